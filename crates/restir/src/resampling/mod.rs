//! Reservoir based light resampling (RIS, and its spatiotemporal ReSTIR extension).

pub mod buffers;
pub mod reservoir;
pub mod sampler;

pub use buffers::ReservoirBuffers;
pub use reservoir::{Reservoir, SampleInfo};
pub use sampler::{LightWeight, RestirLightSampler, SamplerResult};

use derive_more::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SamplingMode {
    /// Initial candidates, then temporal and spatial reuse
    #[default]
    #[display("ReSTIR")]
    Restir,
    /// One uniformly chosen light per pixel, no resampling
    Uniform,
    /// Initial candidates only
    #[display("RIS")]
    Ris,
}

impl SamplingMode {
    pub fn reuses_reservoirs(self) -> bool {
        matches!(self, SamplingMode::Restir)
    }
}

#[derive(Debug, Clone)]
pub struct RestirConfig {
    pub mode: SamplingMode,
    /// `m`, candidates streamed per pixel and frame
    pub initial_candidates: u32,
    /// `K`, random neighbours considered during spatial reuse
    pub neighbour_count: u32,
    /// Spatial reuse disc radius, in pixels
    pub neighbour_radius: f32,
    /// History length cap, relative to the current reservoir sample count
    pub m_cap: u32,
    /// Max euclidean distance between unit shading normals of reused neighbours
    pub normal_threshold: f32,
    /// Max difference of hit distance of reused neighbours
    pub depth_threshold: f32,
    pub shadow_epsilon: f32,
}

impl Default for RestirConfig {
    fn default() -> Self {
        Self {
            mode: SamplingMode::Restir,
            initial_candidates: 4,
            neighbour_count: 5,
            neighbour_radius: 10.0,
            m_cap: 20,
            normal_threshold: 0.25,
            depth_threshold: 0.5,
            shadow_epsilon: 1e-3,
        }
    }
}
