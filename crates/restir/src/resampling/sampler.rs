use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng as _;
use rayon::prelude::*;

use crate::{
    error::{Error, Result},
    interaction::SurfaceInteraction,
    light::LightHandle,
    math::{float::FloatAsExt, point::Point},
    scene::World,
    timed_scope_accumulate,
    utils::log_once::warn_once,
    Rng, Seed,
};

use super::{
    buffers::ReservoirBuffers,
    reservoir::{Reservoir, SampleInfo},
    RestirConfig, SamplingMode,
};

const STREAM_INITIAL: u32 = 0;
const STREAM_SPATIAL: u32 = 1;

/// Per pixel output handed to shading.
///
/// `light == None` or `w == 0` means no direct lighting for this pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerResult {
    pub light_point: Point,
    /// Unit vector from the surface towards `light_point`
    pub light_direction: Vec3,
    pub light: Option<LightHandle>,
    pub w: f64,
}

impl SamplerResult {
    pub const NONE: SamplerResult = SamplerResult {
        light_point: Point::ORIGIN,
        light_direction: Vec3::ZERO,
        light: None,
        w: 0.0,
    };

    fn from_reservoir(reservoir: &Reservoir, hit: &SurfaceInteraction) -> Self {
        match reservoir.y.light {
            Some(light) if reservoir.w > 0.0 => SamplerResult {
                light_point: reservoir.y.point,
                light_direction: (reservoir.y.point - hit.position).normalize_or_zero(),
                light: Some(light),
                w: reservoir.w,
            },
            _ => SamplerResult::NONE,
        }
    }
}

impl Default for SamplerResult {
    fn default() -> Self {
        Self::NONE
    }
}

/// Target and source densities of a light sample seen from a surface point.
///
/// `source` is in solid angle measure.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightWeight {
    pub target: f64,
    pub source: f64,
}

impl LightWeight {
    pub const ZERO: LightWeight = LightWeight {
        target: 0.0,
        source: 0.0,
    };

    /// Resampling weight `target / source`, zero when the source density is degenerate
    pub fn weight(&self) -> f64 {
        (self.target / self.source).finite_non_negative_or_zero()
    }
}

/// Owns the per pixel reservoirs and runs the frame pipeline: initial candidates, temporal
/// reuse, spatial reuse.
pub struct RestirLightSampler {
    width: u32,
    height: u32,
    config: RestirConfig,
    lights: Vec<LightHandle>,
    buffers: ReservoirBuffers,
    seed: u64,
    frame: u32,
}

impl RestirLightSampler {
    pub fn new(
        width: u32,
        height: u32,
        lights: Vec<LightHandle>,
        config: RestirConfig,
        seed: u64,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        log::debug!(
            "light sampler: {}x{} pixels, {} lights, {} mode",
            width,
            height,
            lights.len(),
            config.mode
        );
        Ok(Self {
            width,
            height,
            config,
            lights,
            buffers: ReservoirBuffers::new(width as usize * height as usize),
            seed,
            frame: 0,
        })
    }

    pub fn config(&self) -> &RestirConfig {
        &self.config
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn num_lights(&self) -> usize {
        self.lights.len()
    }

    /// Drops the reservoir history, e.g. after a camera move
    pub fn reset(&mut self) {
        self.buffers.clear();
    }

    pub fn set_lights(&mut self, lights: Vec<LightHandle>) {
        self.lights = lights;
        self.reset();
    }

    fn pixel_seed(&self, index: usize, frame: u32) -> Seed {
        Seed {
            seed: self.seed,
            x: (index % self.width as usize) as u32,
            y: (index / self.width as usize) as u32,
            sample_idx: frame,
        }
    }

    /// Pixels that can receive direct lighting: a hit on a non emissive surface
    fn is_shadable(hit: &SurfaceInteraction, world: &World) -> bool {
        hit.is_hit()
            && world
                .material(hit.material)
                .is_some_and(|material| !material.emits_light())
    }

    pub fn light_weight(&self, sample: &SampleInfo, hit: &SurfaceInteraction, world: &World) -> LightWeight {
        let Some(handle) = sample.light else {
            return LightWeight::ZERO;
        };
        let Some(light) = world.lights.get(handle) else {
            warn_once!("a reservoir refers to an expired light");
            return LightWeight::ZERO;
        };
        let Some(material) = world.material(hit.material) else {
            return LightWeight::ZERO;
        };

        let to_light = sample.point - hit.position;
        let dist2 = to_light.length_squared();
        if !(dist2 > 0.0) {
            return LightWeight::ZERO;
        }
        let l = to_light / dist2.sqrt();
        let cos_surface = hit.shading_normal.dot(l).abs();
        let cos_light = light.cos_emission(sample.point, -l);

        let target = (light.radiance() * material.evaluate(hit, l)).luminance() as f64 * cos_surface as f64;
        // (1 / N) * (1 / A) * d² / |cos θ_l|
        let source = dist2 as f64 / (self.lights.len() as f64 * light.area() as f64 * cos_light as f64);
        LightWeight { target, source }
    }

    /// Streams the initial candidates of a pixel into a fresh reservoir
    pub fn set_initial_sample(
        &self,
        reservoir: &mut Reservoir,
        hit: &SurfaceInteraction,
        world: &World,
        rng: &mut Rng,
    ) {
        reservoir.reset();
        if self.lights.is_empty() {
            return;
        }

        let candidates = match self.config.mode {
            SamplingMode::Uniform => 1,
            SamplingMode::Ris | SamplingMode::Restir => self.config.initial_candidates.max(1),
        };
        for _ in 0..candidates {
            crate::counter!("Initial candidates");
            let handle = self.lights[rng.gen_range(0..self.lights.len())];
            let Some(light) = world.lights.get(handle) else {
                warn_once!("the light sampler holds an expired light handle");
                reservoir.update(rng, SampleInfo::NONE, 0.0, 0.0);
                continue;
            };
            let sample = SampleInfo {
                light: Some(handle),
                point: light.sample_on_light(rng).point,
            };
            let weight = self.light_weight(&sample, hit, world);
            reservoir.update(rng, sample, weight.weight(), weight.target);
        }
        reservoir.finalize();
    }

    pub fn is_visible(&self, sample: &SampleInfo, hit: &SurfaceInteraction, world: &World) -> bool {
        world.unoccluded(hit.position, sample.point, self.config.shadow_epsilon)
    }

    /// Zeroes `w` when the kept sample is occluded from `hit`, and `phat` too if `clear_target`.
    ///
    /// Returns whether the sample is visible. Reservoirs without a usable sample are left as is.
    pub fn visibility_check(
        &self,
        reservoir: &mut Reservoir,
        hit: &SurfaceInteraction,
        world: &World,
        clear_target: bool,
    ) -> bool {
        if reservoir.y.light.is_none() || !(reservoir.phat > 0.0) {
            return false;
        }
        let visible = self.is_visible(&reservoir.y, hit, world);
        if !visible {
            reservoir.w = 0.0;
            if clear_target {
                reservoir.phat = 0.0;
            }
        }
        visible
    }

    /// Copy of a reservoir with its target re-evaluated at `hit`
    fn retarget(&self, reservoir: &Reservoir, hit: &SurfaceInteraction, world: &World) -> Reservoir {
        let mut retargeted = *reservoir;
        if !retargeted.is_empty() {
            retargeted.phat = self.light_weight(&retargeted.y, hit, world).target;
        }
        retargeted
    }

    /// Solid angle Jacobian of moving a light sample from the pixel at `from` to the one at `to`:
    /// `(|cos θ_l,to| / d_to²) / (|cos θ_l,from| / d_from²)`
    pub fn reconnection_jacobian(
        &self,
        sample: &SampleInfo,
        from: &SurfaceInteraction,
        to: &SurfaceInteraction,
        world: &World,
    ) -> f64 {
        let Some(light) = sample.light.and_then(|handle| world.lights.get(handle)) else {
            return 0.0;
        };
        let geometry = |hit: &SurfaceInteraction| {
            let to_light = sample.point - hit.position;
            let dist2 = to_light.length_squared();
            if !(dist2 > 0.0) {
                return 0.0;
            }
            light.cos_emission(sample.point, -to_light / dist2.sqrt()) as f64 / dist2 as f64
        };
        (geometry(to) / geometry(from)).finite_non_negative_or_zero()
    }

    pub fn temporal_update(
        &self,
        current: &Reservoir,
        previous: &Reservoir,
        hit: &SurfaceInteraction,
        world: &World,
        rng: &mut Rng,
    ) -> Reservoir {
        let mut previous = self.retarget(previous, hit, world);
        previous.m = previous.m.min(self.config.m_cap.saturating_mul(current.m));
        Reservoir::combine(&[*current, previous], rng)
    }

    fn is_reusable(&self, hit: &SurfaceInteraction, neighbour: &SurfaceInteraction, world: &World) -> bool {
        Self::is_shadable(neighbour, world)
            && hit.shading_normal.distance(neighbour.shading_normal) <= self.config.normal_threshold
            && (hit.t - neighbour.t).abs() <= self.config.depth_threshold
    }

    /// Pixel indices of the random neighbours of `index` that pass the similarity tests
    fn spatial_neighbours(&self, index: usize, hits: &[SurfaceInteraction], world: &World, rng: &mut Rng) -> Vec<usize> {
        let (width, height) = (self.width as i64, self.height as i64);
        let x = index as i64 % width;
        let y = index as i64 / width;

        let mut neighbours = Vec::with_capacity(self.config.neighbour_count as usize);
        for _ in 0..self.config.neighbour_count {
            let radius = rng.gen::<f32>() * self.config.neighbour_radius;
            let (sin, cos) = (rng.gen::<f32>() * TAU).sin_cos();
            let dx = (radius * cos) as i64;
            let dy = (radius * sin) as i64;
            if dx == 0 && dy == 0 {
                continue;
            }
            let (nx, ny) = (x + dx, y + dy);
            if !(0..width).contains(&nx) || !(0..height).contains(&ny) {
                continue;
            }

            let neighbour = (ny * width + nx) as usize;
            if self.is_reusable(&hits[index], &hits[neighbour], world) {
                neighbours.push(neighbour);
            } else {
                crate::counter!("Spatial neighbours rejected");
            }
        }
        neighbours
    }

    fn spatial_update(
        &self,
        index: usize,
        hits: &[SurfaceInteraction],
        previous: &[Reservoir],
        world: &World,
        rng: &mut Rng,
    ) -> Reservoir {
        let hit = &hits[index];
        let mut candidates = Vec::with_capacity(self.config.neighbour_count as usize + 1);
        candidates.push(previous[index]);

        for neighbour in self.spatial_neighbours(index, hits, world, rng) {
            let mut candidate = self.retarget(&previous[neighbour], hit, world);
            if candidate.is_empty() {
                continue;
            }
            // `w` is a solid angle weight at the neighbour
            candidate.w *= self.reconnection_jacobian(&candidate.y, &hits[neighbour], hit, world);
            self.visibility_check(&mut candidate, hit, world, true);
            candidates.push(candidate);
        }

        Reservoir::combine(&candidates, rng)
    }

    /// Runs one frame of resampling over the row major primary hits of the raster.
    pub fn sample_lights(&mut self, hits: &[SurfaceInteraction], world: &World) -> Result<Vec<SamplerResult>> {
        let expected = self.buffers.len();
        if hits.len() != expected {
            return Err(Error::FrameSizeMismatch {
                expected,
                got: hits.len(),
            });
        }
        if self.lights.is_empty() {
            return Ok(vec![SamplerResult::NONE; expected]);
        }

        let frame = self.frame;
        self.frame = self.frame.wrapping_add(1);

        let mut buffers = std::mem::take(&mut self.buffers);
        let this = &*self;

        // The previous buffer now holds last frame's final reservoirs
        buffers.swap();
        {
            let (current, previous) = buffers.split_mut();
            timed_scope_accumulate!("Initial and temporal resampling", || {
                current
                    .par_iter_mut()
                    .zip(previous.par_iter())
                    .enumerate()
                    .for_each(|(index, (reservoir, history))| {
                        let hit = &hits[index];
                        if !Self::is_shadable(hit, world) {
                            reservoir.reset();
                            return;
                        }
                        let mut rng = this.pixel_seed(index, frame).into_rng(STREAM_INITIAL);
                        this.set_initial_sample(reservoir, hit, world, &mut rng);
                        this.visibility_check(reservoir, hit, world, false);
                        if this.config.mode.reuses_reservoirs() {
                            *reservoir = this.temporal_update(reservoir, history, hit, world, &mut rng);
                        }
                    })
            });
        }

        if this.config.mode.reuses_reservoirs() {
            // The temporal results become the read only input of spatial reuse
            buffers.swap();
            let (current, previous) = buffers.split_mut();
            timed_scope_accumulate!("Spatial resampling", || {
                current
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(index, reservoir)| {
                        if !Self::is_shadable(&hits[index], world) {
                            reservoir.reset();
                            return;
                        }
                        let mut rng = this.pixel_seed(index, frame).into_rng(STREAM_SPATIAL);
                        *reservoir = this.spatial_update(index, hits, previous, world, &mut rng);
                    })
            });
        }

        let results = buffers
            .current()
            .par_iter()
            .zip(hits.par_iter())
            .map(|(reservoir, hit)| SamplerResult::from_reservoir(reservoir, hit))
            .collect();
        self.buffers = buffers;
        Ok(results)
    }
}
