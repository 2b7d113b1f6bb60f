pub mod bvh;

pub use bvh::Bvh;

use crate::{interaction::SurfaceInteraction, ray::Ray};

/// Answers ray queries against the scene geometry.
///
/// Implementors must be shareable across the worker threads of a frame.
pub trait SceneOracle: Send + Sync {
    /// Closest hit within the ray bounds, normals facing the ray
    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction>;

    /// Whether anything lies within the ray bounds
    fn is_occluded(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }
}
