use glam::Vec3;

use crate::{material::MaterialId, math::point::Point, ray::Ray};

/// Distance reported for rays that escape the scene
pub const NO_HIT: f32 = 1e30;

/// What a camera or photon ray found.
///
/// Both normals face the incoming ray. A miss is encoded with `t == NO_HIT` rather than an
/// Option so a whole frame can be stored as a flat buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInteraction {
    pub ray: Ray,
    pub t: f32,
    pub position: Point,
    pub geometric_normal: Vec3,
    pub shading_normal: Vec3,
    pub barycentric: [f32; 3],
    pub primitive: usize,
    pub material: MaterialId,
}

impl SurfaceInteraction {
    pub fn no_hit(ray: Ray) -> Self {
        Self {
            ray,
            t: NO_HIT,
            position: ray.origin,
            geometric_normal: Vec3::ZERO,
            shading_normal: Vec3::ZERO,
            barycentric: [0.0; 3],
            primitive: usize::MAX,
            material: MaterialId(usize::MAX),
        }
    }

    pub fn is_hit(&self) -> bool {
        self.t < NO_HIT
    }
}
