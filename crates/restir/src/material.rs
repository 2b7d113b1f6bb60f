use std::f32::consts::FRAC_1_PI;

use glam::Vec3;
use rand::Rng;

use crate::{
    color::{linear::BLACK, Rgb},
    interaction::SurfaceInteraction,
    math::{
        distributions::{CosineHemisphere3, DirectionalPDF},
        frame::Frame,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Lambertian { albedo: Rgb },
    Emissive { radiance: Rgb },
}

#[derive(Debug, Clone)]
pub struct MaterialDescriptor {
    pub label: Option<String>,
    pub material: Material,
}

/// A direction drawn from a BSDF lobe
#[derive(Debug, Clone, Copy)]
pub struct BsdfSample {
    pub wi: Vec3,
    pub pdf: f32,
}

impl Material {
    /// BRDF value for light arriving from `wi`, zero under the shading hemisphere.
    ///
    /// The cosine factor is not included.
    pub fn evaluate(&self, hit: &SurfaceInteraction, wi: Vec3) -> Rgb {
        match self {
            Material::Lambertian { albedo } if hit.shading_normal.dot(wi) > 0.0 => {
                FRAC_1_PI * *albedo
            }
            _ => BLACK,
        }
    }

    pub fn albedo(&self) -> Rgb {
        match self {
            Material::Lambertian { albedo } => *albedo,
            Material::Emissive { radiance } => *radiance,
        }
    }

    pub fn emits_light(&self) -> bool {
        matches!(self, Material::Emissive { .. })
    }

    pub fn emitted(&self) -> Rgb {
        match self {
            Material::Emissive { radiance } => *radiance,
            Material::Lambertian { .. } => BLACK,
        }
    }

    /// Cosine weighted direction around `normal`. Emitters absorb everything.
    pub fn sample_direction<R: Rng + ?Sized>(&self, normal: Vec3, rng: &mut R) -> Option<BsdfSample> {
        match self {
            Material::Lambertian { .. } => {
                let local: Vec3 = rng.sample(CosineHemisphere3);
                let pdf = CosineHemisphere3.pdf(local.z);
                (pdf > 0.0).then(|| BsdfSample {
                    wi: Frame::new(normal).from_local(local),
                    pdf,
                })
            }
            Material::Emissive { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{math::point::Point, ray::Ray, Rng};

    fn hit_facing_up() -> SurfaceInteraction {
        SurfaceInteraction {
            t: 1.0,
            geometric_normal: Vec3::Z,
            shading_normal: Vec3::Z,
            material: MaterialId(0),
            primitive: 0,
            ..SurfaceInteraction::no_hit(Ray::new(Point::new(0., 0., 1.), -Vec3::Z))
        }
    }

    #[test]
    fn lambertian_is_albedo_over_pi() {
        let m = Material::Lambertian {
            albedo: Rgb::splat(0.5),
        };
        let hit = hit_facing_up();
        let f = m.evaluate(&hit, Vec3::new(0.0, 0.6, 0.8));
        assert!((f.0[0] - 0.5 / std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(m.evaluate(&hit, -Vec3::Z), BLACK);
    }

    #[test]
    fn sampled_directions_stay_above_the_surface() {
        let m = Material::Lambertian {
            albedo: Rgb::splat(0.5),
        };
        let mut rng = Rng::seed_from_u64(0);
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        for _ in 0..1000 {
            let s = m.sample_direction(normal, &mut rng).unwrap();
            assert!(s.wi.dot(normal) >= 0.0);
            assert!(s.pdf > 0.0);
        }
        let light = Material::Emissive {
            radiance: Rgb::splat(1.0),
        };
        assert!(light.sample_direction(normal, &mut rng).is_none());
        assert!(light.emits_light());
    }
}
