use std::{f32::consts, ops::Deref};

use glam::Vec3;
use rand::{distributions::Uniform, prelude::Distribution, Rng};

/// Samples are expected to be in [0;1(^N
pub struct Samples<const N: usize>(pub [f32; N]);

impl<const N: usize> Samples<N> {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let uniform = Uniform::new(0., 1.);
        Samples(std::array::from_fn(|_| uniform.sample(rng)))
    }
}

impl<const N: usize> Deref for Samples<N> {
    type Target = [f32; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub trait Samplable<T, const N: usize> {
    fn sample_with(&self, samples: Samples<N>) -> T;
}

/// Density of a direction, in solid angle measure, given its cosine with the frame axis
pub trait DirectionalPDF {
    fn pdf(&self, costheta: f32) -> f32;
}

macro_rules! distribution_from_samplable {
    ($t:ty, $out:ty, $n:literal) => {
        impl Distribution<$out> for $t {
            fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> $out {
                self.sample_with(Samples::<$n>::draw(rng))
            }
        }
    };
}

pub struct UniformUnitBall2;
impl Samplable<[f32; 2], 2> for UniformUnitBall2 {
    fn sample_with(&self, samples: Samples<2>) -> [f32; 2] {
        let phi = consts::TAU * samples[0];
        let r = samples[1].sqrt();
        let (s, c) = f32::sin_cos(phi);
        [r * c, r * s]
    }
}
distribution_from_samplable!(UniformUnitBall2, [f32; 2], 2);

pub struct UniformUnitSphere3;
impl Samplable<Vec3, 2> for UniformUnitSphere3 {
    fn sample_with(&self, samples: Samples<2>) -> Vec3 {
        let z = 1.0 - 2.0 * samples[0];
        let r = f32::sqrt(f32::max(0.0, 1.0 - z * z));
        let (s, c) = f32::sin_cos(consts::TAU * samples[1]);
        Vec3::new(r * c, r * s, z)
    }
}
impl DirectionalPDF for UniformUnitSphere3 {
    fn pdf(&self, _costheta: f32) -> f32 {
        0.25 * consts::FRAC_1_PI
    }
}
distribution_from_samplable!(UniformUnitSphere3, Vec3, 2);

pub struct UniformHemisphere3;
impl Samplable<Vec3, 2> for UniformHemisphere3 {
    fn sample_with(&self, samples: Samples<2>) -> Vec3 {
        let z = samples[0];
        let r = f32::sqrt(f32::max(0.0, 1.0 - z * z));
        let (s, c) = f32::sin_cos(consts::TAU * samples[1]);
        Vec3::new(r * c, r * s, z)
    }
}
impl DirectionalPDF for UniformHemisphere3 {
    fn pdf(&self, _costheta: f32) -> f32 {
        0.5 * consts::FRAC_1_PI
    }
}
distribution_from_samplable!(UniformHemisphere3, Vec3, 2);

pub struct CosineHemisphere3;
impl Samplable<Vec3, 2> for CosineHemisphere3 {
    fn sample_with(&self, samples: Samples<2>) -> Vec3 {
        let [x, y] = UniformUnitBall2.sample_with(samples);
        let z = f32::sqrt(f32::max(0.0, 1.0 - x * x - y * y));
        Vec3::new(x, y, z)
    }
}
impl DirectionalPDF for CosineHemisphere3 {
    fn pdf(&self, costheta: f32) -> f32 {
        f32::max(costheta, 0.0) * consts::FRAC_1_PI
    }
}
distribution_from_samplable!(CosineHemisphere3, Vec3, 2);

/// Cosine lobes on both sides of the +z axis, each picked with probability 1/2.
pub struct TwoSidedCosine3;
impl Samplable<Vec3, 3> for TwoSidedCosine3 {
    fn sample_with(&self, samples: Samples<3>) -> Vec3 {
        let w = CosineHemisphere3.sample_with(Samples([samples[0], samples[1]]));
        if samples[2] < 0.5 {
            w
        } else {
            Vec3::new(w.x, w.y, -w.z)
        }
    }
}
impl DirectionalPDF for TwoSidedCosine3 {
    fn pdf(&self, costheta: f32) -> f32 {
        0.5 * costheta.abs() * consts::FRAC_1_PI
    }
}
distribution_from_samplable!(TwoSidedCosine3, Vec3, 3);

/// Uniform barycentric coordinates over a triangle
pub struct UniformTriangle;
impl Samplable<[f32; 3], 2> for UniformTriangle {
    fn sample_with(&self, samples: Samples<2>) -> [f32; 3] {
        let su0 = samples[0].sqrt();
        let b1 = 1.0 - su0;
        let b2 = samples[1] * su0;
        [1.0 - b1 - b2, b1, b2]
    }
}
distribution_from_samplable!(UniformTriangle, [f32; 3], 2);

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{math::stat::VarianceSeries, Rng};

    #[test]
    fn cosine_hemisphere_matches_its_pdf() {
        // E[cos] under a cosine lobe is 2/3
        let mut rng = Rng::seed_from_u64(1);
        let mut series = VarianceSeries::new();
        for _ in 0..50_000 {
            let w: Vec3 = CosineHemisphere3.sample(&mut rng);
            assert!(w.z >= 0.0);
            assert!((w.length() - 1.0).abs() < 1e-4);
            series.add_sample(w.z as f64);
        }
        let err = series.error_with_95_confidence().unwrap();
        assert!((series.mean() - 2.0 / 3.0).abs() < 2.0 * err, "{}", series.mean());
    }

    #[test]
    fn uniform_sphere_integrates_to_its_area() {
        // Estimates ∫ 1 dω = 4π with the pdf, and E[z] = 0
        let mut rng = Rng::seed_from_u64(2);
        let mut z = VarianceSeries::new();
        for _ in 0..50_000 {
            let w: Vec3 = UniformUnitSphere3.sample(&mut rng);
            z.add_sample(w.z as f64);
        }
        assert!(z.mean().abs() < 0.02);
        assert!((1.0 / UniformUnitSphere3.pdf(0.0) - 4.0 * consts::PI).abs() < 1e-4);
    }

    #[test]
    fn two_sided_cosine_covers_both_sides() {
        let mut rng = Rng::seed_from_u64(3);
        let mut below = 0;
        for _ in 0..10_000 {
            let w: Vec3 = TwoSidedCosine3.sample(&mut rng);
            if w.z < 0.0 {
                below += 1;
            }
        }
        assert!((4_500..5_500).contains(&below));
    }

    #[test]
    fn triangle_samples_are_inside() {
        let mut rng = Rng::seed_from_u64(4);
        for _ in 0..1_000 {
            let b: [f32; 3] = UniformTriangle.sample(&mut rng);
            assert!(b.iter().all(|&x| (-1e-6..=1.0 + 1e-6).contains(&x)));
            assert!((b.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        }
    }
}
