//! Emitters. Area lights come from the scene description, point lights are what the photon
//! tracer leaves behind.

pub mod catalog;

pub use catalog::{LightCatalog, LightHandle};

use glam::Vec3;
use rand::Rng;

use crate::{
    color::Rgb,
    geometry::Triangle,
    math::{
        distributions::{DirectionalPDF, Samplable, Samples, TwoSidedCosine3, UniformUnitSphere3},
        frame::Frame,
        point::Point,
    },
};

/// Emitting triangle. It emits on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaLight {
    pub triangle: Triangle,
    pub color: Rgb,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Emission {
    /// Two sided cosine lobe around `normal`
    Cosine { normal: Vec3 },
    Isotropic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Point,
    pub color: Rgb,
    pub intensity: f32,
    pub emission: Emission,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Area(AreaLight),
    Point(PointLight),
}

/// A point on a light and its density with respect to the light's area
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    pub point: Point,
    pub pdf: f32,
}

/// An emission direction and its density in solid angle
#[derive(Debug, Clone, Copy)]
pub struct DirectionSample {
    pub direction: Vec3,
    pub pdf: f32,
}

fn sample_emission<R: Rng + ?Sized>(emission: Emission, rng: &mut R) -> DirectionSample {
    match emission {
        Emission::Cosine { normal } => {
            let local = TwoSidedCosine3.sample_with(Samples::<3>::draw(rng));
            DirectionSample {
                direction: Frame::new(normal).from_local(local),
                pdf: TwoSidedCosine3.pdf(local.z),
            }
        }
        Emission::Isotropic => {
            let direction = UniformUnitSphere3.sample_with(Samples::<2>::draw(rng));
            DirectionSample {
                direction,
                pdf: UniformUnitSphere3.pdf(direction.z),
            }
        }
    }
}

impl Emission {
    /// Emission falloff towards `direction`
    pub fn cosine(&self, direction: Vec3) -> f32 {
        match self {
            Emission::Cosine { normal } => normal.dot(direction).abs(),
            Emission::Isotropic => 1.0,
        }
    }
}

impl AreaLight {
    pub fn radiance(&self) -> Rgb {
        self.intensity * self.color
    }

    pub fn power(&self) -> f32 {
        self.intensity * self.triangle.area()
    }

    pub fn normal_at(&self, point: Point) -> Vec3 {
        self.triangle
            .shading_normal(self.triangle.barycentric_of(point))
    }
}

impl PointLight {
    pub fn new(position: Point, color: Rgb, intensity: f32, emission: Emission) -> Self {
        Self {
            position,
            color,
            intensity,
            emission,
        }
    }

    /// Splits a radiance into a unit color and a scalar intensity.
    pub fn from_radiance(position: Point, radiance: Rgb, emission: Emission) -> Self {
        let intensity = radiance.max_element();
        let color = if intensity > 0.0 {
            radiance / intensity
        } else {
            radiance
        };
        Self::new(position, color, intensity.max(0.0), emission)
    }

    pub fn radiance(&self) -> Rgb {
        self.intensity * self.color
    }

    pub fn sample_direction<R: Rng + ?Sized>(&self, rng: &mut R) -> DirectionSample {
        sample_emission(self.emission, rng)
    }
}

impl Light {
    pub fn color(&self) -> Rgb {
        match self {
            Light::Area(l) => l.color,
            Light::Point(l) => l.color,
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Area(l) => l.intensity,
            Light::Point(l) => l.intensity,
        }
    }

    /// `Le`, constant over the light
    pub fn radiance(&self) -> Rgb {
        self.intensity() * self.color()
    }

    /// Point lights count as unit area so the same area to solid angle conversion applies to both
    /// kinds.
    pub fn area(&self) -> f32 {
        match self {
            Light::Area(l) => l.triangle.area(),
            Light::Point(_) => 1.0,
        }
    }

    pub fn normal_at(&self, point: Point) -> Option<Vec3> {
        match self {
            Light::Area(l) => Some(l.normal_at(point)),
            Light::Point(PointLight {
                emission: Emission::Cosine { normal },
                ..
            }) => Some(*normal),
            Light::Point(_) => None,
        }
    }

    /// `|cos θ_l|` between the emitter normal at `point` and `direction`, 1 for isotropic lights
    pub fn cos_emission(&self, point: Point, direction: Vec3) -> f32 {
        match self {
            Light::Area(l) => l.normal_at(point).dot(direction).abs(),
            Light::Point(l) => l.emission.cosine(direction),
        }
    }

    pub fn sample_on_light<R: Rng + ?Sized>(&self, rng: &mut R) -> LightSample {
        match self {
            Light::Area(l) => LightSample {
                point: l.triangle.sample_point(Samples::<2>::draw(rng)),
                pdf: 1.0 / l.triangle.area(),
            },
            Light::Point(l) => LightSample {
                point: l.position,
                pdf: 1.0,
            },
        }
    }

    pub fn sample_direction<R: Rng + ?Sized>(&self, point: Point, rng: &mut R) -> DirectionSample {
        match self {
            Light::Area(l) => sample_emission(
                Emission::Cosine {
                    normal: l.normal_at(point),
                },
                rng,
            ),
            Light::Point(l) => l.sample_direction(rng),
        }
    }
}
