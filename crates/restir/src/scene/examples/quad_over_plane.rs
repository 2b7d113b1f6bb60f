use glam::Vec3;

use crate::{
    camera::Camera,
    color::{linear::WHITE, Rgb},
    error::Result,
    material::Material,
    math::point::Point,
    scene::SceneBuilder,
};

/// A square emitter hovering over a large grey plane. Direct lighting at any point of the plane
/// has a closed form, which makes it the reference scene for convergence checks.
#[derive(Debug, Clone)]
pub struct QuadOverPlaneScene {
    pub light_height: f32,
    pub light_half_size: f32,
    pub light_intensity: f32,
    pub plane_albedo: f32,
}

impl Default for QuadOverPlaneScene {
    fn default() -> Self {
        Self {
            light_height: 1.0,
            light_half_size: 1.0,
            light_intensity: 1.0,
            plane_albedo: 0.5,
        }
    }
}

impl QuadOverPlaneScene {
    pub fn insert_into(&self, builder: &mut SceneBuilder) {
        let grey = builder.insert_material(
            Some("Plane".to_owned()),
            Material::Lambertian {
                albedo: Rgb::splat(self.plane_albedo),
            },
        );
        // Off centre so that the diagonal of the plane does not cross the origin
        builder.insert_quad(Point::new(-9., -11., 0.), 20. * Vec3::X, 20. * Vec3::Y, grey);

        let s = self.light_half_size;
        builder.insert_emissive_quad(
            Point::new(-s, -s, self.light_height),
            2. * s * Vec3::Y,
            2. * s * Vec3::X,
            WHITE,
            self.light_intensity,
        );
    }

    /// Looking straight down from half the light height
    pub fn camera(&self, width: u32, height: u32) -> Result<Camera> {
        Camera::look_at(
            Point::new(0., 0., 0.5 * self.light_height),
            Point::ORIGIN,
            Vec3::Y,
            std::f32::consts::FRAC_PI_2,
            width,
            height,
        )
    }

    /// Outgoing radiance of the plane right below the light centre.
    ///
    /// Sum of the four rectangle to point form factors, one per quarter of the emitter.
    pub fn reference_radiance_below_center(&self) -> f32 {
        let a = self.light_half_size / self.light_height;
        let k = 1.0 / (1.0 + a * a).sqrt();
        let quarter = 2.0 * a * k * (a * k).atan() / (2.0 * std::f32::consts::PI);
        self.plane_albedo * self.light_intensity * 4.0 * quarter
    }
}
