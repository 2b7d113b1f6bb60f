use derive_more::Display;

use crate::{
    color::{linear::BLACK, Rgb},
    interaction::SurfaceInteraction,
    math::vec::{Vec3, Vec3AsRgbExt},
    resampling::sampler::SamplerResult,
    scene::World,
    spatial::PointLightIndex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ShadingMode {
    /// Direct lighting from the resampled light sample
    #[default]
    Shading,
    Albedo,
    Normal,
    /// Surfaces close to a VPL take the color of the closest one
    #[display("VPL")]
    Vpl,
}

/// Vertical gradient returned by rays that leave the scene
pub fn sky_color(direction: Vec3) -> Rgb {
    let t = 0.5 * (direction.normalize_or_zero().y + 1.0);
    ((1.0 - t) * Vec3::ONE + t * Vec3::new(0.5, 0.7, 1.0)).rgb()
}

pub struct Shader {
    pub mode: ShadingMode,
    pub shadow_epsilon: f32,
    pub vpl_index: Option<PointLightIndex>,
    pub vpl_radius: f32,
}

impl Shader {
    pub fn new(mode: ShadingMode, shadow_epsilon: f32) -> Self {
        Self {
            mode,
            shadow_epsilon,
            vpl_index: None,
            vpl_radius: 0.05,
        }
    }

    /// Indexes the current point lights of the world for [ShadingMode::Vpl]
    pub fn index_vpls(&mut self, world: &World) {
        self.vpl_index = Some(PointLightIndex::build(&world.lights));
    }

    pub fn shade(&self, world: &World, hit: &SurfaceInteraction, sample: &SamplerResult) -> Rgb {
        if !hit.is_hit() {
            return sky_color(hit.ray.direction);
        }
        let Some(material) = world.material(hit.material) else {
            return BLACK;
        };
        if material.emits_light() {
            return material.emitted();
        }

        match self.mode {
            ShadingMode::Shading => self.direct_lighting(world, hit, sample),
            ShadingMode::Albedo => material.albedo(),
            ShadingMode::Normal => (0.5 * (hit.shading_normal + Vec3::ONE)).rgb(),
            ShadingMode::Vpl => self.vpl_color(hit),
        }
    }

    /// `Le * f_r * |cos θ_s| * V * W`
    fn direct_lighting(&self, world: &World, hit: &SurfaceInteraction, sample: &SamplerResult) -> Rgb {
        if !(sample.w > 0.0) {
            return BLACK;
        }
        let Some(light) = sample.light.and_then(|handle| world.lights.get(handle)) else {
            return BLACK;
        };
        let Some(material) = world.material(hit.material) else {
            return BLACK;
        };
        if !world.unoccluded(hit.position, sample.light_point, self.shadow_epsilon) {
            return BLACK;
        }

        let wi = sample.light_direction;
        let cos = hit.shading_normal.dot(wi).abs();
        let color = (sample.w as f32 * cos) * (light.radiance() * material.evaluate(hit, wi));
        if color.is_finite() {
            color
        } else {
            crate::counter!("Non finite shading");
            BLACK
        }
    }

    fn vpl_color(&self, hit: &SurfaceInteraction) -> Rgb {
        let Some(index) = &self.vpl_index else {
            return BLACK;
        };
        match index.nearest(hit.position) {
            Some((_, light, distance)) if distance <= self.vpl_radius => light.color,
            _ => BLACK,
        }
    }
}
