pub mod examples;

use glam::Vec3;

use crate::{
    aggregate::{Bvh, SceneOracle},
    color::Rgb,
    error::{Error, Result},
    geometry::{quad, Triangle},
    interaction::SurfaceInteraction,
    light::{AreaLight, LightCatalog},
    material::{Material, MaterialDescriptor, MaterialId},
    math::point::Point,
    ray::Ray,
    utils::{log_once::error_once, timer::timed_scope_log},
};

/// Everything a frame needs to know about the scene. Immutable while a frame is rendered.
pub struct World {
    pub objects: Box<dyn SceneOracle>,
    pub materials: Vec<MaterialDescriptor>,
    pub lights: LightCatalog,
}

impl World {
    pub fn new(
        objects: Box<dyn SceneOracle>,
        materials: Vec<MaterialDescriptor>,
        lights: LightCatalog,
    ) -> Self {
        Self {
            objects,
            materials,
            lights,
        }
    }

    /// Out of range ids are reported once and treated as a miss by callers.
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        match self.materials.get(id.0) {
            Some(descriptor) => Some(&descriptor.material),
            None => {
                error_once!("material id {} is out of range ({} materials)", id.0, self.materials.len());
                None
            }
        }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
        self.objects.intersect(ray)
    }

    pub fn trace(&self, ray: Ray) -> SurfaceInteraction {
        self.objects
            .intersect(&ray)
            .unwrap_or_else(|| SurfaceInteraction::no_hit(ray))
    }

    /// Shadow ray between two points, ignoring `epsilon` at both ends
    pub fn unoccluded(&self, from: Point, to: Point, epsilon: f32) -> bool {
        crate::counter!("Shadow rays");
        match Ray::shadow(from, to, epsilon) {
            Some(ray) => !self.objects.is_occluded(&ray),
            None => true,
        }
    }
}

/// Collects triangles, materials and area lights, then commits them into a [World].
#[derive(Default)]
pub struct SceneBuilder {
    triangles: Vec<Triangle>,
    materials: Vec<MaterialDescriptor>,
    area_lights: Vec<AreaLight>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a material and returns the Material ID associated with this material
    pub fn insert_material(&mut self, label: Option<String>, material: Material) -> MaterialId {
        self.materials.push(MaterialDescriptor { label, material });
        MaterialId(self.materials.len() - 1)
    }

    pub fn insert_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn insert_quad(&mut self, corner: Point, a: Vec3, b: Vec3, material: MaterialId) {
        self.triangles.extend(quad(corner, a, b, material));
    }

    /// Emissive triangle: geometry plus the area light backing it
    pub fn insert_area_light(&mut self, triangle: Triangle, color: Rgb, intensity: f32) {
        self.area_lights.push(AreaLight {
            triangle,
            color,
            intensity,
        });
        self.triangles.push(triangle);
    }

    pub fn insert_emissive_quad(&mut self, corner: Point, a: Vec3, b: Vec3, color: Rgb, intensity: f32) {
        let material = self.insert_material(
            Some("Emitter".to_owned()),
            Material::Emissive {
                radiance: intensity * color,
            },
        );
        for triangle in quad(corner, a, b, material) {
            self.insert_area_light(triangle, color, intensity);
        }
    }

    pub fn commit(self) -> Result<World> {
        if self.triangles.is_empty() {
            return Err(Error::EmptyScene);
        }
        log::info!(
            "committing scene: {} triangles, {} materials, {} area lights",
            self.triangles.len(),
            self.materials.len(),
            self.area_lights.len()
        );
        let bvh = timed_scope_log("Build bvh", || Bvh::new(self.triangles)).res;
        Ok(World::new(
            Box::new(bvh),
            self.materials,
            LightCatalog::new(self.area_lights),
        ))
    }
}
