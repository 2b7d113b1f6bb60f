//! Nearest neighbour queries over point light positions. Only used for debug views.

pub mod kdtree;

pub use kdtree::KdTree;

use crate::{
    light::{LightCatalog, LightHandle, PointLight},
    math::point::Point,
};

/// k-d tree over the point lights of a catalog
pub struct PointLightIndex {
    tree: KdTree,
    lights: Vec<(LightHandle, PointLight)>,
}

impl PointLightIndex {
    pub fn build(catalog: &LightCatalog) -> Self {
        let lights: Vec<(LightHandle, PointLight)> =
            catalog.point_lights().map(|(h, l)| (h, *l)).collect();
        let tree = KdTree::new(lights.iter().map(|(_, l)| l.position).collect());
        log::debug!("indexed {} point lights", lights.len());
        Self { tree, lights }
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Closest point light and its distance
    pub fn nearest(&self, p: Point) -> Option<(LightHandle, &PointLight, f32)> {
        let (index, dist2) = self.tree.nearest(p)?;
        let (handle, light) = &self.lights[index];
        Some((*handle, light, dist2.sqrt()))
    }

    pub fn within_radius(&self, p: Point, radius: f32) -> Vec<LightHandle> {
        self.tree
            .within_radius(p, radius)
            .into_iter()
            .map(|i| self.lights[i].0)
            .collect()
    }
}
