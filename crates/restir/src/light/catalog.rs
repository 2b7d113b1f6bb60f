use crate::light::{AreaLight, Light, PointLight};

/// Stable reference to a light of a [LightCatalog].
///
/// Handles carry the catalog generation they were issued in. Replacing the point lights bumps the
/// generation, which invalidates every outstanding handle: reservoirs that still hold one simply
/// resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightHandle {
    index: u32,
    generation: u32,
}

impl LightHandle {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Owns every light of the scene. Area lights are stored first, point lights after.
#[derive(Debug, Clone, Default)]
pub struct LightCatalog {
    lights: Vec<Light>,
    area_count: usize,
    generation: u32,
}

impl LightCatalog {
    pub fn new(area_lights: Vec<AreaLight>) -> Self {
        let area_count = area_lights.len();
        Self {
            lights: area_lights.into_iter().map(Light::Area).collect(),
            area_count,
            generation: 0,
        }
    }

    /// Replaces all point lights.
    pub fn set_point_lights(&mut self, point_lights: impl IntoIterator<Item = PointLight>) {
        self.lights.truncate(self.area_count);
        self.lights.extend(point_lights.into_iter().map(Light::Point));
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn clear_point_lights(&mut self) {
        self.set_point_lights([]);
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn get(&self, handle: LightHandle) -> Option<&Light> {
        if handle.generation != self.generation {
            return None;
        }
        self.lights.get(handle.index())
    }

    fn handle(&self, index: usize) -> LightHandle {
        LightHandle {
            index: index as u32,
            generation: self.generation,
        }
    }

    pub fn all_handles(&self) -> Vec<LightHandle> {
        (0..self.lights.len()).map(|i| self.handle(i)).collect()
    }

    /// Lights to sample for direct lighting. Point lights, when there are some, were traced from
    /// the area lights and stand in for them.
    pub fn sampled_handles(&self) -> Vec<LightHandle> {
        if self.lights.len() > self.area_count {
            self.point_handles()
        } else {
            self.area_handles()
        }
    }

    pub fn area_handles(&self) -> Vec<LightHandle> {
        (0..self.area_count).map(|i| self.handle(i)).collect()
    }

    pub fn point_handles(&self) -> Vec<LightHandle> {
        (self.area_count..self.lights.len())
            .map(|i| self.handle(i))
            .collect()
    }

    pub fn area_lights(&self) -> impl Iterator<Item = &AreaLight> + '_ {
        self.lights[..self.area_count].iter().filter_map(|l| match l {
            Light::Area(a) => Some(a),
            Light::Point(_) => None,
        })
    }

    pub fn point_lights(&self) -> impl Iterator<Item = (LightHandle, &PointLight)> + '_ {
        self.lights
            .iter()
            .enumerate()
            .skip(self.area_count)
            .filter_map(|(i, l)| match l {
                Light::Point(p) => Some((self.handle(i), p)),
                Light::Area(_) => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::{
        color::Rgb,
        geometry::Triangle,
        light::Emission,
        material::MaterialId,
        math::point::Point,
    };

    fn catalog() -> LightCatalog {
        LightCatalog::new(vec![AreaLight {
            triangle: Triangle::new(
                [
                    Point::new(0., 0., 1.),
                    Point::new(1., 0., 1.),
                    Point::new(0., 1., 1.),
                ],
                MaterialId(0),
            ),
            color: Rgb::splat(1.0),
            intensity: 1.0,
        }])
    }

    fn vpl(z: f32) -> PointLight {
        PointLight::new(
            Point::new(0., 0., z),
            Rgb::splat(1.0),
            1.0,
            Emission::Cosine { normal: Vec3::Z },
        )
    }

    #[test]
    fn handles_expire_when_point_lights_change() {
        let mut catalog = catalog();
        let area = catalog.area_handles()[0];
        assert!(matches!(catalog.get(area), Some(Light::Area(_))));

        catalog.set_point_lights([vpl(0.0), vpl(0.5)]);
        assert!(catalog.get(area).is_none());
        let handles = catalog.all_handles();
        assert_eq!(handles.len(), 3);
        assert_eq!(catalog.point_handles().len(), 2);
        let point = catalog.point_handles()[1];
        assert!(matches!(catalog.get(point), Some(Light::Point(p)) if p.position.0.z == 0.5));

        assert_eq!(catalog.sampled_handles(), catalog.point_handles());

        catalog.clear_point_lights();
        assert!(catalog.get(point).is_none());
        assert_eq!(catalog.sampled_handles(), catalog.area_handles());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.area_lights().count(), 1);
        assert_eq!(catalog.point_lights().count(), 0);
    }
}
