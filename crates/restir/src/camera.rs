use glam::Vec3;
use rayon::prelude::*;

use crate::{
    error::{Error, Result},
    interaction::SurfaceInteraction,
    math::point::Point,
    ray::Ray,
    scene::World,
};

/// Pinhole camera shooting one ray through the centre of each pixel
#[derive(Debug, Clone)]
pub struct Camera {
    pub width: u32,
    pub height: u32,
    origin: Point,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    tan_half_vfov: f32,
}

impl Camera {
    /// `vfov` is the vertical field of view in radians. `up` only needs to be non colinear with
    /// the view direction.
    pub fn look_at(from: Point, to: Point, up: Vec3, vfov: f32, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let forward = (to - from).normalize_or_zero();
        let right = forward.cross(up).normalize_or_zero();
        let up = right.cross(forward);

        Ok(Self {
            width,
            height,
            origin: from,
            forward,
            right,
            up,
            tan_half_vfov: (0.5 * vfov).tan(),
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn ray(&self, x: u32, y: u32) -> Ray {
        let aspect = self.width as f32 / self.height as f32;
        let ndc_x = (x as f32 + 0.5) / self.width as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - (y as f32 + 0.5) / self.height as f32 * 2.0;
        let direction = self.forward
            + ndc_x * self.tan_half_vfov * aspect * self.right
            + ndc_y * self.tan_half_vfov * self.up;
        Ray::new(self.origin, direction)
    }

    /// Primary hits of the whole raster, row major
    pub fn surface_interactions(&self, world: &World) -> Vec<SurfaceInteraction> {
        (0..self.pixel_count())
            .into_par_iter()
            .map(|index| {
                let x = (index % self.width as usize) as u32;
                let y = (index / self.width as usize) as u32;
                world.trace(self.ray(x, y))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_pixel_looks_forward() {
        let camera = Camera::look_at(
            Point::new(0., 0., 1.),
            Point::ORIGIN,
            Vec3::Y,
            std::f32::consts::FRAC_PI_2,
            15,
            15,
        )
        .unwrap();
        assert!(camera.ray(7, 7).direction.distance(-Vec3::Z) < 1e-6);
        // Top left pixel goes up and left
        let corner = camera.ray(0, 0).direction;
        assert!(corner.y > 0.0 && corner.x < 0.0);

        assert_eq!(
            Camera::look_at(Point::ORIGIN, Point::new(0., 0., -1.), Vec3::Y, 1.0, 0, 4).unwrap_err(),
            Error::InvalidDimensions { width: 0, height: 4 }
        );
    }
}
