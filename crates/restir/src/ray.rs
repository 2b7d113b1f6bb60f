use std::ops::{Range, RangeInclusive};

use crate::math::{point::Point, vec::Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vec3,
    pub bounds: (f32, f32),
}

impl Ray {
    pub fn new(origin: Point, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            bounds: (0.0, f32::INFINITY),
        }
    }

    pub fn new_with_range(origin: Point, direction: Vec3, range: Range<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            bounds: (range.start, range.end),
        }
    }

    /// Segment from `from` towards `to`, pulled in by `epsilon` at both ends so the surfaces the
    /// endpoints lie on are not reported as blockers.
    ///
    /// Returns None when the endpoints are closer than `2 * epsilon`.
    pub fn shadow(from: Point, to: Point, epsilon: f32) -> Option<Self> {
        let d = to - from;
        let dist = d.length();
        if !(dist > 2.0 * epsilon) {
            return None;
        }
        let direction = d / dist;
        Some(Self {
            origin: from + epsilon * direction,
            direction,
            bounds: (0.0, dist - 2.0 * epsilon),
        })
    }

    pub fn range(&self) -> RangeInclusive<f32> {
        self.bounds.0..=self.bounds.1
    }

    pub fn with_max(self, t_max: f32) -> Self {
        Self {
            bounds: (self.bounds.0, t_max),
            ..self
        }
    }

    pub fn at(&self, t: f32) -> Point {
        self.origin + t * self.direction
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::Ray;
    use crate::math::point::Point;

    #[test]
    fn ray() {
        let eps = 0.01;
        let ray = Ray::new(Point::new(1., 0., 0.), Vec3::new(-1., 1., 0.));

        assert!(ray.at(0.0).distance_squared(ray.origin) < eps);
        assert!(ray.at(1.0).vec().distance_squared(ray.origin.vec() + ray.direction) < eps);
    }

    #[test]
    fn shadow_segment_stops_short() {
        let ray = Ray::shadow(Point::ORIGIN, Point::new(0., 0., 2.), 0.1).unwrap();
        assert!(ray.origin.distance(Point::new(0., 0., 0.1)) < 1e-6);
        assert!((ray.bounds.1 - 1.8).abs() < 1e-6);
        assert!(Ray::shadow(Point::ORIGIN, Point::new(0., 0., 0.1), 0.1).is_none());
    }
}
