use glam::Vec3;

use crate::ray::Ray;

use super::point::Point;

/// Axis aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// The neutral element of [Bounds::union]
    pub const EMPTY: Bounds = Bounds {
        min: Point(Vec3::splat(f32::INFINITY)),
        max: Point(Vec3::splat(f32::NEG_INFINITY)),
    };

    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        points.into_iter().fold(Self::EMPTY, Self::include)
    }

    pub fn include(self, p: Point) -> Self {
        Bounds {
            min: Point(self.min.0.min(p.0)),
            max: Point(self.max.0.max(p.0)),
        }
    }

    pub fn union(self, other: Bounds) -> Self {
        Bounds {
            min: Point(self.min.0.min(other.min.0)),
            max: Point(self.max.0.max(other.max.0)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.0.cmpgt(self.max.0).any()
    }

    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Point {
        Point(0.5 * (self.min.0 + self.max.0))
    }

    pub fn largest_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Slab test. Returns the parametric interval where the ray is inside the box, clipped to the
    /// ray bounds.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, f32)> {
        let (mut t0, mut t1) = ray.bounds;
        for axis in 0..3 {
            let inv = 1.0 / ray.direction[axis];
            let mut near = (self.min.0[axis] - ray.origin.0[axis]) * inv;
            let mut far = (self.max.0[axis] - ray.origin.0[axis]) * inv;
            if near > far {
                std::mem::swap(&mut near, &mut far);
            }
            // NaN from 0 * inf lands here and keeps the previous bound
            t0 = if near > t0 { near } else { t0 };
            t1 = if far < t1 { far } else { t1 };
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}
