use std::ops::{Add, Sub};

use glam::Vec3;

/// A position in world space. Points and directions don't mix: two points can be subtracted,
/// never added.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point(pub Vec3);

impl Point {
    pub const ORIGIN: Point = Point(Vec3::ZERO);

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    pub fn vec(self) -> Vec3 {
        self.0
    }

    pub fn distance(self, other: Point) -> f32 {
        self.0.distance(other.0)
    }

    pub fn distance_squared(self, other: Point) -> f32 {
        self.0.distance_squared(other.0)
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Barycentric combination of three points.
    pub fn barycentric(points: [Point; 3], weights: [f32; 3]) -> Point {
        Point(weights[0] * points[0].0 + weights[1] * points[1].0 + weights[2] * points[2].0)
    }
}

impl From<Vec3> for Point {
    fn from(v: Vec3) -> Self {
        Point(v)
    }
}

impl Add<Vec3> for Point {
    type Output = Self;

    fn add(self, rhs: Vec3) -> Self::Output {
        Point(self.0 + rhs)
    }
}

impl Sub<Vec3> for Point {
    type Output = Self;

    fn sub(self, rhs: Vec3) -> Self::Output {
        Point(self.0 - rhs)
    }
}

impl Sub for Point {
    type Output = Vec3;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}
