pub mod triangle;

pub use triangle::{Triangle, TriangleHit};

use crate::{
    material::MaterialId,
    math::{point::Point, vec::Vec3},
};

/// Parallelogram `corner, corner + a, corner + a + b, corner + b` split in two triangles.
///
/// The geometric normal of both halves is `a × b`.
pub fn quad(corner: Point, a: Vec3, b: Vec3, material: MaterialId) -> [Triangle; 2] {
    let p0 = corner;
    let p1 = corner + a;
    let p2 = corner + a + b;
    let p3 = corner + b;
    [
        Triangle::new([p0, p1, p2], material),
        Triangle::new([p0, p2, p3], material),
    ]
}
