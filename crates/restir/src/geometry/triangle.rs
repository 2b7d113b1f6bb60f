use glam::Vec3;

use crate::{
    material::MaterialId,
    math::{
        bounds::Bounds,
        distributions::{Samplable, Samples, UniformTriangle},
        point::Point,
    },
    ray::Ray,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point; 3],
    /// Per vertex shading normals
    pub normals: [Vec3; 3],
    pub material: MaterialId,
}

/// Where a ray crossed a triangle. `barycentric[i]` weights `vertices[i]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub t: f32,
    pub barycentric: [f32; 3],
}

/// Solves `origin + t * direction = u * v0 + v * v1 + (1 - u - v) * v2`
enum MollerTrumboreResult {
    Result { u: f32, v: f32, t: f32 },
    NoResult,
}

impl MollerTrumboreResult {
    fn moller_trumbore(vertices: [Point; 3], ray: &Ray) -> Self {
        #[allow(non_snake_case)]
        let M = glam::Mat3::from_cols(
            vertices[2] - vertices[0],
            vertices[2] - vertices[1],
            ray.direction,
        );

        let det = M.determinant();
        if det.abs() < 1e-12 || !det.is_finite() {
            MollerTrumboreResult::NoResult
        } else {
            let [u, v, t] = M.inverse().mul_vec3(vertices[2] - ray.origin).to_array();
            MollerTrumboreResult::Result { u, v, t }
        }
    }
}

impl Triangle {
    /// Flat shaded triangle. Counter clockwise vertices give a normal along `(v1 - v0) × (v2 - v0)`.
    pub fn new(vertices: [Point; 3], material: MaterialId) -> Self {
        let normal = (vertices[1] - vertices[0])
            .cross(vertices[2] - vertices[0])
            .normalize_or_zero();
        Self {
            vertices,
            normals: [normal; 3],
            material,
        }
    }

    pub fn with_normals(vertices: [Point; 3], normals: [Vec3; 3], material: MaterialId) -> Self {
        Self {
            vertices,
            normals: normals.map(Vec3::normalize_or_zero),
            material,
        }
    }

    pub fn geometric_normal(&self) -> Vec3 {
        (self.vertices[1] - self.vertices[0])
            .cross(self.vertices[2] - self.vertices[0])
            .normalize_or_zero()
    }

    pub fn area(&self) -> f32 {
        0.5 * (self.vertices[1] - self.vertices[0])
            .cross(self.vertices[2] - self.vertices[0])
            .length()
    }

    pub fn centroid(&self) -> Point {
        Point::barycentric(self.vertices, [1.0 / 3.0; 3])
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.vertices)
    }

    pub fn point_at(&self, barycentric: [f32; 3]) -> Point {
        Point::barycentric(self.vertices, barycentric)
    }

    /// Interpolated shading normal, falling back to the geometric one for degenerate inputs
    pub fn shading_normal(&self, barycentric: [f32; 3]) -> Vec3 {
        let n = barycentric[0] * self.normals[0]
            + barycentric[1] * self.normals[1]
            + barycentric[2] * self.normals[2];
        n.try_normalize().unwrap_or_else(|| self.geometric_normal())
    }

    /// Barycentric coordinates of a point assumed to lie in the triangle plane
    pub fn barycentric_of(&self, p: Point) -> [f32; 3] {
        let e1 = self.vertices[1] - self.vertices[0];
        let e2 = self.vertices[2] - self.vertices[0];
        let d = p - self.vertices[0];
        let d11 = e1.dot(e1);
        let d12 = e1.dot(e2);
        let d22 = e2.dot(e2);
        let d1 = d.dot(e1);
        let d2 = d.dot(e2);
        let denom = d11 * d22 - d12 * d12;
        if denom.abs() < 1e-20 {
            return [1.0, 0.0, 0.0];
        }
        let b1 = (d22 * d1 - d12 * d2) / denom;
        let b2 = (d11 * d2 - d12 * d1) / denom;
        [1.0 - b1 - b2, b1, b2]
    }

    /// Uniformly distributed point on the triangle, its density is `1 / area`
    pub fn sample_point(&self, samples: Samples<2>) -> Point {
        self.point_at(UniformTriangle.sample_with(samples))
    }

    pub fn intersect(&self, ray: &Ray) -> Option<TriangleHit> {
        match MollerTrumboreResult::moller_trumbore(self.vertices, ray) {
            MollerTrumboreResult::Result { u, v, t } => {
                let w = 1.0 - u - v;
                let inside = (0.0..=1.0).contains(&u)
                    && (0.0..=1.0).contains(&v)
                    && (0.0..=1.0).contains(&w);
                (inside && ray.range().contains(&t)).then_some(TriangleHit {
                    t,
                    barycentric: [u, v, w],
                })
            }
            MollerTrumboreResult::NoResult => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            [
                Point::new(0., 0., 0.),
                Point::new(1., 0., 0.),
                Point::new(0., 1., 0.),
            ],
            MaterialId(0),
        )
    }

    #[test]
    fn hit_and_miss() {
        let tri = unit_triangle();
        assert_eq!(tri.geometric_normal(), Vec3::Z);
        assert!((tri.area() - 0.5).abs() < 1e-6);

        let hit = tri
            .intersect(&Ray::new(Point::new(0.25, 0.25, 2.0), -Vec3::Z))
            .unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
        let p = tri.point_at(hit.barycentric);
        assert!(p.distance(Point::new(0.25, 0.25, 0.0)) < 1e-5);

        assert!(tri
            .intersect(&Ray::new(Point::new(0.8, 0.8, 2.0), -Vec3::Z))
            .is_none());
        // Behind the origin
        assert!(tri
            .intersect(&Ray::new(Point::new(0.25, 0.25, 2.0), Vec3::Z))
            .is_none());
        // Parallel
        assert!(tri
            .intersect(&Ray::new(Point::new(0.25, 0.25, 0.0), Vec3::X))
            .is_none());
    }

    #[test]
    fn barycentric_round_trip() {
        let tri = unit_triangle();
        let b = tri.barycentric_of(Point::new(0.2, 0.3, 0.0));
        assert!((b[1] - 0.2).abs() < 1e-6);
        assert!((b[2] - 0.3).abs() < 1e-6);
        assert!(tri.point_at(b).distance(Point::new(0.2, 0.3, 0.0)) < 1e-6);
    }
}
