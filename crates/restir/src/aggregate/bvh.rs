use crate::{
    geometry::{Triangle, TriangleHit},
    interaction::SurfaceInteraction,
    math::{bounds::Bounds, vec::Vec3SameDirExt},
    ray::Ray,
};

use super::SceneOracle;

const LEAF_SIZE: usize = 4;

/// Bounding volume hierarchy over triangles, split at the median centroid along the widest axis.
pub struct Bvh {
    triangles: Vec<Triangle>,
    root: BvhNode,
}

enum BvhNode {
    Node {
        bounds: Bounds,
        children: Box<[BvhNode; 2]>,
    },
    Leaf {
        bounds: Bounds,
        first: usize,
        count: usize,
    },
}

impl BvhNode {
    fn bounds(&self) -> &Bounds {
        match self {
            BvhNode::Node { bounds, .. } | BvhNode::Leaf { bounds, .. } => bounds,
        }
    }
}

impl Bvh {
    pub fn new(mut triangles: Vec<Triangle>) -> Self {
        let root = Self::build(&mut triangles, 0);
        log::debug!("built a bvh over {} triangles", triangles.len());
        Self { triangles, root }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn bounds(&self) -> Bounds {
        *self.root.bounds()
    }

    fn build(triangles: &mut [Triangle], offset: usize) -> BvhNode {
        let bounds = triangles
            .iter()
            .fold(Bounds::EMPTY, |b, t| b.union(t.bounds()));

        if triangles.len() <= LEAF_SIZE {
            return BvhNode::Leaf {
                bounds,
                first: offset,
                count: triangles.len(),
            };
        }

        let axis = Bounds::from_points(triangles.iter().map(Triangle::centroid)).largest_axis();
        let half = triangles.len() / 2;
        triangles.select_nth_unstable_by(half, |a, b| {
            a.centroid().0[axis].total_cmp(&b.centroid().0[axis])
        });
        let (left, right) = triangles.split_at_mut(half);

        BvhNode::Node {
            bounds,
            children: Box::new([
                Self::build(left, offset),
                Self::build(right, offset + half),
            ]),
        }
    }

    fn closest(&self, node: &BvhNode, ray: &Ray, best: &mut Option<(usize, TriangleHit)>) {
        let t_max = best.map_or(ray.bounds.1, |(_, hit)| hit.t);
        if node.bounds().intersect(&ray.with_max(t_max)).is_none() {
            return;
        }
        match node {
            BvhNode::Leaf { first, count, .. } => {
                for index in *first..*first + *count {
                    let t_max = best.map_or(ray.bounds.1, |(_, hit)| hit.t);
                    if let Some(hit) = self.triangles[index].intersect(&ray.with_max(t_max)) {
                        *best = Some((index, hit));
                    }
                }
            }
            BvhNode::Node { children, .. } => {
                self.closest(&children[0], ray, best);
                self.closest(&children[1], ray, best);
            }
        }
    }

    fn any(&self, node: &BvhNode, ray: &Ray) -> bool {
        if node.bounds().intersect(ray).is_none() {
            return false;
        }
        match node {
            BvhNode::Leaf { first, count, .. } => self.triangles[*first..*first + *count]
                .iter()
                .any(|t| t.intersect(ray).is_some()),
            BvhNode::Node { children, .. } => {
                self.any(&children[0], ray) || self.any(&children[1], ray)
            }
        }
    }
}

impl SceneOracle for Bvh {
    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
        let mut best = None;
        self.closest(&self.root, ray, &mut best);
        let (primitive, hit) = best?;
        let triangle = &self.triangles[primitive];

        let geometric_normal = triangle.geometric_normal().same_direction(-ray.direction);
        let shading_normal = triangle
            .shading_normal(hit.barycentric)
            .same_direction(geometric_normal);

        Some(SurfaceInteraction {
            ray: *ray,
            t: hit.t,
            position: ray.at(hit.t),
            geometric_normal,
            shading_normal,
            barycentric: hit.barycentric,
            primitive,
            material: triangle.material,
        })
    }

    fn is_occluded(&self, ray: &Ray) -> bool {
        self.any(&self.root, ray)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use rand::{Rng as _, SeedableRng};

    use super::*;
    use crate::{geometry::quad, material::MaterialId, math::point::Point, Rng};

    fn random_soup(rng: &mut Rng, n: usize) -> Vec<Triangle> {
        (0..n)
            .map(|i| {
                let c = Point::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
                let a = Vec3::new(rng.gen(), rng.gen(), rng.gen());
                let b = Vec3::new(rng.gen(), rng.gen(), rng.gen());
                Triangle::new([c, c + a, c + b], MaterialId(i))
            })
            .collect()
    }

    #[test]
    fn matches_brute_force() {
        let mut rng = Rng::seed_from_u64(11);
        let triangles = random_soup(&mut rng, 200);
        let bvh = Bvh::new(triangles.clone());

        for _ in 0..500 {
            let origin = Point::new(rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0));
            let target = Point::new(rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0));
            let ray = Ray::new(origin, target - origin);

            let brute = triangles
                .iter()
                .filter_map(|t| t.intersect(&ray).map(|h| (h.t, t.material)))
                .min_by(|a, b| a.0.total_cmp(&b.0));
            let found = bvh.intersect(&ray).map(|h| (h.t, h.material));
            match (brute, found) {
                (None, None) => {}
                (Some((t0, _)), Some((t1, _))) => assert!((t0 - t1).abs() < 1e-4),
                other => panic!("bvh and brute force disagree: {other:?}"),
            }
            assert_eq!(brute.is_some(), bvh.is_occluded(&ray));
        }
    }

    #[test]
    fn normals_face_the_ray() {
        let bvh = Bvh::new(quad(Point::new(-1., -1., 0.), Vec3::X * 2.0, Vec3::Y * 2.0, MaterialId(0)).to_vec());

        let from_above = bvh.intersect(&Ray::new(Point::new(0.1, 0.2, 1.), -Vec3::Z)).unwrap();
        assert_eq!(from_above.geometric_normal, Vec3::Z);
        assert!(from_above.position.distance(Point::new(0.1, 0.2, 0.)) < 1e-5);

        let from_below = bvh.intersect(&Ray::new(Point::new(0.1, 0.2, -1.), Vec3::Z)).unwrap();
        assert_eq!(from_below.geometric_normal, -Vec3::Z);
        assert_eq!(from_below.shading_normal, -Vec3::Z);

        assert!(!bvh.is_occluded(&Ray::new_with_range(Point::new(0., 0., 1.), -Vec3::Z, 0.0..0.5)));
    }
}
