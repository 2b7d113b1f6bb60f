use std::{cmp::Ordering, collections::BinaryHeap};

use crate::math::point::Point;

/// Static, implicit k-d tree. Points are reordered so that every subrange `[lo, hi)` has its
/// splitting point at the middle, the split axis cycling with the depth.
pub struct KdTree {
    /// (position, index in the input)
    nodes: Vec<(Point, usize)>,
}

#[derive(PartialEq)]
struct Candidate {
    dist2: f32,
    index: usize,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist2
            .total_cmp(&other.dist2)
            .then(self.index.cmp(&other.index))
    }
}

impl KdTree {
    pub fn new(points: Vec<Point>) -> Self {
        let mut nodes: Vec<(Point, usize)> = points.into_iter().enumerate().map(|(i, p)| (p, i)).collect();
        Self::build(&mut nodes, 0);
        Self { nodes }
    }

    fn build(nodes: &mut [(Point, usize)], depth: usize) {
        if nodes.len() <= 1 {
            return;
        }
        let axis = depth % 3;
        let mid = nodes.len() / 2;
        nodes.select_nth_unstable_by(mid, |a, b| a.0 .0[axis].total_cmp(&b.0 .0[axis]));
        let (left, right) = nodes.split_at_mut(mid);
        Self::build(left, depth + 1);
        Self::build(&mut right[1..], depth + 1);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Input index of the closest point and its squared distance
    pub fn nearest(&self, p: Point) -> Option<(usize, f32)> {
        self.k_nearest(p, 1).into_iter().next()
    }

    /// Up to `k` closest points, closest first
    pub fn k_nearest(&self, p: Point, k: usize) -> Vec<(usize, f32)> {
        if k == 0 {
            return Vec::new();
        }
        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.search(0, self.nodes.len(), 0, p, k, &mut heap);
        heap.into_sorted_vec()
            .into_iter()
            .map(|c| (c.index, c.dist2))
            .collect()
    }

    fn search(&self, lo: usize, hi: usize, depth: usize, p: Point, k: usize, heap: &mut BinaryHeap<Candidate>) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let (point, index) = self.nodes[mid];
        let dist2 = point.distance_squared(p);
        if heap.len() < k {
            heap.push(Candidate { dist2, index });
        } else if heap.peek().is_some_and(|worst| dist2 < worst.dist2) {
            heap.pop();
            heap.push(Candidate { dist2, index });
        }

        let axis = depth % 3;
        let delta = p.0[axis] - point.0[axis];
        let (near, far) = if delta < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };
        self.search(near.0, near.1, depth + 1, p, k, heap);
        let worst = heap.peek().map_or(f32::INFINITY, |c| c.dist2);
        if heap.len() < k || delta * delta < worst {
            self.search(far.0, far.1, depth + 1, p, k, heap);
        }
    }

    /// Input indices of the points within `radius` of `p`, in no particular order
    pub fn within_radius(&self, p: Point, radius: f32) -> Vec<usize> {
        let mut found = Vec::new();
        self.collect_within(0, self.nodes.len(), 0, p, radius * radius, &mut found);
        found
    }

    fn collect_within(&self, lo: usize, hi: usize, depth: usize, p: Point, r2: f32, found: &mut Vec<usize>) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let (point, index) = self.nodes[mid];
        if point.distance_squared(p) <= r2 {
            found.push(index);
        }
        let delta = p.0[depth % 3] - point.0[depth % 3];
        if delta <= 0.0 || delta * delta <= r2 {
            self.collect_within(lo, mid, depth + 1, p, r2, found);
        }
        if delta >= 0.0 || delta * delta <= r2 {
            self.collect_within(mid + 1, hi, depth + 1, p, r2, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng};

    use super::*;
    use crate::Rng;

    fn random_points(rng: &mut Rng, n: usize) -> Vec<Point> {
        (0..n)
            .map(|_| Point::new(rng.gen(), rng.gen(), rng.gen()))
            .collect()
    }

    #[test]
    fn queries_match_brute_force() {
        let mut rng = Rng::seed_from_u64(8);
        let points = random_points(&mut rng, 500);
        let tree = KdTree::new(points.clone());
        assert_eq!(tree.len(), 500);

        for q in random_points(&mut rng, 200) {
            let mut brute: Vec<(usize, f32)> = points
                .iter()
                .enumerate()
                .map(|(i, p)| (i, p.distance_squared(q)))
                .collect();
            brute.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

            assert_eq!(tree.nearest(q), Some(brute[0]));
            assert_eq!(tree.k_nearest(q, 5), brute[..5].to_vec());

            let mut within = tree.within_radius(q, 0.2);
            within.sort_unstable();
            let mut expected: Vec<usize> = brute
                .iter()
                .filter(|(_, d2)| *d2 <= 0.2f32 * 0.2)
                .map(|(i, _)| *i)
                .collect();
            expected.sort_unstable();
            assert_eq!(within, expected);
        }
    }

    #[test]
    fn empty_tree() {
        let tree = KdTree::new(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.nearest(Point::ORIGIN), None);
        assert!(tree.within_radius(Point::ORIGIN, 1.0).is_empty());
    }
}
