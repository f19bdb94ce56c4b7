//! Bounding Volume Hierarchy over boxed items.
//!
//! Items are `(id, Aabb)` pairs. Nodes split at the median of the box centers
//! along the longest axis of the node's bounds.

use mesh_types::{Aabb, Point3, Vector3};
use smallvec::SmallVec;

/// Default maximum number of items per leaf.
pub const DEFAULT_LEAF_SIZE: usize = 8;

/// Subtrees at least this large are built on the rayon pool.
pub const PARALLEL_BUILD_THRESHOLD: usize = 4096;

#[derive(Debug, Clone)]
enum BvhNode {
    Leaf {
        bounds: Aabb,
        items: SmallVec<[(u32, Aabb); 8]>,
    },
    Internal {
        bounds: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    const fn bounds(&self) -> &Aabb {
        match self {
            Self::Leaf { bounds, .. } | Self::Internal { bounds, .. } => bounds,
        }
    }
}

/// Bounding volume hierarchy.
///
/// # Example
///
/// ```
/// use mesh_spatial::Bvh;
/// use mesh_types::{Aabb, Point3};
///
/// let items = vec![
///     (0, Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))),
///     (1, Aabb::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0))),
/// ];
/// let bvh = Bvh::build(items, false);
/// let hits = bvh.query(&Aabb::around(Point3::new(0.5, 0.5, 0.5), 0.1));
/// assert_eq!(hits, vec![0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    root: Option<BvhNode>,
    len: usize,
}

impl Bvh {
    /// Build a hierarchy over the given items.
    ///
    /// With `parallel` set, large subtrees are built with `rayon::join`.
    #[must_use]
    pub fn build(items: Vec<(u32, Aabb)>, parallel: bool) -> Self {
        Self::build_with_leaf_size(items, DEFAULT_LEAF_SIZE, parallel)
    }

    /// Build a hierarchy with a custom leaf size.
    #[must_use]
    pub fn build_with_leaf_size(items: Vec<(u32, Aabb)>, leaf_size: usize, parallel: bool) -> Self {
        let len = items.len();
        if items.is_empty() {
            return Self::default();
        }
        let threshold = if parallel {
            PARALLEL_BUILD_THRESHOLD
        } else {
            usize::MAX
        };
        let root = build_recursive(items, leaf_size.max(1), threshold);
        Self {
            root: Some(root),
            len,
        }
    }

    /// Number of items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check whether the hierarchy holds no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Bounds of all items.
    #[must_use]
    pub fn bounds(&self) -> Option<&Aabb> {
        self.root.as_ref().map(BvhNode::bounds)
    }

    /// Ids of all items whose boxes overlap `query` (inclusive), in traversal order.
    #[must_use]
    pub fn query(&self, query: &Aabb) -> Vec<u32> {
        let mut result = Vec::new();
        if let Some(root) = &self.root {
            query_recursive(root, query, &mut result);
        }
        result
    }

    /// Ids of all items whose boxes the ray `origin + t * direction`,
    /// `0 <= t <= max_t`, passes through.
    #[must_use]
    pub fn query_ray(&self, origin: &Point3<f64>, direction: &Vector3<f64>, max_t: f64) -> Vec<u32> {
        let inv = direction.map(|d| 1.0 / d);
        let mut result = Vec::new();
        let mut stack: Vec<&BvhNode> = self.root.iter().collect();
        while let Some(node) = stack.pop() {
            if !ray_hits_box(origin, &inv, max_t, node.bounds()) {
                continue;
            }
            match node {
                BvhNode::Leaf { items, .. } => {
                    result.extend(
                        items
                            .iter()
                            .filter(|(_, b)| ray_hits_box(origin, &inv, max_t, b))
                            .map(|(id, _)| *id),
                    );
                }
                BvhNode::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        result
    }
}

fn build_recursive(mut items: Vec<(u32, Aabb)>, leaf_size: usize, parallel_threshold: usize) -> BvhNode {
    let mut bounds = Aabb::empty();
    for (_, b) in &items {
        bounds.merge(b);
    }

    if items.len() <= leaf_size {
        return BvhNode::Leaf {
            bounds,
            items: items.into_iter().collect(),
        };
    }

    let axis = bounds.longest_axis();
    items.sort_by(|(_, a), (_, b)| a.center()[axis].total_cmp(&b.center()[axis]));
    let right_items = items.split_off(items.len() / 2);
    let left_items = items;

    let (left, right) = if left_items.len() + right_items.len() >= parallel_threshold {
        rayon::join(
            || build_recursive(left_items, leaf_size, parallel_threshold),
            || build_recursive(right_items, leaf_size, parallel_threshold),
        )
    } else {
        (
            build_recursive(left_items, leaf_size, parallel_threshold),
            build_recursive(right_items, leaf_size, parallel_threshold),
        )
    };

    BvhNode::Internal {
        bounds,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn query_recursive(node: &BvhNode, query: &Aabb, result: &mut Vec<u32>) {
    if !node.bounds().intersects(query) {
        return;
    }
    match node {
        BvhNode::Leaf { items, .. } => {
            result.extend(
                items
                    .iter()
                    .filter(|(_, b)| b.intersects(query))
                    .map(|(id, _)| *id),
            );
        }
        BvhNode::Internal { left, right, .. } => {
            query_recursive(left, query, result);
            query_recursive(right, query, result);
        }
    }
}

/// Slab test. Zero direction components give infinite inverses, which the
/// min/max logic handles except for origins exactly on a slab plane.
fn ray_hits_box(origin: &Point3<f64>, inv: &Vector3<f64>, max_t: f64, b: &Aabb) -> bool {
    let mut t_min = 0.0_f64;
    let mut t_max = max_t;
    for i in 0..3 {
        let t1 = (b.min[i] - origin[i]) * inv[i];
        let t2 = (b.max[i] - origin[i]) * inv[i];
        let (near, far) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        // NaN comes from 0 * inf: the origin lies on the slab plane
        if near.is_nan() || far.is_nan() {
            continue;
        }
        t_min = t_min.max(near);
        t_max = t_max.min(far);
        if t_min > t_max {
            return false;
        }
    }
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid(n: u32) -> Vec<(u32, Aabb)> {
        (0..n * n)
            .map(|i| {
                let p = Point3::new(f64::from(i % n), f64::from(i / n), 0.0);
                (i, Aabb::around(p, 0.25))
            })
            .collect()
    }

    fn brute(items: &[(u32, Aabb)], q: &Aabb) -> Vec<u32> {
        items.iter().filter(|(_, b)| b.intersects(q)).map(|(i, _)| *i).collect()
    }

    #[test]
    fn empty_hierarchy() {
        let bvh = Bvh::build(Vec::new(), true);
        assert!(bvh.is_empty());
        assert!(bvh.query(&Aabb::around(Point3::origin(), 1.0)).is_empty());
        assert!(bvh.bounds().is_none());
    }

    #[test]
    fn query_matches_brute_force() {
        let items = grid(20);
        let bvh = Bvh::build(items.clone(), false);
        assert_eq!(bvh.len(), 400);
        for q in [
            Aabb::around(Point3::new(3.0, 4.0, 0.0), 0.1),
            Aabb::new(Point3::new(2.5, 2.5, -1.0), Point3::new(7.2, 3.1, 1.0)),
            Aabb::around(Point3::new(100.0, 0.0, 0.0), 1.0),
        ] {
            let mut got = bvh.query(&q);
            got.sort_unstable();
            assert_eq!(got, brute(&items, &q));
        }
    }

    #[test]
    fn parallel_build_matches_serial() {
        let items = grid(70);
        let q = Aabb::new(Point3::new(10.0, 10.0, -1.0), Point3::new(30.0, 12.0, 1.0));
        let mut a = Bvh::build(items.clone(), true).query(&q);
        let mut b = Bvh::build(items, false).query(&q);
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn ray_query() {
        let bvh = Bvh::build(grid(10), false);
        let mut hits = bvh.query_ray(&Point3::new(-1.0, 3.0, 0.0), &Vector3::x(), 100.0);
        hits.sort_unstable();
        assert_eq!(hits, (30..40).collect::<Vec<_>>());
        let short = bvh.query_ray(&Point3::new(-1.0, 3.0, 0.0), &Vector3::x(), 2.0);
        assert_eq!(short.len(), 2);
    }
}
