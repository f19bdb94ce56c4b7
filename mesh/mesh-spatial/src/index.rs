//! Incrementally filled spatial index keyed by caller ids.

use hashbrown::HashMap;
use mesh_types::{Aabb, Point3, Sphere, Triangle};
use tracing::debug;

use crate::Bvh;

/// A shape that can be stored in or used to query a [`SpatialIndex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// A single point.
    Point(Point3<f64>),
    /// An axis-aligned box.
    Aabb(Aabb),
    /// A sphere.
    Sphere(Sphere),
    /// A triangle.
    Triangle(Triangle),
}

impl Shape {
    /// Bounding box of the shape.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        match self {
            Self::Point(p) => Aabb::from_point(*p),
            Self::Aabb(b) => *b,
            Self::Sphere(s) => s.aabb(),
            Self::Triangle(t) => t.aabb(),
        }
    }
}

impl From<Point3<f64>> for Shape {
    fn from(p: Point3<f64>) -> Self {
        Self::Point(p)
    }
}

impl From<Aabb> for Shape {
    fn from(b: Aabb) -> Self {
        Self::Aabb(b)
    }
}

impl From<Sphere> for Shape {
    fn from(s: Sphere) -> Self {
        Self::Sphere(s)
    }
}

impl From<Triangle> for Shape {
    fn from(t: Triangle) -> Self {
        Self::Triangle(t)
    }
}

/// Broad-phase spatial index.
///
/// Shapes are registered with [`update`](Self::update) and become visible
/// to [`query`](Self::query) after the next [`rebuild`](Self::rebuild).
/// Queries compare bounding boxes only; callers run their own exact tests.
///
/// # Example
///
/// ```
/// use mesh_spatial::{Shape, SpatialIndex};
/// use mesh_types::{Aabb, Point3};
///
/// let mut index = SpatialIndex::new();
/// index.update(7, Point3::new(1.0, 0.0, 0.0));
/// index.update(3, Point3::new(0.0, 0.0, 0.0));
/// index.rebuild();
/// let found = index.query(&Shape::Aabb(Aabb::around(Point3::origin(), 2.0)));
/// assert_eq!(found, vec![3, 7]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    shapes: HashMap<u32, Aabb>,
    bvh: Bvh,
    parallel: bool,
}

impl SpatialIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the hierarchy on the rayon pool when large.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Insert or replace the shape stored under `id`.
    pub fn update(&mut self, id: u32, shape: impl Into<Shape>) {
        self.shapes.insert(id, shape.into().aabb());
    }

    /// Remove the shape stored under `id`, if any.
    pub fn remove(&mut self, id: u32) {
        self.shapes.remove(&id);
    }

    /// Remove every shape.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Number of registered shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check whether no shapes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Rebuild the search structure from the registered shapes.
    pub fn rebuild(&mut self) {
        let mut items: Vec<(u32, Aabb)> = self.shapes.iter().map(|(&id, &b)| (id, b)).collect();
        items.sort_unstable_by_key(|&(id, _)| id);
        debug!(shapes = items.len(), "rebuilding spatial index");
        self.bvh = Bvh::build(items, self.parallel);
    }

    /// Ids whose bounding boxes overlap the query shape's bounding box,
    /// sorted ascending.
    #[must_use]
    pub fn query(&self, shape: &Shape) -> Vec<u32> {
        let mut ids = self.bvh.query(&shape.aabb());
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
