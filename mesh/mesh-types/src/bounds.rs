//! Bounding volumes: axis-aligned boxes and spheres.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// An empty box has `min > max` on every axis and absorbs the first point
/// it is expanded with.
///
/// # Example
///
/// ```
/// use mesh_types::{Aabb, Point3};
///
/// let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
/// assert_eq!(aabb.longest_axis(), 0);
/// assert!(aabb.contains(&Point3::new(1.0, 0.5, 0.5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Create a box from two corners, sorting the coordinates per axis.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Create a degenerate box around one point.
    #[inline]
    #[must_use]
    pub const fn from_point(point: Point3<f64>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Create a box centered at `center` extending `half` along every axis.
    #[must_use]
    pub fn around(center: Point3<f64>, half: f64) -> Self {
        let h = Vector3::repeat(half);
        Self {
            min: center - h,
            max: center + h,
        }
    }

    /// Create an empty box.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing all points.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand_to_include(p);
        }
        aabb
    }

    /// Check whether the box contains no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.max - self.min
        }
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Half the extent along each axis.
    #[must_use]
    pub fn half_size(&self) -> Vector3<f64> {
        self.size() * 0.5
    }

    /// Length of the diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z). Ties prefer the lower axis.
    #[must_use]
    pub fn longest_axis(&self) -> usize {
        let s = self.size();
        if s.x >= s.y && s.x >= s.z {
            0
        } else if s.y >= s.z {
            1
        } else {
            2
        }
    }

    /// Inclusive point containment.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Inclusive overlap test.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    /// Grow the box to include a point.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Grow the box to include another box.
    pub fn merge(&mut self, other: &Self) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Copy grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        let m = Vector3::repeat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Copy scaled by `factor` around its center.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let c = self.center();
        let h = self.half_size() * factor;
        Self {
            min: c - h,
            max: c + h,
        }
    }
}

/// A sphere given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sphere {
    /// Center point.
    pub center: Point3<f64>,
    /// Radius, never negative.
    pub radius: f64,
}

impl Sphere {
    /// Create a sphere.
    #[must_use]
    pub const fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Bounding sphere of a point set using Ritter's approximation.
    ///
    /// Returns a zero-radius sphere at the origin for an empty set.
    #[must_use]
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        let Some(&first) = points.first() else {
            return Self::new(Point3::origin(), 0.0);
        };
        let farthest_from = |p: Point3<f64>| {
            points
                .iter()
                .copied()
                .max_by(|a, b| {
                    nalgebra::distance_squared(&p, a).total_cmp(&nalgebra::distance_squared(&p, b))
                })
                .unwrap_or(p)
        };
        let a = farthest_from(first);
        let b = farthest_from(a);
        let mut sphere = Self::new(nalgebra::center(&a, &b), nalgebra::distance(&a, &b) * 0.5);
        for p in points {
            let d = nalgebra::distance(&sphere.center, p);
            if d > sphere.radius {
                let radius = (sphere.radius + d) * 0.5;
                let shift = (d - sphere.radius) * 0.5;
                sphere.center += (p - sphere.center) * (shift / d);
                sphere.radius = radius;
            }
        }
        sphere
    }

    /// Inclusive point containment.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        nalgebra::distance_squared(&self.center, point) <= self.radius * self.radius
    }

    /// Bounding box of the sphere.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::around(self.center, self.radius)
    }
}
