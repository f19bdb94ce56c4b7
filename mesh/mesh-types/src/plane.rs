//! Oriented planes.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Triangle;

/// A plane through `origin` with unit `normal`.
///
/// The positive side is the half-space the normal points into.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plane {
    /// A point on the plane.
    pub origin: Point3<f64>,
    /// Unit normal.
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a plane, normalizing the normal.
    ///
    /// Returns `None` if the normal has zero length or is not finite.
    ///
    /// ```
    /// use mesh_types::{Plane, Point3, Vector3};
    ///
    /// let plane = Plane::new(Point3::origin(), Vector3::new(0.0, 0.0, 3.0)).unwrap();
    /// assert!((plane.normal.z - 1.0).abs() < 1e-12);
    /// assert!(Plane::new(Point3::origin(), Vector3::zeros()).is_none());
    /// ```
    #[must_use]
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let len = normal.norm();
        if len > f64::EPSILON && len.is_finite() {
            Some(Self {
                origin,
                normal: normal / len,
            })
        } else {
            None
        }
    }

    /// Plane containing a triangle, oriented by its winding.
    #[must_use]
    pub fn from_triangle(triangle: &Triangle) -> Option<Self> {
        Self::new(triangle.v0, triangle.normal_unnormalized())
    }

    /// Signed distance; positive on the normal's side.
    #[inline]
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&(point - self.origin))
    }

    /// The same plane facing the other way.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
        }
    }

    /// Intersection parameter of segment `a → b` with the plane.
    ///
    /// Returns `t` in `[0, 1]` when the segment touches or crosses the
    /// plane, `None` when both ends are strictly on the same side or the
    /// segment lies parallel to it.
    #[must_use]
    pub fn segment_parameter(&self, a: &Point3<f64>, b: &Point3<f64>) -> Option<f64> {
        let da = self.signed_distance(a);
        let db = self.signed_distance(b);
        let denom = da - db;
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = da / denom;
        (0.0..=1.0).contains(&t).then_some(t)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn signed_distance_sides() {
        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::z()).unwrap();
        assert_relative_eq!(plane.signed_distance(&Point3::new(3.0, 4.0, 3.0)), 2.0);
        assert_relative_eq!(plane.flipped().signed_distance(&Point3::origin()), 1.0);
    }

    #[test]
    fn segment_crossing() {
        let plane = Plane::new(Point3::new(0.5, 0.0, 0.0), Vector3::x()).unwrap();
        let t = plane
            .segment_parameter(&Point3::origin(), &Point3::new(2.0, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(t, 0.25);
        assert!(plane
            .segment_parameter(&Point3::new(1.0, 0.0, 0.0), &Point3::new(2.0, 0.0, 0.0))
            .is_none());
        assert!(plane
            .segment_parameter(&Point3::new(1.0, 0.0, 0.0), &Point3::new(1.0, 5.0, 0.0))
            .is_none());
    }

    #[test]
    fn plane_of_triangle_follows_winding() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let plane = Plane::from_triangle(&tri).unwrap();
        assert_relative_eq!(plane.normal.z, 1.0);
    }
}
