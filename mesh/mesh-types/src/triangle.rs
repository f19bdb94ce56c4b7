//! Triangle and line segment primitives.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Aabb;

/// Triangles with a smaller area are degenerate.
pub const DEGENERATE_AREA: f64 = 1e-5;

/// Segments shorter than this are degenerate.
pub const DEGENERATE_LENGTH: f64 = 1e-5;

/// A triangle with concrete vertex positions.
///
/// Winding is counter-clockwise when viewed from the front.
///
/// # Example
///
/// ```
/// use mesh_types::{Triangle, Point3};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// assert!((tri.area() - 0.5).abs() < 1e-12);
/// assert!(!tri.is_degenerate());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f64>,
    /// Second vertex.
    pub v1: Point3<f64>,
    /// Third vertex.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// The vertices as an array.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> [Point3<f64>; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Cross product of the two edges from `v0`; length is twice the area.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit normal, `None` for zero-area triangles.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.normal_unnormalized().try_normalize(f64::MIN_POSITIVE)
    }

    /// Area of the triangle.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Center of mass.
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// Zero-area or collinear triangles (area below [`DEGENERATE_AREA`]).
    ///
    /// Non-finite triangles are degenerate too.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let area = self.area();
        !area.is_finite() || area < DEGENERATE_AREA
    }

    /// Lengths of the edges `v0→v1`, `v1→v2`, `v2→v0`.
    #[must_use]
    pub fn edge_lengths(&self) -> [f64; 3] {
        [
            nalgebra::distance(&self.v0, &self.v1),
            nalgebra::distance(&self.v1, &self.v2),
            nalgebra::distance(&self.v2, &self.v0),
        ]
    }

    /// Index of the longest edge, where edge `i` runs from vertex `i` to `i + 1`.
    ///
    /// The last of several equally long edges wins.
    #[must_use]
    pub fn longest_edge(&self) -> usize {
        let l = self.edge_lengths();
        let mut best = 0;
        for i in 1..3 {
            if l[i] >= l[best] {
                best = i;
            }
        }
        best
    }

    /// Vertex `i` (0, 1 or 2, wrapping).
    #[must_use]
    pub fn vertex(&self, i: usize) -> Point3<f64> {
        match i % 3 {
            0 => self.v0,
            1 => self.v1,
            _ => self.v2,
        }
    }

    /// The triangle with opposite winding.
    #[must_use]
    pub const fn flipped(&self) -> Self {
        Self::new(self.v0, self.v2, self.v1)
    }

    /// Bounding box.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&[self.v0, self.v1, self.v2])
    }

    /// Barycentric weights of `point` projected onto the triangle's plane.
    ///
    /// Returns the zero vector for degenerate triangles.
    #[must_use]
    pub fn barycentric(&self, point: &Point3<f64>) -> Vector3<f64> {
        let e0 = self.v1 - self.v0;
        let e1 = self.v2 - self.v0;
        let e2 = point - self.v0;
        let d00 = e0.dot(&e0);
        let d01 = e0.dot(&e1);
        let d11 = e1.dot(&e1);
        let d20 = e2.dot(&e0);
        let d21 = e2.dot(&e1);
        let denom = d00 * d11 - d01 * d01;
        if denom.abs() < 1e-7 * (d00 * d11).max(f64::MIN_POSITIVE) {
            return Vector3::zeros();
        }
        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        Vector3::new(1.0 - v - w, v, w)
    }

    /// Closest point on the triangle to `point`.
    ///
    /// Follows the region classification of Ericson, "Real-Time Collision Detection".
    #[must_use]
    pub fn closest_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let (a, b, c) = (self.v0, self.v1, self.v2);
        let ab = b - a;
        let ac = c - a;
        let ap = point - a;
        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = point - b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            return a + ab * (d1 / (d1 - d3));
        }

        let cp = point - c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            return a + ac * (d2 / (d2 - d6));
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        a + ab * (vb * denom) + ac * (vc * denom)
    }

    /// Ray parameter of the intersection with a ray (Möller–Trumbore).
    ///
    /// With `double_sided == false` hits on the back face are ignored.
    /// Only hits with `t > epsilon` are reported.
    #[must_use]
    pub fn ray_intersection(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        double_sided: bool,
        epsilon: f64,
    ) -> Option<f64> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let h = direction.cross(&edge2);
        let det = edge1.dot(&h);

        // back faces have negative determinant
        if det.abs() < 1e-12 || (!double_sided && det < 0.0) {
            return None;
        }

        let f = 1.0 / det;
        let s = origin - self.v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&edge1);
        let v = f * direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = f * edge2.dot(&q);
        (t > epsilon).then_some(t)
    }

    /// Exact triangle/box overlap test (separating axis theorem).
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        if aabb.is_empty() {
            return false;
        }
        let c = aabb.center();
        let h = aabb.half_size();
        let v = [self.v0 - c, self.v1 - c, self.v2 - c];
        let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

        let separated = |axis: Vector3<f64>| -> bool {
            if axis.norm_squared() < 1e-24 {
                return false;
            }
            let p = [axis.dot(&v[0]), axis.dot(&v[1]), axis.dot(&v[2])];
            let r = h.x * axis.x.abs() + h.y * axis.y.abs() + h.z * axis.z.abs();
            let min = p[0].min(p[1]).min(p[2]);
            let max = p[0].max(p[1]).max(p[2]);
            min > r || max < -r
        };

        let unit = [Vector3::x(), Vector3::y(), Vector3::z()];
        if unit.iter().any(|u| separated(*u)) {
            return false;
        }
        if separated(edges[0].cross(&edges[1])) {
            return false;
        }
        for u in &unit {
            for e in &edges {
                if separated(u.cross(e)) {
                    return false;
                }
            }
        }
        true
    }

    /// Exact triangle/triangle overlap test (separating axis theorem).
    ///
    /// Touching triangles count as intersecting.
    #[must_use]
    pub fn intersects_triangle(&self, other: &Self) -> bool {
        let a = self.vertices();
        let b = other.vertices();
        let ea = [a[1] - a[0], a[2] - a[1], a[0] - a[2]];
        let eb = [b[1] - b[0], b[2] - b[1], b[0] - b[2]];
        let na = self.normal_unnormalized();
        let nb = other.normal_unnormalized();

        let separated = |axis: Vector3<f64>| -> bool {
            let len = axis.norm();
            if len < 1e-12 {
                return false;
            }
            let axis = axis / len;
            let pa = a.map(|p| axis.dot(&p.coords));
            let pb = b.map(|p| axis.dot(&p.coords));
            let (amin, amax) = (pa[0].min(pa[1]).min(pa[2]), pa[0].max(pa[1]).max(pa[2]));
            let (bmin, bmax) = (pb[0].min(pb[1]).min(pb[2]), pb[0].max(pb[1]).max(pb[2]));
            amax < bmin - 1e-12 || bmax < amin - 1e-12
        };

        if separated(na) || separated(nb) {
            return false;
        }
        for x in &ea {
            for y in &eb {
                if separated(x.cross(y)) {
                    return false;
                }
            }
        }
        // in-plane edge normals cover the coplanar case
        for x in &ea {
            if separated(na.cross(x)) {
                return false;
            }
        }
        for y in &eb {
            if separated(nb.cross(y)) {
                return false;
            }
        }
        true
    }
}

/// A line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Line {
    /// Start point.
    pub a: Point3<f64>,
    /// End point.
    pub b: Point3<f64>,
}

impl Line {
    /// Create a segment.
    #[must_use]
    pub const fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self { a, b }
    }

    /// Length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        nalgebra::distance(&self.a, &self.b)
    }

    /// Coincident (or non-finite) endpoints.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let len = self.length();
        !len.is_finite() || len < DEGENERATE_LENGTH
    }
}
