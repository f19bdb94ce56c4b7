//! Similarity transforms and their application to meshes.

use mesh_types::{Matrix4, Mesh, Point3, UnitQuaternion, Vector3};
use tracing::debug;

/// A similarity transform: uniform scale, then rotation, then translation.
///
/// Unlike a general matrix, a similarity keeps angles, so normals and
/// tangents only need the rotation part.
///
/// # Example
///
/// ```
/// use mesh_transform::Transform3D;
/// use mesh_types::Point3;
///
/// let t = Transform3D::uniform_scale(2.0).then(&Transform3D::translation(1.0, 0.0, 0.0));
/// let p = t.transform_point(&Point3::new(1.0, 1.0, 1.0));
/// assert!((p.x - 3.0).abs() < 1e-12);
/// assert!((p.y - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform3D {
    /// Translation applied last.
    pub translation: Vector3<f64>,
    /// Rotation applied after scaling.
    pub rotation: UnitQuaternion<f64>,
    /// Uniform scale factor applied first.
    pub scale: f64,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// Create an identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: 1.0,
        }
    }

    /// Create a translation transform.
    #[must_use]
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::from_translation(Vector3::new(x, y, z))
    }

    /// Create a translation transform from a vector.
    #[must_use]
    pub fn from_translation(offset: Vector3<f64>) -> Self {
        Self {
            translation: offset,
            ..Self::identity()
        }
    }

    /// Create a pure rotation.
    #[must_use]
    pub fn rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            rotation,
            ..Self::identity()
        }
    }

    /// Rotation about an arbitrary axis (angle in radians).
    ///
    /// A zero axis gives the identity.
    #[must_use]
    pub fn rotation_axis(axis: Vector3<f64>, angle: f64) -> Self {
        match nalgebra::Unit::try_new(axis, 1e-12) {
            Some(axis) => Self::rotation(UnitQuaternion::from_axis_angle(&axis, angle)),
            None => Self::identity(),
        }
    }

    /// Rotation taking direction `from` onto direction `to`.
    ///
    /// Zero vectors give the identity. Opposite directions rotate half a
    /// turn around an axis perpendicular to `from`.
    #[must_use]
    pub fn rotation_between(from: Vector3<f64>, to: Vector3<f64>) -> Self {
        let (Some(a), Some(b)) = (from.try_normalize(1e-12), to.try_normalize(1e-12)) else {
            return Self::identity();
        };
        if let Some(rotation) = UnitQuaternion::rotation_between(&a, &b) {
            return Self::rotation(rotation);
        }
        // anti-parallel
        let helper = if a.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
        Self::rotation_axis(a.cross(&helper), std::f64::consts::PI)
    }

    /// Create a uniform scale about the origin.
    #[must_use]
    pub fn uniform_scale(factor: f64) -> Self {
        Self {
            scale: factor,
            ..Self::identity()
        }
    }

    /// Compose: apply `self` first, then `other`.
    #[must_use]
    pub fn then(&self, other: &Self) -> Self {
        Self {
            translation: other.translation + other.rotation * (self.translation * other.scale),
            rotation: other.rotation * self.rotation,
            scale: other.scale * self.scale,
        }
    }

    /// Inverse transform, `None` for a zero scale.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        if self.scale == 0.0 || !self.scale.is_finite() {
            return None;
        }
        let rotation = self.rotation.inverse();
        Some(Self {
            translation: -(rotation * self.translation) / self.scale,
            rotation,
            scale: 1.0 / self.scale,
        })
    }

    /// The equivalent homogeneous matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let mut m = self.rotation.to_homogeneous();
        for r in 0..3 {
            for c in 0..3 {
                m[(r, c)] *= self.scale;
            }
            m[(r, 3)] = self.translation[r];
        }
        m
    }

    /// Transform a point.
    #[must_use]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * (p.coords * self.scale) + self.translation)
    }

    /// Transform a displacement (scaled and rotated, not translated).
    #[must_use]
    pub fn transform_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * (v * self.scale)
    }

    /// Rotate a direction such as a normal or tangent.
    #[must_use]
    pub fn transform_direction(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * v
    }
}

/// Apply a transform to a mesh in place.
///
/// Positions are fully transformed; normals, tangents and bitangents are
/// rotated only. A negative scale mirrors the geometry but keeps the
/// directions as rotated, so callers flipping space should also call
/// [`flip_normals`](crate::flip_normals).
pub fn apply_transform(mesh: &mut Mesh, transform: &Transform3D) {
    for p in mesh.positions_mut() {
        *p = transform.transform_point(p);
    }
    for n in mesh.normals_mut() {
        *n = transform.transform_direction(n);
    }
    for t in mesh.tangents_mut() {
        *t = transform.transform_direction(t);
    }
    for b in mesh.bitangents_mut() {
        *b = transform.transform_direction(b);
    }
    debug!(vertices = mesh.vertex_count(), scale = transform.scale, "applied transform");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::shapes::unit_cube;
    use mesh_types::Vector4;
    use std::f64::consts::PI;

    fn assert_point(p: Point3<f64>, x: f64, y: f64, z: f64) {
        assert_relative_eq!(p.x, x, epsilon = 1e-10);
        assert_relative_eq!(p.y, y, epsilon = 1e-10);
        assert_relative_eq!(p.z, z, epsilon = 1e-10);
    }

    #[test]
    fn identity_and_default() {
        let p = Point3::new(5.0, 10.0, 15.0);
        assert_point(Transform3D::identity().transform_point(&p), 5.0, 10.0, 15.0);
        assert_eq!(Transform3D::default(), Transform3D::identity());
    }

    #[test]
    fn translation_moves_points_not_vectors() {
        let t = Transform3D::translation(10.0, 20.0, 30.0);
        assert_point(t.transform_point(&Point3::new(1.0, 2.0, 3.0)), 11.0, 22.0, 33.0);
        let v = t.transform_vector(&Vector3::x());
        assert_relative_eq!(v, Vector3::x(), epsilon = 1e-10);
    }

    #[test]
    fn uniform_scale() {
        let t = Transform3D::uniform_scale(2.0);
        assert_point(t.transform_point(&Point3::new(1.0, 2.0, 3.0)), 2.0, 4.0, 6.0);
    }

    #[test]
    fn rotation_about_z() {
        let t = Transform3D::rotation_axis(Vector3::z(), PI / 2.0);
        assert_point(t.transform_point(&Point3::new(1.0, 0.0, 0.0)), 0.0, 1.0, 0.0);
    }

    #[test]
    fn rotation_axis_zero_returns_identity() {
        let t = Transform3D::rotation_axis(Vector3::zeros(), PI);
        assert_point(t.transform_point(&Point3::new(1.0, 2.0, 3.0)), 1.0, 2.0, 3.0);
    }

    #[test]
    fn composition_order() {
        // translate then scale: (0,0,0) -> (1,0,0) -> (2,0,0)
        let combined = Transform3D::translation(1.0, 0.0, 0.0).then(&Transform3D::uniform_scale(2.0));
        assert_point(combined.transform_point(&Point3::origin()), 2.0, 0.0, 0.0);

        let a = Transform3D::rotation_axis(Vector3::z(), PI / 2.0).then(&Transform3D::translation(0.0, 0.0, 1.0));
        let b = Transform3D::uniform_scale(3.0);
        let p = Point3::new(1.0, 2.0, 3.0);
        let stepwise = b.transform_point(&a.transform_point(&p));
        let composed = a.then(&b).transform_point(&p);
        assert_relative_eq!(stepwise, composed, epsilon = 1e-10);
    }

    #[test]
    fn inverse_round_trips() {
        let t = Transform3D::rotation_axis(Vector3::new(1.0, 1.0, 0.0), 0.7)
            .then(&Transform3D::uniform_scale(2.5))
            .then(&Transform3D::translation(10.0, 20.0, 30.0));
        let inv = t.inverse().unwrap();
        let p = Point3::new(15.0, -25.0, 35.0);
        assert_relative_eq!(inv.transform_point(&t.transform_point(&p)), p, epsilon = 1e-9);
        assert!(Transform3D::uniform_scale(0.0).inverse().is_none());
    }

    #[test]
    fn rotation_between_cases() {
        let parallel = Transform3D::rotation_between(Vector3::x(), Vector3::new(2.0, 0.0, 0.0));
        assert_point(parallel.transform_point(&Point3::new(1.0, 2.0, 3.0)), 1.0, 2.0, 3.0);

        let perpendicular = Transform3D::rotation_between(Vector3::x(), Vector3::y());
        assert_relative_eq!(perpendicular.transform_vector(&Vector3::x()), Vector3::y(), epsilon = 1e-10);

        let opposite = Transform3D::rotation_between(Vector3::x(), -Vector3::x());
        assert_relative_eq!(opposite.transform_vector(&Vector3::x()), -Vector3::x(), epsilon = 1e-10);

        let zero = Transform3D::rotation_between(Vector3::zeros(), Vector3::x());
        assert_eq!(zero, Transform3D::identity());
    }

    #[test]
    fn matrix_matches_point_transform() {
        let t = Transform3D::rotation_axis(Vector3::y(), 1.1)
            .then(&Transform3D::uniform_scale(0.5))
            .then(&Transform3D::translation(1.0, -2.0, 3.0));
        let p = Point3::new(0.3, 0.6, -0.9);
        let h = t.to_matrix() * Vector4::new(p.x, p.y, p.z, 1.0);
        assert_point(t.transform_point(&p), h.x, h.y, h.z);
        assert_relative_eq!(h.w, 1.0);
    }

    #[test]
    fn mesh_positions_and_normals() {
        let mut mesh = unit_cube();
        let n = mesh.vertex_count();
        mesh.set_normals(vec![Vector3::x(); n]).unwrap();
        mesh.set_tangents(vec![Vector3::y(); n]).unwrap();

        let t = Transform3D::rotation_axis(Vector3::z(), PI / 2.0)
            .then(&Transform3D::uniform_scale(2.0))
            .then(&Transform3D::translation(10.0, 0.0, 0.0));
        apply_transform(&mut mesh, &t);

        assert_point(mesh.positions()[1], 10.0, 2.0, 0.0);
        assert_relative_eq!(mesh.normals()[0], Vector3::y(), epsilon = 1e-10);
        assert_relative_eq!(mesh.tangents()[0], -Vector3::x(), epsilon = 1e-10);
        assert_relative_eq!(mesh.signed_volume(), 8.0, epsilon = 1e-9);
    }
}
