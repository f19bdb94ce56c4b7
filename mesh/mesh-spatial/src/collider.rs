//! Triangle-soup collider for ray casts, overlap and proximity queries.

use mesh_types::{Aabb, Mesh, MeshResult, Point3, Triangle, Vector3};
use tracing::debug;

use crate::Bvh;

/// Hits closer than this to the ray origin are ignored.
const RAY_EPSILON: f64 = 1e-9;

/// A half-line `origin + t * direction`, `t >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Point3<f64>,
    /// Unit direction.
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Create a ray, normalizing the direction. A zero direction is kept
    /// as is and never hits anything.
    #[must_use]
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(f64::MIN_POSITIVE).unwrap_or(direction),
        }
    }

    /// Point at distance `t` along the ray.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }
}

/// Nearest ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Index of the hit triangle.
    pub triangle: u32,
    /// Distance from the ray origin.
    pub distance: f64,
    /// Hit point.
    pub point: Point3<f64>,
}

/// Collider over a set of triangles.
///
/// # Example
///
/// ```
/// use mesh_spatial::{Collider, Ray};
/// use mesh_types::{shapes::unit_cube, Point3, Vector3};
///
/// let collider = Collider::from_mesh(&unit_cube()).unwrap();
/// let ray = Ray::new(Point3::new(0.5, 0.5, 5.0), -Vector3::z());
/// let hit = collider.cast_ray(&ray, f64::INFINITY, false).unwrap();
/// assert!((hit.distance - 4.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Collider {
    triangles: Vec<Triangle>,
    bvh: Bvh,
}

impl Collider {
    /// Build a collider from the triangles of a mesh, in face order.
    ///
    /// # Errors
    ///
    /// Returns [`mesh_types::MeshError::Validation`] if the mesh is not made
    /// of triangles.
    pub fn from_mesh(mesh: &Mesh) -> MeshResult<Self> {
        mesh.require_triangles("build collider")?;
        Ok(Self::from_triangles(mesh.triangles().collect()))
    }

    /// Build a collider from a triangle soup.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let items = triangles
            .iter()
            .enumerate()
            .map(|(i, t)| (i as u32, t.aabb()))
            .collect();
        let bvh = Bvh::build(items, true);
        debug!(triangles = triangles.len(), "built collider");
        Self { triangles, bvh }
    }

    /// The collider's triangles.
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Nearest hit within `max_distance`.
    ///
    /// With `double_sided == false` triangles seen from behind are ignored.
    #[must_use]
    pub fn cast_ray(&self, ray: &Ray, max_distance: f64, double_sided: bool) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        let mut candidates = self.bvh.query_ray(&ray.origin, &ray.direction, max_distance);
        candidates.sort_unstable();
        for id in candidates {
            let tri = &self.triangles[id as usize];
            let Some(t) = tri.ray_intersection(&ray.origin, &ray.direction, double_sided, RAY_EPSILON)
            else {
                continue;
            };
            if t > max_distance {
                continue;
            }
            if best.map_or(true, |b| t < b.distance) {
                best = Some(RayHit {
                    triangle: id,
                    distance: t,
                    point: ray.point_at(t),
                });
            }
        }
        best
    }

    /// Indices of triangles whose bounding boxes overlap `aabb`, ascending.
    #[must_use]
    pub fn overlapping(&self, aabb: &Aabb) -> Vec<u32> {
        let mut ids = self.bvh.query(aabb);
        ids.sort_unstable();
        ids
    }

    /// Triangle closest to `point` within `max_distance`, with the closest
    /// point on it. Ties prefer the lower index.
    #[must_use]
    pub fn closest_triangle(&self, point: &Point3<f64>, max_distance: f64) -> Option<(u32, Point3<f64>)> {
        let mut best: Option<(u32, Point3<f64>, f64)> = None;
        for id in self.overlapping(&Aabb::around(*point, max_distance)) {
            let q = self.triangles[id as usize].closest_point(point);
            let d = (point - q).norm();
            if d <= max_distance && best.map_or(true, |(_, _, bd)| d < bd) {
                best = Some((id, q, d));
            }
        }
        best.map(|(id, q, _)| (id, q))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{shapes::unit_cube, Topology};

    fn floor() -> Collider {
        Collider::from_triangles(vec![Triangle::new(
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )])
    }

    #[test]
    fn single_sided_ignores_back_faces() {
        let c = floor();
        let down = Ray::new(Point3::new(0.0, 0.0, 1.0), -Vector3::z());
        let up = Ray::new(Point3::new(0.0, 0.0, -1.0), Vector3::z());
        assert!(c.cast_ray(&down, 10.0, false).is_some());
        assert!(c.cast_ray(&up, 10.0, false).is_none());
        assert!(c.cast_ray(&up, 10.0, true).is_some());
        assert!(c.cast_ray(&down, 0.5, false).is_none());
    }

    #[test]
    fn nearest_hit_wins() {
        let c = Collider::from_mesh(&unit_cube()).unwrap();
        let ray = Ray::new(Point3::new(0.5, 0.5, -2.0), Vector3::z());
        let hit = c.cast_ray(&ray, f64::INFINITY, true).unwrap();
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-9);
        assert_relative_eq!(hit.point.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn closest_triangle_in_range() {
        let c = floor();
        let (id, q) = c.closest_triangle(&Point3::new(0.0, 0.0, 0.3), 1.0).unwrap();
        assert_eq!(id, 0);
        assert_relative_eq!(q.z, 0.0);
        assert!(c.closest_triangle(&Point3::new(0.0, 0.0, 3.0), 1.0).is_none());
    }

    #[test]
    fn rejects_lines() {
        let lines = Mesh::from_positions(Topology::Lines, vec![Point3::origin(); 2]);
        assert!(Collider::from_mesh(&lines).unwrap_err().is_validation());
    }
}
