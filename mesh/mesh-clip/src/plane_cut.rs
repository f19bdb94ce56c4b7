//! Plane cuts of triangles and meshes.

use mesh_repair::discard_invalid;
use mesh_types::{Mesh, MeshResult, Plane, Point3, Triangle};
use smallvec::{smallvec, SmallVec};
use tracing::info;

/// Fragments produced by [`plane_cut`].
pub type Fragments = SmallVec<[Triangle; 3]>;

/// Vertices closer to the plane than this are on it.
const ON_PLANE: f64 = 1e-9;

/// Point where edge `i` (from vertex `i` to `i + 1`) strictly crosses the plane.
fn crossing(tri: &Triangle, d: &[f64; 3], i: usize) -> Option<Point3<f64>> {
    let j = (i + 1) % 3;
    if d[i] * d[j] < 0.0 && d[i].abs() > ON_PLANE && d[j].abs() > ON_PLANE {
        let t = d[i] / (d[i] - d[j]);
        let a = tri.vertex(i);
        let b = tri.vertex(j);
        Some(a + (b - a) * t)
    } else {
        None
    }
}

/// Split a triangle along a plane.
///
/// An edge crosses the plane when its endpoints lie strictly on opposite
/// sides; vertices within `1e-9` of the plane count as lying on it. A triangle with exactly two crossing edges becomes three
/// triangles with the original winding: one on the side of the uncut edge
/// pair and two forming the quad on the other side. Any other triangle is
/// returned whole.
///
/// # Example
///
/// ```
/// use mesh_clip::plane_cut;
/// use mesh_types::{Plane, Point3, Triangle, Vector3};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(0.0, 2.0, 0.0),
/// );
/// let plane = Plane::new(Point3::new(1.0, 0.0, 0.0), Vector3::x()).unwrap();
/// let parts = plane_cut(&plane, &tri);
/// assert_eq!(parts.len(), 3);
/// let area: f64 = parts.iter().map(Triangle::area).sum();
/// assert!((area - tri.area()).abs() < 1e-12);
/// ```
#[must_use]
pub fn plane_cut(plane: &Plane, tri: &Triangle) -> Fragments {
    let d = tri.vertices().map(|p| plane.signed_distance(&p));
    let mids = [crossing(tri, &d, 0), crossing(tri, &d, 1), crossing(tri, &d, 2)];
    let cuts = mids.iter().filter(|m| m.is_some()).count();
    let Some(uncut) = mids.iter().position(Option::is_none) else {
        return smallvec![*tri];
    };
    if cuts != 2 {
        return smallvec![*tri];
    }
    let (Some(m1), Some(m2)) = (mids[(uncut + 1) % 3], mids[(uncut + 2) % 3]) else {
        return smallvec![*tri];
    };
    let r0 = tri.vertex(uncut);
    let r1 = tri.vertex(uncut + 1);
    let r2 = tri.vertex(uncut + 2);
    smallvec![
        Triangle::new(r0, r1, m1),
        Triangle::new(r0, m1, m2),
        Triangle::new(m1, r2, m2),
    ]
}

/// Keep only the part of a triangle mesh on the positive side of a plane.
///
/// Every triangle is cut by the plane and fragments whose centroid lies
/// strictly on the normal's side are kept, so triangles lying in the plane
/// are dropped. The result is an expanded mesh with positions only;
/// degenerate fragments are discarded.
///
/// # Errors
///
/// Returns [`mesh_types::MeshError::Validation`] for non-triangle meshes.
pub fn clip_plane(mesh: &mut Mesh, plane: &Plane) -> MeshResult<()> {
    clip_where(mesh, plane, |d| d > 0.0)
}

/// Keep the fragments whose centroid distance passes `keep`.
fn clip_where(mesh: &mut Mesh, plane: &Plane, keep: impl Fn(f64) -> bool) -> MeshResult<()> {
    mesh.require_triangles("clip plane")?;
    mesh.validate()?;
    let faces_before = mesh.faces_count();

    let kept: Vec<Triangle> = mesh
        .triangles()
        .flat_map(|t| plane_cut(plane, &t))
        .filter(|k| keep(plane.signed_distance(&k.centroid())))
        .collect();
    *mesh = Mesh::from_triangles(&kept);
    discard_invalid(mesh)?;

    info!(faces_before, faces_after = mesh.faces_count(), "clipped mesh by plane");
    Ok(())
}

/// Cut a triangle mesh in two along a plane.
///
/// `mesh` keeps the part on the normal's side; the part on the other side
/// is returned. Triangles lying in the plane stay with `mesh`, so together
/// the two parts cover the surface of the input.
///
/// # Errors
///
/// Returns [`mesh_types::MeshError::Validation`] for non-triangle meshes.
///
/// # Example
///
/// ```
/// use mesh_clip::cut;
/// use mesh_types::{shapes::unit_cube, Plane, Point3, Vector3};
///
/// let mut top = unit_cube();
/// let plane = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::z()).unwrap();
/// let bottom = cut(&mut top, &plane).unwrap();
/// let total = top.surface_area() + bottom.surface_area();
/// assert!((total - 6.0).abs() < 1e-9);
/// ```
pub fn cut(mesh: &mut Mesh, plane: &Plane) -> MeshResult<Mesh> {
    mesh.require_triangles("cut")?;
    let mut other = mesh.clone();
    clip_where(mesh, plane, |d| d > -ON_PLANE)?;
    clip_where(&mut other, &plane.flipped(), |d| d >= ON_PLANE)?;
    Ok(other)
}
