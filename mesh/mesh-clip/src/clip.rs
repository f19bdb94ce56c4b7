//! Axis-aligned clipping of indexed triangle lists.

use mesh_repair::discard_invalid;
use mesh_types::{Aabb, Mesh, MeshResult, Triangle, Vertex};
use tracing::{debug, info};

/// Cuts closer than this to an edge endpoint snap to the endpoint.
const SNAP: f64 = 1e-5;

/// Vertex where edge `a → b` crosses the plane `p[axis] == value`.
///
/// Returns `a` when the edge is (nearly) parallel to the plane or the cut
/// lies within `1e-5` of `a`, and `b` when it lies within `1e-5` of `b`.
/// Otherwise a new vertex interpolated from `a` and `b` is appended and its
/// id returned.
///
/// # Errors
///
/// Returns [`mesh_types::MeshError::Validation`] when the vertices carry
/// bone data, which cannot be interpolated.
///
/// # Panics
///
/// Panics if `a` or `b` is out of range or `axis > 2`.
pub fn clip_add_point(mesh: &mut Mesh, a: u32, b: u32, axis: usize, value: f64) -> MeshResult<u32> {
    let pa = mesh.positions()[a as usize][axis];
    let pb = mesh.positions()[b as usize][axis];
    if (pb - pa).abs() < SNAP {
        return Ok(a);
    }
    let t = (value - pa) / (pb - pa);
    if t < SNAP {
        return Ok(a);
    }
    if t > 1.0 - SNAP {
        return Ok(b);
    }
    let v = Vertex::lerp(&mesh.vertex(a as usize), &mesh.vertex(b as usize), t)?;
    Ok(mesh.add_vertex(v))
}

/// Clip a list of index triples against one axis-aligned half-space.
///
/// With `keep_below` the kept side is `p[axis] <= value`, otherwise
/// `p[axis] > value`; vertices on the plane count as below. Triangles
/// entirely inside pass unchanged, triangles entirely outside are dropped
/// and straddling triangles are split, appending the crossing vertices to
/// `mesh`. Output windings match the input.
///
/// # Errors
///
/// Same as [`clip_add_point`].
///
/// # Panics
///
/// Panics if an id is out of range or `input.len()` is not a multiple of 3.
///
/// # Example
///
/// ```
/// use mesh_clip::clip_triangles;
/// use mesh_types::{Mesh, Point3, Topology};
///
/// let mut mesh = Mesh::from_positions(
///     Topology::Triangles,
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(2.0, 0.0, 0.0),
///         Point3::new(0.0, 2.0, 0.0),
///     ],
/// );
/// let out = clip_triangles(&mut mesh, &[0, 1, 2], 0, 1.0, true).unwrap();
/// assert_eq!(out.len(), 6);
/// assert_eq!(mesh.vertex_count(), 5);
/// ```
pub fn clip_triangles(
    mesh: &mut Mesh,
    input: &[u32],
    axis: usize,
    value: f64,
    keep_below: bool,
) -> MeshResult<Vec<u32>> {
    debug_assert_eq!(input.len() % 3, 0);
    let mut out = Vec::with_capacity(input.len());
    for tri in input.chunks_exact(3) {
        let mut ids = [tri[0], tri[1], tri[2]];
        let mut above = ids.map(|i| mesh.positions()[i as usize][axis] > value);
        let count = above.iter().filter(|&&s| s).count();
        match (count, keep_below) {
            (0, true) | (3, false) => {
                out.extend_from_slice(&ids);
                continue;
            }
            (0, false) | (3, true) => continue,
            _ => {}
        }

        // rotate until the first vertex is below and the second above
        while above[0] || !above[1] {
            ids.rotate_left(1);
            above.rotate_left(1);
        }
        let [a, b, c] = ids;
        let ab = clip_add_point(mesh, a, b, axis, value)?;
        if count == 1 {
            let bc = clip_add_point(mesh, b, c, axis, value)?;
            if keep_below {
                out.extend_from_slice(&[a, ab, bc, a, bc, c]);
            } else {
                out.extend_from_slice(&[ab, b, bc]);
            }
        } else {
            let ac = clip_add_point(mesh, a, c, axis, value)?;
            if keep_below {
                out.extend_from_slice(&[a, ab, ac]);
            } else {
                out.extend_from_slice(&[ab, b, ac, ac, b, c]);
            }
        }
    }
    Ok(out)
}

/// Clip a triangle mesh to the inside of an axis-aligned box.
///
/// Triangles with every vertex inside the box are kept as they are and
/// triangles not touching the box are dropped. The rest are clipped
/// against the six faces of the box, interpolating every vertex attribute
/// at the new vertices. No caps are added. Invalid geometry produced by the
/// clipping is discarded, and the mesh is left indexed.
///
/// # Errors
///
/// Returns [`mesh_types::MeshError::Validation`] for non-triangle meshes,
/// inconsistent meshes and meshes with bone data.
///
/// # Example
///
/// ```
/// use mesh_clip::clip_box;
/// use mesh_types::{shapes::tetrahedron, Aabb, Point3};
///
/// let mut mesh = tetrahedron();
/// let bounds = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(2.0, 2.0, 0.5));
/// clip_box(&mut mesh, &bounds).unwrap();
/// assert_eq!(mesh.faces_count(), 7);
/// ```
pub fn clip_box(mesh: &mut Mesh, bounds: &Aabb) -> MeshResult<()> {
    if mesh.faces_count() == 0 {
        return Ok(());
    }
    mesh.require_triangles("clip box")?;
    mesh.validate()?;
    mesh.check_interpolatable("clip box")?;

    let faces_before = mesh.faces_count();
    mesh.convert_to_indexed();
    let source = mesh.indices().to_vec();
    let corners = [bounds.min, bounds.max];

    let mut kept = Vec::with_capacity(source.len());
    let mut split = 0usize;
    for ids in source.chunks_exact(3) {
        let tri = Triangle::new(
            mesh.positions()[ids[0] as usize],
            mesh.positions()[ids[1] as usize],
            mesh.positions()[ids[2] as usize],
        );
        if tri.vertices().iter().all(|p| bounds.contains(p)) {
            kept.extend_from_slice(ids);
            continue;
        }
        if !tri.intersects_aabb(bounds) {
            continue;
        }
        split += 1;
        let mut work = ids.to_vec();
        for axis in 0..3 {
            for (side, corner) in corners.iter().enumerate() {
                work = clip_triangles(mesh, &work, axis, corner[axis], side == 1)?;
            }
        }
        kept.extend(work);
    }
    debug!(split, "clipped straddling triangles");

    if kept.is_empty() {
        mesh.clear();
    } else {
        mesh.set_indices(kept)?;
        mesh.remove_unused_vertices();
    }
    discard_invalid(mesh)?;

    info!(faces_before, faces_after = mesh.faces_count(), "clipped mesh by box");
    Ok(())
}
