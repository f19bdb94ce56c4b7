//! Splitting of long, thin triangles.

use mesh_clip::{plane_cut, Fragments};
use mesh_types::{Mesh, MeshResult, Plane, Triangle};
use tracing::{debug, info, warn};

use crate::soup::soup_to_mesh;
use crate::{SplitLongParams, SplitSummary};

/// Cut a triangle across the midpoint of its longest edge.
///
/// The cutting plane faces along that edge. When the opposite vertex lies
/// on the plane, the triangle is halved through it instead.
fn split_across_longest(tri: &Triangle) -> Option<Fragments> {
    let e = tri.longest_edge();
    let a = tri.vertex(e);
    let b = tri.vertex(e + 1);
    let mid = a + (b - a) * 0.5;
    let plane = Plane::new(mid, b - a)?;
    let pieces = plane_cut(&plane, tri);
    if pieces.len() > 1 {
        return Some(pieces);
    }
    let c = tri.vertex(e + 2);
    Some(Fragments::from_slice(&[Triangle::new(a, mid, c), Triangle::new(mid, b, c)]))
}

/// Whether the triangle is acceptable as is.
fn is_compact(tri: &Triangle, params: &SplitLongParams) -> bool {
    let mut lengths = tri.edge_lengths();
    lengths.sort_by(f64::total_cmp);
    lengths[0] / lengths[2] > params.ratio || lengths[2] < params.length
}

/// Split triangles that are long and thin.
///
/// A triangle is left alone when the ratio of its shortest to its longest
/// edge is above `ratio`, or when its longest edge is shorter than
/// `length`. Every other triangle is cut across its longest edge at the
/// midpoint, and the pieces are examined again until none qualifies or
/// `max_iterations` rounds have run. Isosceles triangles cut across their
/// base are halved through the apex.
///
/// A cut that would leave a degenerate piece is not made; that triangle is
/// kept whole, so the surface area is preserved.
///
/// The result is expanded and carries positions only; if the input had
/// normals, flat face normals are set.
///
/// # Errors
///
/// - [`mesh_types::MeshError::Config`] for invalid parameters
/// - [`mesh_types::MeshError::Validation`] for non-triangle meshes
///
/// # Example
///
/// ```
/// use mesh_subdivide::{split_long, SplitLongParams};
/// use mesh_types::{Mesh, Point3, Topology};
///
/// let mut sliver = Mesh::from_positions(
///     Topology::Triangles,
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(10.0, 0.0, 0.0),
///         Point3::new(1.0, 0.5, 0.0),
///     ],
/// );
/// let summary = split_long(&mut sliver, &SplitLongParams::default()).unwrap();
/// assert!(summary.faces_after > 1);
/// ```
pub fn split_long(mesh: &mut Mesh, params: &SplitLongParams) -> MeshResult<SplitSummary> {
    params.validate()?;
    let mut summary = SplitSummary {
        faces_before: mesh.faces_count(),
        ..SplitSummary::default()
    };
    if mesh.faces_count() == 0 {
        return Ok(summary);
    }
    mesh.require_triangles("split long")?;
    mesh.validate()?;

    let had_normals = !mesh.normals().is_empty();
    let mut pending: Vec<Triangle> = mesh.triangles().collect();
    let mut done = Vec::with_capacity(pending.len());
    let mut next = Vec::new();

    while !pending.is_empty() {
        if summary.iterations == params.max_iterations {
            warn!(
                pending = pending.len(),
                max_iterations = params.max_iterations,
                "split long stopped at the round limit"
            );
            done.append(&mut pending);
            break;
        }
        summary.iterations += 1;

        for tri in pending.drain(..) {
            if is_compact(&tri, params) {
                done.push(tri);
                continue;
            }
            match split_across_longest(&tri) {
                Some(pieces) if !pieces.iter().any(Triangle::is_degenerate) => {
                    next.extend(pieces);
                }
                _ => done.push(tri),
            }
        }
        debug!(round = summary.iterations, pending = next.len(), "split long round");
        std::mem::swap(&mut pending, &mut next);
    }

    *mesh = soup_to_mesh(&done, had_normals)?;

    summary.faces_after = mesh.faces_count();
    info!(
        faces_before = summary.faces_before,
        faces_after = summary.faces_after,
        iterations = summary.iterations,
        "split long triangles"
    );
    Ok(summary)
}
