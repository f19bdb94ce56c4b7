//! Resolution of self-intersections by splitting.

#![allow(clippy::cast_possible_truncation)]

use mesh_clip::plane_cut;
use mesh_spatial::Collider;
use mesh_types::{fan_out, Mesh, MeshResult, Plane, Triangle};
use tracing::{debug, info};

use crate::soup::soup_to_mesh;
use crate::{SplitIntersectingParams, SplitSummary};

/// Split every triangle along the planes of the triangles crossing it.
///
/// For each triangle the other non-degenerate triangles that really
/// intersect it are the cutters. They are applied largest first, each one
/// cutting all fragments produced so far; degenerate fragments are
/// dropped. A triangle with more than `max_cutters_per_triangle` cutters
/// is kept whole. Neighbours that merely share an edge or lie in the same
/// plane never split each other.
///
/// The result is expanded and carries positions only; if the input had
/// normals, flat face normals are set.
///
/// # Errors
///
/// Returns [`mesh_types::MeshError::Validation`] for non-triangle meshes.
///
/// # Example
///
/// ```
/// use mesh_subdivide::{split_intersecting, SplitIntersectingParams};
/// use mesh_types::shapes::unit_cube;
///
/// let mut cube = unit_cube();
/// let summary = split_intersecting(&mut cube, &SplitIntersectingParams::default()).unwrap();
/// assert_eq!(summary.faces_after, 12);
/// ```
pub fn split_intersecting(
    mesh: &mut Mesh,
    params: &SplitIntersectingParams,
) -> MeshResult<SplitSummary> {
    mesh.require_triangles("split intersecting")?;
    mesh.validate()?;
    let mut summary = SplitSummary {
        faces_before: mesh.faces_count(),
        iterations: 1,
        ..SplitSummary::default()
    };
    if mesh.faces_count() == 0 {
        summary.iterations = 0;
        return Ok(summary);
    }

    let had_normals = !mesh.normals().is_empty();
    let collider = Collider::from_mesh(mesh)?;
    let triangles = collider.triangles();

    let pieces = fan_out(triangles.len(), params.parallel, |f| {
        split_one(&collider, f, params.max_cutters_per_triangle)
    });
    let split = pieces.iter().filter(|p| p.len() > 1).count();
    debug!(split, "triangles split by cutters");

    let soup: Vec<Triangle> = pieces.into_iter().flatten().collect();
    *mesh = soup_to_mesh(&soup, had_normals)?;

    summary.faces_after = mesh.faces_count();
    info!(
        faces_before = summary.faces_before,
        faces_after = summary.faces_after,
        "split intersecting triangles"
    );
    Ok(summary)
}

/// Fragments of triangle `f` after cutting it by every triangle crossing it.
fn split_one(collider: &Collider, f: usize, max_cutters: usize) -> Vec<Triangle> {
    let triangles = collider.triangles();
    let tri = triangles[f];

    let mut cutters: Vec<&Triangle> = collider
        .overlapping(&tri.aabb())
        .into_iter()
        .filter(|&c| c as usize != f)
        .map(|c| &triangles[c as usize])
        .filter(|c| !c.is_degenerate() && c.intersects_triangle(&tri))
        .collect();
    if cutters.len() > max_cutters {
        debug!(face = f, cutters = cutters.len(), "too many cutters, keeping triangle whole");
        return vec![tri];
    }
    cutters.sort_by(|a, b| b.area().total_cmp(&a.area()));

    let mut fragments = vec![tri];
    let mut next = Vec::with_capacity(8);
    for cutter in cutters {
        let Some(plane) = Plane::from_triangle(cutter) else {
            continue;
        };
        for fragment in &fragments {
            next.extend(plane_cut(&plane, fragment).into_iter().filter(|t| !t.is_degenerate()));
        }
        std::mem::swap(&mut fragments, &mut next);
        next.clear();
    }
    fragments
}
