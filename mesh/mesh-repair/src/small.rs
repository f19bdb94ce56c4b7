//! Removal of small faces.

use mesh_types::{require_non_negative, Mesh, MeshResult, Topology};
use tracing::info;

use crate::discard_invalid;

/// Remove triangles with area below `threshold`, or lines shorter than it.
///
/// A zero threshold leaves the mesh untouched; `f64::INFINITY` removes every
/// face. Otherwise the survivors go through [`discard_invalid`], which also
/// drops vertices left unused. Returns the number of removed faces.
///
/// # Errors
///
/// - [`mesh_types::MeshError::Config`] for a negative or NaN threshold
/// - [`mesh_types::MeshError::Validation`] for point meshes
///
/// # Example
///
/// ```
/// use mesh_repair::remove_small;
/// use mesh_types::shapes::unit_cube;
///
/// let mut cube = unit_cube();
/// assert_eq!(remove_small(&mut cube, 0.0).unwrap(), 0);
/// assert_eq!(remove_small(&mut cube, f64::INFINITY).unwrap(), 12);
/// assert!(cube.is_empty());
/// ```
pub fn remove_small(mesh: &mut Mesh, threshold: f64) -> MeshResult<usize> {
    require_non_negative("threshold", threshold)?;
    if mesh.topology() == Topology::Points {
        return Err(mesh_types::MeshError::validation(
            "remove small",
            "requires lines or triangles",
        ));
    }
    mesh.validate()?;
    if threshold <= 0.0 || mesh.faces_count() == 0 {
        return Ok(0);
    }

    let faces = mesh.faces_count();
    let keep: Vec<bool> = (0..faces)
        .map(|f| {
            let size = if mesh.topology() == Topology::Triangles {
                mesh.triangle(f).area()
            } else {
                mesh.line(f).length()
            };
            size >= threshold
        })
        .collect();
    let small = keep.iter().filter(|&&k| !k).count();
    if small > 0 {
        mesh.retain_faces(&keep)?;
    }
    discard_invalid(mesh)?;

    let removed = faces - mesh.faces_count();
    info!(threshold, removed, faces_after = mesh.faces_count(), "removed small faces");
    Ok(removed)
}
