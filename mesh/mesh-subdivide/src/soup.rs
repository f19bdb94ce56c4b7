//! Conversion of triangle soups back into meshes.

use mesh_repair::discard_invalid;
use mesh_types::{Mesh, MeshResult, Triangle, Vector3};

/// Expanded mesh of `triangles`, with flat normals when `with_normals`.
/// Degenerate triangles are discarded.
pub(crate) fn soup_to_mesh(triangles: &[Triangle], with_normals: bool) -> MeshResult<Mesh> {
    let mut mesh = Mesh::from_triangles(triangles);
    if with_normals {
        let normals = triangles
            .iter()
            .flat_map(|t| [t.normal().unwrap_or_else(Vector3::zeros); 3])
            .collect();
        mesh.set_normals(normals)?;
    }
    discard_invalid(&mut mesh)?;
    Ok(mesh)
}
