//! Linear blend skinning.

use mesh_types::{Matrix4, Mesh, MeshError, MeshResult, Point3, Vector3};
use tracing::info;

/// Bake bone poses into the mesh with linear blend skinning.
///
/// Every vertex is moved by the weighted sum of the matrices of its four
/// bones. Normals, tangents and bitangents go through the upper 3x3 block
/// of the same blended matrix and are renormalized. Bone data is removed
/// afterwards, since it no longer describes the baked vertices.
///
/// # Errors
///
/// Returns [`MeshError::Validation`] when the mesh has no bone data or a
/// vertex refers to a bone outside `bones`. The mesh is unchanged then.
///
/// # Example
///
/// ```
/// use mesh_transform::apply_skinning;
/// use mesh_types::{Matrix4, Mesh, Point3, Topology, Vector3, Vector4};
///
/// let mut mesh = Mesh::from_positions(Topology::Points, vec![Point3::origin()]);
/// mesh.set_bones(vec![[0, 0, 0, 0]], vec![Vector4::new(1.0, 0.0, 0.0, 0.0)]).unwrap();
/// apply_skinning(&mut mesh, &[Matrix4::new_translation(&Vector3::new(0.0, 2.0, 0.0))]).unwrap();
/// assert_eq!(mesh.positions()[0], Point3::new(0.0, 2.0, 0.0));
/// assert!(mesh.bone_indices().is_empty());
/// ```
pub fn apply_skinning(mesh: &mut Mesh, bones: &[Matrix4<f64>]) -> MeshResult<()> {
    const OP: &str = "apply skinning";
    if mesh.vertex_count() > 0 && mesh.bone_indices().is_empty() {
        return Err(MeshError::validation(OP, "mesh has no bone data"));
    }
    if let Some(bad) = mesh
        .bone_indices()
        .iter()
        .flatten()
        .find(|&&b| b as usize >= bones.len())
    {
        return Err(MeshError::validation(
            OP,
            format!("bone {bad} out of range for {} bones", bones.len()),
        ));
    }

    let blended: Vec<Matrix4<f64>> = mesh
        .bone_indices()
        .iter()
        .zip(mesh.bone_weights())
        .map(|(ids, weights)| {
            ids.iter()
                .zip(weights.iter())
                .fold(Matrix4::zeros(), |acc, (&b, &w)| acc + bones[b as usize] * w)
        })
        .collect();

    for (p, m) in mesh.positions_mut().iter_mut().zip(&blended) {
        let h = m * p.to_homogeneous();
        *p = Point3::new(h.x, h.y, h.z);
    }
    skin_directions(mesh.normals_mut(), &blended);
    skin_directions(mesh.tangents_mut(), &blended);
    skin_directions(mesh.bitangents_mut(), &blended);
    mesh.set_bones(Vec::new(), Vec::new())?;

    info!(vertices = blended.len(), bones = bones.len(), "applied skinning");
    Ok(())
}

fn skin_directions(directions: &mut [Vector3<f64>], blended: &[Matrix4<f64>]) {
    for (d, m) in directions.iter_mut().zip(blended) {
        let moved = m.fixed_view::<3, 3>(0, 0) * *d;
        *d = moved.try_normalize(0.0).unwrap_or(moved);
    }
}
