//! Winding and normal operations.

#![allow(clippy::cast_possible_truncation)]

use std::collections::BTreeSet;

use mesh_types::{Mesh, MeshResult, Topology, Vector3};
use tracing::{debug, info};

/// Squared length below which an accumulated normal is treated as zero.
const MIN_NORMAL_LENGTH_SQUARED: f64 = 1e-7;

/// Reverse the winding of every triangle and negate all normals.
///
/// Indexed meshes swap the second and third index of each face; expanded
/// meshes swap the second and third vertex. Points and lines only get
/// their normals negated.
pub fn flip_normals(mesh: &mut Mesh) {
    if mesh.topology() == Topology::Triangles {
        if mesh.is_indexed() {
            for face in mesh.indices_mut().chunks_exact_mut(3) {
                face.swap(1, 2);
            }
        } else {
            for f in 0..mesh.faces_count() {
                mesh.swap_vertices(3 * f + 1, 3 * f + 2);
            }
        }
    }
    for n in mesh.normals_mut() {
        *n = -*n;
    }
    debug!(faces = mesh.faces_count(), "flipped normals");
}

/// Rotate a face so its smallest index comes first, keeping the winding.
fn canonical(face: [u32; 3]) -> [u32; 3] {
    let [a, b, c] = face;
    if a <= b && a <= c {
        [a, b, c]
    } else if b <= a && b <= c {
        [b, c, a]
    } else {
        [c, a, b]
    }
}

/// Make every triangle visible from both sides.
///
/// Each triangle is emitted in its own winding and in the reverse one.
/// When the mesh has normals, the reversed copies use a mirrored set of
/// vertices whose normals are negated. Faces that occur more than once
/// are kept once. The result is indexed, with faces in sorted order.
///
/// # Errors
///
/// Returns [`mesh_types::MeshError::Validation`] for non-triangle meshes.
///
/// # Example
///
/// ```
/// use mesh_transform::duplicate_sides;
/// use mesh_types::shapes::tetrahedron;
///
/// let mut mesh = tetrahedron();
/// duplicate_sides(&mut mesh).unwrap();
/// assert_eq!(mesh.faces_count(), 8);
/// assert!(mesh.signed_volume().abs() < 1e-12);
/// ```
pub fn duplicate_sides(mesh: &mut Mesh) -> MeshResult<()> {
    if mesh.faces_count() == 0 {
        return Ok(());
    }
    mesh.require_triangles("duplicate sides")?;
    mesh.validate()?;
    mesh.convert_to_indexed();

    let front_count = mesh.vertex_count() as u32;
    let mirrored = !mesh.normals().is_empty();
    if mirrored {
        for i in 0..front_count as usize {
            let mut v = mesh.vertex(i);
            v.attributes.normal = v.attributes.normal.map(|n| -n);
            mesh.add_vertex(v);
        }
    }
    let back = |i: u32| if mirrored { i + front_count } else { i };

    let mut faces = BTreeSet::new();
    for face in mesh.indices().chunks_exact(3) {
        let (a, b, c) = (face[0], face[1], face[2]);
        faces.insert(canonical([a, b, c]));
        faces.insert(canonical([back(a), back(c), back(b)]));
    }
    let faces_before = mesh.faces_count();
    mesh.set_indices(faces.into_iter().flatten().collect())?;
    mesh.remove_unused_vertices();

    info!(
        faces_before,
        faces_after = mesh.faces_count(),
        mirrored,
        "duplicated triangle sides"
    );
    Ok(())
}

/// Compute smooth vertex normals.
///
/// Existing normals are discarded and the mesh is indexed, so vertices
/// that agree on every other attribute are shared. Each vertex normal is
/// the area-weighted sum of the normals of the triangles using it,
/// normalized; a vertex whose sum is too short gets a zero normal.
///
/// # Errors
///
/// Returns [`mesh_types::MeshError::Validation`] for non-triangle meshes.
///
/// # Example
///
/// ```
/// use mesh_transform::generate_normals;
/// use mesh_types::shapes::icosahedron;
///
/// let mut mesh = icosahedron(1.0);
/// generate_normals(&mut mesh).unwrap();
/// for (n, p) in mesh.normals().iter().zip(mesh.positions()) {
///     assert!((n - p.coords).norm() < 1e-9);
/// }
/// ```
pub fn generate_normals(mesh: &mut Mesh) -> MeshResult<()> {
    if mesh.faces_count() == 0 {
        return Ok(());
    }
    mesh.require_triangles("generate normals")?;
    mesh.validate()?;
    mesh.set_normals(Vec::new())?;
    mesh.convert_to_indexed();

    let mut sums = vec![Vector3::zeros(); mesh.vertex_count()];
    for f in 0..mesh.faces_count() {
        // cross product length is twice the area
        let weighted = mesh.triangle(f).normal_unnormalized();
        for i in mesh.triangle_ids(f) {
            sums[i as usize] += weighted;
        }
    }
    let mut zero = 0;
    for n in &mut sums {
        if n.norm_squared() > MIN_NORMAL_LENGTH_SQUARED {
            n.normalize_mut();
        } else {
            *n = Vector3::zeros();
            zero += 1;
        }
    }
    mesh.set_normals(sums)?;

    info!(vertices = mesh.vertex_count(), zero, "generated normals");
    Ok(())
}
