//! Connected component analysis.

use mesh_types::{DisjointSets, Mesh, MeshError, MeshResult, Topology};
use tracing::{debug, info};

/// Split a triangle mesh into its vertex-connected components.
///
/// Triangles sharing a vertex belong to the same component. Expanded meshes
/// are indexed first, so coincident vertices with identical attributes
/// connect their triangles. Each component is returned as a separate mesh that
/// keeps the source attributes and only the vertices it uses. Components
/// are ordered by their smallest vertex.
///
/// Meshes with no faces and point meshes yield no components.
///
/// # Errors
///
/// Returns [`MeshError::NotImplemented`] for line meshes.
///
/// # Example
///
/// ```
/// use mesh_repair::separate_disconnected;
/// use mesh_types::shapes::unit_cube;
///
/// let mut two = unit_cube();
/// let mut other = unit_cube();
/// for p in other.positions_mut() {
///     p.x += 5.0;
/// }
/// two.append(&other).unwrap();
///
/// let parts = separate_disconnected(&two).unwrap();
/// assert_eq!(parts.len(), 2);
/// assert_eq!(parts[0].faces_count(), 12);
/// ```
pub fn separate_disconnected(mesh: &Mesh) -> MeshResult<Vec<Mesh>> {
    mesh.validate()?;
    if mesh.faces_count() == 0 {
        return Ok(Vec::new());
    }
    match mesh.topology() {
        Topology::Points => return Ok(Vec::new()),
        Topology::Lines => {
            return Err(MeshError::not_implemented("separate disconnected", "lines"));
        }
        Topology::Triangles => {}
    }

    let mut work = mesh.clone();
    work.convert_to_indexed();

    let faces = work.faces_count();
    let mut sets = DisjointSets::new(work.vertex_count());
    for f in 0..faces {
        let [a, b, c] = work.triangle_ids(f);
        sets.merge(a as usize, b as usize);
        sets.merge(a as usize, c as usize);
    }

    let roots: Vec<usize> = (0..faces)
        .map(|f| sets.find(work.triangle_ids(f)[0] as usize))
        .collect();
    let mut ordered: Vec<usize> = roots.clone();
    ordered.sort_unstable();
    ordered.dedup();

    let mut components = Vec::with_capacity(ordered.len());
    for root in ordered {
        let keep: Vec<bool> = roots.iter().map(|&r| r == root).collect();
        let mut part = work.clone();
        part.retain_faces(&keep)?;
        part.remove_unused_vertices();
        components.push(part);
    }

    debug!(components = components.len(), faces, "separated components");
    Ok(components)
}

/// Keep only the component with the most faces. Ties keep the first.
///
/// # Errors
///
/// Same as [`separate_disconnected`].
pub fn discard_disconnected(mesh: &mut Mesh) -> MeshResult<()> {
    if mesh.faces_count() == 0 {
        return Ok(());
    }
    let components = separate_disconnected(mesh)?;
    let count = components.len();
    let mut largest: Option<Mesh> = None;
    for part in components {
        if largest
            .as_ref()
            .map_or(true, |best| part.faces_count() > best.faces_count())
        {
            largest = Some(part);
        }
    }
    if let Some(largest) = largest {
        info!(
            components = count,
            faces_before = mesh.faces_count(),
            faces_after = largest.faces_count(),
            "kept largest component"
        );
        *mesh = largest;
    }
    Ok(())
}
