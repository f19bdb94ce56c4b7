//! Removal of non-finite vertices and degenerate faces.

use mesh_types::{Mesh, MeshResult, TexCoords, Topology, Vector3};
use tracing::{debug, info};

/// Normals whose squared length differs from one by more than this are invalid.
const UNIT_TOLERANCE: f64 = 1e-3;

/// Counts reported by the repair operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepairSummary {
    /// Vertex count before the operation.
    pub vertices_before: usize,
    /// Vertex count after the operation.
    pub vertices_after: usize,
    /// Face count before the operation.
    pub faces_before: usize,
    /// Face count after the operation.
    pub faces_after: usize,
}

impl RepairSummary {
    /// Capture the counts of `mesh` as the starting point.
    #[must_use]
    pub fn start(mesh: &Mesh) -> Self {
        Self {
            vertices_before: mesh.vertex_count(),
            vertices_after: mesh.vertex_count(),
            faces_before: mesh.faces_count(),
            faces_after: mesh.faces_count(),
        }
    }

    /// Record the final counts of `mesh`.
    #[must_use]
    pub fn finish(mut self, mesh: &Mesh) -> Self {
        self.vertices_after = mesh.vertex_count();
        self.faces_after = mesh.faces_count();
        self
    }

    /// Number of vertices removed.
    #[must_use]
    pub const fn vertices_removed(&self) -> usize {
        self.vertices_before.saturating_sub(self.vertices_after)
    }

    /// Number of faces removed.
    #[must_use]
    pub const fn faces_removed(&self) -> usize {
        self.faces_before.saturating_sub(self.faces_after)
    }

    /// Whether the operation changed anything.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.vertices_before != self.vertices_after || self.faces_before != self.faces_after
    }
}

impl std::fmt::Display for RepairSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Repair: {} -> {} verts ({} removed), {} -> {} faces ({} removed)",
            self.vertices_before,
            self.vertices_after,
            self.vertices_removed(),
            self.faces_before,
            self.faces_after,
            self.faces_removed()
        )
    }
}

fn finite(v: impl IntoIterator<Item = f64>) -> bool {
    v.into_iter().all(f64::is_finite)
}

fn unit(v: &Vector3<f64>) -> bool {
    finite(v.iter().copied()) && (v.norm_squared() - 1.0).abs() <= UNIT_TOLERANCE
}

/// Per-vertex validity: finite attributes and unit-length directions.
#[must_use]
pub fn valid_vertices(mesh: &Mesh) -> Vec<bool> {
    let mut valid: Vec<bool> = mesh
        .positions()
        .iter()
        .map(|p| finite(p.iter().copied()))
        .collect();
    let mut mark = |i: usize, ok: bool| valid[i] &= ok;
    for (i, n) in mesh.normals().iter().enumerate() {
        mark(i, unit(n));
    }
    for (i, t) in mesh.tangents().iter().enumerate() {
        mark(i, unit(t));
    }
    for (i, b) in mesh.bitangents().iter().enumerate() {
        mark(i, unit(b));
    }
    match mesh.tex_coords() {
        TexCoords::None => {}
        TexCoords::Uv(uvs) => {
            for (i, uv) in uvs.iter().enumerate() {
                mark(i, finite(uv.iter().copied()));
            }
        }
        TexCoords::Uv3(uvs) => {
            for (i, uv) in uvs.iter().enumerate() {
                mark(i, finite(uv.iter().copied()));
            }
        }
    }
    for (i, w) in mesh.bone_weights().iter().enumerate() {
        mark(i, finite(w.iter().copied()));
    }
    valid
}

/// Remove invalid vertices, the faces using them, and degenerate faces.
///
/// A vertex is invalid when any attribute is not finite or a normal,
/// tangent or bitangent is not unit length. Every face touching an invalid
/// vertex is removed. Triangles with (near) zero area and lines with
/// coincident endpoints are removed too. Finally, vertices no face uses are
/// dropped; if no face remains the mesh is cleared.
///
/// # Errors
///
/// Returns [`mesh_types::MeshError::Validation`] if the mesh's attribute
/// arrays are inconsistent.
///
/// # Example
///
/// ```
/// use mesh_repair::discard_invalid;
/// use mesh_types::{Mesh, Point3, Topology};
///
/// let mut mesh = Mesh::from_positions(
///     Topology::Triangles,
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(2.0, 0.0, 0.0),
///     ],
/// );
/// let summary = discard_invalid(&mut mesh).unwrap();
/// assert_eq!(summary.faces_removed(), 1);
/// assert_eq!(mesh.faces_count(), 1);
/// ```
pub fn discard_invalid(mesh: &mut Mesh) -> MeshResult<RepairSummary> {
    mesh.validate()?;
    let summary = RepairSummary::start(mesh);

    let valid = valid_vertices(mesh);
    let faces = mesh.faces_count();
    let keep: Vec<bool> = (0..faces)
        .map(|f| {
            let ids = mesh.face(f);
            if !ids.iter().all(|&i| valid[i as usize]) {
                return false;
            }
            match mesh.topology() {
                Topology::Points => true,
                Topology::Lines => !mesh.line(f).is_degenerate(),
                Topology::Triangles => !mesh.triangle(f).is_degenerate(),
            }
        })
        .collect();

    let dropped = keep.iter().filter(|&&k| !k).count();
    if dropped > 0 {
        debug!(dropped, "dropping invalid faces");
        mesh.retain_faces(&keep)?;
    }
    mesh.remove_unused_vertices();
    if mesh.faces_count() == 0 {
        mesh.clear();
    }

    let summary = summary.finish(mesh);
    if summary.changed() {
        info!(
            vertices_removed = summary.vertices_removed(),
            faces_removed = summary.faces_removed(),
            "discarded invalid geometry"
        );
    }
    Ok(summary)
}

/// Remove vertices no face references.
///
/// Returns the number of removed vertices.
pub fn remove_unused_vertices(mesh: &mut Mesh) -> usize {
    let removed = mesh.remove_unused_vertices();
    if removed > 0 {
        debug!(removed, "removed unused vertices");
    }
    removed
}
