//! Simplification of coplanar regions.

#![allow(clippy::cast_possible_truncation)]

use std::collections::BTreeMap;

use mesh_repair::discard_invalid;
use mesh_types::{Mesh, MeshResult, Point3, Triangle, Vector3};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::{MergeSummary, PlanarParams};

/// Reduce the number of triangles in flat regions without changing the
/// covered surface.
///
/// A vertex is collapsed into one of its neighbours when every triangle
/// around it (that is coplanar with the rest of its fan) agrees on the
/// plane, and either the fan closes around the vertex or the vertex lies on
/// a straight boundary. A collapse is rejected if any triangle of the fan
/// would flip. Triangles touched by a collapse are frozen until the next
/// pass; passes repeat while the face count keeps dropping.
///
/// The result is indexed. A mesh without faces is left untouched.
///
/// # Errors
///
/// - [`mesh_types::MeshError::Config`] for invalid parameters
/// - [`mesh_types::MeshError::Validation`] for non-triangle meshes
///
/// # Example
///
/// ```
/// use mesh_decimate::{merge_planar, PlanarParams};
/// use mesh_types::shapes::unit_cube;
///
/// let mut cube = unit_cube();
/// let summary = merge_planar(&mut cube, &PlanarParams::default()).unwrap();
/// assert_eq!(summary.faces_after, 12);
/// ```
pub fn merge_planar(mesh: &mut Mesh, params: &PlanarParams) -> MeshResult<MergeSummary> {
    params.validate()?;
    let mut summary = MergeSummary::start(mesh);
    if mesh.faces_count() == 0 {
        return Ok(summary);
    }
    mesh.require_triangles("merge_planar")?;
    mesh.validate()?;
    mesh.convert_to_indexed();

    while summary.passes < params.max_passes {
        let before = mesh.faces_count();
        let (indices, collapsed) = planar_pass(mesh, params.normal_threshold);
        summary.passes += 1;
        debug!(pass = summary.passes, collapsed, "planar merge pass");
        if collapsed == 0 {
            break;
        }
        mesh.set_indices(indices)?;
        discard_invalid(mesh)?;
        if mesh.faces_count() >= before {
            break;
        }
    }

    let summary = summary.finish(mesh);
    info!(
        faces_before = summary.faces_before,
        faces_after = summary.faces_after,
        passes = summary.passes,
        "merged planar regions"
    );
    Ok(summary)
}

/// One sweep over all vertices. Returns the rewritten index buffer and the
/// number of collapsed vertices.
fn planar_pass(mesh: &Mesh, threshold: f64) -> (Vec<u32>, usize) {
    let positions = mesh.positions();
    let indices = mesh.indices();
    let face_count = mesh.faces_count();

    let normals: Vec<Option<Vector3<f64>>> = mesh.triangles().map(|t| t.normal()).collect();
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); mesh.vertex_count()];
    for (t, ids) in indices.chunks_exact(3).enumerate() {
        for &i in ids {
            incident[i as usize].push(t);
        }
    }
    for around in &mut incident {
        around.dedup();
    }

    let mut state = Collapser {
        positions,
        indices,
        normals: &normals,
        banned: vec![false; face_count],
        output: indices.to_vec(),
        collapsed: 0,
    };

    for (vi, around) in incident.iter().enumerate() {
        let vi = vi as u32;
        for (k, &t1) in around.iter().enumerate() {
            let Some(n1) = normals[t1] else { continue };
            let mut group: SmallVec<[usize; 8]> = around[k + 1..]
                .iter()
                .copied()
                .filter(|&t2| normals[t2].is_some_and(|n2| n1.dot(&n2) > threshold))
                .collect();
            if group.is_empty() {
                continue;
            }
            group.push(t1);
            if group.iter().any(|&t| state.banned[t]) {
                continue;
            }

            let mut uses: BTreeMap<u32, usize> = BTreeMap::new();
            for &t in &group {
                for &i in &indices[t * 3..t * 3 + 3] {
                    *uses.entry(i).or_default() += 1;
                }
            }
            let edge: SmallVec<[u32; 2]> = uses
                .iter()
                .filter(|&(_, &n)| n == 1)
                .map(|(&i, _)| i)
                .collect();
            let twos = uses.values().filter(|&&n| n == 2).count();
            if edge.len() != 2 && twos != group.len() {
                continue;
            }

            if edge.len() == 2 {
                if !collinear(positions, edge[0], vi, edge[1], threshold) {
                    continue;
                }
                if !state.try_collapse(&group, vi, edge[0]) {
                    state.try_collapse(&group, vi, edge[1]);
                }
                continue;
            }

            for (&target, &n) in &uses {
                if n == 2 && target != vi && state.try_collapse(&group, vi, target) {
                    break;
                }
            }
        }
    }

    (state.output, state.collapsed)
}

/// Whether `a`, `b`, `c` lie on a straight line, in that order.
fn collinear(positions: &[Point3<f64>], a: u32, b: u32, c: u32, threshold: f64) -> bool {
    let pa = positions[a as usize];
    let pb = positions[b as usize];
    let pc = positions[c as usize];
    match ((pb - pa).try_normalize(0.0), (pc - pb).try_normalize(0.0)) {
        (Some(x), Some(y)) => x.dot(&y) > threshold,
        _ => false,
    }
}

struct Collapser<'a> {
    positions: &'a [Point3<f64>],
    indices: &'a [u32],
    normals: &'a [Option<Vector3<f64>>],
    banned: Vec<bool>,
    output: Vec<u32>,
    collapsed: usize,
}

impl Collapser<'_> {
    fn moved(&self, t: usize, from: u32, to: u32) -> [u32; 3] {
        let mut ids = [0; 3];
        for (dst, &src) in ids.iter_mut().zip(&self.indices[t * 3..t * 3 + 3]) {
            *dst = if src == from { to } else { src };
        }
        ids
    }

    /// Move `from` onto `to` in all of `faces`, unless that flips one of
    /// them. Degenerate results are allowed.
    fn try_collapse(&mut self, faces: &[usize], from: u32, to: u32) -> bool {
        let flips = faces.iter().any(|&t| {
            let ids = self.moved(t, from, to);
            let tri = Triangle::new(
                self.positions[ids[0] as usize],
                self.positions[ids[1] as usize],
                self.positions[ids[2] as usize],
            );
            match (tri.normal(), self.normals[t]) {
                (Some(n), Some(original)) => n.dot(&original) < 0.0 && !tri.is_degenerate(),
                _ => false,
            }
        });
        if flips {
            return false;
        }
        for &t in faces {
            let ids = self.moved(t, from, to);
            self.output[t * 3..t * 3 + 3].copy_from_slice(&ids);
            self.banned[t] = true;
        }
        self.collapsed += 1;
        true
    }
}
