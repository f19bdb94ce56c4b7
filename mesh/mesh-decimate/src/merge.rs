//! Merging of nearby vertices.

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use kiddo::{KdTree, SquaredEuclidean};
use mesh_repair::discard_invalid;
use mesh_types::{fan_out, DisjointSets, Mesh, MeshResult, Point3, UnitQuaternion, Vector3};
use tracing::{debug, info};

use crate::{MergeParams, MergeSummary};

/// Merge vertices that lie within `distance_threshold` of each other.
///
/// Vertices are clustered transitively: if `a` is close to `b` and `b` to
/// `c`, all three end up in one cluster even when `a` and `c` are far
/// apart. In the default mode the mesh is indexed first and every index is
/// remapped to the smallest vertex id of its cluster; in move-only mode
/// the topology is kept and every vertex of a cluster moves to the
/// cluster's centroid. Faces that collapse are removed afterwards.
///
/// A zero threshold leaves the mesh unchanged.
///
/// # Errors
///
/// Returns [`mesh_types::MeshError::Config`] for a negative or NaN
/// threshold.
///
/// # Example
///
/// ```
/// use mesh_decimate::{merge_close_vertices, MergeParams};
/// use mesh_types::shapes::unit_cube;
///
/// let mut cube = unit_cube();
/// cube.convert_to_expanded();
/// let summary = merge_close_vertices(&mut cube, &MergeParams::default()).unwrap();
/// assert_eq!(summary.vertices_after, 8);
/// assert_eq!(summary.faces_after, 12);
/// ```
pub fn merge_close_vertices(mesh: &mut Mesh, params: &MergeParams) -> MeshResult<MergeSummary> {
    params.validate()?;
    mesh.validate()?;
    let mut summary = MergeSummary::start(mesh);
    if mesh.faces_count() == 0 || params.distance_threshold <= 0.0 {
        return Ok(summary);
    }

    if !params.move_only {
        mesh.convert_to_indexed();
    }

    let threshold = params.distance_threshold;
    let positions = mesh.positions();
    let mut clusters = DisjointSets::new(positions.len());

    // Coincident vertices are joined up front; the tree holds each position once.
    let mut first_at: HashMap<[u64; 3], usize> = HashMap::with_capacity(positions.len());
    let mut representatives = Vec::new();
    for (i, p) in positions.iter().enumerate() {
        match first_at.entry([p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]) {
            Entry::Occupied(e) => clusters.merge(*e.get(), i),
            Entry::Vacant(e) => {
                e.insert(i);
                representatives.push(i);
            }
        }
    }

    // Axis-aligned grids put many points on one coordinate value, which
    // overflows a kd-tree bucket; query in a rotated frame instead.
    let frame = UnitQuaternion::from_euler_angles(0.5, 0.7, 1.1);
    let tree_point = |p: &Point3<f64>| {
        let r = frame * p;
        [r.x, r.y, r.z]
    };

    let mut tree: KdTree<f64, 3> = KdTree::with_capacity(representatives.len());
    for (slot, &i) in representatives.iter().enumerate() {
        tree.add(&tree_point(&positions[i]), slot as u64);
    }

    let radius_sq = threshold * threshold;
    let neighbours = fan_out(representatives.len(), params.parallel, |slot| {
        let query = tree_point(&positions[representatives[slot]]);
        tree.within::<SquaredEuclidean>(&query, radius_sq)
            .into_iter()
            .map(|n| n.item as usize)
            .filter(|&other| other != slot)
            .collect::<Vec<usize>>()
    });

    for (slot, near) in neighbours.iter().enumerate() {
        for &other in near {
            clusters.merge(representatives[slot], representatives[other]);
        }
    }
    let groups = clusters.groups(false);
    debug!(clusters = groups.len(), "found vertex clusters");

    if params.move_only {
        let points = mesh.positions_mut();
        for group in &groups {
            let sum = group
                .iter()
                .fold(Vector3::zeros(), |acc, &i| acc + points[i].coords);
            let center = Point3::from(sum / group.len() as f64);
            for &i in group {
                points[i] = center;
            }
        }
    } else {
        for i in mesh.indices_mut() {
            *i = clusters.find(*i as usize) as u32;
        }
    }

    discard_invalid(mesh)?;
    summary.passes = 1;
    let summary = summary.finish(mesh);
    info!(
        threshold,
        clusters = groups.len(),
        vertices_after = summary.vertices_after,
        faces_after = summary.faces_after,
        "merged close vertices"
    );
    Ok(summary)
}
