//! Property-based tests for mesh repair operations.
//!
//! These tests use proptest to generate random meshes and verify invariants.
//!
//! Run with: cargo test -p mesh-repair -- proptest

#![allow(clippy::unwrap_used, clippy::cast_possible_truncation)]

use mesh_repair::{discard_invalid, remove_small, separate_disconnected};
use mesh_types::shapes::unit_cube;
use mesh_types::{Mesh, Point3, Topology};
use proptest::prelude::*;

// =============================================================================
// Strategies for generating random meshes
// =============================================================================

/// Generate a random vertex position in a bounded range.
fn arb_position() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-100.0..100.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// Generate a position that is occasionally not finite.
fn arb_maybe_bad_position() -> impl Strategy<Value = Point3<f64>> {
    prop_oneof![
        8 => arb_position(),
        1 => Just(Point3::new(f64::NAN, 0.0, 0.0)),
        1 => Just(Point3::new(0.0, f64::INFINITY, 0.0)),
    ]
}

/// Generate an indexed triangle mesh with in-range indices.
fn arb_mesh(
    min_vertices: usize,
    max_vertices: usize,
    min_faces: usize,
    max_faces: usize,
) -> impl Strategy<Value = Mesh> {
    (min_vertices..=max_vertices).prop_flat_map(move |num_vertices| {
        let positions = prop::collection::vec(arb_maybe_bad_position(), num_vertices);
        positions.prop_flat_map(move |positions| {
            let n = positions.len() as u32;
            let face = prop::array::uniform3(0..n);
            prop::collection::vec(face, min_faces..=max_faces).prop_map(move |faces| {
                let indices = faces.iter().flatten().copied().collect();
                Mesh::from_indexed(Topology::Triangles, positions.clone(), indices).unwrap()
            })
        })
    })
}

/// Generate a few translated copies of the unit cube.
fn arb_cubes() -> impl Strategy<Value = (usize, Mesh)> {
    (1usize..5).prop_map(|count| {
        let mut mesh = Mesh::default();
        for i in 0..count {
            let mut cube = unit_cube();
            for p in cube.positions_mut() {
                p.x += 3.0 * i as f64;
            }
            mesh.append(&cube).unwrap();
        }
        (count, mesh)
    })
}

// =============================================================================
// Property Tests: Validity
// =============================================================================

proptest! {
    /// Discarding invalid geometry always leaves a consistent mesh.
    #[test]
    fn discard_invalid_leaves_valid_mesh(mesh in arb_mesh(3, 30, 1, 50)) {
        let mut repaired = mesh.clone();
        let summary = discard_invalid(&mut repaired).unwrap();

        prop_assert!(repaired.validate().is_ok());
        prop_assert!(repaired.faces_count() <= mesh.faces_count());
        prop_assert_eq!(summary.faces_after, repaired.faces_count());
        for p in repaired.positions() {
            prop_assert!(p.iter().all(|c| c.is_finite()));
        }
        for t in repaired.triangles() {
            prop_assert!(!t.is_degenerate());
        }
    }

    /// A second pass finds nothing left to remove.
    #[test]
    fn discard_invalid_is_idempotent(mesh in arb_mesh(3, 30, 1, 50)) {
        let mut once = mesh.clone();
        discard_invalid(&mut once).unwrap();
        let mut twice = once.clone();
        let summary = discard_invalid(&mut twice).unwrap();

        prop_assert!(!summary.changed());
        prop_assert_eq!(once, twice);
    }
}

// =============================================================================
// Property Tests: Small faces
// =============================================================================

proptest! {
    /// A zero threshold never changes the mesh.
    #[test]
    fn remove_small_zero_is_noop(mesh in arb_mesh(3, 30, 1, 50)) {
        let mut cleaned = mesh.clone();
        discard_invalid(&mut cleaned).unwrap();
        let before = cleaned.clone();

        prop_assert_eq!(remove_small(&mut cleaned, 0.0).unwrap(), 0);
        prop_assert_eq!(cleaned, before);
    }

    /// An infinite threshold removes every face.
    #[test]
    fn remove_small_infinite_removes_all(mesh in arb_mesh(3, 30, 1, 50)) {
        let mut cleaned = mesh.clone();
        discard_invalid(&mut cleaned).unwrap();
        let faces = cleaned.faces_count();

        prop_assert_eq!(remove_small(&mut cleaned, f64::INFINITY).unwrap(), faces);
        prop_assert_eq!(cleaned.faces_count(), 0);
    }
}

// =============================================================================
// Property Tests: Connectivity
// =============================================================================

proptest! {
    /// Components together hold every face of the input.
    #[test]
    fn components_conserve_faces(mesh in arb_mesh(3, 30, 1, 50)) {
        let mut cleaned = mesh.clone();
        discard_invalid(&mut cleaned).unwrap();

        let parts = separate_disconnected(&cleaned).unwrap();
        let total: usize = parts.iter().map(Mesh::faces_count).sum();
        prop_assert_eq!(total, cleaned.faces_count());
        for part in &parts {
            prop_assert!(part.faces_count() > 0);
            prop_assert!(part.validate().is_ok());
        }
    }

    /// Separated cubes come back one per component.
    #[test]
    fn separated_cubes((count, mesh) in arb_cubes()) {
        let parts = separate_disconnected(&mesh).unwrap();
        prop_assert_eq!(parts.len(), count);
        for part in &parts {
            prop_assert_eq!(part.faces_count(), 12);
            prop_assert_eq!(part.vertex_count(), 8);
        }
    }
}

// =============================================================================
// Cube invariants
// =============================================================================

#[test]
fn cube_is_valid() {
    let cube = unit_cube();
    cube.validate().unwrap();

    assert_eq!(cube.vertex_count(), 8);
    assert_eq!(cube.faces_count(), 12);
}

#[test]
fn cube_repair_is_stable() {
    let cube = unit_cube();
    let mut repaired = cube.clone();

    let summary = discard_invalid(&mut repaired).unwrap();

    assert!(!summary.changed());
    assert_eq!(repaired, cube);
}
