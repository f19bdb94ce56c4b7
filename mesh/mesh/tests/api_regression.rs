//! API Regression Tests for Mesh Crate Ecosystem
//!
//! These tests serve as a regression suite to ensure the public API and the
//! geometric guarantees of the mesh crates stay stable. They are organized
//! in 5 tiers of increasing complexity:
//!
//! - Tier 1: Foundation (mesh-types, indexing, validation)
//! - Tier 2: Cleanup (mesh-repair, mesh-decimate)
//! - Tier 3: Cutting & Tessellation (mesh-clip, mesh-subdivide)
//! - Tier 4: Attributes (mesh-transform, mesh-texture)
//! - Tier 5: Persistence (mesh-io)
//!
//! If any of these tests fail after API changes, it indicates a breaking change
//! that needs documentation in CHANGELOG.md and a version bump.
//!
//! Set `RUST_LOG=debug` to see the operations' logs.

// Allow test-specific patterns
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::float_cmp)]
#![allow(clippy::cast_lossless)]

use approx::assert_relative_eq;
use mesh::{prelude::*, types};
use types::shapes::{icosahedron, tetrahedron, unit_cube, uv_sphere};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Two unit cubes five units apart along x.
fn two_cubes() -> Mesh {
    let mut mesh = unit_cube();
    let mut other = unit_cube();
    apply_transform(&mut other, &Transform3D::translation(5.0, 0.0, 0.0));
    mesh.append(&other).unwrap();
    mesh
}

// =============================================================================
// TIER 1: Foundation - Mesh Container and Indexing
// =============================================================================

mod tier1_foundation {
    use super::*;

    #[test]
    fn vertex_creation_and_access() {
        let v = Vertex::from_coords(1.0, 2.0, 3.0).with_normal(Vector3::z());
        assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(v.attributes.normal, Some(Vector3::z()));

        let mut mesh = Mesh::default();
        let id = mesh.add_vertex(v);
        assert_eq!(id, 0);
        assert_eq!(mesh.vertex(0), v);
    }

    #[test]
    fn primitive_unit_cube() {
        let cube = unit_cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.faces_count(), 12); // 6 faces × 2 triangles
        assert!(cube.is_indexed());
        assert_relative_eq!(cube.surface_area(), 6.0, epsilon = 1e-12);
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn mesh_bounds_calculation() {
        let bounds = unit_cube().bounding_box();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn convert_to_indexed_is_idempotent() {
        let cube = unit_cube();
        let mut again = cube.clone();
        again.convert_to_indexed();
        assert_eq!(again, cube);
    }

    #[test]
    fn convert_to_expanded_is_idempotent() {
        let mut expanded = unit_cube();
        expanded.convert_to_expanded();
        let mut again = expanded.clone();
        again.convert_to_expanded();
        assert_eq!(again, expanded);
        assert!(again.indices().is_empty());
    }

    #[test]
    fn index_round_trip_preserves_faces() {
        let mut original = icosahedron(1.5);
        original.convert_to_expanded();

        let mut round = original.clone();
        round.convert_to_indexed();
        assert_eq!(round.vertex_count(), 12);
        round.convert_to_expanded();

        assert_eq!(round.faces_count(), original.faces_count());
        for f in 0..original.faces_count() {
            let a = original.triangle(f);
            let b = round.triangle(f);
            for (p, q) in a.vertices().iter().zip(b.vertices().iter()) {
                assert_relative_eq!(p, q, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn topology_checks() {
        let mut lines = Mesh::new(Topology::Lines);
        let a = lines.add_vertex(Vertex::from_coords(0.0, 0.0, 0.0));
        let b = lines.add_vertex(Vertex::from_coords(1.0, 0.0, 0.0));
        lines.add_line(a, b).unwrap();
        assert_eq!(lines.faces_count(), 1);
        assert!(lines.require_triangles("test").is_err());
        assert!(lines.add_triangle(a, b, a).is_err());
    }
}

// =============================================================================
// TIER 2: Cleanup - Repair and Merging
// =============================================================================

mod tier2_cleanup {
    use super::*;
    use mesh::repair::RepairSummary;

    #[test]
    fn remove_small_thresholds() {
        init_tracing();
        let mut mesh = uv_sphere(1.0, 12, 6);
        let faces = mesh.faces_count();

        remove_small(&mut mesh, 0.0).unwrap();
        assert_eq!(mesh.faces_count(), faces);

        remove_small(&mut mesh, f64::INFINITY).unwrap();
        assert_eq!(mesh.faces_count(), 0);
    }

    #[test]
    fn merge_zero_distance_is_noop() {
        let mut mesh = two_cubes();
        let before = mesh.clone();
        let summary = merge_close_vertices(&mut mesh, &MergeParams::with_distance(0.0)).unwrap();
        assert_eq!(summary.faces_after, summary.faces_before);
        assert_eq!(mesh.faces_count(), before.faces_count());
    }

    #[test]
    fn merge_welds_expanded_cube() {
        let mut mesh = unit_cube();
        mesh.convert_to_expanded();
        merge_close_vertices(&mut mesh, &MergeParams::with_distance(1e-6)).unwrap();
        assert_eq!(mesh.faces_count(), 12);
        assert_eq!(mesh.vertex_count(), 8);
    }

    #[test]
    fn connectivity_conservation() {
        init_tracing();
        let mut mesh = two_cubes();
        let mut small = tetrahedron();
        apply_transform(&mut small, &Transform3D::translation(0.0, 9.0, 0.0));
        mesh.append(&small).unwrap();

        let parts = separate_disconnected(&mesh).unwrap();
        assert_eq!(parts.len(), 3);
        let total: usize = parts.iter().map(Mesh::faces_count).sum();
        assert_eq!(total, 12 + 12 + 4);

        discard_disconnected(&mut mesh).unwrap();
        assert_eq!(mesh.faces_count(), 12);
    }

    #[test]
    fn discard_invalid_drops_nan_faces() {
        let mut mesh = unit_cube();
        mesh.positions_mut()[0] = Point3::new(f64::NAN, 0.0, 0.0);
        let summary: RepairSummary = discard_invalid(&mut mesh).unwrap();
        assert!(summary.changed());
        assert!(mesh.faces_count() < 12);
        assert!(mesh
            .positions()
            .iter()
            .all(|p| p.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn planar_merge_keeps_the_shape() {
        let mut mesh = unit_cube();
        let summary = merge_planar(&mut mesh, &PlanarParams::default()).unwrap();
        assert!(summary.faces_after <= 12);
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(mesh.surface_area(), 6.0, epsilon = 1e-9);
    }
}

// =============================================================================
// TIER 3: Cutting & Tessellation
// =============================================================================

mod tier3_cutting {
    use super::*;
    use mesh::subdivide::{split_intersecting, SplitIntersectingParams};

    #[test]
    fn cut_partitions_surface_area() {
        init_tracing();
        for mesh in [unit_cube(), icosahedron(1.0), uv_sphere(2.0, 16, 8)] {
            let area = mesh.surface_area();
            let mut top = mesh;
            let plane = Plane::new(Point3::new(0.1, 0.2, 0.3), Vector3::new(1.0, 2.0, 3.0)).unwrap();
            let bottom = cut(&mut top, &plane).unwrap();
            assert_relative_eq!(top.surface_area() + bottom.surface_area(), area, max_relative = 1e-9);
        }
    }

    #[test]
    fn tetrahedron_clipped_below_apex() {
        let mut mesh = tetrahedron();
        let bounds = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(2.0, 2.0, 0.5));
        clip_box(&mut mesh, &bounds).unwrap();

        assert_eq!(mesh.faces_count(), 7);
        assert!(mesh.positions().iter().all(|p| p.z <= 0.5 + 1e-12));
    }

    #[test]
    fn split_long_grows_sliver() {
        let mut mesh = Mesh::from_positions(
            Topology::Triangles,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(1.0, 0.5, 0.0),
            ],
        );
        let area = mesh.surface_area();
        let params = SplitLongParams::new()
            .with_ratio(1.0)
            .with_length(0.0)
            .with_max_iterations(8);
        let summary = split_long(&mut mesh, &params).unwrap();

        assert!(summary.faces_after > summary.faces_before);
        assert!(mesh.faces_count() > 1);
        assert_relative_eq!(mesh.surface_area(), area, max_relative = 1e-9);
    }

    #[test]
    fn split_intersecting_crossing_quads() {
        let mut mesh = Mesh::from_positions(
            Topology::Triangles,
            vec![
                Point3::new(-1.0, -1.0, 0.0),
                Point3::new(1.0, -1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, -0.5, -1.0),
                Point3::new(0.0, -0.5, 1.0),
                Point3::new(0.0, 0.5, 0.0),
            ],
        );
        let summary = split_intersecting(&mut mesh, &SplitIntersectingParams::default()).unwrap();
        assert!(summary.faces_after > 2);
    }

    #[test]
    fn chunking_covers_the_mesh() {
        let mesh = uv_sphere(1.0, 24, 12);
        let area = mesh.surface_area();
        let chunks = chunking(&mesh, &ChunkingParams::new(area / 4.0)).unwrap();

        assert!(chunks.len() > 1);
        let total: f64 = chunks.iter().map(Mesh::surface_area).sum();
        assert_relative_eq!(total, area, max_relative = 1e-9);
    }
}

// =============================================================================
// TIER 4: Attributes - Normals, Transforms, Textures
// =============================================================================

mod tier4_attributes {
    use super::*;
    use image::Luma;
    use mesh::texture::{generate_texture, retexture, RetextureParams, Texture};
    use mesh::transform::apply_skinning;
    use types::Matrix4;

    #[test]
    fn generated_normals_are_unit_and_outward() {
        for mut mesh in [icosahedron(1.0), uv_sphere(1.0, 16, 8)] {
            generate_normals(&mut mesh).unwrap();
            let centroid = mesh.bounding_box().center();
            assert_eq!(mesh.normals().len(), mesh.vertex_count());
            for (p, n) in mesh.positions().iter().zip(mesh.normals()) {
                assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-3);
                assert!(n.dot(&(p - centroid)) > 0.0);
            }
        }
    }

    #[test]
    fn flip_then_generate_points_inward() {
        let mut mesh = icosahedron(1.0);
        flip_normals(&mut mesh);
        generate_normals(&mut mesh).unwrap();
        for (p, n) in mesh.positions().iter().zip(mesh.normals()) {
            assert!(n.dot(&p.coords) < 0.0);
        }
    }

    #[test]
    fn transform_round_trip() {
        let t = Transform3D::translation(1.0, 2.0, 3.0)
            .then(&Transform3D::rotation_axis(Vector3::z(), 0.7))
            .then(&Transform3D::uniform_scale(2.0));
        let mut mesh = unit_cube();
        apply_transform(&mut mesh, &t);
        assert_relative_eq!(mesh.signed_volume(), 8.0, epsilon = 1e-9);

        apply_transform(&mut mesh, &t.inverse().unwrap());
        for (p, q) in mesh.positions().iter().zip(unit_cube().positions()) {
            assert_relative_eq!(p, q, epsilon = 1e-9);
        }
    }

    #[test]
    fn skinning_moves_bound_vertices() {
        let mut mesh = tetrahedron();
        let n = mesh.vertex_count();
        mesh.set_bones(vec![[0, 0, 0, 0]; n], vec![types::Vector4::new(1.0, 0.0, 0.0, 0.0); n])
            .unwrap();
        let lift = Matrix4::new_translation(&Vector3::new(0.0, 0.0, 2.0));
        apply_skinning(&mut mesh, &[lift]).unwrap();

        assert!(mesh.bone_indices().is_empty());
        assert_relative_eq!(mesh.bounding_box().min.z, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn texture_raster_and_retexture() {
        let mut mesh = Mesh::from_positions(
            Topology::Triangles,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        );
        mesh.set_uvs(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)])
            .unwrap();

        let mut covered = 0;
        generate_texture(&mesh, 8, 8, |_| covered += 1).unwrap();
        assert!(covered > 0);

        let input: Texture<Luma<f32>> = Texture::from_pixel(4, 4, Luma([0.25]));
        let params = RetextureParams::with_resolution(16).with_max_distance(0.1);
        let out = retexture(&params, &mesh, &mesh, &[input]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dimensions(), (16, 16));
    }
}

// =============================================================================
// TIER 5: Persistence
// =============================================================================

mod tier5_persistence {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn io_format_detection() {
        assert_eq!(MeshFormat::from_path("a.cagemesh"), Some(MeshFormat::Cagemesh));
        assert_eq!(MeshFormat::from_path("a.OBJ"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path("a.glb"), Some(MeshFormat::Glb));
        assert_eq!(MeshFormat::from_path("a.stl"), None);
    }

    #[test]
    fn processed_mesh_survives_save_and_load() {
        init_tracing();
        let dir = tempdir().unwrap();
        let mut mesh = unit_cube();
        let plane = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::z()).unwrap();
        let _ = cut(&mut mesh, &plane).unwrap();

        for name in ["half.cagemesh", "half.obj"] {
            let path = dir.path().join(name);
            save_mesh(&mesh, &path).unwrap();
            let loaded = load_mesh(&path).unwrap();
            assert_eq!(loaded.faces_count(), mesh.faces_count());
            assert_relative_eq!(loaded.surface_area(), mesh.surface_area(), epsilon = 1e-6);
        }
        save_mesh(&mesh, dir.path().join("half.glb")).unwrap();
    }
}

// =============================================================================
// Error Handling
// =============================================================================

mod error_handling {
    use super::*;

    #[test]
    fn triangle_operations_reject_points() {
        let mut points = Mesh::from_positions(Topology::Points, vec![Point3::origin(); 3]);
        assert!(matches!(generate_normals(&mut points), Err(MeshError::Validation { .. })));
        assert!(matches!(
            split_long(&mut points, &SplitLongParams::default()),
            Err(MeshError::Validation { .. })
        ));
        let plane = Plane::new(Point3::origin(), Vector3::z()).unwrap();
        assert!(cut(&mut points, &plane).is_err());
        assert_eq!(points.vertex_count(), 3);
    }

    #[test]
    fn negative_thresholds_are_config_errors() {
        let mut mesh = unit_cube();
        assert!(matches!(remove_small(&mut mesh, -1.0), Err(MeshError::Config { .. })));
        assert!(matches!(
            merge_close_vertices(&mut mesh, &MergeParams::with_distance(-1.0)),
            Err(MeshError::Config { .. })
        ));
        assert!(matches!(
            chunking(&mesh, &ChunkingParams::new(0.0)),
            Err(MeshError::Config { .. })
        ));
        assert_eq!(mesh, unit_cube());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(save_mesh(&unit_cube(), "model.stl").is_err());
    }
}
