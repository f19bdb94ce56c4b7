//! Conformance tests across every supported format.
//!
//! Each shape is written in every format and, where the format can be
//! read, loaded back and compared with the original.
//!
//! To run: cargo test -p mesh-io --test format_conformance

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mesh_io::{load_mesh, save_mesh, IoError, MeshFormat};
use mesh_transform::generate_normals;
use mesh_types::shapes::{icosahedron, tetrahedron, unit_cube, uv_sphere};
use mesh_types::{Mesh, Point2};
use tempfile::tempdir;

const FORMATS: [MeshFormat; 3] = [MeshFormat::Cagemesh, MeshFormat::Obj, MeshFormat::Glb];

fn fixtures() -> Vec<(&'static str, Mesh)> {
    let mut textured = unit_cube();
    let uvs = textured
        .positions()
        .iter()
        .map(|p| Point2::new(p.x, p.y))
        .collect();
    textured.set_uvs(uvs).unwrap();

    let mut smooth = uv_sphere(1.0, 16, 8);
    generate_normals(&mut smooth).unwrap();

    let mut expanded = icosahedron(2.0);
    expanded.convert_to_expanded();

    vec![
        ("tetrahedron", tetrahedron()),
        ("cube", unit_cube()),
        ("textured", textured),
        ("smooth", smooth),
        ("expanded", expanded),
    ]
}

#[test]
fn every_format_writes_every_fixture() {
    let dir = tempdir().expect("failed to create temp dir");
    for (name, mesh) in fixtures() {
        for format in FORMATS {
            let path = dir.path().join(format!("{name}.{}", format.extension()));
            save_mesh(&mesh, &path).unwrap_or_else(|e| panic!("{name} as {format:?}: {e}"));
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
    }
}

#[test]
fn cagemesh_is_lossless_for_f32_data() {
    let dir = tempdir().expect("failed to create temp dir");
    for (name, mesh) in fixtures() {
        if name == "smooth" || name == "expanded" {
            // irrational coordinates lose precision in f32
            continue;
        }
        let path = dir.path().join(format!("{name}.cagemesh"));
        save_mesh(&mesh, &path).unwrap();
        assert_eq!(load_mesh(&path).unwrap(), mesh, "{name}");
    }
}

#[test]
fn readable_formats_keep_geometry() {
    let dir = tempdir().expect("failed to create temp dir");
    for (name, mesh) in fixtures() {
        for format in FORMATS.into_iter().filter(MeshFormat::can_load) {
            let path = dir.path().join(format!("{name}.{}", format.extension()));
            save_mesh(&mesh, &path).unwrap();
            let loaded = load_mesh(&path).unwrap();

            assert_eq!(loaded.faces_count(), mesh.faces_count(), "{name} {format:?}");
            assert_eq!(loaded.topology(), mesh.topology());
            assert!(
                (loaded.surface_area() - mesh.surface_area()).abs() < 1e-5,
                "{name} {format:?}"
            );
            assert!((loaded.signed_volume() - mesh.signed_volume()).abs() < 1e-5);
            assert_eq!(loaded.normals().is_empty(), mesh.normals().is_empty());
            assert_eq!(loaded.uvs().is_empty(), mesh.uvs().is_empty());
        }
    }
}

#[test]
fn missing_files_are_reported() {
    let dir = tempdir().expect("failed to create temp dir");
    for format in FORMATS.into_iter().filter(MeshFormat::can_load) {
        let path = dir.path().join(format!("missing.{}", format.extension()));
        assert!(matches!(load_mesh(&path), Err(IoError::FileNotFound { .. })));
    }
}
