//! Benchmarks for mesh-decimate operations.
//!
//! Run with: cargo bench -p mesh-decimate
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-decimate -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-decimate -- --baseline main

#![allow(missing_docs, clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mesh_decimate::{merge_close_vertices, merge_planar, MergeParams, PlanarParams};
use mesh_types::shapes::uv_sphere;
use mesh_types::{Mesh, Point3, Topology};

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// Expanded sphere; every vertex has duplicates to weld.
fn create_sphere(segments: u32) -> Mesh {
    let mut mesh = uv_sphere(1.0, segments, segments / 2);
    mesh.convert_to_expanded();
    mesh
}

/// Flat grid of `n` x `n` unit squares.
fn create_grid(n: u32) -> Mesh {
    let mut positions = Vec::new();
    for y in 0..=n {
        for x in 0..=n {
            positions.push(Point3::new(f64::from(x), f64::from(y), 0.0));
        }
    }
    let mut indices = Vec::new();
    for y in 0..n {
        for x in 0..n {
            let a = y * (n + 1) + x;
            let c = a + n + 1;
            indices.extend_from_slice(&[a, a + 1, c + 1, a, c + 1, c]);
        }
    }
    Mesh::from_indexed(Topology::Triangles, positions, indices).unwrap()
}

// =============================================================================
// Merge Benchmarks
// =============================================================================

fn bench_merge_close(c: &mut Criterion) {
    let mut group = c.benchmark_group("MergeClose");

    for segments in [16u32, 32, 64] {
        let sphere = create_sphere(segments);
        group.throughput(Throughput::Elements(sphere.vertex_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sphere.vertex_count()), &sphere, |b, s| {
            b.iter(|| {
                let mut m = s.clone();
                merge_close_vertices(&mut m, black_box(&MergeParams::with_distance(1e-3))).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_merge_planar(c: &mut Criterion) {
    let mut group = c.benchmark_group("MergePlanar");
    group.sample_size(20);

    for n in [8u32, 16, 32] {
        let grid = create_grid(n);
        group.throughput(Throughput::Elements(grid.faces_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(grid.faces_count()), &grid, |b, g| {
            b.iter(|| {
                let mut m = g.clone();
                merge_planar(&mut m, black_box(&PlanarParams::default())).unwrap()
            });
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_merge_close, bench_merge_planar);
criterion_main!(benches);
