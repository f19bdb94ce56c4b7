//! Small closed meshes with outward winding, used for tests and demos.
//!
//! All generators return indexed triangle meshes with positions only.

use std::f64::consts::{PI, TAU};

use nalgebra::Point3;

use crate::{Mesh, Topology};

fn indexed(positions: Vec<Point3<f64>>, faces: &[[u32; 3]]) -> Mesh {
    let mut mesh = Mesh::from_positions(Topology::Triangles, positions);
    let indices = faces.iter().flatten().copied().collect();
    // generators only emit in-range ids
    if mesh.set_indices(indices).is_err() {
        mesh.clear();
    }
    mesh
}

/// Unit cube spanning `[0, 1]³`: 8 vertices, 12 triangles.
///
/// ```
/// let cube = mesh_types::shapes::unit_cube();
/// assert_eq!(cube.faces_count(), 12);
/// assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn unit_cube() -> Mesh {
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];
    indexed(
        positions,
        &[
            // -z
            [0, 2, 1],
            [0, 3, 2],
            // +z
            [4, 5, 6],
            [4, 6, 7],
            // -y
            [0, 1, 5],
            [0, 5, 4],
            // +y
            [3, 7, 6],
            [3, 6, 2],
            // -x
            [0, 4, 7],
            [0, 7, 3],
            // +x
            [1, 2, 6],
            [1, 6, 5],
        ],
    )
}

/// Tetrahedron with corners at the origin and the three unit axis points.
/// The apex is `(0, 0, 1)`; the base lies in `z = 0`.
#[must_use]
pub fn tetrahedron() -> Mesh {
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    indexed(positions, &[[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]])
}

/// Regular icosahedron centered at the origin with circumradius `radius`.
#[must_use]
pub fn icosahedron(radius: f64) -> Mesh {
    let phi = (1.0 + 5.0_f64.sqrt()) * 0.5;
    let s = radius / (1.0 + phi * phi).sqrt();
    let raw = [
        (-1.0, phi, 0.0),
        (1.0, phi, 0.0),
        (-1.0, -phi, 0.0),
        (1.0, -phi, 0.0),
        (0.0, -1.0, phi),
        (0.0, 1.0, phi),
        (0.0, -1.0, -phi),
        (0.0, 1.0, -phi),
        (phi, 0.0, -1.0),
        (phi, 0.0, 1.0),
        (-phi, 0.0, -1.0),
        (-phi, 0.0, 1.0),
    ];
    let positions = raw
        .iter()
        .map(|&(x, y, z)| Point3::new(x * s, y * s, z * s))
        .collect();
    indexed(
        positions,
        &[
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ],
    )
}

/// Latitude/longitude sphere centered at the origin.
///
/// `segments` is clamped to at least 3 and `rings` to at least 2.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn uv_sphere(radius: f64, segments: u32, rings: u32) -> Mesh {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let mut positions = vec![Point3::new(0.0, 0.0, radius)];
    for k in 1..rings {
        let polar = PI * f64::from(k) / f64::from(rings);
        for j in 0..segments {
            let azimuth = TAU * f64::from(j) / f64::from(segments);
            positions.push(Point3::new(
                radius * polar.sin() * azimuth.cos(),
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
            ));
        }
    }
    positions.push(Point3::new(0.0, 0.0, -radius));
    let bottom = positions.len() as u32 - 1;

    let ring = |k: u32, j: u32| 1 + k * segments + j % segments;
    let mut faces = Vec::new();
    for j in 0..segments {
        faces.push([0, ring(0, j), ring(0, j + 1)]);
    }
    for k in 0..rings - 2 {
        for j in 0..segments {
            let (a0, a1) = (ring(k, j), ring(k, j + 1));
            let (b0, b1) = (ring(k + 1, j), ring(k + 1, j + 1));
            faces.push([a0, b0, b1]);
            faces.push([a0, b1, a1]);
        }
    }
    for j in 0..segments {
        faces.push([ring(rings - 2, j), bottom, ring(rings - 2, j + 1)]);
    }
    indexed(positions, &faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn closed_shapes_have_positive_volume() {
        assert_relative_eq!(unit_cube().signed_volume(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(tetrahedron().signed_volume(), 1.0 / 6.0, epsilon = 1e-12);
        assert!(icosahedron(1.0).signed_volume() > 2.0);
        assert!(uv_sphere(1.0, 16, 8).signed_volume() > 3.0);
    }

    #[test]
    fn icosahedron_vertices_on_sphere() {
        let mesh = icosahedron(2.0);
        assert_eq!(mesh.faces_count(), 20);
        for p in mesh.positions() {
            assert_relative_eq!(p.coords.norm(), 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn uv_sphere_counts() {
        let mesh = uv_sphere(1.0, 8, 4);
        assert_eq!(mesh.vertex_count(), 2 + 8 * 3);
        assert_eq!(mesh.faces_count(), 8 * 2 + 8 * 2 * 2);
        assert!(uv_sphere(1.0, 0, 0).faces_count() > 0);
    }

    #[test]
    fn every_face_points_outward() {
        for mesh in [unit_cube(), tetrahedron(), icosahedron(1.0), uv_sphere(1.0, 12, 6)] {
            let sum = mesh
                .positions()
                .iter()
                .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
            #[allow(clippy::cast_precision_loss)]
            let center = Point3::from(sum / mesh.vertex_count() as f64);
            for tri in mesh.triangles() {
                let outward = tri.centroid() - center;
                assert!(tri.normal_unnormalized().dot(&outward) > 0.0);
            }
        }
    }
}
