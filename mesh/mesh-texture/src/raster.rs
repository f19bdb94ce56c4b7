//! Scanline rasterization of triangles in texture space.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use mesh_types::{Mesh, MeshError, MeshResult, Point2, Point3, Triangle, Vector3};
use tracing::warn;

/// Triangles reaching this many texels from the origin are not rasterized.
const MAX_TEXEL: f64 = 2_147_483_648.0;

/// One covered texel, as passed to the [`generate_texture`] callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexelSample {
    /// Column of the texel.
    pub x: u32,
    /// Row of the texel.
    pub y: u32,
    /// Vertex ids of the triangle covering the texel.
    pub face: [u32; 3],
    /// Barycentric weights of the texel within the triangle, in the order
    /// of `face`.
    pub weights: Vector3<f64>,
}

impl TexelSample {
    /// Interpolate a per-vertex attribute at this texel.
    ///
    /// # Panics
    ///
    /// Panics if a face id is out of range for `values`.
    #[must_use]
    pub fn interpolate(&self, values: &[Point3<f64>]) -> Point3<f64> {
        let mut acc = Vector3::zeros();
        for (&id, w) in self.face.iter().zip(self.weights.iter()) {
            acc += values[id as usize].coords * *w;
        }
        Point3::from(acc)
    }
}

type Pixel = [i64; 2];

fn scaled(a: Pixel, b: Pixel, t: f64) -> Pixel {
    [
        a[0] + ((b[0] - a[0]) as f64 * t) as i64,
        a[1] + ((b[1] - a[1]) as f64 * t) as i64,
    ]
}

/// Rasterize the triangles of a mesh into a `width` x `height` grid using
/// their texture coordinates.
///
/// Texture coordinates are scaled by the grid size and truncated to
/// texels. Each triangle is filled row by row, spans inclusive, in two
/// halves split at its middle vertex. For every covered texel inside the
/// grid `callback` receives the texel, the triangle's vertex ids and the
/// texel's barycentric weights. Texels shared by neighbouring triangles are
/// reported once per triangle. A mesh without faces produces no calls.
/// Triangles with non-finite texture coordinates, or ones reaching `2^31`
/// texels away from the grid origin, are skipped.
///
/// # Errors
///
/// Returns [`MeshError::Validation`] for non-triangle meshes or meshes
/// without 2D texture coordinates.
///
/// # Example
///
/// ```
/// use mesh_texture::generate_texture;
/// use mesh_types::{Mesh, Point2, Point3, Topology};
///
/// let mut mesh = Mesh::from_positions(
///     Topology::Triangles,
///     vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
/// );
/// mesh.set_uvs(vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(0.0, 1.0),
/// ])
/// .unwrap();
///
/// let mut covered = 0;
/// generate_texture(&mesh, 8, 8, |_| covered += 1).unwrap();
/// assert!(covered > 30);
/// ```
pub fn generate_texture<F>(mesh: &Mesh, width: u32, height: u32, mut callback: F) -> MeshResult<()>
where
    F: FnMut(TexelSample),
{
    if mesh.faces_count() == 0 {
        return Ok(());
    }
    mesh.require_triangles("generate texture")?;
    mesh.validate()?;
    let uvs = mesh.uvs();
    if uvs.is_empty() {
        return Err(MeshError::validation(
            "generate texture",
            "mesh has no 2D texture coordinates",
        ));
    }

    let scale = [f64::from(width), f64::from(height)];
    let to_grid = |uv: &Point2<f64>| Point3::new(uv.x * scale[0], uv.y * scale[1], 0.0);

    let mut skipped = 0_usize;
    for f in 0..mesh.faces_count() {
        let face = mesh.triangle_ids(f);
        let grid = Triangle::new(
            to_grid(&uvs[face[0] as usize]),
            to_grid(&uvs[face[1] as usize]),
            to_grid(&uvs[face[2] as usize]),
        );
        if !grid
            .vertices()
            .iter()
            .all(|p| p.x.abs() < MAX_TEXEL && p.y.abs() < MAX_TEXEL)
        {
            skipped += 1;
            continue;
        }
        let [mut t0, mut t1, mut t2] = grid.vertices().map(|p| [p.x as i64, p.y as i64]);
        if t0[1] > t1[1] {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0[1] > t2[1] {
            std::mem::swap(&mut t0, &mut t2);
        }
        if t1[1] > t2[1] {
            std::mem::swap(&mut t1, &mut t2);
        }

        let total = t2[1] - t0[1];
        let first = (-t0[1]).max(0);
        let last = (i64::from(height) - 1 - t0[1]).min(total);
        for i in first..=last {
            let second_half = i > t1[1] - t0[1] || t1[1] == t0[1];
            let segment = if second_half { t2[1] - t1[1] } else { t1[1] - t0[1] };
            let (alpha, beta) = if total == 0 {
                (0.0, 0.0)
            } else {
                let offset = if second_half { t1[1] - t0[1] } else { 0 };
                (i as f64 / total as f64, (i - offset) as f64 / segment as f64)
            };
            let mut a = scaled(t0, t2, alpha);
            let mut b = if second_half {
                scaled(t1, t2, beta)
            } else {
                scaled(t0, t1, beta)
            };
            if a[0] > b[0] {
                std::mem::swap(&mut a, &mut b);
            }

            let y = t0[1] + i;
            for x in a[0].max(0)..=b[0].min(i64::from(width) - 1) {
                let weights = grid.barycentric(&Point3::new(x as f64, y as f64, 0.0));
                callback(TexelSample {
                    x: x as u32,
                    y: y as u32,
                    face,
                    weights,
                });
            }
        }
    }
    if skipped > 0 {
        warn!(skipped, "skipped triangles with out of range texture coordinates");
    }
    Ok(())
}
