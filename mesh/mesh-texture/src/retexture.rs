//! Transfer of textures between meshes covering the same surface.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use image::{ImageBuffer, Pixel};
use mesh_spatial::Collider;
use mesh_types::{fan_out, require_positive, Mesh, MeshError, MeshResult, Point2, Point3, Vector2};
use tracing::{debug, info};

use crate::generate_texture;

/// Floating-point image as accepted and produced by [`retexture`].
pub type Texture<P> = ImageBuffer<P, Vec<f32>>;

/// Configuration for [`retexture`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetextureParams {
    /// Width and height of the produced textures.
    ///
    /// Default: 1024
    pub resolution: u32,

    /// Source surface farther than this from a target texel leaves the texel
    /// empty.
    ///
    /// Default: 1.0
    pub max_distance: f64,

    /// Look texels up on the rayon pool.
    ///
    /// Default: `true`
    pub parallel: bool,
}

impl Default for RetextureParams {
    fn default() -> Self {
        Self {
            resolution: 1024,
            max_distance: 1.0,
            parallel: true,
        }
    }
}

impl RetextureParams {
    /// Square textures of the given size.
    #[must_use]
    pub fn with_resolution(resolution: u32) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }

    /// Set the search distance.
    #[must_use]
    pub const fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Enable or disable parallel lookups.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Config`] unless both the resolution and the
    /// distance are positive.
    pub fn validate(&self) -> MeshResult<()> {
        if self.resolution == 0 {
            return Err(MeshError::config("resolution", 0.0, "must be positive"));
        }
        require_positive("max_distance", self.max_distance)
    }
}

/// Bilinear sample of `image` at texture coordinate `uv`.
///
/// The lookup cell is clamped to the image, so coordinates outside `[0, 1]`
/// repeat the border.
#[must_use]
pub fn sample_bilinear<P>(image: &Texture<P>, uv: Point2<f64>) -> P
where
    P: Pixel<Subpixel = f32>,
{
    let (w, h) = image.dimensions();
    let texel = Vector2::new(uv.x * f64::from(w), uv.y * f64::from(h));
    let cell = |c: f64, size: u32| -> (u32, u32, f32) {
        let hi = (i64::from(size) - 2).max(0);
        let p = (c as i64).clamp(0, hi);
        let frac = (c - p as f64).clamp(0.0, 1.0) as f32;
        let next = (p + 1).min(i64::from(size) - 1);
        (p as u32, next as u32, frac)
    };
    let (x0, x1, fx) = cell(texel.x, w);
    let (y0, y1, fy) = cell(texel.y, h);

    let lerp = |a: &P, b: &P, t: f32| a.map2(b, |p, q| p + (q - p) * t);
    let top = lerp(image.get_pixel(x0, y0), image.get_pixel(x1, y0), fx);
    let bottom = lerp(image.get_pixel(x0, y1), image.get_pixel(x1, y1), fx);
    lerp(&top, &bottom, fy)
}

/// Texture coordinate of the source surface nearest to `point`.
fn source_uv(
    source: &Mesh,
    collider: &Collider,
    point: &Point3<f64>,
    max_distance: f64,
) -> Option<Point2<f64>> {
    let (f, closest) = collider.closest_triangle(point, max_distance)?;
    let f = f as usize;
    let weights = source.triangle(f).barycentric(&closest);
    let uvs = source.uvs();
    let mut acc = Vector2::zeros();
    for (&id, w) in source.triangle_ids(f).iter().zip(weights.iter()) {
        acc += uvs[id as usize].coords * *w;
    }
    Some(Point2::from(acc))
}

/// Bake textures of `source` into the texture space of `target`.
///
/// The target is rasterized at `resolution` x `resolution`; each covered
/// texel is mapped to its 3D position on the target, the nearest point of
/// the source surface within `max_distance` is found and its interpolated
/// texture coordinate is used to sample every input image bilinearly. The
/// output images have the inputs' pixel type and start out zeroed, so
/// texels with no source surface in range stay zero.
///
/// # Errors
///
/// - [`MeshError::Config`] for a zero resolution or a non-positive distance
/// - [`MeshError::Validation`] if either mesh is not made of triangles or
///   lacks 2D texture coordinates
///
/// # Example
///
/// ```
/// use image::Luma;
/// use mesh_texture::{retexture, RetextureParams, Texture};
/// use mesh_types::{Mesh, Point2, Point3, Topology};
///
/// let positions = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
/// let mut mesh = Mesh::from_positions(Topology::Triangles, positions);
/// mesh.set_uvs(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)])
///     .unwrap();
///
/// let input: Texture<Luma<f32>> = Texture::from_pixel(4, 4, Luma([0.5]));
/// let params = RetextureParams::with_resolution(16).with_max_distance(0.1);
/// let out = retexture(&params, &mesh, &mesh, &[input]).unwrap();
/// assert_eq!(out[0].dimensions(), (16, 16));
/// assert!((out[0].get_pixel(1, 1).0[0] - 0.5).abs() < 1e-6);
/// ```
pub fn retexture<P>(
    params: &RetextureParams,
    source: &Mesh,
    target: &Mesh,
    inputs: &[Texture<P>],
) -> MeshResult<Vec<Texture<P>>>
where
    P: Pixel<Subpixel = f32> + Send + Sync,
{
    params.validate()?;
    for (mesh, role) in [(source, "source"), (target, "target")] {
        mesh.require_triangles("retexture")?;
        mesh.validate()?;
        if mesh.faces_count() > 0 && mesh.uvs().is_empty() {
            return Err(MeshError::validation(
                "retexture",
                format!("{role} mesh has no 2D texture coordinates"),
            ));
        }
    }

    let res = params.resolution;
    let mut outputs: Vec<Texture<P>> = inputs.iter().map(|_| ImageBuffer::new(res, res)).collect();

    let mut texels: Vec<(u32, u32, Point3<f64>)> = Vec::new();
    generate_texture(target, res, res, |s| {
        texels.push((s.x, s.y, s.interpolate(target.positions())));
    })?;
    debug!(texels = texels.len(), "rasterized target");
    if texels.is_empty() || inputs.is_empty() || source.faces_count() == 0 {
        return Ok(outputs);
    }

    let collider = Collider::from_mesh(source)?;
    let samples = fan_out(texels.len(), params.parallel, |i| {
        let (_, _, point) = texels[i];
        source_uv(source, &collider, &point, params.max_distance)
            .map(|uv| inputs.iter().map(|img| sample_bilinear(img, uv)).collect::<Vec<P>>())
    });

    let mut filled = 0usize;
    for ((x, y, _), sample) in texels.iter().zip(samples) {
        let Some(pixels) = sample else { continue };
        for (out, pixel) in outputs.iter_mut().zip(pixels) {
            out.put_pixel(*x, *y, pixel);
        }
        filled += 1;
    }

    info!(
        resolution = res,
        images = inputs.len(),
        texels = texels.len(),
        filled,
        "retextured mesh"
    );
    Ok(outputs)
}
