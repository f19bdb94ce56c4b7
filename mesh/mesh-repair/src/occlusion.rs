//! Removal of triangles that cannot be seen from outside the mesh.
//!
//! Each triangle shoots a few random rays from points on its surface. A
//! triangle is visible when at least one ray escapes without hitting any
//! triangle of the mesh.

use std::f64::consts::TAU;

use mesh_spatial::{Collider, Ray};
use mesh_types::{fan_out, Mesh, MeshError, MeshResult, Point3, Triangle, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::discard_invalid;

/// Ray origins are lifted off the surface by this much along the normal.
const SURFACE_OFFSET: f64 = 1e-6;

/// Configuration for [`remove_occluded`].
///
/// # Example
///
/// ```
/// use mesh_repair::OcclusionParams;
///
/// let params = OcclusionParams::default()
///     .with_rays(20, 100)
///     .with_seed(7);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OcclusionParams {
    /// Rays per unit of triangle area before clamping.
    ///
    /// Default: `1.0`
    pub rays_per_unit_area: f64,

    /// Minimum rays per triangle.
    ///
    /// Default: `10`
    pub min_rays: u32,

    /// Maximum rays per triangle.
    ///
    /// Default: `50`
    pub max_rays: u32,

    /// Rays closer to the triangle's plane than this angle are resampled.
    ///
    /// Default: `5.0`
    pub grazing_angle_degrees: f64,

    /// Shoot rays to both sides of each triangle instead of only along its normal.
    ///
    /// Default: `false`
    pub double_sided: bool,

    /// Process triangles on the rayon pool.
    ///
    /// Default: `true`
    pub parallel: bool,

    /// Seed for reproducible runs; `None` draws from system entropy.
    ///
    /// Default: `None`
    pub seed: Option<u64>,
}

impl Default for OcclusionParams {
    fn default() -> Self {
        Self {
            rays_per_unit_area: 1.0,
            min_rays: 10,
            max_rays: 50,
            grazing_angle_degrees: 5.0,
            double_sided: false,
            parallel: true,
            seed: None,
        }
    }
}

impl OcclusionParams {
    /// Fewer rays; quick but may remove a few barely visible triangles.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            min_rays: 4,
            max_rays: 16,
            ..Self::default()
        }
    }

    /// More rays; slower but rarely misclassifies.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            rays_per_unit_area: 10.0,
            min_rays: 32,
            max_rays: 256,
            ..Self::default()
        }
    }

    /// Set the ray density.
    #[must_use]
    pub const fn with_rays_per_unit_area(mut self, density: f64) -> Self {
        self.rays_per_unit_area = density;
        self
    }

    /// Set the per-triangle ray bounds.
    #[must_use]
    pub const fn with_rays(mut self, min: u32, max: u32) -> Self {
        self.min_rays = min;
        self.max_rays = max;
        self
    }

    /// Set the grazing angle in degrees.
    #[must_use]
    pub const fn with_grazing_angle(mut self, degrees: f64) -> Self {
        self.grazing_angle_degrees = degrees;
        self
    }

    /// Shoot rays to both sides.
    #[must_use]
    pub const fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    /// Enable or disable parallel processing.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fix the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Config`] if `max_rays < min_rays`, the density is
    /// not above `1e-5`, or the grazing angle is outside `[0, 90)`.
    pub fn validate(&self) -> MeshResult<()> {
        if self.max_rays < self.min_rays {
            return Err(MeshError::config(
                "max_rays",
                f64::from(self.max_rays),
                "must not be below min_rays",
            ));
        }
        if !(self.rays_per_unit_area > 1e-5) {
            return Err(MeshError::config(
                "rays_per_unit_area",
                self.rays_per_unit_area,
                "must be above 1e-5",
            ));
        }
        if !(0.0..90.0).contains(&self.grazing_angle_degrees) {
            return Err(MeshError::config(
                "grazing_angle_degrees",
                self.grazing_angle_degrees,
                "must be in [0, 90)",
            ));
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rays_for(&self, area: f64) -> u32 {
        let wanted = (area * self.rays_per_unit_area).floor();
        let wanted = if wanted >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            wanted.max(0.0) as u32
        };
        wanted.clamp(self.min_rays, self.max_rays)
    }
}

/// Remove triangles no ray from outside can reach.
///
/// Returns the number of removed triangles. Invalid geometry is discarded
/// as well.
///
/// Ray origins are offset to the front side of their triangle in both
/// modes. With `double_sided`, a ray sampled in the back hemisphere
/// therefore crosses its own triangle and never counts as escaping.
///
/// # Errors
///
/// - [`MeshError::Config`] for invalid parameters
/// - [`MeshError::Validation`] for non-triangle meshes
///
/// # Example
///
/// ```
/// use mesh_repair::{remove_occluded, OcclusionParams};
/// use mesh_types::shapes::unit_cube;
///
/// let mut cube = unit_cube();
/// let removed = remove_occluded(&mut cube, &OcclusionParams::default().with_seed(1)).unwrap();
/// assert_eq!(removed, 0);
/// ```
pub fn remove_occluded(mesh: &mut Mesh, params: &OcclusionParams) -> MeshResult<usize> {
    params.validate()?;
    if mesh.faces_count() == 0 {
        return Ok(0);
    }
    mesh.require_triangles("remove occluded")?;
    mesh.validate()?;

    let faces_before = mesh.faces_count();
    let collider = Collider::from_mesh(mesh)?;
    let min_dot = params.grazing_angle_degrees.to_radians().sin();
    let base_seed = params.seed;

    let visible = fan_out(faces_before, params.parallel, |f| {
        let mut rng = match base_seed {
            Some(seed) => {
                StdRng::seed_from_u64(seed ^ (f as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
            }
            None => StdRng::from_entropy(),
        };
        triangle_visible(&collider.triangles()[f], &collider, params, min_dot, &mut rng)
    });

    let hidden = visible.iter().filter(|&&v| !v).count();
    debug!(faces = faces_before, hidden, "occlusion rays cast");
    mesh.retain_faces(&visible)?;
    discard_invalid(mesh)?;

    let removed = faces_before - mesh.faces_count();
    info!(removed, faces_after = mesh.faces_count(), "removed occluded triangles");
    Ok(removed)
}

fn triangle_visible(
    tri: &Triangle,
    collider: &Collider,
    params: &OcclusionParams,
    min_dot: f64,
    rng: &mut StdRng,
) -> bool {
    // degenerate triangles are left for the validity pass
    let Some(n) = tri.normal() else {
        return true;
    };
    let u = tri.v1 - tri.v0;
    let v = tri.v2 - tri.v0;
    for _ in 0..params.rays_for(tri.area()) {
        let s = rng.gen::<f64>() * 0.5;
        let t = rng.gen::<f64>() * 0.5;
        let origin: Point3<f64> = tri.v0 + u * s + v * t + n * SURFACE_OFFSET;
        let mut dir = random_direction(rng);
        while dir.dot(&n).abs() < min_dot {
            dir = random_direction(rng);
        }
        if !params.double_sided && dir.dot(&n) < 0.0 {
            dir = -dir;
        }
        if collider
            .cast_ray(&Ray::new(origin, dir), f64::INFINITY, true)
            .is_none()
        {
            return true;
        }
    }
    false
}

fn random_direction(rng: &mut StdRng) -> Vector3<f64> {
    let z: f64 = rng.gen_range(-1.0..=1.0);
    let phi: f64 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vector3::new(r * phi.cos(), r * phi.sin(), z)
}
