//! Recursive spatial chunking by surface area.

use mesh_types::{require_positive, Aabb, Mesh, MeshResult};
use tracing::{debug, info};

use crate::clip_box;

/// Candidate split positions, as fractions of the box along its longest axis.
const SPLIT_FRACTIONS: [f64; 7] = [0.3, 0.4, 0.45, 0.5, 0.55, 0.6, 0.7];

/// Clipping boxes reach this far from the center, relative to the box size,
/// so that clipping never touches the sides that are not being split.
const BOX_MARGIN: f64 = 0.6;

/// Configuration for [`chunking`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkingParams {
    /// Largest surface area of a single chunk. Must be positive.
    pub max_surface_area: f64,

    /// Recurse into the two halves of a split in parallel.
    ///
    /// Default: `true`
    pub parallel: bool,
}

impl ChunkingParams {
    /// Chunks of at most `max_surface_area`.
    #[must_use]
    pub const fn new(max_surface_area: f64) -> Self {
        Self {
            max_surface_area,
            parallel: true,
        }
    }

    /// Enable or disable parallel recursion.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`mesh_types::MeshError::Config`] unless `max_surface_area`
    /// is positive.
    pub fn validate(&self) -> MeshResult<()> {
        require_positive("max_surface_area", self.max_surface_area)
    }
}

/// Split a triangle mesh into pieces whose surface area fits the budget.
///
/// A piece over budget is split along the longest axis of its bounding
/// box. Of a few candidate positions the one dividing the area most evenly
/// wins, and both halves are clipped from independent copies and processed
/// recursively. Halves that come out empty are dropped. A mesh with no
/// faces yields no chunks; one within budget yields a single copy.
///
/// # Errors
///
/// - [`mesh_types::MeshError::Config`] for a non-positive area budget
/// - [`mesh_types::MeshError::Validation`] for non-triangle meshes or
///   meshes with bone data
///
/// # Example
///
/// ```
/// use mesh_clip::{chunking, ChunkingParams};
/// use mesh_types::shapes::unit_cube;
///
/// let chunks = chunking(&unit_cube(), &ChunkingParams::new(2.0)).unwrap();
/// assert!(chunks.len() >= 3);
/// let area: f64 = chunks.iter().map(|c| c.surface_area()).sum();
/// assert!((area - 6.0).abs() < 1e-9);
/// ```
pub fn chunking(mesh: &Mesh, params: &ChunkingParams) -> MeshResult<Vec<Mesh>> {
    params.validate()?;
    if mesh.faces_count() == 0 {
        return Ok(Vec::new());
    }
    mesh.require_triangles("chunking")?;
    mesh.validate()?;
    mesh.check_interpolatable("chunking")?;

    let mut work = mesh.clone();
    work.convert_to_indexed();
    let area = work.surface_area();
    let chunks = split_recursive(work, area, params)?;
    info!(
        chunks = chunks.len(),
        area,
        max_area = params.max_surface_area,
        "chunked mesh"
    );
    Ok(chunks)
}

/// Box covering `bounds` generously, cut at `position` along `axis`.
fn clipping_box(bounds: &Aabb, axis: usize, position: f64, upper: bool) -> Aabb {
    let c = bounds.center();
    let hs = bounds.size() * BOX_MARGIN;
    let mut r = Aabb {
        min: c - hs,
        max: c + hs,
    };
    if upper {
        r.min[axis] = position;
    } else {
        r.max[axis] = position;
    }
    r
}

fn clipped(mesh: &Mesh, bounds: &Aabb) -> MeshResult<Mesh> {
    let mut part = mesh.clone();
    clip_box(&mut part, bounds)?;
    Ok(part)
}

fn split_recursive(mesh: Mesh, area: f64, params: &ChunkingParams) -> MeshResult<Vec<Mesh>> {
    if area <= params.max_surface_area {
        return Ok(vec![mesh]);
    }

    let bounds = mesh.bounding_box();
    let axis = bounds.longest_axis();
    let at = |fraction: f64| bounds.min[axis] + (bounds.max[axis] - bounds.min[axis]) * fraction;

    let mut best_position = 0.5;
    let mut best_score = f64::INFINITY;
    for fraction in SPLIT_FRACTIONS {
        let lower = clipped(&mesh, &clipping_box(&bounds, axis, at(fraction), false))?;
        let score = (0.5 - lower.surface_area() / area).abs();
        if score < best_score {
            best_score = score;
            best_position = fraction;
        }
    }
    let split = at(best_position);
    debug!(axis, fraction = best_position, score = best_score, "splitting chunk");

    let lower = clipped(&mesh, &clipping_box(&bounds, axis, split, false))?;
    let upper = clipped(&mesh, &clipping_box(&bounds, axis, split, true))?;

    let recurse = |part: Mesh| -> MeshResult<Vec<Mesh>> {
        if part.faces_count() == 0 {
            return Ok(Vec::new());
        }
        let part_area = part.surface_area();
        if part_area < area {
            split_recursive(part, part_area, params)
        } else {
            // nothing was cut away; splitting again would not terminate
            Ok(vec![part])
        }
    };

    let (a, b) = if params.parallel {
        rayon::join(|| recurse(lower), || recurse(upper))
    } else {
        (recurse(lower), recurse(upper))
    };
    let mut result = a?;
    result.extend(b?);
    Ok(result)
}
