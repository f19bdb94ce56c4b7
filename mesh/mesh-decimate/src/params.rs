//! Parameters for vertex merging and planar simplification.

use mesh_types::{require_non_negative, MeshError, MeshResult};

/// Parameters for [`merge_close_vertices`](crate::merge_close_vertices).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeParams {
    /// Vertices closer than this (Euclidean) are merged. Zero disables
    /// merging. Default: `1e-5`
    pub distance_threshold: f64,

    /// Only move the vertices of each cluster to its centroid instead of
    /// remapping indices. Other attributes are left alone. Default: false
    pub move_only: bool,

    /// Run the neighbour queries on the rayon pool. Default: true
    pub parallel: bool,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            distance_threshold: 1e-5,
            move_only: false,
            parallel: true,
        }
    }
}

impl MergeParams {
    /// Create params merging vertices within `distance`.
    #[must_use]
    pub fn with_distance(distance: f64) -> Self {
        Self {
            distance_threshold: distance,
            ..Default::default()
        }
    }

    /// Set move-only mode.
    #[must_use]
    pub const fn with_move_only(mut self, move_only: bool) -> Self {
        self.move_only = move_only;
        self
    }

    /// Enable or disable parallel processing.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Config`] for a negative or NaN threshold.
    pub fn validate(&self) -> MeshResult<()> {
        require_non_negative("distance_threshold", self.distance_threshold)
    }
}

/// Parameters for [`merge_planar`](crate::merge_planar).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanarParams {
    /// Triangles whose unit normals have a dot product above this are
    /// coplanar; also the collinearity threshold for boundary vertices.
    /// Default: 0.999
    pub normal_threshold: f64,

    /// Upper bound on the number of passes. Default: 100
    pub max_passes: usize,
}

impl Default for PlanarParams {
    fn default() -> Self {
        Self {
            normal_threshold: 0.999,
            max_passes: 100,
        }
    }
}

impl PlanarParams {
    /// Set the coplanarity threshold.
    #[must_use]
    pub const fn with_normal_threshold(mut self, threshold: f64) -> Self {
        self.normal_threshold = threshold;
        self
    }

    /// Set the pass limit.
    #[must_use]
    pub const fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Config`] if the threshold is outside `(0, 1]` or
    /// no pass is allowed.
    pub fn validate(&self) -> MeshResult<()> {
        if !(self.normal_threshold > 0.0 && self.normal_threshold <= 1.0) {
            return Err(MeshError::config(
                "normal_threshold",
                self.normal_threshold,
                "must be in (0, 1]",
            ));
        }
        if self.max_passes == 0 {
            return Err(MeshError::config("max_passes", 0.0, "must be at least 1"));
        }
        Ok(())
    }
}
