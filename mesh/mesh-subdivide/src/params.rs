//! Tessellation parameters.

use mesh_types::{require_non_negative, MeshError, MeshResult};

/// Smallest accepted [`SplitLongParams::ratio`].
pub const MIN_RATIO: f64 = 1e-5;

/// Parameters for [`split_long`](crate::split_long).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitLongParams {
    /// Triangles whose shortest to longest edge ratio is above this are
    /// left alone.
    pub ratio: f64,

    /// Triangles whose longest edge is shorter than this are left alone.
    pub length: f64,

    /// Upper bound on the number of splitting rounds. Triangles still
    /// pending when it is reached are kept as they are.
    pub max_iterations: usize,
}

impl Default for SplitLongParams {
    fn default() -> Self {
        Self {
            ratio: 0.25,
            length: 1.0,
            max_iterations: 64,
        }
    }
}

impl SplitLongParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split only slivers: triangles much longer than wide.
    #[must_use]
    pub fn slivers() -> Self {
        Self {
            ratio: 0.1,
            length: 0.0,
            ..Self::default()
        }
    }

    /// Set the edge ratio.
    #[must_use]
    pub const fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    /// Set the minimal length of the longest edge.
    #[must_use]
    pub const fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    /// Set the round limit.
    #[must_use]
    pub const fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Config`] if `ratio` is below [`MIN_RATIO`] or
    /// `length` is negative.
    pub fn validate(&self) -> MeshResult<()> {
        if !(self.ratio >= MIN_RATIO) {
            return Err(MeshError::config("ratio", self.ratio, "must be at least 1e-5"));
        }
        require_non_negative("length", self.length)
    }
}

/// Parameters for [`split_intersecting`](crate::split_intersecting).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitIntersectingParams {
    /// Triangles crossed by more cutters than this are left whole.
    pub max_cutters_per_triangle: usize,

    /// Process triangles on the rayon pool.
    pub parallel: bool,
}

impl Default for SplitIntersectingParams {
    fn default() -> Self {
        Self {
            max_cutters_per_triangle: 100,
            parallel: true,
        }
    }
}

impl SplitIntersectingParams {
    /// Set the cutter limit.
    #[must_use]
    pub const fn with_max_cutters(mut self, max: usize) -> Self {
        self.max_cutters_per_triangle = max;
        self
    }

    /// Enable or disable parallel processing.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
