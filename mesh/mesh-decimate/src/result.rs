//! Result types for merge operations.

// Face counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]

use mesh_types::Mesh;

/// Counts reported by [`merge_close_vertices`](crate::merge_close_vertices)
/// and [`merge_planar`](crate::merge_planar).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Vertex count before merging.
    pub vertices_before: usize,

    /// Vertex count after merging.
    pub vertices_after: usize,

    /// Face count before merging.
    pub faces_before: usize,

    /// Face count after merging.
    pub faces_after: usize,

    /// Number of passes run.
    pub passes: usize,
}

impl MergeSummary {
    pub(crate) fn start(mesh: &Mesh) -> Self {
        Self {
            vertices_before: mesh.vertex_count(),
            vertices_after: mesh.vertex_count(),
            faces_before: mesh.faces_count(),
            faces_after: mesh.faces_count(),
            passes: 0,
        }
    }

    pub(crate) fn finish(mut self, mesh: &Mesh) -> Self {
        self.vertices_after = mesh.vertex_count();
        self.faces_after = mesh.faces_count();
        self
    }

    /// Get the reduction ratio (faces after / faces before).
    #[must_use]
    pub fn reduction_ratio(&self) -> f64 {
        if self.faces_before == 0 {
            1.0
        } else {
            self.faces_after as f64 / self.faces_before as f64
        }
    }

    /// Get the percentage of faces removed.
    #[must_use]
    pub fn reduction_percent(&self) -> f64 {
        (1.0 - self.reduction_ratio()) * 100.0
    }

    /// Check if anything was merged.
    #[must_use]
    pub const fn was_merged(&self) -> bool {
        self.vertices_before != self.vertices_after || self.faces_before != self.faces_after
    }
}

impl std::fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Merge: {} → {} verts, {} → {} faces ({:.1}% reduction, {} passes)",
            self.vertices_before,
            self.vertices_after,
            self.faces_before,
            self.faces_after,
            self.reduction_percent(),
            self.passes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(faces_after: usize) -> MergeSummary {
        MergeSummary {
            vertices_before: 100,
            vertices_after: 60,
            faces_before: 200,
            faces_after,
            passes: 2,
        }
    }

    #[test]
    fn test_reduction_ratio() {
        let result = summary(100);
        assert!((result.reduction_ratio() - 0.5).abs() < 0.001);
        assert!((result.reduction_percent() - 50.0).abs() < 0.1);
        assert!((MergeSummary::default().reduction_ratio() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_was_merged() {
        assert!(summary(100).was_merged());
        assert!(!MergeSummary::default().was_merged());
    }

    #[test]
    fn test_display() {
        let display = format!("{}", summary(100));
        assert!(display.contains("200 → 100 faces"));
        assert!(display.contains("50.0%"));
        assert!(display.contains("2 passes"));
    }
}
