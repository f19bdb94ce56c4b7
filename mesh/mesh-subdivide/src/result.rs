//! Result types for splitting operations.

// Face counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]

/// Counts reported by [`split_long`](crate::split_long) and
/// [`split_intersecting`](crate::split_intersecting).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitSummary {
    /// Number of faces in the input.
    pub faces_before: usize,

    /// Number of faces in the output.
    pub faces_after: usize,

    /// Number of splitting rounds run.
    pub iterations: usize,
}

impl SplitSummary {
    /// Get the face multiplication factor.
    #[must_use]
    pub fn face_ratio(&self) -> f64 {
        if self.faces_before == 0 {
            1.0
        } else {
            self.faces_after as f64 / self.faces_before as f64
        }
    }

    /// Check if any triangle was split.
    #[must_use]
    pub const fn was_split(&self) -> bool {
        self.faces_after > self.faces_before
    }
}

impl std::fmt::Display for SplitSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Split: {} → {} faces ({:.1}x), {} iterations",
            self.faces_before,
            self.faces_after,
            self.face_ratio(),
            self.iterations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_ratio() {
        let result = SplitSummary {
            faces_before: 100,
            faces_after: 400,
            iterations: 3,
        };
        assert!((result.face_ratio() - 4.0).abs() < 0.001);
        assert!(result.was_split());
        assert!((SplitSummary::default().face_ratio() - 1.0).abs() < 0.001);
        assert!(!SplitSummary::default().was_split());
    }

    #[test]
    fn test_display() {
        let result = SplitSummary {
            faces_before: 100,
            faces_after: 400,
            iterations: 2,
        };
        let display = format!("{result}");
        assert!(display.contains("100 → 400"));
        assert!(display.contains("4.0x"));
        assert!(display.contains("2 iterations"));
    }
}
