//! Error types shared by the mesh algorithm crates.

use thiserror::Error;

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors raised by mesh operations.
///
/// All of these are contract violations detected at the entry point of an
/// operation, before the mesh is modified. None of them are transient.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum MeshError {
    /// The mesh does not satisfy the operation's preconditions
    /// (wrong topology, missing attributes, inconsistent buffers).
    #[error("{operation}: {reason}")]
    Validation {
        /// Operation that rejected the mesh.
        operation: &'static str,
        /// What was wrong with the mesh.
        reason: String,
    },

    /// A configuration value is out of its valid range.
    #[error("invalid {parameter} = {value}: {reason}")]
    Config {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
        /// The constraint that was violated.
        reason: &'static str,
    },

    /// The operation is not implemented for this input.
    #[error("{operation} is not implemented for {what}")]
    NotImplemented {
        /// Operation that was requested.
        operation: &'static str,
        /// The unsupported case.
        what: &'static str,
    },
}

impl MeshError {
    /// Create a `Validation` error.
    #[must_use]
    pub fn validation(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            operation,
            reason: reason.into(),
        }
    }

    /// Create a `Config` error.
    #[must_use]
    pub const fn config(parameter: &'static str, value: f64, reason: &'static str) -> Self {
        Self::Config {
            parameter,
            value,
            reason,
        }
    }

    /// Create a `NotImplemented` error.
    #[must_use]
    pub const fn not_implemented(operation: &'static str, what: &'static str) -> Self {
        Self::NotImplemented { operation, what }
    }

    /// Check if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

/// Reject a configuration value that is not strictly positive (NaN included).
///
/// # Errors
///
/// Returns [`MeshError::Config`] when `value <= 0` or `value` is NaN.
pub fn require_positive(parameter: &'static str, value: f64) -> MeshResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(MeshError::config(parameter, value, "must be positive"))
    }
}

/// Reject a configuration value that is negative or NaN.
///
/// # Errors
///
/// Returns [`MeshError::Config`] when `value < 0` or `value` is NaN.
pub fn require_non_negative(parameter: &'static str, value: f64) -> MeshResult<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(MeshError::config(parameter, value, "must not be negative"))
    }
}
