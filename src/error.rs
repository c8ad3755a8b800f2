//! Error types for arap2d.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`ArapError`].
pub type Result<T> = std::result::Result<T, ArapError>;

/// Errors that can occur while building or running a deformation.
#[derive(Error, Debug)]
pub enum ArapError {
    /// The triangle list does not describe a usable mesh.
    #[error("invalid topology: {details}")]
    InvalidTopology {
        /// Description of the malformed input.
        details: String,
    },

    /// The pin list is empty, contains duplicates, or references missing vertices.
    #[error("invalid pin set: {details}")]
    InvalidPinSet {
        /// Description of the problem.
        details: String,
    },

    /// The local frame of an edge cannot be inverted.
    #[error("edge {edge} ({v0}, {v1}) has a singular local frame")]
    SingularNeighborhood {
        /// Edge index.
        edge: usize,
        /// Start vertex of the edge.
        v0: usize,
        /// End vertex of the edge.
        v1: usize,
    },

    /// A normal-equation matrix is not positive definite.
    #[error("{stage} normal equations are singular")]
    SingularSystem {
        /// Which of the two solve stages failed.
        stage: Stage,
    },

    /// The iterative backend did not reach its tolerance.
    #[error("{stage} solve failed to converge after {iterations} iterations")]
    ConvergenceFailed {
        /// Which of the two solve stages failed.
        stage: Stage,
        /// Number of iterations attempted.
        iterations: usize,
    },

    /// The rotation estimate of an edge vanished.
    #[error("edge {edge} collapsed: rotation estimate has norm {norm:e}")]
    DegenerateRotation {
        /// Edge index.
        edge: usize,
        /// Norm of the raw (c, s) pair.
        norm: f64,
    },

    /// Wrong number of pin targets passed to a solve.
    #[error("expected {expected} pin targets, got {actual}")]
    ShapeMismatch {
        /// Number of pins of the solver.
        expected: usize,
        /// Number of targets supplied.
        actual: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed rig or animation document.
    #[error("malformed JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArapError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        ArapError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn topology(details: impl Into<String>) -> Self {
        ArapError::InvalidTopology {
            details: details.into(),
        }
    }

    pub(crate) fn pins(details: impl Into<String>) -> Self {
        ArapError::InvalidPinSet {
            details: details.into(),
        }
    }
}

/// The two least-squares stages of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Similarity-invariant position relaxation.
    Relaxation,
    /// Edge-consistent position resolve.
    Resolve,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Relaxation => f.write_str("relaxation"),
            Stage::Resolve => f.write_str("resolve"),
        }
    }
}
