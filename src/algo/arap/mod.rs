//! As-Rigid-As-Possible (ARAP) shape manipulation.
//!
//! Deforms a 2D triangle mesh so that pinned vertices follow user targets
//! while every edge's neighborhood stays as close to a rotated copy of its
//! rest shape as least squares allows.
//!
//! The solver works in two stages, both weighted least-squares problems whose
//! normal-equation matrices depend only on the rest pose and are prepared once:
//!
//! 1. **Relaxation**: find positions that minimize, per edge, the part of the
//!    edge vector that the best-fit similarity (rotation + uniform scale) of
//!    its neighborhood cannot explain.
//! 2. **Resolve**: read the per-edge similarity off the relaxed positions,
//!    drop its scale, rotate the rest-pose edge vectors by it, and solve for
//!    positions whose edges match those rotated vectors.
//!
//! # Example
//!
//! ```
//! use arap2d::algo::arap::ArapSolver;
//! use nalgebra::Point2;
//!
//! let vertices = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! let triangles = vec![[0, 1, 2], [0, 2, 3]];
//!
//! let solver = ArapSolver::new(&[0, 1], &triangles, &vertices).unwrap();
//! let deformed = solver
//!     .solve(&[Point2::new(0.0, 0.0), Point2::new(0.0, 1.0)])
//!     .unwrap();
//!
//! // A quarter turn of the pins turns the whole square
//! assert!((deformed[2] - Point2::new(-1.0, 1.0)).norm() < 1e-6);
//! ```
//!
//! # References
//!
//! - Igarashi, T., & Igarashi, Y. (2009). "Implementing As-Rigid-As-Possible
//!   Shape Manipulation and Surface Flattening." Journal of Graphics, GPU,
//!   and Game Tools, 14(1).

mod assemble;
mod local_frame;
mod normal;
mod solver;
mod sparse;

pub use local_frame::LocalFrame;
pub use solver::{ArapSolver, Deformation, EdgeRotation};
pub use sparse::{conjugate_gradient, CgFailure, CsrMatrix};

use crate::error::{ArapError, Result};

/// Linear solver used for the normal equations of both stages.
#[derive(Debug, Clone, PartialEq)]
pub enum LinearSolver {
    /// Dense Cholesky factorization computed once at construction.
    ///
    /// Every solve is two triangular substitutions; the factor needs
    /// `(2V)²` storage for `V` vertices.
    Cholesky,

    /// Conjugate gradient on the sparse normal matrices, run on every solve.
    ConjugateGradient {
        /// Maximum iterations per linear solve.
        max_iterations: usize,
        /// Relative residual tolerance.
        tolerance: f64,
    },
}

impl Default for LinearSolver {
    fn default() -> Self {
        LinearSolver::Cholesky
    }
}

impl LinearSolver {
    /// Conjugate gradient with default limits.
    pub fn iterative() -> Self {
        LinearSolver::ConjugateGradient {
            max_iterations: 10_000,
            tolerance: 1e-12,
        }
    }
}

/// Options for ARAP deformation.
#[derive(Debug, Clone)]
pub struct ArapOptions {
    /// Weight of the pin constraints relative to the edge terms.
    ///
    /// Larger weights hold pins closer to their targets.
    pub pin_weight: f64,

    /// Backend for the normal equations.
    pub linear_solver: LinearSolver,

    /// Rotation estimates with a norm below this are treated as collapsed edges.
    pub rotation_epsilon: f64,

    /// Whether to build local frames, extract rotations, and run batch solves
    /// on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ArapOptions {
    fn default() -> Self {
        Self {
            pin_weight: 1000.0,
            linear_solver: LinearSolver::Cholesky,
            rotation_epsilon: 1e-12,
            parallel: true,
        }
    }
}

impl ArapOptions {
    /// Set the pin weight.
    pub fn with_pin_weight(mut self, weight: f64) -> Self {
        self.pin_weight = weight;
        self
    }

    /// Set the linear solver backend.
    pub fn with_linear_solver(mut self, solver: LinearSolver) -> Self {
        self.linear_solver = solver;
        self
    }

    /// Set the collapsed-rotation threshold.
    pub fn with_rotation_epsilon(mut self, epsilon: f64) -> Self {
        self.rotation_epsilon = epsilon;
        self
    }

    /// Enable or disable parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that every option is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.pin_weight.is_finite() && self.pin_weight > 0.0) {
            return Err(ArapError::invalid_param(
                "pin_weight",
                self.pin_weight,
                "must be finite and positive",
            ));
        }
        if !(self.rotation_epsilon.is_finite() && self.rotation_epsilon >= 0.0) {
            return Err(ArapError::invalid_param(
                "rotation_epsilon",
                self.rotation_epsilon,
                "must be finite and non-negative",
            ));
        }
        if let LinearSolver::ConjugateGradient {
            max_iterations,
            tolerance,
        } = self.linear_solver
        {
            if max_iterations == 0 {
                return Err(ArapError::invalid_param(
                    "max_iterations",
                    max_iterations,
                    "must be at least 1",
                ));
            }
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return Err(ArapError::invalid_param(
                    "tolerance",
                    tolerance,
                    "must be finite and positive",
                ));
            }
        }
        Ok(())
    }
}
