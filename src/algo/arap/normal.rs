//! Cached normal-equation solvers.
//!
//! Both deformation stages solve `AᵗA x = Aᵗb` against a matrix that only
//! depends on the rest pose, so the matrix is prepared once per solver and
//! shared by every subsequent solve.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};

use super::sparse::{conjugate_gradient, CgFailure, CsrMatrix};
use super::LinearSolver;
use crate::error::{ArapError, Result, Stage};

/// Smallest accepted ratio between a squared Cholesky pivot and the
/// corresponding diagonal entry.
const PIVOT_RATIO: f64 = 1e-12;

/// A prepared normal-equation matrix.
#[derive(Debug, Clone)]
pub(crate) enum NormalSystem {
    /// Dense LLᵀ factorization.
    Cholesky(Cholesky<f64, Dyn>),
    /// Sparse matrix solved by conjugate gradient on demand.
    Iterative {
        matrix: CsrMatrix,
        max_iterations: usize,
        tolerance: f64,
    },
}

impl NormalSystem {
    /// Prepare `AᵗA` for repeated solves with the chosen backend.
    ///
    /// # Errors
    ///
    /// Returns [`ArapError::SingularSystem`] if the Cholesky factorization
    /// fails, meaning `AᵗA` is not positive definite.
    pub(crate) fn prepare(gram: CsrMatrix, backend: &LinearSolver, stage: Stage) -> Result<Self> {
        match *backend {
            LinearSolver::Cholesky => {
                let dense = gram.to_dense();
                let diagonal = dense.diagonal();
                let chol = Cholesky::new(dense).ok_or(ArapError::SingularSystem { stage })?;

                // Rounding can leave a tiny positive pivot for a singular matrix
                let l = chol.l_dirty();
                let degenerate = (0..diagonal.len())
                    .any(|i| l[(i, i)] * l[(i, i)] <= PIVOT_RATIO * diagonal[i]);
                if degenerate {
                    return Err(ArapError::SingularSystem { stage });
                }
                Ok(NormalSystem::Cholesky(chol))
            }
            LinearSolver::ConjugateGradient {
                max_iterations,
                tolerance,
            } => Ok(NormalSystem::Iterative {
                matrix: gram,
                max_iterations,
                tolerance,
            }),
        }
    }

    /// Solve for a single right-hand side.
    pub(crate) fn solve(&self, rhs: &DVector<f64>, stage: Stage) -> Result<DVector<f64>> {
        match self {
            NormalSystem::Cholesky(chol) => Ok(chol.solve(rhs)),
            NormalSystem::Iterative {
                matrix,
                max_iterations,
                tolerance,
            } => conjugate_gradient(matrix, rhs, *max_iterations, *tolerance)
                .map_err(|failure| cg_error(failure, stage)),
        }
    }

    /// Solve for every column of `rhs`.
    ///
    /// The factorized backend handles all columns in one substitution pass;
    /// the iterative backend runs one solve per column.
    pub(crate) fn solve_columns(&self, rhs: &DMatrix<f64>, stage: Stage) -> Result<DMatrix<f64>> {
        match self {
            NormalSystem::Cholesky(chol) => Ok(chol.solve(rhs)),
            NormalSystem::Iterative { .. } => {
                let columns = rhs
                    .column_iter()
                    .map(|col| self.solve(&col.into_owned(), stage))
                    .collect::<Result<Vec<_>>>()?;
                Ok(DMatrix::from_columns(&columns))
            }
        }
    }
}

fn cg_error(failure: CgFailure, stage: Stage) -> ArapError {
    match failure {
        CgFailure::NotPositiveDefinite => ArapError::SingularSystem { stage },
        CgFailure::MaxIterations(iterations) => ArapError::ConvergenceFailed { stage, iterations },
    }
}
