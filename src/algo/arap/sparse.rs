//! Sparse matrix storage and conjugate gradient solver.
//!
//! The deformation operators have at most eight non-zeros per row, so they
//! are assembled in CSR form and only densified when a direct factorization
//! is requested.

use nalgebra::{DMatrix, DVector};

/// Compressed Sparse Row (CSR) matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    /// `row_ptr[i]..row_ptr[i + 1]` indexes the entries of row `i`.
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Create a CSR matrix from `(row, col, value)` triplets.
    ///
    /// Entries at the same position are summed, so operators can be
    /// scattered piecewise.
    pub fn from_triplets(rows: usize, cols: usize, mut triplets: Vec<(usize, usize, f64)>) -> Self {
        triplets.sort_unstable_by_key(|&(r, c, _)| (r, c));

        let mut row_ptr = vec![0usize; rows + 1];
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values: Vec<f64> = Vec::with_capacity(triplets.len());
        let mut last = None;

        for (r, c, v) in triplets {
            debug_assert!(r < rows && c < cols, "triplet ({r}, {c}) out of bounds");
            if last == Some((r, c)) {
                if let Some(acc) = values.last_mut() {
                    *acc += v;
                }
                continue;
            }
            last = Some((r, c));
            col_idx.push(c);
            values.push(v);
            row_ptr[r + 1] += 1;
        }

        for r in 0..rows {
            row_ptr[r + 1] += row_ptr[r];
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Get the number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Get the number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterate over the `(col, value)` entries of a row.
    #[inline]
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Value at `(i, j)`, zero if not stored.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        match self.col_idx[range.clone()].binary_search(&j) {
            Ok(pos) => self.values[range.start + pos],
            Err(_) => 0.0,
        }
    }

    /// Multiply matrix by vector: y = A * x.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.cols, "Vector dimension mismatch");

        DVector::from_iterator(
            self.rows,
            (0..self.rows).map(|i| self.row(i).map(|(j, v)| v * x[j]).sum::<f64>()),
        )
    }

    /// Multiply the transpose by a vector: y = Aᵗ * b.
    pub fn transpose_mul_vec(&self, b: &DVector<f64>) -> DVector<f64> {
        assert_eq!(b.len(), self.rows, "Vector dimension mismatch");

        let mut y = DVector::zeros(self.cols);
        for i in 0..self.rows {
            if b[i] == 0.0 {
                continue;
            }
            for (j, v) in self.row(i) {
                y[j] += v * b[i];
            }
        }
        y
    }

    /// Normal-equation matrix AᵗA.
    ///
    /// Each row contributes the outer product of its entries.
    pub fn gram(&self) -> CsrMatrix {
        let mut triplets = Vec::new();
        for i in 0..self.rows {
            for (a, va) in self.row(i) {
                for (b, vb) in self.row(i) {
                    triplets.push((a, b, va * vb));
                }
            }
        }
        CsrMatrix::from_triplets(self.cols, self.cols, triplets)
    }

    /// Convert to a dense matrix.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.rows, self.cols);
        for i in 0..self.rows {
            for (j, v) in self.row(i) {
                dense[(i, j)] = v;
            }
        }
        dense
    }
}

/// Why a conjugate gradient solve stopped without a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgFailure {
    /// A search direction had non-positive curvature.
    NotPositiveDefinite,
    /// The residual did not drop below tolerance.
    MaxIterations(usize),
}

/// Solve A*x = b using the Conjugate Gradient method.
///
/// Requires A to be symmetric positive definite.
///
/// # Arguments
///
/// * `a` - The system matrix (must be symmetric positive definite)
/// * `b` - The right-hand side vector
/// * `max_iter` - Maximum number of iterations
/// * `tolerance` - Convergence tolerance (relative residual norm)
pub fn conjugate_gradient(
    a: &CsrMatrix,
    b: &DVector<f64>,
    max_iter: usize,
    tolerance: f64,
) -> Result<DVector<f64>, CgFailure> {
    let n = b.len();
    assert_eq!(a.nrows(), n, "Matrix-vector dimension mismatch");
    assert_eq!(a.ncols(), n, "Matrix must be square");

    let mut x = DVector::zeros(n);
    let b_norm = b.norm();
    if b_norm < 1e-300 {
        return Ok(x);
    }

    let mut r = b.clone();
    let mut p = r.clone();
    let mut r_norm_sq = r.dot(&r);

    for _ in 0..max_iter {
        let ap = a.mul_vec(&p);
        let curvature = p.dot(&ap);
        if curvature <= 0.0 {
            return Err(CgFailure::NotPositiveDefinite);
        }

        let alpha = r_norm_sq / curvature;
        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &ap, 1.0);

        let new_r_norm_sq = r.dot(&r);
        if new_r_norm_sq.sqrt() / b_norm < tolerance {
            return Ok(x);
        }

        let beta = new_r_norm_sq / r_norm_sq;
        p = &r + beta * &p;
        r_norm_sq = new_r_norm_sq;
    }

    Err(CgFailure::MaxIterations(max_iter))
}
