//! Per-edge local frame operators.
//!
//! For an edge `(vi, vj)` with stencil vertices `p_0..p_n`, the local frame
//! `G_k` stacks the rows `(x, y)` and `(y, -x)` of every stencil vertex, so
//! `G_k * (c, s)` is the stencil transformed by the similarity
//! `[[c, s], [-s, c]]`. Its pseudo-inverse `G*_k` recovers the best-fit
//! `(c, s)` from deformed stencil positions, and
//! `H_k = D - E_k * G*_k` measures what is left of the edge vector once that
//! similarity is removed.

use nalgebra::{Matrix2, Matrix2xX, MatrixXx2, Point2, Vector2};

use crate::error::{ArapError, Result};
use crate::mesh::EdgeStencil;

/// Smallest accepted `Σ|p|²` of a stencil, relative to the squared mesh size.
const FRAME_EPSILON: f64 = 1e-12;

/// Local operators of a single edge.
///
/// Column pair `(2m, 2m + 1)` of both matrices belongs to the `m`-th
/// stencil vertex.
#[derive(Debug, Clone)]
pub struct LocalFrame {
    /// Stencil the operators were built from.
    pub stencil: EdgeStencil,
    /// Least-squares similarity extractor `G*_k` (2 x 2n).
    pub pseudo_inverse: Matrix2xX<f64>,
    /// Residual operator `H_k` (2 x 2n).
    pub residual: Matrix2xX<f64>,
}

impl LocalFrame {
    /// Build the operators of edge `edge` from frame-local rest positions.
    ///
    /// `scale` is the size of the mesh (its bounding-box diagonal); stencils
    /// that sit on the frame origin relative to it are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ArapError::SingularNeighborhood`] if `G_kᵗ G_k` cannot be
    /// inverted.
    pub fn build(
        edge: usize,
        stencil: EdgeStencil,
        rest: &[Point2<f64>],
        scale: f64,
    ) -> Result<Self> {
        let vertices = stencil.vertices();
        let (vi, vj) = (vertices[0], vertices[1]);
        let cols = 2 * vertices.len();

        let mut frame = MatrixXx2::zeros(cols);
        for (m, &v) in vertices.iter().enumerate() {
            let p = rest[v];
            frame[(2 * m, 0)] = p.x;
            frame[(2 * m, 1)] = p.y;
            frame[(2 * m + 1, 0)] = p.y;
            frame[(2 * m + 1, 1)] = -p.x;
        }

        // G_kᵗ G_k is Σ|p|² times the identity
        let normal: Matrix2<f64> = frame.transpose() * &frame;
        let singular = || ArapError::SingularNeighborhood {
            edge,
            v0: vi,
            v1: vj,
        };
        if !(normal[(0, 0)] > FRAME_EPSILON * scale * scale) {
            return Err(singular());
        }
        let inverse = normal.try_inverse().ok_or_else(singular)?;
        let pseudo_inverse: Matrix2xX<f64> = inverse * frame.transpose();

        let e = rest[vj] - rest[vi];
        let residual = difference_operator(cols) - edge_matrix(&e) * &pseudo_inverse;

        Ok(Self {
            stencil,
            pseudo_inverse,
            residual,
        })
    }

    /// Scatter a 2 x 2n local operator into global `(row, col, value)`
    /// triplets at rows `(2k, 2k + 1)`.
    pub fn scatter(
        &self,
        local: &Matrix2xX<f64>,
        edge: usize,
        triplets: &mut Vec<(usize, usize, f64)>,
    ) {
        for (m, &v) in self.stencil.vertices().iter().enumerate() {
            for r in 0..2 {
                for d in 0..2 {
                    triplets.push((2 * edge + r, 2 * v + d, local[(r, 2 * m + d)]));
                }
            }
        }
    }
}

/// Maps stacked stencil coordinates to the edge vector `vj - vi`.
fn difference_operator(cols: usize) -> Matrix2xX<f64> {
    let mut d = Matrix2xX::zeros(cols);
    d[(0, 0)] = -1.0;
    d[(1, 1)] = -1.0;
    d[(0, 2)] = 1.0;
    d[(1, 3)] = 1.0;
    d
}

/// `E_k = [[ex, ey], [ey, -ex]]`.
fn edge_matrix(e: &Vector2<f64>) -> Matrix2<f64> {
    Matrix2::new(e.x, e.y, e.y, -e.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn stacked(points: &[Point2<f64>]) -> DVector<f64> {
        DVector::from_iterator(points.len() * 2, points.iter().flat_map(|p| [p.x, p.y]))
    }

    const SQUARE_SCALE: f64 = std::f64::consts::SQRT_2;

    fn square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(-0.5, -0.5),
            Point2::new(0.5, -0.5),
            Point2::new(0.5, 0.5),
            Point2::new(-0.5, 0.5),
        ]
    }

    #[test]
    fn test_boundary_shapes() {
        let frame =
            LocalFrame::build(0, EdgeStencil::Boundary([0, 1, 2]), &square(), SQUARE_SCALE).unwrap();

        assert_eq!(frame.pseudo_inverse.shape(), (2, 6));
        assert_eq!(frame.residual.shape(), (2, 6));
    }

    #[test]
    fn test_interior_shapes() {
        let stencil = EdgeStencil::Interior([2, 0, 1, 3]);
        let frame = LocalFrame::build(2, stencil, &square(), SQUARE_SCALE).unwrap();

        assert_eq!(frame.pseudo_inverse.shape(), (2, 8));
        assert_eq!(frame.residual.shape(), (2, 8));
    }

    #[test]
    fn test_recovers_similarity() {
        let rest = square();
        let stencil = EdgeStencil::Interior([0, 2, 1, 3]);
        let frame = LocalFrame::build(3, stencil, &rest, SQUARE_SCALE).unwrap();

        // Scaled rotation [[c, s], [-s, c]] with c = 1.2, s = 0.5
        let (c, s) = (1.2, 0.5);
        let moved: Vec<_> = stencil
            .vertices()
            .iter()
            .map(|&v| {
                let p = rest[v];
                Point2::new(c * p.x + s * p.y, -s * p.x + c * p.y)
            })
            .collect();
        let x = stacked(&moved);

        let cs = &frame.pseudo_inverse * &x;
        assert!((cs[0] - c).abs() < 1e-12);
        assert!((cs[1] - s).abs() < 1e-12);

        // Similarities leave no residual
        let h = &frame.residual * &x;
        assert!(h.norm() < 1e-12);
    }

    #[test]
    fn test_residual_sees_shear() {
        let rest = square();
        let stencil = EdgeStencil::Boundary([0, 1, 2]);
        let frame = LocalFrame::build(0, stencil, &rest, SQUARE_SCALE).unwrap();

        let sheared: Vec<_> = stencil
            .vertices()
            .iter()
            .map(|&v| Point2::new(rest[v].x + 0.8 * rest[v].y, rest[v].y))
            .collect();

        let h = &frame.residual * stacked(&sheared);
        assert!(h.norm() > 1e-3);
    }

    #[test]
    fn test_collapsed_stencil_is_singular() {
        let rest = vec![Point2::origin(); 3];
        let err = LocalFrame::build(4, EdgeStencil::Boundary([0, 1, 2]), &rest, 1.0).unwrap_err();

        assert!(matches!(
            err,
            ArapError::SingularNeighborhood { edge: 4, v0: 0, v1: 1 }
        ));
    }

    #[test]
    fn test_small_stencil_is_regular() {
        let scale = 1e-6;
        let rest: Vec<_> = square()
            .iter()
            .map(|p| Point2::from(p.coords * scale))
            .collect();
        let frame =
            LocalFrame::build(0, EdgeStencil::Boundary([0, 1, 2]), &rest, SQUARE_SCALE * scale)
                .unwrap();

        // Rest pose has no residual at any scale
        let h = &frame.residual * stacked(&[rest[0], rest[1], rest[2]]);
        assert!(h.norm() < 1e-12 * scale);
    }

    #[test]
    fn test_stencil_on_origin_is_singular() {
        // Tiny against a unit-sized mesh
        let rest = vec![
            Point2::new(1e-9, 0.0),
            Point2::new(0.0, 1e-9),
            Point2::new(-1e-9, 0.0),
        ];
        let err = LocalFrame::build(0, EdgeStencil::Boundary([0, 1, 2]), &rest, 1.0).unwrap_err();
        assert!(matches!(err, ArapError::SingularNeighborhood { edge: 0, .. }));
    }

    #[test]
    fn test_scatter_accumulates_per_vertex() {
        let stencil = EdgeStencil::Boundary([1, 2, 0]);
        let frame = LocalFrame::build(1, stencil, &square(), SQUARE_SCALE).unwrap();
        let mut triplets = Vec::new();
        frame.scatter(&frame.residual, 1, &mut triplets);

        assert_eq!(triplets.len(), 12);
        assert!(triplets.iter().all(|&(r, _, _)| r == 2 || r == 3));
        assert!(triplets.contains(&(2, 2, frame.residual[(0, 0)])));
        assert!(triplets.contains(&(3, 1, frame.residual[(1, 5)])));
    }
}
