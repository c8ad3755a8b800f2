//! Global operator assembly.
//!
//! Row layout of the operators, for `E` edges, `P` pins and `V` vertices:
//!
//! | Operator | Rows | Columns |
//! |----------|------|---------|
//! | `A1` | `2E` edge residuals, then `2P` pin rows | `2V` interleaved `x, y` |
//! | `G`  | `2E` raw `(c, s)` pairs | `2V` interleaved `x, y` |
//! | `A2` | `E` edge differences, then `P` pin rows | `V` (shared by `x` and `y`) |

use nalgebra::Point2;
use rayon::prelude::*;
use tracing::debug;

use super::local_frame::LocalFrame;
use super::normal::NormalSystem;
use super::sparse::CsrMatrix;
use super::ArapOptions;
use crate::error::{Result, Stage};
use crate::mesh::Topology;

/// Operators and prepared normal equations of a deformation.
#[derive(Debug, Clone)]
pub(crate) struct ArapSystem {
    /// Stage-1 operator `A1`.
    pub relax: CsrMatrix,
    /// Per-edge similarity extractor `G`.
    pub similarity: CsrMatrix,
    /// Stage-2 operator `A2`.
    pub resolve: CsrMatrix,
    /// Prepared `A1ᵗA1`.
    pub relax_normal: NormalSystem,
    /// Prepared `A2ᵗA2`.
    pub resolve_normal: NormalSystem,
}

impl ArapSystem {
    /// Assemble all operators from frame-local rest positions.
    ///
    /// # Errors
    ///
    /// Propagates topology and local-frame failures, and returns
    /// [`crate::error::ArapError::SingularSystem`] if a normal matrix cannot
    /// be prepared.
    pub fn assemble(
        topology: &Topology,
        rest: &[Point2<f64>],
        pins: &[usize],
        options: &ArapOptions,
    ) -> Result<Self> {
        let n_edges = topology.num_edges();
        let n_vertices = rest.len();

        let scale = extent(rest);
        let build = |k: usize| LocalFrame::build(k, topology.stencil(k)?, rest, scale);
        let frames: Vec<Result<LocalFrame>> = if options.parallel {
            (0..n_edges).into_par_iter().map(build).collect()
        } else {
            (0..n_edges).map(build).collect()
        };
        let frames = frames.into_iter().collect::<Result<Vec<_>>>()?;

        let relax = relax_operator(&frames, pins, n_vertices, options.pin_weight);
        let similarity = similarity_operator(&frames, n_vertices);
        let resolve = resolve_operator(topology, pins, n_vertices, options.pin_weight);

        debug!(
            "Assembled A1 {}x{} ({} nnz), G {}x{} ({} nnz), A2 {}x{} ({} nnz)",
            relax.nrows(),
            relax.ncols(),
            relax.nnz(),
            similarity.nrows(),
            similarity.ncols(),
            similarity.nnz(),
            resolve.nrows(),
            resolve.ncols(),
            resolve.nnz()
        );

        let relax_normal =
            NormalSystem::prepare(relax.gram(), &options.linear_solver, Stage::Relaxation)?;
        let resolve_normal =
            NormalSystem::prepare(resolve.gram(), &options.linear_solver, Stage::Resolve)?;

        Ok(Self {
            relax,
            similarity,
            resolve,
            relax_normal,
            resolve_normal,
        })
    }
}

/// Bounding-box diagonal of a point set.
fn extent(points: &[Point2<f64>]) -> f64 {
    let Some(&first) = points.first() else {
        return 0.0;
    };
    let (lo, hi) = points.iter().fold((first, first), |(lo, hi), p| {
        (lo.inf(p), hi.sup(p))
    });
    (hi - lo).norm()
}

/// `A1`: edge residual operators followed by one `(x, y)` row pair per pin.
fn relax_operator(
    frames: &[LocalFrame],
    pins: &[usize],
    n_vertices: usize,
    weight: f64,
) -> CsrMatrix {
    let n_edges = frames.len();
    let mut triplets = Vec::with_capacity(frames.len() * 32 + pins.len() * 2);

    for (k, frame) in frames.iter().enumerate() {
        frame.scatter(&frame.residual, k, &mut triplets);
    }

    for (p, &v) in pins.iter().enumerate() {
        let row = 2 * (n_edges + p);
        triplets.push((row, 2 * v, weight));
        triplets.push((row + 1, 2 * v + 1, weight));
    }

    CsrMatrix::from_triplets(2 * (n_edges + pins.len()), 2 * n_vertices, triplets)
}

/// `G`: per-edge least-squares similarity extractors.
fn similarity_operator(frames: &[LocalFrame], n_vertices: usize) -> CsrMatrix {
    let mut triplets = Vec::with_capacity(frames.len() * 32);
    for (k, frame) in frames.iter().enumerate() {
        frame.scatter(&frame.pseudo_inverse, k, &mut triplets);
    }
    CsrMatrix::from_triplets(2 * frames.len(), 2 * n_vertices, triplets)
}

/// `A2`: `-1, +1` edge differences followed by one weighted row per pin.
fn resolve_operator(
    topology: &Topology,
    pins: &[usize],
    n_vertices: usize,
    weight: f64,
) -> CsrMatrix {
    let n_edges = topology.num_edges();
    let mut triplets = Vec::with_capacity(n_edges * 2 + pins.len());

    for (k, edge) in topology.edges().iter().enumerate() {
        triplets.push((k, edge.from, -1.0));
        triplets.push((k, edge.to, 1.0));
    }

    for (p, &v) in pins.iter().enumerate() {
        triplets.push((n_edges + p, v, weight));
    }

    CsrMatrix::from_triplets(n_edges + pins.len(), n_vertices, triplets)
}
