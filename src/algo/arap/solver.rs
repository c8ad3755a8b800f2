//! The two-stage ARAP solver.

use std::time::Instant;

use nalgebra::{DMatrix, DVector, Matrix2, Point2, Vector2};
use rayon::prelude::*;
use tracing::{info, trace};

use super::assemble::ArapSystem;
use super::ArapOptions;
use crate::error::{ArapError, Result, Stage};
use crate::mesh::{Mesh, Topology};

/// Pins closer together than this fraction of the mesh size count as a
/// single point when choosing the frame anchor.
const PIN_SPREAD_EPSILON: f64 = 1e-9;

/// Unit rotation extracted for one edge, as the matrix `[[c, s], [-s, c]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRotation {
    /// Cosine term.
    pub c: f64,
    /// Sine term.
    pub s: f64,
}

impl EdgeRotation {
    /// Rotation matrix `[[c, s], [-s, c]]`.
    #[inline]
    pub fn matrix(&self) -> Matrix2<f64> {
        Matrix2::new(self.c, self.s, -self.s, self.c)
    }

    /// Rotate a vector.
    #[inline]
    pub fn apply(&self, v: &Vector2<f64>) -> Vector2<f64> {
        Vector2::new(self.c * v.x + self.s * v.y, -self.s * v.x + self.c * v.y)
    }

    /// Counter-clockwise rotation angle in radians.
    #[inline]
    pub fn angle(&self) -> f64 {
        (-self.s).atan2(self.c)
    }
}

/// Result of a detailed solve.
#[derive(Debug, Clone)]
pub struct Deformation {
    /// Solved vertex positions, indexed by vertex ID.
    pub positions: Vec<Point2<f64>>,
    /// Normalized rotation of every directed edge, in edge order.
    pub rotations: Vec<EdgeRotation>,
}

/// ARAP deformation solver for a fixed mesh and pin set.
///
/// Construction assembles and factorizes everything that depends on the rest
/// pose; [`solve`](Self::solve) then only builds right-hand sides and runs
/// substitutions, so it can be called once per animation frame. Solving takes
/// `&self` and the solver is `Sync`, so frames can be solved concurrently.
///
/// Rest coordinates are expressed relative to an anchor (the centroid of the
/// pinned rest positions) and targets relative to their own centroid. Moving
/// all targets by the same rigid motion therefore moves the result by exactly
/// that motion. Pins that share one rest position carry no orientation, so
/// they translate the mesh.
#[derive(Debug, Clone)]
pub struct ArapSolver {
    mesh: Mesh,
    topology: Topology,
    pins: Vec<usize>,
    options: ArapOptions,
    /// Origin of the frame the operators were built in.
    anchor: Point2<f64>,
    /// Centroid of the rest positions of the pins.
    pin_centroid: Point2<f64>,
    system: ArapSystem,
}

impl ArapSolver {
    /// Build a solver with default options.
    ///
    /// # Arguments
    ///
    /// * `pins` - Distinct vertex IDs held at targets; the order of targets
    ///   passed to [`solve`](Self::solve) follows this order
    /// * `triangles` - Vertex index triples
    /// * `vertices` - Rest-pose positions, indexed by vertex ID
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The triangles do not form a valid mesh ([`ArapError::InvalidTopology`])
    /// - The pins are empty, repeated, or out of range ([`ArapError::InvalidPinSet`])
    /// - An edge neighborhood is degenerate ([`ArapError::SingularNeighborhood`])
    /// - The pins do not determine the deformation ([`ArapError::SingularSystem`])
    pub fn new(pins: &[usize], triangles: &[[usize; 3]], vertices: &[Point2<f64>]) -> Result<Self> {
        Self::with_options(pins, triangles, vertices, &ArapOptions::default())
    }

    /// Build a solver with explicit options.
    pub fn with_options(
        pins: &[usize],
        triangles: &[[usize; 3]],
        vertices: &[Point2<f64>],
        options: &ArapOptions,
    ) -> Result<Self> {
        Self::from_mesh(Mesh::from_slices(vertices, triangles)?, pins, options)
    }

    /// Build a solver for an already validated mesh.
    pub fn from_mesh(mesh: Mesh, pins: &[usize], options: &ArapOptions) -> Result<Self> {
        let start = Instant::now();
        options.validate()?;
        validate_pins(pins, mesh.num_vertices())?;

        let topology = Topology::new(&mesh);
        let pin_centroid = centroid(pins.iter().map(|&v| mesh.position(v)));
        let anchor = choose_anchor(&mesh, pins, pin_centroid);

        let rest: Vec<Point2<f64>> = mesh
            .vertices()
            .iter()
            .map(|p| Point2::from(p - anchor))
            .collect();
        let system = ArapSystem::assemble(&topology, &rest, pins, options)?;

        info!(
            "ARAP solver ready: {} vertices, {} edges, {} pins ({:.2?})",
            mesh.num_vertices(),
            topology.num_edges(),
            pins.len(),
            start.elapsed()
        );

        Ok(Self {
            mesh,
            topology,
            pins: pins.to_vec(),
            options: options.clone(),
            anchor,
            pin_centroid,
            system,
        })
    }

    /// Solve for all vertex positions given new pin targets.
    ///
    /// `targets[i]` is the target of `pins()[i]`. Returns one position per
    /// vertex, in vertex-ID order.
    ///
    /// # Errors
    ///
    /// - [`ArapError::ShapeMismatch`] if the number of targets differs from
    ///   the number of pins
    /// - [`ArapError::InvalidParameter`] if a target is not finite
    /// - [`ArapError::DegenerateRotation`] if an edge collapses during relaxation
    /// - [`ArapError::SingularSystem`] or [`ArapError::ConvergenceFailed`] if a
    ///   linear solve fails
    pub fn solve(&self, targets: &[Point2<f64>]) -> Result<Vec<Point2<f64>>> {
        self.solve_detailed(targets).map(|d| d.positions)
    }

    /// Solve and also return the per-edge rotations.
    pub fn solve_detailed(&self, targets: &[Point2<f64>]) -> Result<Deformation> {
        self.check_targets(targets)?;

        let n_edges = self.topology.num_edges();
        let n_pins = self.pins.len();
        let w = self.options.pin_weight;

        // Targets in the operator frame
        let shift = centroid(targets.iter().copied()) - self.pin_centroid;
        let local: Vec<Vector2<f64>> = targets
            .iter()
            .map(|t| t - shift - self.anchor)
            .collect();

        // Stage 1: similarity-invariant relaxation
        let mut b1 = DVector::zeros(2 * (n_edges + n_pins));
        for (p, t) in local.iter().enumerate() {
            b1[2 * (n_edges + p)] = w * t.x;
            b1[2 * (n_edges + p) + 1] = w * t.y;
        }
        let rhs1 = self.system.relax.transpose_mul_vec(&b1);
        let v1 = self.system.relax_normal.solve(&rhs1, Stage::Relaxation)?;

        // Per-edge rotations, applied to rest-pose edge vectors
        let raw = self.system.similarity.mul_vec(&v1);
        let rotations = self.extract_rotations(&raw)?;

        // Stage 2: edge-consistent resolve, x and y share the operator
        let mut bx = DVector::zeros(n_edges + n_pins);
        let mut by = DVector::zeros(n_edges + n_pins);
        for (k, (edge, rotation)) in self.topology.edges().iter().zip(&rotations).enumerate() {
            let e = rotation.apply(&self.mesh.edge_vector(edge.from, edge.to));
            bx[k] = e.x;
            by[k] = e.y;
        }
        for (p, t) in local.iter().enumerate() {
            bx[n_edges + p] = w * t.x;
            by[n_edges + p] = w * t.y;
        }
        let rhs2 = DMatrix::from_columns(&[
            self.system.resolve.transpose_mul_vec(&bx),
            self.system.resolve.transpose_mul_vec(&by),
        ]);
        let v2 = self.system.resolve_normal.solve_columns(&rhs2, Stage::Resolve)?;

        let offset = self.anchor.coords + shift;
        let positions = (0..self.mesh.num_vertices())
            .map(|v| Point2::new(v2[(v, 0)], v2[(v, 1)]) + offset)
            .collect();

        trace!("Solved {} pin targets", n_pins);

        Ok(Deformation {
            positions,
            rotations,
        })
    }

    /// Solve many independent pin configurations.
    ///
    /// Results are returned in input order. Frames run on the rayon thread
    /// pool when [`ArapOptions::parallel`] is set.
    pub fn solve_batch<T>(&self, frames: &[T]) -> Result<Vec<Vec<Point2<f64>>>>
    where
        T: AsRef<[Point2<f64>]> + Sync,
    {
        let results: Vec<Result<Vec<Point2<f64>>>> = if self.options.parallel {
            frames.par_iter().map(|f| self.solve(f.as_ref())).collect()
        } else {
            frames.iter().map(|f| self.solve(f.as_ref())).collect()
        };
        results.into_iter().collect()
    }

    /// The rest-pose mesh.
    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Edges and adjacency of the mesh.
    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Pinned vertex IDs, in target order.
    #[inline]
    pub fn pins(&self) -> &[usize] {
        &self.pins
    }

    /// Rest-pose positions of the pins, in target order.
    pub fn rest_pin_positions(&self) -> Vec<Point2<f64>> {
        self.pins.iter().map(|&v| self.mesh.position(v)).collect()
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.mesh.num_vertices()
    }

    /// Number of directed edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.topology.num_edges()
    }

    /// Number of pins.
    #[inline]
    pub fn num_pins(&self) -> usize {
        self.pins.len()
    }

    /// Options the solver was built with.
    #[inline]
    pub fn options(&self) -> &ArapOptions {
        &self.options
    }

    fn check_targets(&self, targets: &[Point2<f64>]) -> Result<()> {
        if targets.len() != self.pins.len() {
            return Err(ArapError::ShapeMismatch {
                expected: self.pins.len(),
                actual: targets.len(),
            });
        }
        if let Some(t) = targets.iter().find(|t| !(t.x.is_finite() && t.y.is_finite())) {
            return Err(ArapError::invalid_param(
                "pin_targets",
                format!("({}, {})", t.x, t.y),
                "targets must be finite",
            ));
        }
        Ok(())
    }

    /// Normalize the raw `(c, s)` pair of every edge.
    ///
    /// On failure the lowest collapsed edge is reported, independent of
    /// scheduling.
    fn extract_rotations(&self, raw: &DVector<f64>) -> Result<Vec<EdgeRotation>> {
        let epsilon = self.options.rotation_epsilon;
        let normalize = |k: usize| -> Result<EdgeRotation> {
            let (c, s) = (raw[2 * k], raw[2 * k + 1]);
            let norm = c.hypot(s);
            if !(norm > epsilon) {
                return Err(ArapError::DegenerateRotation { edge: k, norm });
            }
            Ok(EdgeRotation {
                c: c / norm,
                s: s / norm,
            })
        };

        let n_edges = self.topology.num_edges();
        let rotations: Vec<Result<EdgeRotation>> = if self.options.parallel {
            (0..n_edges).into_par_iter().map(normalize).collect()
        } else {
            (0..n_edges).map(normalize).collect()
        };
        rotations.into_iter().collect()
    }
}

fn validate_pins(pins: &[usize], n_vertices: usize) -> Result<()> {
    if pins.is_empty() {
        return Err(ArapError::pins("at least one pin is required"));
    }

    let mut seen = vec![false; n_vertices];
    for &v in pins {
        if v >= n_vertices {
            return Err(ArapError::pins(format!(
                "pin vertex {v} is out of range ({n_vertices} vertices)"
            )));
        }
        if std::mem::replace(&mut seen[v], true) {
            return Err(ArapError::pins(format!("vertex {v} is pinned twice")));
        }
    }
    Ok(())
}

fn centroid(points: impl Iterator<Item = Point2<f64>>) -> Point2<f64> {
    let (sum, count) = points.fold((Vector2::zeros(), 0usize), |(sum, n), p| {
        (sum + p.coords, n + 1)
    });
    Point2::from(sum / count.max(1) as f64)
}

/// Pin centroid, unless all pins sit on one point.
///
/// Similarities about the anchor are invisible to the relaxation stage, so
/// pins that coincide with the anchor would leave rotation and scale free.
/// Coincident pins use a point one diagonal below the bounding box instead,
/// which no pin and no stencil centroid can reach.
fn choose_anchor(mesh: &Mesh, pins: &[usize], pin_centroid: Point2<f64>) -> Point2<f64> {
    let Some((lo, hi)) = mesh.bounding_box() else {
        return pin_centroid;
    };
    let diagonal = hi - lo;
    let spread = pins
        .iter()
        .map(|&v| (mesh.position(v) - pin_centroid).norm())
        .fold(0.0, f64::max);

    if spread > PIN_SPREAD_EPSILON * diagonal.norm() {
        pin_centroid
    } else {
        lo - diagonal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::arap::LinearSolver;
    use crate::mesh::generators;
    use nalgebra::Rotation2;

    fn square() -> (Vec<Point2<f64>>, Vec<[usize; 3]>) {
        (
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    fn assert_close(a: &[Point2<f64>], b: &[Point2<f64>], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (i, (p, q)) in a.iter().zip(b).enumerate() {
            assert!(
                (p - q).norm() < tol,
                "vertex {}: {:?} vs {:?}",
                i,
                p,
                q
            );
        }
    }

    fn grid_solver(options: &ArapOptions) -> ArapSolver {
        let mesh = generators::grid(4, 3, 4.0, 3.0).unwrap();
        // Bottom corners and top corners
        ArapSolver::from_mesh(mesh, &[0, 4, 15, 19], options).unwrap()
    }

    #[test]
    fn test_identity() {
        let (vertices, triangles) = square();
        let solver = ArapSolver::new(&[0, 1], &triangles, &vertices).unwrap();

        let result = solver.solve(&solver.rest_pin_positions()).unwrap();
        assert_close(&result, &vertices, 1e-8);
    }

    #[test]
    fn test_identity_grid() {
        let solver = grid_solver(&ArapOptions::default());

        let result = solver.solve(&solver.rest_pin_positions()).unwrap();
        assert_close(&result, solver.mesh().vertices(), 1e-7);
    }

    #[test]
    fn test_square_stretch() {
        let (vertices, triangles) = square();
        let solver = ArapSolver::new(&[0, 1], &triangles, &vertices).unwrap();

        let result = solver
            .solve(&[Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)])
            .unwrap();

        // Pins hold within the tolerance of the weight
        assert!((result[0] - Point2::new(0.0, 0.0)).norm() < 1e-4);
        assert!((result[1] - Point2::new(2.0, 0.0)).norm() < 1e-4);

        // Free vertices settle where the rotated rest edges fit best
        assert_close(
            &result[2..],
            &[Point2::new(9.0 / 7.0, 1.0), Point2::new(1.0 / 7.0, 1.0)],
            1e-4,
        );

        // The vertical side keeps its rest length
        assert!(((result[3] - result[0]).norm() - (1.0f64 + 1.0 / 49.0).sqrt()).abs() < 1e-4);
        assert!(((result[2] - result[3]).norm() - 8.0 / 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_rigid_motion_invariance() {
        let solver = grid_solver(&ArapOptions::default());
        let rotation = Rotation2::new(0.9);
        let translation = Vector2::new(-3.0, 7.5);
        let motion = |p: &Point2<f64>| rotation * p + translation;

        let targets: Vec<_> = solver.rest_pin_positions().iter().map(motion).collect();
        let expected: Vec<_> = solver.mesh().vertices().iter().map(motion).collect();

        let result = solver.solve(&targets).unwrap();
        assert_close(&result, &expected, 1e-6);
    }

    #[test]
    fn test_rigid_motion_of_deformed_pose() {
        let solver = grid_solver(&ArapOptions::default());
        let mut targets = solver.rest_pin_positions();
        targets[2] += Vector2::new(1.0, 0.5);
        targets[3] += Vector2::new(1.5, -0.5);

        let rotation = Rotation2::new(-2.1);
        let translation = Vector2::new(10.0, 4.0);
        let moved: Vec<_> = targets.iter().map(|p| rotation * p + translation).collect();

        let base = solver.solve(&targets).unwrap();
        let expected: Vec<_> = base.iter().map(|p| rotation * p + translation).collect();
        let result = solver.solve(&moved).unwrap();
        assert_close(&result, &expected, 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let solver = grid_solver(&ArapOptions::default());
        let mut targets = solver.rest_pin_positions();
        targets[3] += Vector2::new(2.0, 1.0);

        let a = solver.solve(&targets).unwrap();
        let b = solver.solve(&targets).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rotations_are_normalized() {
        let solver = grid_solver(&ArapOptions::default());
        let mut targets = solver.rest_pin_positions();
        targets[2] += Vector2::new(2.0, -1.0);
        targets[3] += Vector2::new(3.0, 0.5);

        let deformation = solver.solve_detailed(&targets).unwrap();
        assert_eq!(deformation.rotations.len(), solver.num_edges());
        for r in &deformation.rotations {
            assert!((r.c * r.c + r.s * r.s - 1.0).abs() < 1e-12);
            assert!((r.matrix().determinant() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rotations_follow_rigid_turn() {
        let (vertices, triangles) = square();
        let solver = ArapSolver::new(&[0, 1], &triangles, &vertices).unwrap();
        let angle = 0.4;
        let rotation = Rotation2::new(angle);

        let targets: Vec<_> = solver
            .rest_pin_positions()
            .iter()
            .map(|p| rotation * p)
            .collect();
        let deformation = solver.solve_detailed(&targets).unwrap();

        for r in &deformation.rotations {
            assert!((r.angle() - angle).abs() < 1e-8);
        }
    }

    #[test]
    fn test_pin_weight_tightens_match() {
        let (vertices, triangles) = square();
        let targets = [Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)];

        let pin_error = |weight: f64| {
            let options = ArapOptions::default().with_pin_weight(weight);
            let solver = ArapSolver::with_options(&[0, 1], &triangles, &vertices, &options).unwrap();
            let result = solver.solve(&targets).unwrap();
            (result[1] - targets[1]).norm()
        };

        let loose = pin_error(10.0);
        let tight = pin_error(1000.0);
        assert!(tight < loose);
        assert!(tight < 1e-4);
    }

    #[test]
    fn test_single_triangle() {
        let vertices = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 1.0),
        ];
        let solver = ArapSolver::new(&[0, 1], &[[0, 1, 2]], &vertices).unwrap();
        assert!(solver.topology().stencil(0).unwrap().is_boundary());

        let result = solver
            .solve(&[Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)])
            .unwrap();
        assert!((result[2] - Point2::new(1.0, 1.0)).norm() < 1e-4);
    }

    #[test]
    fn test_single_pin_drags_mesh() {
        let (vertices, triangles) = square();
        let solver = ArapSolver::new(&[0], &triangles, &vertices).unwrap();

        let result = solver.solve(&[Point2::new(2.0, 3.0)]).unwrap();
        let expected: Vec<_> = vertices.iter().map(|p| p + Vector2::new(2.0, 3.0)).collect();
        assert_close(&result, &expected, 1e-6);
    }

    #[test]
    fn test_single_pin_on_mesh_centroid() {
        // Vertex 4 is the center of a 2 x 2 grid
        let mesh = generators::grid(2, 2, 2.0, 2.0).unwrap();
        let rest = mesh.vertices().to_vec();
        let solver = ArapSolver::from_mesh(mesh, &[4], &ArapOptions::default()).unwrap();

        let result = solver.solve(&[Point2::new(2.0, -1.0)]).unwrap();
        let expected: Vec<_> = rest.iter().map(|p| p + Vector2::new(1.0, -2.0)).collect();
        assert_close(&result, &expected, 1e-6);
    }

    #[test]
    fn test_single_pin_on_fan_center() {
        let mesh = generators::fan(8, 1.0).unwrap();
        let shifted: Vec<_> = mesh
            .vertices()
            .iter()
            .map(|p| p + Vector2::new(5.0, 5.0))
            .collect();
        let solver = ArapSolver::new(&[0], mesh.triangles(), &shifted).unwrap();

        let result = solver.solve(&[Point2::new(5.0, 5.0)]).unwrap();
        assert_close(&result, &shifted, 1e-6);
    }

    #[test]
    fn test_single_triangle_single_pin() {
        let vertices = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 1.0),
        ];
        let solver = ArapSolver::new(&[1], &[[0, 1, 2]], &vertices).unwrap();

        let result = solver.solve(&[Point2::new(3.0, 1.0)]).unwrap();
        let expected: Vec<_> = vertices.iter().map(|p| p + Vector2::new(2.0, 1.0)).collect();
        assert_close(&result, &expected, 1e-6);
    }

    #[test]
    fn test_small_scale_square() {
        let (vertices, triangles) = square();
        let scale = 1e-4;
        let small: Vec<_> = vertices.iter().map(|p| Point2::from(p.coords * scale)).collect();
        let solver = ArapSolver::new(&[0, 1], &triangles, &small).unwrap();

        let result = solver
            .solve(&[Point2::origin(), Point2::new(2.0 * scale, 0.0)])
            .unwrap();
        assert_close(
            &result[2..],
            &[
                Point2::new(9.0 / 7.0 * scale, scale),
                Point2::new(1.0 / 7.0 * scale, scale),
            ],
            1e-4 * scale,
        );
    }

    #[test]
    fn test_backends_agree() {
        let direct = grid_solver(&ArapOptions::default());
        let iterative = grid_solver(
            &ArapOptions::default().with_linear_solver(LinearSolver::ConjugateGradient {
                max_iterations: 20_000,
                tolerance: 1e-14,
            }),
        );

        let mut targets = direct.rest_pin_positions();
        targets[2] += Vector2::new(-1.0, 1.0);
        targets[3] += Vector2::new(1.0, 1.0);

        let a = direct.solve(&targets).unwrap();
        let b = iterative.solve(&targets).unwrap();
        assert_close(&a, &b, 1e-5);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let solver = grid_solver(&ArapOptions::default());
        let frames: Vec<Vec<Point2<f64>>> = (0..4)
            .map(|i| {
                let mut targets = solver.rest_pin_positions();
                targets[3] += Vector2::new(0.5 * i as f64, 0.25 * i as f64);
                targets
            })
            .collect();

        let batch = solver.solve_batch(&frames).unwrap();
        assert_eq!(batch.len(), 4);
        for (frame, solved) in frames.iter().zip(&batch) {
            assert_eq!(&solver.solve(frame).unwrap(), solved);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let (vertices, triangles) = square();
        let solver = ArapSolver::new(&[0, 1], &triangles, &vertices).unwrap();

        match solver.solve(&[Point2::origin()]) {
            Err(ArapError::ShapeMismatch { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("Expected ShapeMismatch, got {:?}", other),
        }

        // The solver stays usable after a failed call
        assert!(solver.solve(&solver.rest_pin_positions()).is_ok());
    }

    #[test]
    fn test_non_finite_target() {
        let (vertices, triangles) = square();
        let solver = ArapSolver::new(&[0, 1], &triangles, &vertices).unwrap();

        let result = solver.solve(&[Point2::origin(), Point2::new(f64::NAN, 0.0)]);
        assert!(matches!(result, Err(ArapError::InvalidParameter { .. })));
    }

    #[test]
    fn test_degenerate_rotation() {
        let (vertices, triangles) = square();
        let options = ArapOptions::default().with_rotation_epsilon(1e-12);
        let solver = ArapSolver::with_options(&[0, 1], &triangles, &vertices, &options).unwrap();

        // Both pins on the same point collapse every neighborhood
        let result = solver.solve(&[Point2::new(3.0, 3.0), Point2::new(3.0, 3.0)]);
        assert!(matches!(result, Err(ArapError::DegenerateRotation { .. })));
    }

    #[test]
    fn test_invalid_pin_sets() {
        let (vertices, triangles) = square();

        for pins in [&[][..], &[0, 4][..], &[1, 2, 1][..]] {
            assert!(matches!(
                ArapSolver::new(pins, &triangles, &vertices),
                Err(ArapError::InvalidPinSet { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_topology() {
        let (vertices, _) = square();
        assert!(matches!(
            ArapSolver::new(&[0], &[[0, 1, 9]], &vertices),
            Err(ArapError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn test_unpinned_component_is_singular() {
        // Two separate triangles, only the first is pinned
        let vertices = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(5.0, 0.0),
            Point2::new(6.0, 0.0),
            Point2::new(5.0, 1.0),
        ];
        let triangles = [[0, 1, 2], [3, 4, 5]];

        assert!(matches!(
            ArapSolver::new(&[0, 1], &triangles, &vertices),
            Err(ArapError::SingularSystem { .. })
        ));
    }

    #[test]
    fn test_solver_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ArapSolver>();
    }
}
