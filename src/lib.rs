//! # arap2d
//!
//! As-rigid-as-possible shape manipulation for 2D triangle meshes.
//!
//! A mesh is deformed by dragging a few pinned vertices; every other vertex
//! follows so that local neighborhoods rotate instead of shearing or
//! stretching. The heavy work (operator assembly and factorization) happens
//! once per mesh and pin set, after which each new set of pin targets is a
//! cheap solve, suitable for interactive use and for animating a rig frame by
//! frame.
//!
//! ## Features
//!
//! - **Two-stage solver**: similarity-invariant relaxation followed by a
//!   scale-free edge resolve
//! - **Prepared factorizations**: dense Cholesky once at construction, or
//!   conjugate gradient on the sparse normal matrices
//! - **Parallel**: local frames, rotation extraction and batch solves on rayon
//! - **JSON rigs**: load pin animations and export solved frames
//!
//! ## Quick Start
//!
//! ```
//! use arap2d::prelude::*;
//! use nalgebra::Point2;
//!
//! // A 4 x 2 strip, pinned at its four corners
//! let mesh = generators::grid(4, 2, 4.0, 2.0).unwrap();
//! let pins = [0, 4, 10, 14];
//! let solver = ArapSolver::from_mesh(mesh, &pins, &ArapOptions::default()).unwrap();
//!
//! // Lift the right end
//! let mut targets = solver.rest_pin_positions();
//! targets[1] += nalgebra::Vector2::new(0.0, 1.0);
//! targets[3] += nalgebra::Vector2::new(0.0, 1.0);
//!
//! let deformed = solver.solve(&targets).unwrap();
//! assert_eq!(deformed.len(), 15);
//! assert!((deformed[0] - Point2::new(0.0, 0.0)).norm() < 1e-3);
//! ```
//!
//! ## Animating a Rig
//!
//! ```no_run
//! use arap2d::prelude::*;
//!
//! let rig = arap2d::io::load_rig("rig.json").unwrap();
//! let solver = ArapSolver::from_mesh(rig.mesh().unwrap(), &rig.pins, &ArapOptions::default())
//!     .unwrap();
//!
//! let frames = solver.solve_batch(&rig.targets()).unwrap();
//! let animation = Animation::from_frames(solver.mesh(), &frames);
//! arap2d::io::save_animation(&animation, "animation.json").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use arap2d::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::arap::{
        ArapOptions, ArapSolver, Deformation, EdgeRotation, LinearSolver,
    };
    pub use crate::error::{ArapError, Result};
    pub use crate::io::{Animation, Rig};
    pub use crate::mesh::{generators, Edge, EdgeStencil, Mesh, Topology};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
