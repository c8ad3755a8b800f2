//! Rig documents: a rest mesh, its pins, and pin targets per frame.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mesh::Mesh;

/// A deformable 2D rig.
///
/// ```json
/// {
///   "vertices": [[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]],
///   "triangles": [[0, 1, 2]],
///   "pins": [0, 1],
///   "frames": [[[0.0, 0.0], [2.0, 0.0]]]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rig {
    /// Rest-pose vertex positions.
    pub vertices: Vec<[f64; 2]>,
    /// Vertex index triples.
    pub triangles: Vec<[usize; 3]>,
    /// Pinned vertex IDs.
    pub pins: Vec<usize>,
    /// Pin targets of every frame, in pin order.
    #[serde(default)]
    pub frames: Vec<Vec<[f64; 2]>>,
}

impl Rig {
    /// Rig for an existing mesh with no frames yet.
    pub fn from_mesh(mesh: &Mesh, pins: Vec<usize>) -> Self {
        Self {
            vertices: mesh.vertices().iter().map(|p| [p.x, p.y]).collect(),
            triangles: mesh.triangles().to_vec(),
            pins,
            frames: Vec::new(),
        }
    }

    /// Validated rest mesh.
    pub fn mesh(&self) -> Result<Mesh> {
        let vertices = self
            .vertices
            .iter()
            .map(|&[x, y]| Point2::new(x, y))
            .collect();
        Mesh::new(vertices, self.triangles.clone())
    }

    /// Append a frame of pin targets.
    pub fn push_frame(&mut self, targets: &[Point2<f64>]) {
        self.frames.push(targets.iter().map(|p| [p.x, p.y]).collect());
    }

    /// Pin targets of every frame as points.
    pub fn targets(&self) -> Vec<Vec<Point2<f64>>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|&[x, y]| Point2::new(x, y)).collect())
            .collect()
    }

    /// Number of frames.
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }
}
