//! Solved animation export.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;

/// One solved frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    /// Frame index.
    pub frame: u32,
    /// Interleaved `[x0, y0, x1, y1, ...]`.
    pub positions: Vec<f64>,
}

/// Deformed vertex positions of a mesh over time, ready for a viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    /// Vertices per frame.
    pub vertex_count: usize,
    /// Flat triangle indices, three per triangle.
    pub triangles: Vec<u32>,
    /// Solved frames.
    pub frames: Vec<AnimationFrame>,
}

impl Animation {
    /// Animation of `mesh` through the given solved positions.
    pub fn from_frames<T: AsRef<[Point2<f64>]>>(mesh: &Mesh, frames: &[T]) -> Self {
        let triangles = mesh
            .triangles()
            .iter()
            .flat_map(|t| t.map(|v| v as u32))
            .collect();

        let frames = frames
            .iter()
            .enumerate()
            .map(|(i, positions)| AnimationFrame {
                frame: i as u32,
                positions: positions
                    .as_ref()
                    .iter()
                    .flat_map(|p| [p.x, p.y])
                    .collect(),
            })
            .collect();

        Self {
            vertex_count: mesh.num_vertices(),
            triangles,
            frames,
        }
    }

    /// Number of frames.
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Positions of frame `i` as points.
    pub fn positions(&self, i: usize) -> Option<Vec<Point2<f64>>> {
        self.frames.get(i).map(|f| {
            f.positions
                .chunks_exact(2)
                .map(|c| Point2::new(c[0], c[1]))
                .collect()
        })
    }
}
