//! Rest-pose mesh data.
//!
//! A [`Mesh`] is the immutable, validated 2D triangle mesh a deformation is
//! built from. Vertices are identified by their index in the vertex list and
//! triangles are ordered triples of vertex indices.
//!
//! ```
//! use arap2d::mesh::Mesh;
//! use nalgebra::Point2;
//!
//! let vertices = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(0.5, 1.0),
//! ];
//! let mesh = Mesh::new(vertices, vec![[0, 1, 2]]).unwrap();
//! assert_eq!(mesh.num_vertices(), 3);
//! assert_eq!(mesh.num_triangles(), 1);
//! ```

pub mod generators;
mod topology;

pub use topology::{Edge, EdgeStencil, Topology};

use nalgebra::{Point2, Vector2};

use crate::error::{ArapError, Result};

/// A validated 2D triangle mesh in its rest pose.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Point2<f64>>,
    triangles: Vec<[usize; 3]>,
}

impl Mesh {
    /// Build a mesh, validating the triangle list against the vertices.
    ///
    /// # Errors
    ///
    /// Returns [`ArapError::InvalidTopology`] if:
    /// - there are no triangles
    /// - a triangle references a vertex that does not exist
    /// - a triangle repeats a vertex
    /// - a vertex is not referenced by any triangle
    /// - a coordinate is not finite
    pub fn new(vertices: Vec<Point2<f64>>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        if triangles.is_empty() {
            return Err(ArapError::topology("mesh has no triangles"));
        }

        if let Some(v) = vertices
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite()))
        {
            return Err(ArapError::topology(format!(
                "vertex {v} has a non-finite position"
            )));
        }

        let mut referenced = vec![false; vertices.len()];
        for (ti, tri) in triangles.iter().enumerate() {
            for &v in tri {
                if v >= vertices.len() {
                    return Err(ArapError::topology(format!(
                        "triangle {ti} references invalid vertex index {v}"
                    )));
                }
                referenced[v] = true;
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return Err(ArapError::topology(format!(
                    "triangle {ti} is degenerate (has duplicate vertices)"
                )));
            }
        }

        if let Some(v) = referenced.iter().position(|&r| !r) {
            return Err(ArapError::topology(format!(
                "vertex {v} is not referenced by any triangle"
            )));
        }

        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Build a mesh from borrowed slices.
    pub fn from_slices(vertices: &[Point2<f64>], triangles: &[[usize; 3]]) -> Result<Self> {
        Self::new(vertices.to_vec(), triangles.to_vec())
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Rest-pose vertex positions, indexed by vertex ID.
    #[inline]
    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    /// Triangles as vertex index triples.
    #[inline]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Rest-pose position of a vertex.
    #[inline]
    pub fn position(&self, v: usize) -> Point2<f64> {
        self.vertices[v]
    }

    /// Rest-pose vector from `from` to `to`.
    #[inline]
    pub fn edge_vector(&self, from: usize, to: usize) -> Vector2<f64> {
        self.vertices[to] - self.vertices[from]
    }

    /// Average of all vertex positions.
    pub fn centroid(&self) -> Point2<f64> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / self.vertices.len() as f64)
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounding_box(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), p| {
            (
                Point2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }

    /// Signed area of a triangle (positive for counter-clockwise winding).
    pub fn triangle_area(&self, t: usize) -> f64 {
        let [a, b, c] = self.triangles[t];
        let ab = self.edge_vector(a, b);
        let ac = self.edge_vector(a, c);
        0.5 * ab.perp(&ac)
    }
}
