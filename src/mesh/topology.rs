//! Edge and adjacency extraction.
//!
//! Every triangle side becomes its own directed edge, in the per-triangle
//! order `(v0, v1), (v1, v2), (v2, v0)`. An interior edge shared by two
//! triangles therefore appears twice, once in each direction, so each
//! triangle penalizes distortion of its own copy.

use std::collections::BTreeSet;

use super::Mesh;
use crate::error::{ArapError, Result};

/// A directed edge between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Start vertex.
    pub from: usize,
    /// End vertex.
    pub to: usize,
}

impl Edge {
    /// Create a new directed edge.
    #[inline]
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// The vertices an edge's local frame is fitted to.
///
/// The first two entries are always the edge endpoints, followed by the
/// vertices opposite the edge in its adjacent triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStencil {
    /// Edge on the mesh boundary: `[from, to, opposite]`.
    Boundary([usize; 3]),
    /// Edge shared by two triangles: `[from, to, left, right]`.
    Interior([usize; 4]),
}

impl EdgeStencil {
    /// Stencil vertices in scatter order.
    #[inline]
    pub fn vertices(&self) -> &[usize] {
        match self {
            EdgeStencil::Boundary(v) => v,
            EdgeStencil::Interior(v) => v,
        }
    }

    /// Whether the stencil belongs to a boundary edge.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        matches!(self, EdgeStencil::Boundary(_))
    }
}

/// Directed edges and vertex adjacency of a triangle mesh.
#[derive(Debug, Clone)]
pub struct Topology {
    edges: Vec<Edge>,
    neighbors: Vec<BTreeSet<usize>>,
}

impl Topology {
    /// Extract edges and vertex neighbors from a mesh.
    pub fn new(mesh: &Mesh) -> Self {
        Self::from_triangles(mesh.triangles(), mesh.num_vertices())
    }

    /// Extract edges and vertex neighbors from a raw triangle list.
    ///
    /// Triangle indices must be smaller than `n_vertices`.
    pub fn from_triangles(triangles: &[[usize; 3]], n_vertices: usize) -> Self {
        let mut edges = Vec::with_capacity(triangles.len() * 3);
        let mut neighbors = vec![BTreeSet::new(); n_vertices];

        for &[v0, v1, v2] in triangles {
            edges.push(Edge::new(v0, v1));
            edges.push(Edge::new(v1, v2));
            edges.push(Edge::new(v2, v0));

            neighbors[v0].extend([v1, v2]);
            neighbors[v1].extend([v2, v0]);
            neighbors[v2].extend([v0, v1]);
        }

        Self { edges, neighbors }
    }

    /// Number of directed edges (three per triangle).
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// All directed edges in triangle order.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Vertices sharing a triangle with `v`, in ascending order.
    #[inline]
    pub fn vertex_neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors[v].iter().copied()
    }

    /// Number of vertices sharing a triangle with `v`.
    #[inline]
    pub fn valence(&self, v: usize) -> usize {
        self.neighbors[v].len()
    }

    /// Build the stencil of edge `k`.
    ///
    /// The opposite vertices are the common neighbors of both endpoints,
    /// in ascending vertex order.
    ///
    /// # Errors
    ///
    /// Returns [`ArapError::InvalidTopology`] if the edge has more than two
    /// opposite vertices (non-manifold edge).
    pub fn stencil(&self, k: usize) -> Result<EdgeStencil> {
        let Edge { from, to } = self.edges[k];
        let mut opposite = self.neighbors[from].intersection(&self.neighbors[to]).copied();

        match (opposite.next(), opposite.next(), opposite.next()) {
            (Some(l), None, _) => Ok(EdgeStencil::Boundary([from, to, l])),
            (Some(l), Some(r), None) => Ok(EdgeStencil::Interior([from, to, l, r])),
            (None, _, _) => Err(ArapError::topology(format!(
                "edge ({from}, {to}) has no adjacent triangle"
            ))),
            _ => Err(ArapError::topology(format!(
                "edge ({from}, {to}) has more than two incident triangles"
            ))),
        }
    }

    /// Number of edges with a boundary stencil.
    pub fn boundary_edge_count(&self) -> usize {
        (0..self.num_edges())
            .filter(|&k| matches!(self.stencil(k), Ok(s) if s.is_boundary()))
            .count()
    }
}
