//! Procedural test meshes.

use std::f64::consts::PI;

use nalgebra::Point2;

use super::Mesh;
use crate::error::{ArapError, Result};

/// Regular grid of `nx` by `ny` cells spanning `[0, width] x [0, height]`.
///
/// Vertices are numbered row by row starting at the bottom-left corner, and
/// every cell is split along its rising diagonal into two counter-clockwise
/// triangles.
pub fn grid(nx: usize, ny: usize, width: f64, height: f64) -> Result<Mesh> {
    if nx == 0 || ny == 0 {
        return Err(ArapError::invalid_param(
            "grid cells",
            format!("{nx}x{ny}"),
            "must be at least 1x1",
        ));
    }

    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            vertices.push(Point2::new(
                width * i as f64 / nx as f64,
                height * j as f64 / ny as f64,
            ));
        }
    }

    let mut triangles = Vec::with_capacity(nx * ny * 2);
    for j in 0..ny {
        for i in 0..nx {
            let v00 = j * (nx + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (nx + 1);
            let v11 = v01 + 1;

            triangles.push([v00, v10, v11]);
            triangles.push([v00, v11, v01]);
        }
    }

    Mesh::new(vertices, triangles)
}

/// Disk made of `segments` triangles around a center vertex at the origin.
///
/// Vertex 0 is the center; rim vertices follow counter-clockwise from the
/// positive x axis.
pub fn fan(segments: usize, radius: f64) -> Result<Mesh> {
    if segments < 3 {
        return Err(ArapError::invalid_param(
            "segments",
            segments,
            "a fan needs at least 3 segments",
        ));
    }

    let mut vertices = Vec::with_capacity(segments + 1);
    vertices.push(Point2::origin());
    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        vertices.push(Point2::new(radius * angle.cos(), radius * angle.sin()));
    }

    let triangles = (0..segments)
        .map(|i| [0, 1 + i, 1 + (i + 1) % segments])
        .collect();

    Mesh::new(vertices, triangles)
}
