//! Mesh data structure for linear triangles.
//!
//! Stores nodal coordinates and triangle connectivity. Node ids are 0-based
//! indices into the coordinate list and stay fixed for the mesh's lifetime.

use crate::error::{Error, Result};
use crate::types::Point2;

/// Triangulated 2D mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Nodal coordinates.
    nodes: Vec<Point2>,
    /// Triangle connectivity (3 node ids each).
    triangles: Vec<[usize; 3]>,
}

impl Mesh {
    /// Create a mesh, checking that every triangle references existing nodes.
    ///
    /// Degenerate triangles are accepted here; they are rejected when the
    /// element kernel is evaluated.
    pub fn new(nodes: Vec<Point2>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        let n_nodes = nodes.len();
        for (elem_idx, tri) in triangles.iter().enumerate() {
            if let Some(&bad) = tri.iter().find(|&&n| n >= n_nodes) {
                return Err(Error::Mesh(format!(
                    "triangle {} references node {} (mesh has {} nodes)",
                    elem_idx, bad, n_nodes
                )));
            }
        }
        Ok(Self { nodes, triangles })
    }

    /// Create a mesh from row-major raw arrays.
    ///
    /// `coords` holds `(x, y)` pairs and `connectivity` holds node-id triples.
    pub fn from_flat(coords: &[f64], connectivity: &[usize]) -> Result<Self> {
        if coords.len() % 2 != 0 {
            return Err(Error::Shape(format!(
                "coordinates must have shape (n_nodes, 2), got {} values",
                coords.len()
            )));
        }
        if connectivity.len() % 3 != 0 {
            return Err(Error::Shape(format!(
                "connectivity must have shape (n_triangles, 3), got {} values",
                connectivity.len()
            )));
        }

        let nodes = coords
            .chunks_exact(2)
            .map(|xy| Point2::new(xy[0], xy[1]))
            .collect();
        let triangles = connectivity
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        Self::new(nodes, triangles)
    }

    /// Number of nodes in the mesh.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of triangles in the mesh.
    pub fn n_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Get nodal coordinates.
    pub fn nodes(&self) -> &[Point2] {
        &self.nodes
    }

    /// Get a specific node's coordinates.
    pub fn node(&self, idx: usize) -> Option<&Point2> {
        self.nodes.get(idx)
    }

    /// Get triangle connectivity.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Get a specific triangle's connectivity.
    pub fn triangle(&self, idx: usize) -> Option<&[usize; 3]> {
        self.triangles.get(idx)
    }

    /// Get coordinates for a triangle's vertices.
    pub fn element_coords(&self, elem_idx: usize) -> Option<[Point2; 3]> {
        let tri = self.triangles.get(elem_idx)?;
        Some(tri.map(|n| self.nodes[n]))
    }

    /// Stretch all coordinates by `(sx, sy)`.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        for node in &mut self.nodes {
            node.x *= sx;
            node.y *= sy;
        }
    }

    /// Compute mesh bounding box.
    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        let first = *self.nodes.first()?;
        Some(self.nodes[1..].iter().fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        }))
    }
}
