//! Structured triangulations of rectangles.
//!
//! Node numbering is row-major: node `(i, j)` has id `j * (nx + 1) + i`.
//! Each quadrilateral cell is split along the diagonal from its lower-left
//! to its upper-right corner, giving two counter-clockwise triangles.

use crate::boundary::{edges_from_node_chain, Boundary};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::types::Point2;
use tracing::debug;

/// Triangulate the unit square with `nx × ny` cells.
///
/// Returns the mesh together with the `left`, `right`, `bottom` and `top`
/// boundary groups, read off the grid structure. The boundary is validated
/// strictly before it is returned.
pub fn unit_square(nx: usize, ny: usize) -> Result<(Mesh, Boundary)> {
    if nx == 0 || ny == 0 {
        return Err(Error::Shape(format!(
            "structured mesh needs nx, ny >= 1, got nx={}, ny={}",
            nx, ny
        )));
    }

    let nid = |i: usize, j: usize| j * (nx + 1) + i;

    let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            nodes.push(Point2::new(i as f64 / nx as f64, j as f64 / ny as f64));
        }
    }

    let mut triangles = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let n00 = nid(i, j);
            let n10 = nid(i + 1, j);
            let n01 = nid(i, j + 1);
            let n11 = nid(i + 1, j + 1);
            triangles.push([n00, n10, n11]);
            triangles.push([n00, n11, n01]);
        }
    }

    let left: Vec<usize> = (0..=ny).map(|j| nid(0, j)).collect();
    let right: Vec<usize> = (0..=ny).map(|j| nid(nx, j)).collect();
    let bottom: Vec<usize> = (0..=nx).map(|i| nid(i, 0)).collect();
    let top: Vec<usize> = (0..=nx).map(|i| nid(i, ny)).collect();

    let boundary = Boundary::new()
        .with_edges("left", edges_from_node_chain(&left))
        .with_edges("right", edges_from_node_chain(&right))
        .with_edges("bottom", edges_from_node_chain(&bottom))
        .with_edges("top", edges_from_node_chain(&top))
        .with_nodes("left", left)
        .with_nodes("right", right)
        .with_nodes("bottom", bottom)
        .with_nodes("top", top);

    let mesh = Mesh::new(nodes, triangles)?;
    boundary.validate(&mesh, true)?;

    debug!(
        nx,
        ny,
        n_nodes = mesh.n_nodes(),
        n_triangles = mesh.n_triangles(),
        "generated structured unit-square mesh"
    );

    Ok((mesh, boundary))
}

/// Triangulate the rectangle `[0, width] × [0, height]` with `nx × ny` cells.
///
/// Same numbering and boundary groups as [`unit_square`].
pub fn rectangle(nx: usize, ny: usize, width: f64, height: f64) -> Result<(Mesh, Boundary)> {
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
        return Err(Error::Shape(format!(
            "rectangle extents must be positive and finite, got {} x {}",
            width, height
        )));
    }

    let (mut mesh, boundary) = unit_square(nx, ny)?;
    mesh.scale(width, height);
    Ok((mesh, boundary))
}
