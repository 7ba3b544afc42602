//! Boundary-condition enforcement on an assembled system.
//!
//! Natural (Neumann/traction) loads are integrated along boundary edges and
//! added to the load vector. Dirichlet constraints are then imposed on the
//! matrix and load vector together, so a constrained row always ends up with
//! its prescribed value no matter what was loaded there before.

use crate::conditions::FieldValue;
use crate::element::gauss::{gauss_legendre_2, EdgeMap};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::sparse::CsrMatrix;
use crate::types::{node_dof, Edge};
use std::collections::BTreeMap;
use tracing::debug;

/// How Dirichlet constraints are imposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirichletMethod {
    /// Replace each constrained row by the identity row and set the load to
    /// the prescribed value. The matrix loses symmetry.
    #[default]
    RowElimination,
    /// Row elimination plus moving constrained columns into the load vector,
    /// which keeps a symmetric matrix symmetric. Same solution.
    Symmetric,
}

/// Impose `constraints` (DOF → value) on `matrix` and `rhs`.
///
/// Returns the constrained matrix; `rhs` is updated in place. Applying the
/// same constraints twice gives the same system as applying them once.
///
/// # Errors
///
/// [`Error::Shape`] if the matrix is not square, `rhs` has the wrong length,
/// or a constrained DOF is out of range.
pub fn apply_dirichlet(
    matrix: &CsrMatrix,
    rhs: &mut [f64],
    constraints: &BTreeMap<usize, f64>,
    method: DirichletMethod,
) -> Result<CsrMatrix> {
    let n = matrix.nrows();
    if matrix.ncols() != n || rhs.len() != n {
        return Err(Error::Shape(format!(
            "system is {}x{} with a load vector of length {}",
            n,
            matrix.ncols(),
            rhs.len()
        )));
    }
    if let Some((&dof, _)) = constraints.range(n..).next() {
        return Err(Error::Shape(format!(
            "constrained DOF {} out of range (system has {} DOFs)",
            dof, n
        )));
    }

    let mut row_offsets = Vec::with_capacity(n + 1);
    let mut col_indices = Vec::with_capacity(matrix.nnz());
    let mut values = Vec::with_capacity(matrix.nnz());
    row_offsets.push(0);

    for (i, row) in matrix.row_iter().enumerate() {
        if let Some(&value) = constraints.get(&i) {
            col_indices.push(i);
            values.push(1.0);
            rhs[i] = value;
        } else {
            for (&j, &v) in row.col_indices().iter().zip(row.values()) {
                match (method, constraints.get(&j)) {
                    (DirichletMethod::Symmetric, Some(&prescribed)) => {
                        rhs[i] -= v * prescribed;
                    }
                    _ => {
                        col_indices.push(j);
                        values.push(v);
                    }
                }
            }
        }
        row_offsets.push(col_indices.len());
    }

    debug!(
        constrained = constraints.len(),
        method = ?method,
        nnz = values.len(),
        "applied Dirichlet constraints"
    );

    CsrMatrix::try_from_csr_data(n, n, row_offsets, col_indices, values)
        .map_err(|e| Error::Solver(format!("failed to rebuild constrained matrix: {}", e)))
}

/// Integrate an edge load and add it to `rhs`.
///
/// Each edge uses the 2-point Gauss rule; the load at each point is weighted
/// by `w * J` and split between the endpoints with the linear edge shape
/// functions, component by component.
///
/// # Errors
///
/// [`Error::Mesh`] if an edge endpoint is not a mesh node, [`Error::Shape`] if
/// `rhs` is too short for the field.
pub fn add_edge_loads<V: FieldValue>(
    rhs: &mut [f64],
    mesh: &Mesh,
    edges: &[Edge],
    load: &(dyn Fn(f64, f64) -> V + Send + Sync + '_),
) -> Result<()> {
    let components = V::COMPONENTS;
    if rhs.len() != mesh.n_nodes() * components {
        return Err(Error::Shape(format!(
            "load vector has length {}, expected {} for {} nodes",
            rhs.len(),
            mesh.n_nodes() * components,
            mesh.n_nodes()
        )));
    }

    for &edge in edges {
        let [a, b] = edge;
        let (pa, pb) = match (mesh.node(a), mesh.node(b)) {
            (Some(pa), Some(pb)) => (*pa, *pb),
            _ => {
                return Err(Error::Mesh(format!(
                    "load edge {:?} references a node outside the mesh",
                    edge
                )))
            }
        };

        let map = EdgeMap::new(pa, pb);
        let jacobian = map.jacobian();
        for (xi, weight) in gauss_legendre_2() {
            let p = map.point(xi);
            let value = load(p.x, p.y);
            for (node, n) in [a, b].into_iter().zip(EdgeMap::shape(xi)) {
                for c in 0..components {
                    rhs[node_dof(node, c, components)] +=
                        weight * jacobian * n * value.component(c);
                }
            }
        }
    }

    debug!(n_edges = edges.len(), components, "applied edge loads");
    Ok(())
}
