//! Linear system solvers and the shared solve pipeline.
//!
//! Solvers see only a matrix and a load vector, so the element and assembly
//! code never depends on which factorization runs.
//!
//! # Solver Backends
//!
//! - [`SparseLuSolver`]: faer sparse LU. Handles the unsymmetric systems left
//!   by row-elimination Dirichlet enforcement.
//! - [`FaerCholeskySolver`]: faer sparse LLᵀ, for systems kept symmetric
//!   positive definite by [`DirichletMethod::Symmetric`].
//! - [`DenseLuSolver`]: nalgebra dense LU, for small systems and tests.

use crate::assembly::{assemble_elements, AssemblyOptions};
use crate::bc::{add_edge_loads, apply_dirichlet, DirichletMethod};
use crate::boundary::Boundary;
use crate::conditions::{BoundaryConditions, FieldValue};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::sparse::CsrMatrix;
use faer::linalg::cholesky::llt::factor::LltError;
use faer::prelude::*;
use faer::sparse::linalg::solvers::{Llt, Lu, SymbolicLlt, SymbolicLu};
use faer::sparse::linalg::LltError as SparseLltError;
use faer::sparse::{SparseColMat, SymbolicSparseColMat};
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Linear solver interface.
pub trait Solver: Send + Sync {
    /// Solve the linear system Ax = b.
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>>;

    /// Solver name for diagnostics.
    fn name(&self) -> &str;
}

/// Solver selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverType {
    /// Sparse LU for row-eliminated systems, sparse Cholesky for symmetric ones.
    #[default]
    Auto,
    /// faer sparse LU.
    SparseLu,
    /// faer sparse Cholesky. Requires symmetric Dirichlet elimination.
    SparseCholesky,
    /// nalgebra dense LU.
    DenseLu,
}

/// Solver configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverConfig {
    /// Solver type to use.
    pub solver_type: SolverType,
}

fn check_system(matrix: &CsrMatrix, rhs: &[f64]) -> Result<usize> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(Error::Solver("Matrix must be square".into()));
    }
    if n != rhs.len() {
        return Err(Error::Solver("RHS size mismatch".into()));
    }
    Ok(n)
}

/// Reject solutions polluted by a zero pivot.
fn check_finite(solution: Vec<f64>) -> Result<Vec<f64>> {
    match solution.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(Error::SingularMatrix(format!(
            "non-finite solution component at DOF {}",
            i
        ))),
        None => Ok(solution),
    }
}

/// Dense LU solver using nalgebra.
///
/// Converts the matrix to dense storage; only suitable for small systems.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenseLuSolver;

impl DenseLuSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for DenseLuSolver {
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>> {
        use nalgebra::{DMatrix, DVector};

        if check_system(matrix, rhs)? == 0 {
            return Ok(vec![]);
        }

        let dense = DMatrix::from(matrix);
        let b = DVector::from_column_slice(rhs);
        let solution = dense
            .lu()
            .solve(&b)
            .ok_or_else(|| Error::SingularMatrix("LU factorization failed".into()))?;

        check_finite(solution.as_slice().to_vec())
    }

    fn name(&self) -> &str {
        "nalgebra Dense LU"
    }
}

/// Convert nalgebra-sparse CSR matrix to faer SparseColMat (CSC format).
///
/// Transposes the index structure with a counting pass, so row indices within
/// each column come out sorted and no symmetry is assumed.
fn csr_to_faer_csc(csr: &CsrMatrix) -> SparseColMat<usize, f64> {
    let nrows = csr.nrows();
    let ncols = csr.ncols();
    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    let mut col_offsets = vec![0usize; ncols + 1];
    for &col in col_indices {
        col_offsets[col + 1] += 1;
    }
    for i in 0..ncols {
        col_offsets[i + 1] += col_offsets[i];
    }

    let nnz = values.len();
    let mut csc_row_indices = vec![0usize; nnz];
    let mut csc_values = vec![0.0f64; nnz];
    let mut col_positions = col_offsets[..ncols].to_vec();

    for row in 0..nrows {
        for idx in row_offsets[row]..row_offsets[row + 1] {
            let col = col_indices[idx];
            let pos = col_positions[col];
            csc_row_indices[pos] = row;
            csc_values[pos] = values[idx];
            col_positions[col] += 1;
        }
    }

    // SAFETY: offsets are non-decreasing and end at nnz; rows within each
    // column are strictly increasing because CSR rows are visited in order.
    unsafe {
        SparseColMat::new(
            SymbolicSparseColMat::new_unchecked(nrows, ncols, col_offsets, None, csc_row_indices),
            csc_values,
        )
    }
}

/// Sparse LU solver using the faer library.
#[derive(Debug, Default, Clone, Copy)]
pub struct SparseLuSolver;

impl SparseLuSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for SparseLuSolver {
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>> {
        let n = check_system(matrix, rhs)?;
        if n == 0 {
            return Ok(vec![]);
        }

        let csc = csr_to_faer_csc(matrix);
        let csc_ref = csc.as_ref();

        let symbolic = SymbolicLu::try_new(csc_ref.symbolic())
            .map_err(|e| Error::Solver(format!("Symbolic LU analysis failed: {:?}", e)))?;
        // faer panics on an exactly zero numeric pivot instead of returning an error.
        let factor = AssertUnwindSafe(|| Lu::try_new_with_symbolic(symbolic, csc_ref));
        let lu = panic::catch_unwind(factor)
            .map_err(|_| Error::SingularMatrix("Sparse LU hit a zero pivot".into()))?
            .map_err(|e| {
                Error::SingularMatrix(format!("Sparse LU factorization failed: {:?}", e))
            })?;

        let mut x = faer::Mat::from_fn(n, 1, |i, _| rhs[i]);
        lu.solve_in_place(x.as_mut());

        check_finite((0..n).map(|i| x[(i, 0)]).collect())
    }

    fn name(&self) -> &str {
        "faer Sparse LU"
    }
}

/// Sparse Cholesky solver using the faer library.
///
/// Only the lower triangle is read, so the matrix must be symmetric.
#[derive(Debug, Default, Clone, Copy)]
pub struct FaerCholeskySolver;

impl FaerCholeskySolver {
    /// Create a new sparse Cholesky solver.
    pub fn new() -> Self {
        Self
    }
}

impl Solver for FaerCholeskySolver {
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>> {
        let n = check_system(matrix, rhs)?;
        if n == 0 {
            return Ok(vec![]);
        }

        let csc = csr_to_faer_csc(matrix);
        let csc_ref = csc.as_ref();

        let symbolic = SymbolicLlt::try_new(csc_ref.symbolic(), faer::Side::Lower)
            .map_err(|_| Error::Solver("Symbolic Cholesky analysis failed".into()))?;

        let llt = Llt::try_new_with_symbolic(symbolic, csc_ref, faer::Side::Lower).map_err(
            |e| match e {
                SparseLltError::Generic(err) => {
                    Error::Solver(format!("Sparse Cholesky error: {:?}", err))
                }
                SparseLltError::Numeric(LltError::NonPositivePivot { index }) => {
                    Error::SingularMatrix(format!(
                        "Matrix is not positive definite at pivot {}",
                        index
                    ))
                }
            },
        )?;

        let mut x = faer::Mat::from_fn(n, 1, |i, _| rhs[i]);
        llt.solve_in_place(x.as_mut());

        check_finite((0..n).map(|i| x[(i, 0)]).collect())
    }

    fn name(&self) -> &str {
        "faer Sparse Cholesky (LLᵀ)"
    }
}

/// Select a solver for systems constrained with `method`.
///
/// # Errors
///
/// [`Error::Solver`] when Cholesky is requested for a row-eliminated system,
/// which is not symmetric.
pub fn select_solver(config: &SolverConfig, method: DirichletMethod) -> Result<Box<dyn Solver>> {
    match (config.solver_type, method) {
        (SolverType::Auto, DirichletMethod::RowElimination) | (SolverType::SparseLu, _) => {
            Ok(Box::new(SparseLuSolver::new()))
        }
        (SolverType::Auto, DirichletMethod::Symmetric)
        | (SolverType::SparseCholesky, DirichletMethod::Symmetric) => {
            Ok(Box::new(FaerCholeskySolver::new()))
        }
        (SolverType::SparseCholesky, DirichletMethod::RowElimination) => Err(Error::Solver(
            "sparse Cholesky needs symmetric Dirichlet elimination".into(),
        )),
        (SolverType::DenseLu, _) => Ok(Box::new(DenseLuSolver::new())),
    }
}

/// Options for one driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveOptions {
    /// Re-run boundary validation before assembling.
    pub validate_boundary: bool,
    /// Use strict validation (edge endpoints must be in the node group).
    pub strict: bool,
    pub assembly: AssemblyOptions,
    pub dirichlet: DirichletMethod,
    pub solver: SolverConfig,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            validate_boundary: false,
            strict: true,
            assembly: AssemblyOptions::default(),
            dirichlet: DirichletMethod::default(),
            solver: SolverConfig::default(),
        }
    }
}

impl SolveOptions {
    /// Default options with boundary validation switched on.
    pub fn validated() -> Self {
        Self {
            validate_boundary: true,
            ..Self::default()
        }
    }
}

/// Validate, assemble, load, constrain and solve.
///
/// Shared by every problem driver; `element` fixes the physics and `V` the
/// number of DOFs per node.
pub(crate) fn solve_field<E, V>(
    mesh: &Mesh,
    element: &E,
    body: &(dyn Fn(f64, f64) -> V + Send + Sync),
    boundary: Option<&Boundary>,
    conditions: &BoundaryConditions<'_, V>,
    options: &SolveOptions,
) -> Result<Vec<f64>>
where
    E: Element,
    V: FieldValue,
{
    if options.validate_boundary {
        if let Some(boundary) = boundary {
            boundary.validate(mesh, options.strict)?;
        }
    }

    let resolved = conditions.resolve(mesh, boundary)?;
    let mut system = assemble_elements(mesh, element, body, &options.assembly)?;

    for natural in &resolved.natural {
        add_edge_loads(&mut system.rhs, mesh, natural.edges, natural.load)?;
    }

    let matrix = apply_dirichlet(
        &system.stiffness,
        &mut system.rhs,
        &resolved.dirichlet,
        options.dirichlet,
    )?;

    let solver = select_solver(&options.solver, options.dirichlet)?;
    debug!(solver = solver.name(), n_dofs = system.n_dofs, "solving");
    solver.solve(&matrix, &system.rhs)
}
