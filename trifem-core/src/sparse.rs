//! Sparse matrix assembly.
//!
//! Local element matrices are scattered into (row, col, value) triplets, and
//! the triplets are summed into a CSR matrix once assembly is complete.

use crate::error::{Error, Result};
use nalgebra::DMatrix;
use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csr::CsrMatrix as NalgebraCsr;

/// Compressed Sparse Row matrix.
pub type CsrMatrix = NalgebraCsr<f64>;

/// A single (row, col, value) contribution.
pub type Triplet = (usize, usize, f64);

/// Expand a dense local matrix into global triplets.
///
/// Entry `(i, j)` of `local` lands on `(dof_map[i], dof_map[j])`. Every entry
/// is emitted, zeros included; nothing is summed at this stage.
pub fn local_to_triplets<'a>(
    dof_map: &'a [usize],
    local: &'a DMatrix<f64>,
) -> impl Iterator<Item = Triplet> + 'a {
    debug_assert_eq!(local.nrows(), dof_map.len());
    debug_assert_eq!(local.ncols(), dof_map.len());

    dof_map.iter().enumerate().flat_map(move |(i, &row)| {
        dof_map
            .iter()
            .enumerate()
            .map(move |(j, &col)| (row, col, local[(i, j)]))
    })
}

/// Build an `n_dof × n_dof` CSR matrix, summing triplets on the same entry.
pub fn assemble(n_dof: usize, triplets: impl IntoIterator<Item = Triplet>) -> Result<CsrMatrix> {
    let mut matrix = TripletMatrix::new(n_dof, n_dof);
    for (row, col, value) in triplets {
        matrix.add(row, col, value);
    }
    matrix.to_csr()
}

/// Builder for assembling a sparse matrix from triplets (COO format).
///
/// Accumulates (row, col, value) triplets and converts to CSR when complete.
#[derive(Debug, Clone)]
pub struct TripletMatrix {
    n_rows: usize,
    n_cols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl TripletMatrix {
    /// Create a new triplet matrix builder.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self::with_capacity(n_rows, n_cols, 0)
    }

    /// Create with estimated capacity.
    pub fn with_capacity(n_rows: usize, n_cols: usize, nnz_estimate: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            rows: Vec::with_capacity(nnz_estimate),
            cols: Vec::with_capacity(nnz_estimate),
            values: Vec::with_capacity(nnz_estimate),
        }
    }

    /// Add a value at (row, col). Duplicates are summed during conversion.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.n_rows, "Row index out of bounds");
        debug_assert!(col < self.n_cols, "Column index out of bounds");

        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
    }

    /// Add a dense submatrix at the specified DOF indices.
    ///
    /// This is the core operation for finite element assembly.
    pub fn add_submatrix(&mut self, dof_indices: &[usize], submatrix: &DMatrix<f64>) {
        for (row, col, value) in local_to_triplets(dof_indices, submatrix) {
            self.add(row, col, value);
        }
    }

    /// Number of stored triplets.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Convert to CSR format, summing duplicate entries.
    pub fn to_csr(self) -> Result<CsrMatrix> {
        let coo = CooMatrix::try_from_triplets(
            self.n_rows,
            self.n_cols,
            self.rows,
            self.cols,
            self.values,
        )
        .map_err(|e| Error::Solver(format!("invalid triplet data: {}", e)))?;

        Ok(CsrMatrix::from(&coo))
    }
}

/// Dense load vector accumulated during assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadVector {
    values: Vec<f64>,
}

impl LoadVector {
    /// Create a zero vector of given size.
    pub fn zeros(size: usize) -> Self {
        Self {
            values: vec![0.0; size],
        }
    }

    /// Add a value at the given index.
    pub fn add(&mut self, index: usize, value: f64) {
        self.values[index] += value;
    }

    /// Add values at multiple indices (for element load assembly).
    pub fn add_subvector(&mut self, indices: &[usize], values: &[f64]) {
        debug_assert_eq!(indices.len(), values.len());
        for (&idx, &val) in indices.iter().zip(values.iter()) {
            self.values[idx] += val;
        }
    }

    /// Get the underlying dense vector.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Consume and return the dense vector.
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}
