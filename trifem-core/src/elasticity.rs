//! Plane linear elasticity with interleaved displacement DOFs.

use crate::boundary::Boundary;
use crate::conditions::VectorConditions;
use crate::element::{Element, Tri3};
use crate::error::Result;
use crate::mesh::Mesh;
use crate::solver::{solve_field, SolveOptions};
use crate::types::ConstitutiveMatrix;
use nalgebra::DMatrix;
use tracing::info;

/// Constant-strain triangle for a given constitutive matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticElement {
    d: ConstitutiveMatrix,
}

impl ElasticElement {
    pub fn new(d: ConstitutiveMatrix) -> Self {
        Self { d }
    }
}

impl Element for ElasticElement {
    fn dofs_per_node(&self) -> usize {
        2
    }

    /// K_e = Bᵀ D B · A, exact since B is constant over the triangle.
    fn stiffness(&self, geometry: &Tri3) -> DMatrix<f64> {
        let b = geometry.strain_displacement();
        let k = b.transpose() * self.d * b * geometry.area;
        DMatrix::from_column_slice(6, 6, k.as_slice())
    }
}

/// Solve for the displacement field.
///
/// Returns `2 * n_nodes` values, node `k` owning `[2k, 2k + 1] = [u_x, u_y]`.
/// `body_force` is sampled at element centroids; tractions and prescribed
/// displacements come from `conditions`.
pub fn solve_elasticity<F>(
    mesh: &Mesh,
    d: &ConstitutiveMatrix,
    body_force: F,
    boundary: Option<&Boundary>,
    conditions: &VectorConditions<'_>,
    options: &SolveOptions,
) -> Result<Vec<f64>>
where
    F: Fn(f64, f64) -> [f64; 2] + Send + Sync,
{
    let element = ElasticElement::new(*d);
    info!(
        n_nodes = mesh.n_nodes(),
        n_triangles = mesh.n_triangles(),
        "solving plane elasticity problem"
    );

    let u = solve_field(mesh, &element, &body_force, boundary, conditions, options)?;

    info!(n_dofs = u.len(), "elasticity solve finished");
    Ok(u)
}
