//! Scalar Poisson problem `-∇·(κ∇u) = f`.

use crate::boundary::Boundary;
use crate::conditions::ScalarConditions;
use crate::element::{Element, Tri3};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::solver::{solve_field, SolveOptions};
use nalgebra::DMatrix;
use tracing::info;

/// Linear-triangle diffusion operator with uniform conductivity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusionElement {
    kappa: f64,
}

impl DiffusionElement {
    /// # Errors
    ///
    /// [`Error::InvalidMaterial`] unless `kappa` is positive and finite.
    pub fn new(kappa: f64) -> Result<Self> {
        if !(kappa > 0.0 && kappa.is_finite()) {
            return Err(Error::InvalidMaterial(format!(
                "diffusivity must be positive and finite, got {}",
                kappa
            )));
        }
        Ok(Self { kappa })
    }
}

impl Element for DiffusionElement {
    fn dofs_per_node(&self) -> usize {
        1
    }

    /// K_e = κ · A · G Gᵀ with G the 3×2 gradient matrix.
    fn stiffness(&self, geometry: &Tri3) -> DMatrix<f64> {
        let g = geometry.gradient_matrix();
        let k = g * g.transpose() * (self.kappa * geometry.area);
        DMatrix::from_column_slice(3, 3, k.as_slice())
    }
}

/// Solve the Poisson problem and return one value per node.
///
/// `source` is sampled at element centroids. Dirichlet values and Neumann
/// fluxes (`κ ∂u/∂n`) come from `conditions`; named groups are looked up in
/// `boundary`.
///
/// # Example
///
/// ```
/// use trifem_core::conditions::ScalarConditions;
/// use trifem_core::generator::unit_square;
/// use trifem_core::poisson::solve_poisson;
/// use trifem_core::solver::SolveOptions;
///
/// let (mesh, boundary) = unit_square(4, 4).unwrap();
/// let conditions = ScalarConditions::new()
///     .dirichlet("left", |_, _| 1.0)
///     .dirichlet("right", |_, _| 1.0);
///
/// let options = SolveOptions::default();
/// let u = solve_poisson(&mesh, 1.0, |_, _| 0.0, Some(&boundary), &conditions, &options).unwrap();
/// assert!(u.iter().all(|v| (v - 1.0).abs() < 1e-10));
/// ```
pub fn solve_poisson<F>(
    mesh: &Mesh,
    kappa: f64,
    source: F,
    boundary: Option<&Boundary>,
    conditions: &ScalarConditions<'_>,
    options: &SolveOptions,
) -> Result<Vec<f64>>
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    let element = DiffusionElement::new(kappa)?;
    info!(
        n_nodes = mesh.n_nodes(),
        n_triangles = mesh.n_triangles(),
        kappa,
        "solving Poisson problem"
    );

    let u = solve_field(mesh, &element, &source, boundary, conditions, options)?;

    info!(n_dofs = u.len(), "Poisson solve finished");
    Ok(u)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bc::DirichletMethod;
    use crate::boundary::edges_from_node_chain;
    use crate::error::BoundaryViolation;
    use crate::generator::unit_square;
    use crate::solver::{SolverConfig, SolverType};
    use crate::types::Point2;
    use crate::verify::max_nodal_error;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn exact(x: f64, y: f64) -> f64 {
        (PI * x).sin() * (PI * y).sin()
    }

    fn manufactured_error(n: usize) -> f64 {
        let (mesh, boundary) = unit_square(n, n).unwrap();
        let mut conditions = ScalarConditions::new();
        for side in ["left", "right", "bottom", "top"] {
            conditions = conditions.dirichlet(side, exact);
        }

        let u = solve_poisson(
            &mesh,
            1.0,
            |x, y| 2.0 * PI * PI * exact(x, y),
            Some(&boundary),
            &conditions,
            &SolveOptions::validated(),
        )
        .unwrap();
        max_nodal_error(&mesh, &u, exact).unwrap()
    }

    #[test]
    fn test_element_stiffness_unit_triangle() {
        let tri = Tri3::new(&[
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ])
        .unwrap();
        let k = DiffusionElement::new(2.0).unwrap().stiffness(&tri);

        #[rustfmt::skip]
        let expected = DMatrix::from_row_slice(3, 3, &[
             2.0, -1.0, -1.0,
            -1.0,  1.0,  0.0,
            -1.0,  0.0,  1.0,
        ]);
        assert_relative_eq!(k, expected, epsilon = 1e-14);
    }

    #[test]
    fn test_invalid_kappa() {
        for kappa in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                DiffusionElement::new(kappa),
                Err(Error::InvalidMaterial(_))
            ));
        }
    }

    #[test]
    fn test_manufactured_solution_converges() {
        let coarse = manufactured_error(8);
        let medium = manufactured_error(16);
        let fine = manufactured_error(32);

        assert!(medium < 0.01, "error at 16x16 is {}", medium);
        assert!(
            coarse / fine > 3.0,
            "error only dropped from {} to {}",
            coarse,
            fine
        );
    }

    #[test]
    fn test_neumann_patch_reproduces_linear_field() {
        // u = x: zero on the left, unit outward flux on the right.
        let (mesh, boundary) = unit_square(4, 3).unwrap();
        let conditions = ScalarConditions::new()
            .dirichlet("left", |_, _| 0.0)
            .natural("right", |_, _| 1.0)
            .natural("top", |_, _| 0.0);

        for dirichlet in [DirichletMethod::RowElimination, DirichletMethod::Symmetric] {
            let options = SolveOptions {
                dirichlet,
                ..SolveOptions::validated()
            };
            let u = solve_poisson(&mesh, 1.0, |_, _| 0.0, Some(&boundary), &conditions, &options)
                .unwrap();

            assert_eq!(u.len(), mesh.n_nodes());
            for (value, p) in u.iter().zip(mesh.nodes()) {
                assert_relative_eq!(*value, p.x, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_explicit_inputs_match_named_groups() {
        let (mesh, boundary) = unit_square(5, 5).unwrap();
        let source = |x: f64, y: f64| 1.0 + x - y;

        let named = ScalarConditions::new()
            .dirichlet("bottom", |x, _| x)
            .natural("top", |x, _| 0.5 * x);
        let u_named =
            solve_poisson(&mesh, 1.5, source, Some(&boundary), &named, &SolveOptions::default())
                .unwrap();

        let bottom_dofs: Vec<(usize, f64)> = boundary
            .nodes("bottom")
            .unwrap()
            .iter()
            .map(|&n| (n, mesh.node(n).unwrap().x))
            .collect();
        let top: Vec<usize> = (30..36).collect();
        let explicit = ScalarConditions::new()
            .dirichlet_dofs(bottom_dofs)
            .natural_edges(edges_from_node_chain(&top), |x, _| 0.5 * x);
        let u_explicit =
            solve_poisson(&mesh, 1.5, source, None, &explicit, &SolveOptions::default()).unwrap();

        for (a, b) in u_named.iter().zip(&u_explicit) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_solvers_agree() {
        let (mesh, boundary) = unit_square(6, 4).unwrap();
        let conditions = ScalarConditions::new()
            .dirichlet("left", |_, y| y)
            .dirichlet("right", |_, _| 0.0);
        let source = |x: f64, _y: f64| 4.0 * x;

        let solve = |dirichlet, solver_type| {
            let options = SolveOptions {
                dirichlet,
                solver: SolverConfig { solver_type },
                ..SolveOptions::default()
            };
            solve_poisson(&mesh, 1.0, source, Some(&boundary), &conditions, &options).unwrap()
        };

        let reference = solve(DirichletMethod::RowElimination, SolverType::DenseLu);
        for (dirichlet, solver_type) in [
            (DirichletMethod::RowElimination, SolverType::Auto),
            (DirichletMethod::Symmetric, SolverType::Auto),
            (DirichletMethod::Symmetric, SolverType::SparseLu),
        ] {
            let u = solve(dirichlet, solver_type);
            for (a, b) in u.iter().zip(&reference) {
                assert_relative_eq!(*a, *b, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_clockwise_triangles_same_solution() {
        let (mesh, boundary) = unit_square(4, 4).unwrap();
        let flipped = Mesh::new(
            mesh.nodes().to_vec(),
            mesh.triangles().iter().map(|&[a, b, c]| [a, c, b]).collect(),
        )
        .unwrap();
        let conditions = ScalarConditions::new()
            .dirichlet("left", |_, _| 0.0)
            .dirichlet("right", |_, _| 1.0);
        let source = |x: f64, y: f64| x * y;
        let options = SolveOptions::default();

        let u = solve_poisson(&mesh, 1.0, source, Some(&boundary), &conditions, &options).unwrap();
        let v = solve_poisson(&flipped, 1.0, source, Some(&boundary), &conditions, &options)
            .unwrap();
        for (a, b) in u.iter().zip(&v) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_validation_runs_only_when_requested() {
        let (mesh, _) = unit_square(2, 2).unwrap();
        // Edge (1, 4) is an interior grid line shared by two cells.
        let bad = Boundary::new()
            .with_nodes("left", vec![0, 3, 6])
            .with_edges("inner", vec![[1, 4]])
            .with_nodes("inner", vec![1, 4]);
        let conditions = ScalarConditions::new().dirichlet("left", |_, _| 0.0);
        let unit = |_: f64, _: f64| 1.0;

        let validated = SolveOptions::validated();
        match solve_poisson(&mesh, 1.0, unit, Some(&bad), &conditions, &validated) {
            Err(Error::Boundary { group, violation }) => {
                assert_eq!(group, "inner");
                assert_eq!(violation, BoundaryViolation::NotOnBoundary { edge: [1, 4] });
            }
            other => panic!("expected boundary error, got {:?}", other.err()),
        }

        let unchecked = SolveOptions::default();
        assert!(solve_poisson(&mesh, 1.0, unit, Some(&bad), &conditions, &unchecked).is_ok());
    }

    #[test]
    fn test_degenerate_triangle_fails() {
        let mesh = Mesh::from_flat(
            &[0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 1.0],
            &[0, 1, 3, 0, 1, 2],
        )
        .unwrap();
        let conditions = ScalarConditions::new().dirichlet_nodes(vec![0], |_, _| 0.0);
        let options = SolveOptions::default();
        let result = solve_poisson(&mesh, 1.0, |_, _| 1.0, None, &conditions, &options);
        assert!(matches!(result, Err(Error::Geometry(_))));
    }

    #[test]
    fn test_unconstrained_problem_is_singular() {
        // No Dirichlet data: constants lie in the kernel of the stiffness.
        let mesh = Mesh::from_flat(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0], &[0, 1, 2]).unwrap();
        let conditions = ScalarConditions::new();

        let result = solve_poisson(
            &mesh,
            1.0,
            |_, _| 1.0,
            None,
            &conditions,
            &SolveOptions::default(),
        );
        assert!(matches!(result, Err(Error::SingularMatrix(_))));
    }

    #[test]
    fn test_named_conditions_without_boundary() {
        let (mesh, _) = unit_square(2, 2).unwrap();
        let conditions = ScalarConditions::new().dirichlet("left", |_, _| 0.0);
        let options = SolveOptions::default();
        let result = solve_poisson(&mesh, 1.0, |_, _| 1.0, None, &conditions, &options);
        assert!(matches!(result, Err(Error::MissingBoundary)));
    }
}
