//! trifem Core - linear-triangle finite elements in 2D
//!
//! Small finite element library for:
//! - Scalar Poisson problems `-∇·(κ∇u) = f`
//! - Plane-stress and plane-strain linear elasticity
//! - Named boundary groups with validation against the mesh
//! - Parallel element evaluation using Rayon
//! - Sparse assembly (CSR format) and faer direct solvers
//!
//! # Architecture
//!
//! The solver is designed around these core abstractions:
//!
//! - [`Mesh`]: Nodal coordinates and triangle connectivity
//! - [`Boundary`]: Named node and edge groups on the mesh boundary
//! - [`Element`] trait: Local stiffness of one triangle for one physics
//! - [`BoundaryConditions`]: Dirichlet and natural data, by group name or explicit ids
//! - [`Solver`] trait: Linear system solution strategies
//!
//! The drivers [`solve_poisson`] and [`solve_elasticity`] run the whole
//! pipeline: validate, assemble, apply edge loads, constrain, solve.

pub mod types;
pub mod error;
pub mod mesh;
pub mod generator;
pub mod boundary;
pub mod element;
pub mod material;
pub mod sparse;
pub mod assembly;
pub mod bc;
pub mod conditions;
pub mod solver;
pub mod poisson;
pub mod elasticity;
pub mod verify;
pub mod io;

pub use types::{ConstitutiveMatrix, Edge, Point2};
pub use boundary::Boundary;
pub use conditions::{BoundaryConditions, ScalarConditions, VectorConditions};
pub use element::{Element, Tri3};
pub use mesh::Mesh;
pub use material::{Material, PlaneCondition};
pub use sparse::CsrMatrix;
pub use solver::{SolveOptions, Solver};
pub use poisson::solve_poisson;
pub use elasticity::solve_elasticity;
pub use error::{Error, Result};
