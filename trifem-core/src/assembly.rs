//! Global finite element assembly.
//!
//! Element stiffness matrices and centroid-sampled body loads are evaluated
//! per triangle (in parallel with Rayon when enabled), then scattered into a
//! [`SystemBuilder`] in element order so the assembled system does not depend
//! on thread scheduling.

use crate::conditions::FieldValue;
use crate::element::{Element, Tri3};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::sparse::{CsrMatrix, LoadVector, TripletMatrix};
use crate::types::node_dof;
use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::debug;

/// Assembly options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Evaluate element kernels on the Rayon thread pool.
    pub parallel: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Assembled system before boundary conditions are enforced.
#[derive(Debug, Clone)]
pub struct AssembledSystem {
    /// Global stiffness matrix.
    pub stiffness: CsrMatrix,
    /// Right-hand side (load) vector.
    pub rhs: Vec<f64>,
    /// Number of DOFs in the system.
    pub n_dofs: usize,
}

/// Accumulator for one global system.
///
/// Lives for the duration of a single assembly and is consumed by
/// [`SystemBuilder::finish`].
pub struct SystemBuilder {
    matrix: TripletMatrix,
    rhs: LoadVector,
}

impl SystemBuilder {
    /// Empty system for `n_nodes` nodes with `dofs_per_node` DOFs each.
    pub fn new(n_nodes: usize, dofs_per_node: usize, nnz_estimate: usize) -> Self {
        let n_dofs = n_nodes * dofs_per_node;
        Self {
            matrix: TripletMatrix::with_capacity(n_dofs, n_dofs, nnz_estimate),
            rhs: LoadVector::zeros(n_dofs),
        }
    }

    /// Scatter a local stiffness matrix and load vector.
    pub fn add_element(&mut self, dofs: &[usize], stiffness: &DMatrix<f64>, load: &[f64]) {
        self.matrix.add_submatrix(dofs, stiffness);
        self.rhs.add_subvector(dofs, load);
    }

    /// Finalize into CSR, summing duplicate contributions.
    pub fn finish(self) -> Result<AssembledSystem> {
        let n_dofs = self.rhs.as_slice().len();
        let n_triplets = self.matrix.nnz();
        let stiffness = self.matrix.to_csr()?;
        debug!(n_dofs, n_triplets, nnz = stiffness.nnz(), "finalized global matrix");
        Ok(AssembledSystem {
            stiffness,
            rhs: self.rhs.into_vec(),
            n_dofs,
        })
    }
}

/// Global DOF indices of a triangle for `dofs_per_node` components.
pub fn element_dofs(triangle: &[usize; 3], dofs_per_node: usize) -> Vec<usize> {
    triangle
        .iter()
        .flat_map(|&node| (0..dofs_per_node).map(move |c| node_dof(node, c, dofs_per_node)))
        .collect()
}

/// Local contribution of one triangle.
struct ElementContribution {
    dofs: Vec<usize>,
    stiffness: DMatrix<f64>,
    load: Vec<f64>,
}

/// Assemble stiffness and body load over every triangle of `mesh`.
///
/// The body load is sampled once at each centroid and a third of
/// `value * area` goes to each vertex, per component.
///
/// # Errors
///
/// - [`Error::Shape`] if the element's DOFs per node do not match `V`
/// - [`Error::Geometry`] naming the first degenerate triangle
pub fn assemble_elements<E, V>(
    mesh: &Mesh,
    element: &E,
    body: &(dyn Fn(f64, f64) -> V + Send + Sync),
    options: &AssemblyOptions,
) -> Result<AssembledSystem>
where
    E: Element,
    V: FieldValue,
{
    let dpn = element.dofs_per_node();
    if dpn != V::COMPONENTS {
        return Err(Error::Shape(format!(
            "element has {} DOFs per node but the load field has {} components",
            dpn,
            V::COMPONENTS
        )));
    }

    let kernel = |elem_idx: usize| -> Result<ElementContribution> {
        let triangle = mesh.triangles()[elem_idx];
        let coords = triangle.map(|n| mesh.nodes()[n]);
        let geometry = Tri3::new(&coords).map_err(|e| match e {
            Error::Geometry(msg) => Error::Geometry(format!("element {}: {}", elem_idx, msg)),
            other => other,
        })?;

        let value = body(geometry.centroid.x, geometry.centroid.y);
        let share = geometry.area / 3.0;
        let load = (0..3)
            .flat_map(|_| (0..dpn).map(move |c| value.component(c) * share))
            .collect();

        Ok(ElementContribution {
            dofs: element_dofs(&triangle, dpn),
            stiffness: element.stiffness(&geometry),
            load,
        })
    };

    let n_elements = mesh.n_triangles();
    let contributions: Vec<ElementContribution> = if options.parallel {
        (0..n_elements)
            .into_par_iter()
            .map(kernel)
            .collect::<Result<_>>()?
    } else {
        (0..n_elements).map(kernel).collect::<Result<_>>()?
    };

    let local_size = 3 * dpn;
    let mut builder = SystemBuilder::new(
        mesh.n_nodes(),
        dpn,
        n_elements * local_size * local_size,
    );
    for c in &contributions {
        builder.add_element(&c.dofs, &c.stiffness, &c.load);
    }

    debug!(
        n_elements,
        dofs_per_node = dpn,
        parallel = options.parallel,
        "assembled element contributions"
    );

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elasticity::ElasticElement;
    use crate::generator::unit_square;
    use crate::material::Material;
    use crate::poisson::DiffusionElement;
    use crate::types::Point2;
    use approx::assert_relative_eq;

    #[test]
    fn test_element_dofs_interleaved() {
        assert_eq!(element_dofs(&[4, 0, 2], 1), vec![4, 0, 2]);
        assert_eq!(element_dofs(&[4, 0, 2], 2), vec![8, 9, 0, 1, 4, 5]);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::new(vec![], vec![]).unwrap();
        let zero = |_: f64, _: f64| 0.0;
        let system = assemble_elements(
            &mesh,
            &DiffusionElement::new(1.0).unwrap(),
            &zero,
            &AssemblyOptions::default(),
        )
        .unwrap();
        assert_eq!(system.n_dofs, 0);
        assert_eq!(system.stiffness.nnz(), 0);
    }

    #[test]
    fn test_poisson_system_properties() {
        let (mesh, _) = unit_square(3, 3).unwrap();
        let one = |_: f64, _: f64| 1.0;
        let system = assemble_elements(
            &mesh,
            &DiffusionElement::new(2.0).unwrap(),
            &one,
            &AssemblyOptions::default(),
        )
        .unwrap();

        let dense = DMatrix::from(&system.stiffness);
        assert_eq!(system.n_dofs, 16);
        assert_relative_eq!(dense, dense.transpose(), epsilon = 1e-12);

        // Constants lie in the kernel of the Laplacian.
        for i in 0..16 {
            assert_relative_eq!(dense.row(i).sum(), 0.0, epsilon = 1e-12);
            assert!(dense[(i, i)] > 0.0);
        }

        // Unit source over the unit square loads the total area.
        assert_relative_eq!(system.rhs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_elastic_body_force_split_per_component() {
        let (mesh, _) = unit_square(2, 1).unwrap();
        let d = Material::new(1.0, 0.25).unwrap().constitutive_plane_stress();
        let gravity = |_: f64, _: f64| [0.0, -3.0];
        let system = assemble_elements(
            &mesh,
            &ElasticElement::new(d),
            &gravity,
            &AssemblyOptions::default(),
        )
        .unwrap();

        assert_eq!(system.n_dofs, 12);
        let fx: f64 = system.rhs.iter().step_by(2).sum();
        let fy: f64 = system.rhs.iter().skip(1).step_by(2).sum();
        assert_relative_eq!(fx, 0.0, epsilon = 1e-14);
        assert_relative_eq!(fy, -3.0, epsilon = 1e-12);

        // Node 0 touches both triangles of the first cell, each of area 1/4.
        assert_relative_eq!(system.rhs[1], -3.0 * 2.0 * 0.25 / 3.0, epsilon = 1e-14);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let (mesh, _) = unit_square(6, 5).unwrap();
        let element = DiffusionElement::new(0.7).unwrap();
        let source = |x: f64, y: f64| x * y + 1.0;

        let parallel = AssemblyOptions { parallel: true };
        let serial = AssemblyOptions { parallel: false };
        let parallel = assemble_elements(&mesh, &element, &source, &parallel).unwrap();
        let serial = assemble_elements(&mesh, &element, &source, &serial).unwrap();

        assert_eq!(parallel.stiffness, serial.stiffness);
        assert_eq!(parallel.rhs, serial.rhs);
    }

    #[test]
    fn test_degenerate_element_reports_index() {
        let nodes = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(2.0, 0.0),
        ];
        let mesh = Mesh::new(nodes, vec![[0, 1, 2], [0, 1, 3]]).unwrap();
        let zero = |_: f64, _: f64| 0.0;

        match assemble_elements(
            &mesh,
            &DiffusionElement::new(1.0).unwrap(),
            &zero,
            &AssemblyOptions::default(),
        ) {
            Err(Error::Geometry(msg)) => assert!(msg.contains("element 1"), "{}", msg),
            other => panic!("expected geometry error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_component_mismatch() {
        let (mesh, _) = unit_square(1, 1).unwrap();
        let vector = |_: f64, _: f64| [0.0, 0.0];
        let result = assemble_elements(
            &mesh,
            &DiffusionElement::new(1.0).unwrap(),
            &vector,
            &AssemblyOptions::default(),
        );
        assert!(matches!(result, Err(Error::Shape(_))));
    }
}
