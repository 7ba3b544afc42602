//! Boundary-condition input and its normalization.
//!
//! Conditions can be given by boundary group name (resolved against a
//! [`Boundary`]) or, for callers without one, as explicit node lists, DOF maps
//! and edge lists. Both forms resolve into one canonical
//! [`ResolvedConditions`]: a DOF→value map for Dirichlet data and a list of
//! edge loads for Neumann/traction data.

use crate::boundary::Boundary;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::types::{node_dof, Edge};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Nodal value of a field: a scalar, or a 2D vector.
pub trait FieldValue: Copy + Send + Sync + 'static {
    /// Number of components, i.e. DOFs per node.
    const COMPONENTS: usize;

    /// Component `index` of the value.
    fn component(&self, index: usize) -> f64;
}

impl FieldValue for f64 {
    const COMPONENTS: usize = 1;

    fn component(&self, _index: usize) -> f64 {
        *self
    }
}

impl FieldValue for [f64; 2] {
    const COMPONENTS: usize = 2;

    fn component(&self, index: usize) -> f64 {
        self[index]
    }
}

/// Spatially varying field `(x, y) -> V`.
pub type FieldFn<'a, V> = Box<dyn Fn(f64, f64) -> V + Send + Sync + 'a>;

/// Boundary conditions for a field with values of type `V`.
///
/// Dirichlet constraints resolve in a fixed order, later writes replacing
/// earlier ones on the same DOF: named groups in insertion order, then
/// explicit node lists, then explicit DOF maps. No conflict detection is done.
pub struct BoundaryConditions<'a, V: FieldValue> {
    dirichlet: Vec<(String, FieldFn<'a, V>)>,
    natural: Vec<(String, FieldFn<'a, V>)>,
    dirichlet_nodes: Vec<(Vec<usize>, FieldFn<'a, V>)>,
    dirichlet_dofs: BTreeMap<usize, f64>,
    natural_edges: Vec<(Vec<Edge>, FieldFn<'a, V>)>,
}

/// Conditions for scalar (Poisson) problems.
pub type ScalarConditions<'a> = BoundaryConditions<'a, f64>;

/// Conditions for 2D displacement (elasticity) problems.
pub type VectorConditions<'a> = BoundaryConditions<'a, [f64; 2]>;

impl<V: FieldValue> Default for BoundaryConditions<'_, V> {
    fn default() -> Self {
        Self {
            dirichlet: Vec::new(),
            natural: Vec::new(),
            dirichlet_nodes: Vec::new(),
            dirichlet_dofs: BTreeMap::new(),
            natural_edges: Vec::new(),
        }
    }
}

impl<'a, V: FieldValue> BoundaryConditions<'a, V> {
    /// No conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prescribe the field on every node of boundary group `group`.
    pub fn dirichlet(
        mut self,
        group: impl Into<String>,
        value: impl Fn(f64, f64) -> V + Send + Sync + 'a,
    ) -> Self {
        self.dirichlet.push((group.into(), Box::new(value)));
        self
    }

    /// Apply a flux (Poisson) or traction (elasticity) on every edge of
    /// boundary group `group`.
    pub fn natural(
        mut self,
        group: impl Into<String>,
        load: impl Fn(f64, f64) -> V + Send + Sync + 'a,
    ) -> Self {
        self.natural.push((group.into(), Box::new(load)));
        self
    }

    /// Prescribe the field on an explicit list of nodes.
    pub fn dirichlet_nodes(
        mut self,
        nodes: Vec<usize>,
        value: impl Fn(f64, f64) -> V + Send + Sync + 'a,
    ) -> Self {
        self.dirichlet_nodes.push((nodes, Box::new(value)));
        self
    }

    /// Prescribe individual global DOFs.
    pub fn dirichlet_dofs(mut self, dofs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        self.dirichlet_dofs.extend(dofs);
        self
    }

    /// Apply a flux or traction on an explicit list of edges.
    pub fn natural_edges(
        mut self,
        edges: Vec<Edge>,
        load: impl Fn(f64, f64) -> V + Send + Sync + 'a,
    ) -> Self {
        self.natural_edges.push((edges, Box::new(load)));
        self
    }

    /// Whether any condition refers to a boundary group by name.
    pub fn uses_named_groups(&self) -> bool {
        !self.dirichlet.is_empty() || !self.natural.is_empty()
    }

    /// Normalize into constrained DOFs and edge loads.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingBoundary`] if named groups are used without a boundary
    /// - [`Error::UnknownGroup`] if a named group is absent from the boundary
    /// - [`Error::Mesh`] if an explicit node, edge or DOF is out of range
    pub fn resolve<'r>(
        &'r self,
        mesh: &Mesh,
        boundary: Option<&'r Boundary>,
    ) -> Result<ResolvedConditions<'r, V>> {
        let boundary = match boundary {
            Some(b) => Some(b),
            None if self.uses_named_groups() => return Err(Error::MissingBoundary),
            None => None,
        };

        let n_nodes = mesh.n_nodes();
        let n_dofs = n_nodes * V::COMPONENTS;
        let mut dirichlet = BTreeMap::new();
        let mut overwritten = 0usize;

        let mut constrain = |nodes: &[usize], value: &FieldFn<'a, V>| -> Result<()> {
            for &node in nodes {
                let p = mesh.node(node).ok_or_else(|| {
                    Error::Mesh(format!(
                        "Dirichlet node {} out of range (mesh has {} nodes)",
                        node, n_nodes
                    ))
                })?;
                let v = value(p.x, p.y);
                for c in 0..V::COMPONENTS {
                    let dof = node_dof(node, c, V::COMPONENTS);
                    if dirichlet.insert(dof, v.component(c)).is_some() {
                        overwritten += 1;
                    }
                }
            }
            Ok(())
        };

        if let Some(boundary) = boundary {
            for (group, value) in &self.dirichlet {
                let nodes = boundary
                    .nodes(group)
                    .ok_or_else(|| Error::UnknownGroup(group.clone()))?;
                constrain(nodes, value)?;
            }
        }
        for (nodes, value) in &self.dirichlet_nodes {
            constrain(nodes, value)?;
        }

        for (&dof, &value) in &self.dirichlet_dofs {
            if dof >= n_dofs {
                return Err(Error::Mesh(format!(
                    "Dirichlet DOF {} out of range (system has {} DOFs)",
                    dof, n_dofs
                )));
            }
            if dirichlet.insert(dof, value).is_some() {
                overwritten += 1;
            }
        }

        let mut natural = Vec::with_capacity(self.natural.len() + self.natural_edges.len());
        if let Some(boundary) = boundary {
            for (group, load) in &self.natural {
                let edges = boundary
                    .edges(group)
                    .ok_or_else(|| Error::UnknownGroup(group.clone()))?;
                natural.push(EdgeLoad { edges, load: &**load });
            }
        }
        for (edges, load) in &self.natural_edges {
            if let Some(edge) = edges.iter().find(|e| e.iter().any(|&n| n >= n_nodes)) {
                return Err(Error::Mesh(format!(
                    "load edge {:?} out of range (mesh has {} nodes)",
                    edge, n_nodes
                )));
            }
            natural.push(EdgeLoad { edges, load: &**load });
        }

        debug!(
            constrained_dofs = dirichlet.len(),
            overwritten,
            edge_loads = natural.len(),
            "resolved boundary conditions"
        );
        if overwritten > 0 {
            warn!(overwritten, "Dirichlet DOFs constrained more than once, last value kept");
        }

        Ok(ResolvedConditions { dirichlet, natural })
    }
}

/// A load function applied over a list of edges.
pub struct EdgeLoad<'r, V> {
    pub edges: &'r [Edge],
    pub load: &'r (dyn Fn(f64, f64) -> V + Send + Sync + 'r),
}

/// Canonical form of all boundary conditions for one solve.
pub struct ResolvedConditions<'r, V> {
    /// Constrained global DOF → prescribed value.
    pub dirichlet: BTreeMap<usize, f64>,
    /// Neumann or traction loads, in application order.
    pub natural: Vec<EdgeLoad<'r, V>>,
}
