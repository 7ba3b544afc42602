//! Named boundary groups and their validation against mesh topology.
//!
//! A [`Boundary`] maps group names to node sets and edge sets. Edge groups may
//! only contain free edges of the triangulation: edges referenced by exactly
//! one triangle, as computed by [`boundary_edges_of`].

use crate::error::{BoundaryViolation, Error, Result};
use crate::mesh::Mesh;
use crate::types::{canonical_edge, Edge};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

/// Named groups of boundary nodes and boundary edges.
///
/// Edges are canonicalized to `[min, max]` on insertion. Groups are kept in
/// sorted maps so iteration order (and [`Boundary::summary`]) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boundary {
    nodes: BTreeMap<String, Vec<usize>>,
    edges: BTreeMap<String, Vec<Edge>>,
}

impl Boundary {
    /// Create an empty boundary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node group `name`, replacing any existing one.
    pub fn with_nodes(mut self, name: impl Into<String>, nodes: Vec<usize>) -> Self {
        self.nodes.insert(name.into(), nodes);
        self
    }

    /// Set the edge group `name`, replacing any existing one.
    pub fn with_edges(mut self, name: impl Into<String>, edges: Vec<Edge>) -> Self {
        let edges = edges.into_iter().map(|[a, b]| canonical_edge(a, b)).collect();
        self.edges.insert(name.into(), edges);
        self
    }

    /// Set the edge group `name` from a flat `[a0, b0, a1, b1, ...]` list.
    pub fn with_edges_flat(self, name: impl Into<String>, flat: &[usize]) -> Result<Self> {
        let name = name.into();
        if flat.len() % 2 != 0 {
            return Err(Error::boundary(
                &name,
                BoundaryViolation::MalformedEdges { len: flat.len() },
            ));
        }
        let edges = flat.chunks_exact(2).map(|e| [e[0], e[1]]).collect();
        Ok(self.with_edges(name, edges))
    }

    /// Node ids of group `name`.
    pub fn nodes(&self, name: &str) -> Option<&[usize]> {
        self.nodes.get(name).map(Vec::as_slice)
    }

    /// Canonical edges of group `name`.
    pub fn edges(&self, name: &str) -> Option<&[Edge]> {
        self.edges.get(name).map(Vec::as_slice)
    }

    /// All group names appearing in either map, sorted.
    pub fn group_names(&self) -> BTreeSet<&str> {
        self.nodes
            .keys()
            .chain(self.edges.keys())
            .map(String::as_str)
            .collect()
    }

    /// Check every group against the mesh.
    ///
    /// Node groups: ids in range, no duplicates. Edge groups: no zero-length
    /// edges, endpoints in range, no duplicates, every edge a free edge of the
    /// mesh. With `strict`, every edge endpoint must also be listed in the
    /// group's own node set. Empty groups are skipped.
    pub fn validate(&self, mesh: &Mesh, strict: bool) -> Result<()> {
        let n_nodes = mesh.n_nodes();

        for (name, nodes) in &self.nodes {
            let mut seen = HashSet::with_capacity(nodes.len());
            for &node in nodes {
                if node >= n_nodes {
                    return Err(Error::boundary(
                        name,
                        BoundaryViolation::NodeOutOfRange { node, n_nodes },
                    ));
                }
                if !seen.insert(node) {
                    return Err(Error::boundary(name, BoundaryViolation::DuplicateNode { node }));
                }
            }
        }

        let free_edges: HashSet<Edge> = boundary_edges_of(mesh).into_iter().collect();

        for (name, edges) in &self.edges {
            if edges.is_empty() {
                continue;
            }

            if let Some(&[node, _]) = edges.iter().find(|[a, b]| a == b) {
                return Err(Error::boundary(name, BoundaryViolation::ZeroLengthEdge { node }));
            }

            if let Some(&edge) = edges.iter().find(|[_, b]| *b >= n_nodes) {
                return Err(Error::boundary(
                    name,
                    BoundaryViolation::EdgeOutOfRange { edge, n_nodes },
                ));
            }

            let mut seen = HashSet::with_capacity(edges.len());
            if let Some(&edge) = edges.iter().find(|e| !seen.insert(**e)) {
                return Err(Error::boundary(name, BoundaryViolation::DuplicateEdge { edge }));
            }

            if let Some(&edge) = edges.iter().find(|e| !free_edges.contains(*e)) {
                return Err(Error::boundary(name, BoundaryViolation::NotOnBoundary { edge }));
            }

            if strict {
                let group_nodes: HashSet<usize> = self
                    .nodes(name)
                    .map(|n| n.iter().copied().collect())
                    .unwrap_or_default();
                if group_nodes.is_empty() {
                    return Err(Error::boundary(name, BoundaryViolation::MissingNodeGroup));
                }
                for &edge in edges {
                    if let Some(&node) = edge.iter().find(|n| !group_nodes.contains(*n)) {
                        return Err(Error::boundary(
                            name,
                            BoundaryViolation::EndpointNotInGroup { edge, node },
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Per-group node and edge counts, sorted by group name.
    pub fn summary(&self) -> String {
        let mut lines = vec!["Boundary groups:".to_owned()];
        for name in self.group_names() {
            let n_nodes = self.nodes(name).map_or(0, <[usize]>::len);
            let n_edges = self.edges(name).map_or(0, <[Edge]>::len);
            lines.push(format!(
                "  - {:<10}: nodes={:>6}, edges={:>6}",
                name, n_nodes, n_edges
            ));
        }
        lines.join("\n")
    }

    /// Derive groups from named predicates over node coordinates.
    ///
    /// A node joins a group when the predicate holds at its coordinates. A
    /// free edge joins a group when the predicate holds at both endpoints.
    pub fn from_predicates(mesh: &Mesh, predicates: &[(&str, &dyn Fn(f64, f64) -> bool)]) -> Self {
        let free_edges = boundary_edges_of(mesh);
        let nodes = mesh.nodes();

        let mut boundary = Self::new();
        for &(name, predicate) in predicates {
            let hits: Vec<bool> = nodes.iter().map(|p| predicate(p.x, p.y)).collect();

            let group_nodes = (0..nodes.len()).filter(|&n| hits[n]).collect();
            let group_edges = free_edges
                .iter()
                .filter(|[a, b]| hits[*a] && hits[*b])
                .copied()
                .collect();

            boundary = boundary
                .with_nodes(name, group_nodes)
                .with_edges(name, group_edges);
        }
        boundary
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Free edges of the triangulation, sorted.
///
/// Every triangle contributes its three canonical edges; an edge lies on the
/// boundary iff exactly one triangle references it. This is recomputed from
/// connectivity alone and never consults stored group data.
pub fn boundary_edges_of(mesh: &Mesh) -> Vec<Edge> {
    let mut counts: HashMap<Edge, usize> = HashMap::with_capacity(3 * mesh.n_triangles());
    for &[a, b, c] in mesh.triangles() {
        for (i, j) in [(a, b), (b, c), (c, a)] {
            *counts.entry(canonical_edge(i, j)).or_insert(0) += 1;
        }
    }

    let mut edges: Vec<Edge> = counts
        .into_iter()
        .filter(|&(_, count)| count == 1)
        .map(|(edge, _)| edge)
        .collect();
    edges.sort_unstable();
    edges
}

/// Canonical edges between consecutive ids of an ordered node chain.
pub fn edges_from_node_chain(node_ids: &[usize]) -> Vec<Edge> {
    node_ids
        .windows(2)
        .map(|pair| canonical_edge(pair[0], pair[1]))
        .collect()
}
