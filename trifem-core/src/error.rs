//! Error types for trifem operations.

use crate::types::Edge;
use thiserror::Error;

/// Result type alias using the trifem Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or solving a problem.
#[derive(Error, Debug)]
pub enum Error {
    /// Degenerate element (non-positive area).
    #[error("geometry error: {0}")]
    Geometry(String),

    /// A boundary group violates one of the boundary invariants.
    #[error("boundary group '{group}': {violation}")]
    Boundary {
        group: String,
        violation: BoundaryViolation,
    },

    /// A boundary condition refers to a group the boundary does not define.
    #[error("unknown boundary group '{0}'")]
    UnknownGroup(String),

    /// Named boundary conditions were given without a boundary.
    #[error("named boundary conditions require a boundary")]
    MissingBoundary,

    /// Input array has the wrong shape.
    #[error("shape error: {0}")]
    Shape(String),

    /// Mesh connectivity errors.
    #[error("mesh error: {0}")]
    Mesh(String),

    /// Invalid material or physics parameters.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// A scalar parameter outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Solver errors.
    #[error("solver error: {0}")]
    Solver(String),

    /// Matrix singularity reported by the factorization.
    #[error("singular matrix: {0}")]
    SingularMatrix(String),

    /// I/O errors (VTK output).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The boundary invariant that failed, with an example offender.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoundaryViolation {
    #[error("node id {node} out of range (mesh has {n_nodes} nodes)")]
    NodeOutOfRange { node: usize, n_nodes: usize },

    #[error("duplicate node id {node}")]
    DuplicateNode { node: usize },

    #[error("edge list must hold pairs of node ids, got {len} ids")]
    MalformedEdges { len: usize },

    #[error("zero-length edge ({node}, {node})")]
    ZeroLengthEdge { node: usize },

    #[error("edge {edge:?} has an endpoint out of range (mesh has {n_nodes} nodes)")]
    EdgeOutOfRange { edge: Edge, n_nodes: usize },

    #[error("duplicate edge {edge:?}")]
    DuplicateEdge { edge: Edge },

    #[error("edge {edge:?} is not on the mesh boundary")]
    NotOnBoundary { edge: Edge },

    #[error("edges are present but the node group is empty or missing")]
    MissingNodeGroup,

    #[error("edge {edge:?} has endpoint {node} missing from the group's nodes")]
    EndpointNotInGroup { edge: Edge, node: usize },
}

impl Error {
    pub(crate) fn boundary(group: &str, violation: BoundaryViolation) -> Self {
        Error::Boundary {
            group: group.to_owned(),
            violation,
        }
    }
}
