//! Core data types shared across the crate.

use nalgebra::{Matrix3, Vector2};

/// A point in the plane.
pub type Point2 = Vector2<f64>;

/// Undirected mesh edge stored as `[min, max]`.
pub type Edge = [usize; 2];

/// Plane constitutive matrix in Voigt notation.
///
/// Maps [ε_xx, ε_yy, γ_xy] to [σ_xx, σ_yy, τ_xy].
pub type ConstitutiveMatrix = Matrix3<f64>;

/// Canonical form of the edge between `a` and `b`.
#[inline]
pub fn canonical_edge(a: usize, b: usize) -> Edge {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}

/// Global DOF of `component` at `node` for a field with `components` per node.
///
/// Vector fields are interleaved: node `n` owns DOFs `2n` and `2n + 1`.
#[inline]
pub fn node_dof(node: usize, component: usize, components: usize) -> usize {
    node * components + component
}
