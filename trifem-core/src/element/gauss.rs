//! Gauss quadrature for boundary (edge) integrals.
//!
//! Edge loads are integrated with the 2-point Gauss-Legendre rule on the
//! reference interval [-1, 1], which is exact for integrands up to cubic
//! degree: loads varying linearly along the edge times linear shape functions.
//!
//! # Usage
//!
//! ```
//! use trifem_core::element::gauss::{gauss_legendre_2, EdgeMap};
//! use trifem_core::types::Point2;
//!
//! let edge = EdgeMap::new(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
//! let length: f64 = gauss_legendre_2()
//!     .iter()
//!     .map(|&(_xi, w)| w * edge.jacobian())
//!     .sum();
//! assert!((length - 2.0).abs() < 1e-14);
//! ```

use crate::types::Point2;

/// 2-point Gauss-Legendre rule as `(ξ, weight)` pairs on [-1, 1].
///
/// Points are ±1/√3 with unit weights.
pub fn gauss_legendre_2() -> [(f64, f64); 2] {
    let p = 1.0 / 3.0_f64.sqrt();
    [(-p, 1.0), (p, 1.0)]
}

/// Linear map from the reference interval onto a straight edge `a → b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeMap {
    a: Point2,
    b: Point2,
}

impl EdgeMap {
    /// Map onto the edge from `a` (ξ = -1) to `b` (ξ = +1).
    pub fn new(a: Point2, b: Point2) -> Self {
        Self { a, b }
    }

    /// Linear edge shape functions `[0.5(1 - ξ), 0.5(1 + ξ)]`.
    #[inline]
    pub fn shape(xi: f64) -> [f64; 2] {
        [0.5 * (1.0 - xi), 0.5 * (1.0 + xi)]
    }

    /// Physical point at reference coordinate `xi`.
    pub fn point(&self, xi: f64) -> Point2 {
        let [na, nb] = Self::shape(xi);
        self.a * na + self.b * nb
    }

    /// Measure factor of the map: half the physical edge length.
    pub fn jacobian(&self) -> f64 {
        0.5 * (self.b - self.a).norm()
    }
}
