//! Linear triangle kernel and element operators.
//!
//! [`Tri3`] evaluates the per-triangle geometry (area, constant shape-function
//! gradients, centroid). The [`Element`] trait turns that geometry into a
//! local stiffness matrix so assembly can work with either physics uniformly.
//!
//! # Submodules
//!
//! - [`gauss`] - Gauss-Legendre rule and edge mapping for boundary integrals

use crate::error::{Error, Result};
use crate::types::Point2;
use nalgebra::{DMatrix, SMatrix};

pub mod gauss;

pub use gauss::{gauss_legendre_2, EdgeMap};

/// Geometry of a 3-node linear triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tri3 {
    /// Element area (always positive).
    pub area: f64,
    /// Physical gradients of the three shape functions.
    pub gradients: [Point2; 3],
    /// Vertex average.
    pub centroid: Point2,
}

impl Tri3 {
    /// Evaluate the kernel for the given vertices.
    ///
    /// The Jacobian determinant `det = (x2-x1)(y3-y1) - (x3-x1)(y2-y1)` gives
    /// `area = |det| / 2`. Shape-function gradients use the area-coordinate
    /// formulas divided by the signed determinant, which keeps them correct
    /// for clockwise vertex order as well.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Geometry`] for collinear or coincident vertices, i.e.
    /// when the area vanishes relative to the squared edge lengths.
    pub fn new(coords: &[Point2; 3]) -> Result<Self> {
        let [p1, p2, p3] = coords;
        let (x1, y1) = (p1.x, p1.y);
        let (x2, y2) = (p2.x, p2.y);
        let (x3, y3) = (p3.x, p3.y);

        let det = (x2 - x1) * (y3 - y1) - (x3 - x1) * (y2 - y1);
        let area = 0.5 * det.abs();

        let scale = (p2 - p1)
            .norm_squared()
            .max((p3 - p2).norm_squared())
            .max((p1 - p3).norm_squared());
        if !(area.is_finite() && area > f64::EPSILON * scale) {
            return Err(Error::Geometry(format!(
                "degenerate triangle with non-positive area {:e}",
                area
            )));
        }

        let inv_det = 1.0 / det;
        let gradients = [
            Point2::new((y2 - y3) * inv_det, (x3 - x2) * inv_det),
            Point2::new((y3 - y1) * inv_det, (x1 - x3) * inv_det),
            Point2::new((y1 - y2) * inv_det, (x2 - x1) * inv_det),
        ];

        Ok(Self {
            area,
            gradients,
            centroid: (p1 + p2 + p3) / 3.0,
        })
    }

    /// Gradient matrix with row `a` holding `∇N_a`.
    pub fn gradient_matrix(&self) -> SMatrix<f64, 3, 2> {
        let g = &self.gradients;
        SMatrix::<f64, 3, 2>::new(g[0].x, g[0].y, g[1].x, g[1].y, g[2].x, g[2].y)
    }

    /// Strain-displacement matrix for interleaved `[u1, v1, u2, v2, u3, v3]`.
    ///
    /// ε = [ε_xx, ε_yy, γ_xy]^T = B * u
    pub fn strain_displacement(&self) -> SMatrix<f64, 3, 6> {
        let mut b = SMatrix::<f64, 3, 6>::zeros();
        for (a, g) in self.gradients.iter().enumerate() {
            let col = 2 * a;
            b[(0, col)] = g.x;
            b[(1, col + 1)] = g.y;
            b[(2, col)] = g.y;
            b[(2, col + 1)] = g.x;
        }
        b
    }
}

/// Local operator evaluated on a [`Tri3`].
///
/// Elements must be thread-safe (Send + Sync) to enable parallel assembly.
pub trait Element: Send + Sync {
    /// Degrees of freedom per node (1 for scalar fields, 2 for displacements).
    fn dofs_per_node(&self) -> usize;

    /// Total degrees of freedom for this element.
    fn n_dofs(&self) -> usize {
        3 * self.dofs_per_node()
    }

    /// Dense local stiffness matrix of shape (n_dofs, n_dofs), in
    /// node-major interleaved DOF order.
    fn stiffness(&self, geometry: &Tri3) -> DMatrix<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_right_triangle() -> [Point2; 3] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_area_unit() {
        let tri = Tri3::new(&unit_right_triangle()).unwrap();
        assert_relative_eq!(tri.area, 0.5, epsilon = 1e-14);
        assert_relative_eq!(tri.centroid.x, 1.0 / 3.0, epsilon = 1e-14);
    }

    #[test]
    fn test_gradients_unit() {
        let tri = Tri3::new(&unit_right_triangle()).unwrap();
        // N1 = 1 - x - y, N2 = x, N3 = y
        assert_relative_eq!(tri.gradients[0], Point2::new(-1.0, -1.0), epsilon = 1e-14);
        assert_relative_eq!(tri.gradients[1], Point2::new(1.0, 0.0), epsilon = 1e-14);
        assert_relative_eq!(tri.gradients[2], Point2::new(0.0, 1.0), epsilon = 1e-14);
    }

    #[test]
    fn test_gradients_reproduce_linear_field() {
        let coords = [
            Point2::new(0.3, -0.2),
            Point2::new(2.1, 0.4),
            Point2::new(0.9, 1.7),
        ];
        let tri = Tri3::new(&coords).unwrap();

        // u = 2 + 3x - 5y sampled at the vertices.
        let grad = coords
            .iter()
            .zip(&tri.gradients)
            .fold(Point2::zeros(), |acc, (p, g)| acc + g * (2.0 + 3.0 * p.x - 5.0 * p.y));
        assert_relative_eq!(grad, Point2::new(3.0, -5.0), epsilon = 1e-12);

        // Partition of unity: gradients sum to zero.
        let sum = tri.gradients.iter().sum::<Point2>();
        assert_relative_eq!(sum, Point2::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_clockwise_order_gives_same_gradients() {
        let [a, b, c] = unit_right_triangle();
        let ccw = Tri3::new(&[a, b, c]).unwrap();
        let cw = Tri3::new(&[a, c, b]).unwrap();

        assert_relative_eq!(cw.area, ccw.area, epsilon = 1e-14);
        assert_relative_eq!(cw.gradients[1], ccw.gradients[2], epsilon = 1e-14);
        assert_relative_eq!(cw.gradients[2], ccw.gradients[1], epsilon = 1e-14);
    }

    #[test]
    fn test_collinear_vertices_rejected() {
        let coords = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        ];
        assert!(matches!(Tri3::new(&coords), Err(Error::Geometry(_))));
    }

    #[test]
    fn test_duplicate_vertices_rejected() {
        let coords = [
            Point2::new(0.5, 0.5),
            Point2::new(0.5, 0.5),
            Point2::new(1.0, 0.0),
        ];
        assert!(matches!(Tri3::new(&coords), Err(Error::Geometry(_))));

        let point = [Point2::new(1.0, 1.0); 3];
        assert!(matches!(Tri3::new(&point), Err(Error::Geometry(_))));
    }

    #[test]
    fn test_strain_displacement_layout() {
        let tri = Tri3::new(&unit_right_triangle()).unwrap();
        let b = tri.strain_displacement();

        // Uniform ε_xx = 0.001: u = 0.001 * x
        let u = nalgebra::SVector::<f64, 6>::from_column_slice(&[0.0, 0.0, 0.001, 0.0, 0.0, 0.0]);
        let strain = b * u;
        assert_relative_eq!(strain[0], 0.001, epsilon = 1e-15);
        assert_relative_eq!(strain[1], 0.0, epsilon = 1e-15);
        assert_relative_eq!(strain[2], 0.0, epsilon = 1e-15);

        // Rigid translation produces no strain.
        let t = nalgebra::SVector::<f64, 6>::from_column_slice(&[1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
        assert_relative_eq!((b * t).norm(), 0.0, epsilon = 1e-14);
    }
}
