//! Post-processing checks against closed-form solutions.

use crate::boundary::Boundary;
use crate::error::{Error, Result};
use crate::mesh::Mesh;

/// Vertical displacement measure over the nodes of `group`.
///
/// `u` is an interleaved displacement vector. With `use_abs` the result is
/// the largest `|u_y|`; otherwise the most negative `u_y`.
pub fn tip_deflection(boundary: &Boundary, group: &str, u: &[f64], use_abs: bool) -> Result<f64> {
    let nodes = boundary
        .nodes(group)
        .ok_or_else(|| Error::UnknownGroup(group.to_string()))?;
    if nodes.is_empty() {
        return Err(Error::Shape(format!("boundary group '{}' has no nodes", group)));
    }

    let mut uy = Vec::with_capacity(nodes.len());
    for &n in nodes {
        let v = u.get(2 * n + 1).ok_or_else(|| {
            Error::Shape(format!(
                "displacement vector of length {} has no entry for node {}",
                u.len(),
                n
            ))
        })?;
        uy.push(*v);
    }

    Ok(if use_abs {
        uy.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
    } else {
        uy.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

/// Euler–Bernoulli tip deflection of a cantilever under an end traction `t0`
/// spread over height `h` (unit thickness).
///
/// δ = P L³ / (3 E I) with P = T0·H and I = H³/12, i.e. 4·T0·L³/(E·H²).
/// Returned as a magnitude.
pub fn euler_bernoulli_tip_deflection(t0: f64, l: f64, h: f64, e: f64) -> Result<f64> {
    if !(l > 0.0 && h > 0.0 && e > 0.0) {
        return Err(Error::InvalidParameter(format!(
            "L, H and E must be positive, got L={}, H={}, E={}",
            l, h, e
        )));
    }
    Ok(4.0 * t0.abs() * l.powi(3) / (e * h * h))
}

/// Largest nodal deviation of a scalar field from `exact`.
pub fn max_nodal_error(mesh: &Mesh, u: &[f64], exact: impl Fn(f64, f64) -> f64) -> Result<f64> {
    if u.len() != mesh.n_nodes() {
        return Err(Error::Shape(format!(
            "field has {} values for {} nodes",
            u.len(),
            mesh.n_nodes()
        )));
    }
    Ok(mesh
        .nodes()
        .iter()
        .zip(u)
        .map(|(p, v)| (v - exact(p.x, p.y)).abs())
        .fold(0.0, f64::max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::unit_square;
    use approx::assert_relative_eq;

    #[test]
    fn test_tip_deflection_modes() {
        let boundary = Boundary::new().with_nodes("right", vec![1, 2]);
        let u = [0.0, 9.0, 0.0, -0.5, 0.0, 0.25];

        assert_relative_eq!(tip_deflection(&boundary, "right", &u, true).unwrap(), 0.5);
        assert_relative_eq!(tip_deflection(&boundary, "right", &u, false).unwrap(), -0.5);
    }

    #[test]
    fn test_tip_deflection_errors() {
        let boundary = Boundary::new()
            .with_nodes("right", vec![5])
            .with_nodes("empty", vec![]);
        let u = [0.0; 4];

        assert!(matches!(
            tip_deflection(&boundary, "tip", &u, true),
            Err(Error::UnknownGroup(_))
        ));
        assert!(matches!(
            tip_deflection(&boundary, "empty", &u, true),
            Err(Error::Shape(_))
        ));
        assert!(matches!(
            tip_deflection(&boundary, "right", &u, true),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn test_euler_bernoulli() {
        let delta = euler_bernoulli_tip_deflection(1e6, 10.0, 1.0, 210e9).unwrap();
        assert_relative_eq!(delta, 0.019047619047619, max_relative = 1e-12);
        assert_relative_eq!(
            euler_bernoulli_tip_deflection(-1e6, 10.0, 1.0, 210e9).unwrap(),
            delta
        );

        for (l, h, e) in [(0.0, 1.0, 1.0), (1.0, -1.0, 1.0), (1.0, 1.0, 0.0)] {
            assert!(matches!(
                euler_bernoulli_tip_deflection(1.0, l, h, e),
                Err(Error::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_max_nodal_error() {
        let (mesh, _) = unit_square(2, 2).unwrap();
        let mut u: Vec<f64> = mesh.nodes().iter().map(|p| p.x + p.y).collect();
        assert_eq!(max_nodal_error(&mesh, &u, |x, y| x + y).unwrap(), 0.0);

        u[4] += 0.125;
        assert_relative_eq!(max_nodal_error(&mesh, &u, |x, y| x + y).unwrap(), 0.125);
        assert!(max_nodal_error(&mesh, &u[..3], |_, _| 0.0).is_err());
    }
}
