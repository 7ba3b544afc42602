//! Isotropic linear elastic material for plane problems.
//!
//! Provides the 3x3 constitutive matrix for plane stress and plane strain.

use crate::error::{Error, Result};
use crate::types::ConstitutiveMatrix;

/// In-plane idealization of a thin or thick body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaneCondition {
    /// σ_z = 0 (thin plates).
    #[default]
    Stress,
    /// ε_z = 0 (long prismatic bodies).
    Strain,
}

/// Material properties for plane elasticity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Young's modulus (Pa).
    pub youngs_modulus: f64,
    /// Poisson's ratio (dimensionless).
    pub poissons_ratio: f64,
}

impl Material {
    /// Create a new isotropic linear elastic material.
    ///
    /// # Arguments
    ///
    /// * `youngs_modulus` - Young's modulus E (Pa)
    /// * `poissons_ratio` - Poisson's ratio ν (dimensionless, -1 < ν < 0.5)
    ///
    /// # Errors
    ///
    /// Returns error if material properties are physically invalid.
    pub fn new(youngs_modulus: f64, poissons_ratio: f64) -> Result<Self> {
        if !(youngs_modulus > 0.0 && youngs_modulus.is_finite()) {
            return Err(Error::InvalidMaterial(
                "Young's modulus must be positive".into(),
            ));
        }
        if !(poissons_ratio > -1.0 && poissons_ratio < 0.5) {
            return Err(Error::InvalidMaterial(
                "Poisson's ratio must be in range (-1, 0.5)".into(),
            ));
        }
        Ok(Self {
            youngs_modulus,
            poissons_ratio,
        })
    }

    /// Shear modulus G = E / (2(1 + ν)).
    pub fn shear_modulus(&self) -> f64 {
        self.youngs_modulus / (2.0 * (1.0 + self.poissons_ratio))
    }

    /// Constitutive matrix for the given plane condition.
    pub fn constitutive(&self, condition: PlaneCondition) -> ConstitutiveMatrix {
        match condition {
            PlaneCondition::Stress => self.constitutive_plane_stress(),
            PlaneCondition::Strain => self.constitutive_plane_strain(),
        }
    }

    /// Plane stress constitutive matrix.
    ///
    /// Returns a 3x3 matrix for [σ_xx, σ_yy, τ_xy] = D * [ε_xx, ε_yy, γ_xy].
    pub fn constitutive_plane_stress(&self) -> ConstitutiveMatrix {
        let e = self.youngs_modulus;
        let nu = self.poissons_ratio;

        let factor = e / (1.0 - nu * nu);

        ConstitutiveMatrix::new(
            factor,         factor * nu, 0.0,
            factor * nu,    factor,      0.0,
            0.0,            0.0,         factor * (1.0 - nu) / 2.0,
        )
    }

    /// Plane strain constitutive matrix.
    ///
    /// Returns a 3x3 matrix for [σ_xx, σ_yy, τ_xy] = D * [ε_xx, ε_yy, γ_xy].
    pub fn constitutive_plane_strain(&self) -> ConstitutiveMatrix {
        let e = self.youngs_modulus;
        let nu = self.poissons_ratio;

        let factor = e / ((1.0 + nu) * (1.0 - 2.0 * nu));
        let c11 = factor * (1.0 - nu);
        let c12 = factor * nu;
        let c33 = factor * (1.0 - 2.0 * nu) / 2.0;

        ConstitutiveMatrix::new(
            c11, c12, 0.0,
            c12, c11, 0.0,
            0.0, 0.0, c33,
        )
    }
}
