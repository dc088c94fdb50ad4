//! Per-phase coefficient sets and the total phase free energy.
//!
//! A phase free energy is the composition-weighted pure-species reference
//! plus ideal and excess mixing contributions. All energies are molar
//! (J/mol); `rt` is R*T in the same units.

use pf_core::Real;
use pf_core::numeric::ensure_all_finite;
use serde::{Deserialize, Serialize};

use crate::binary;
use crate::error::CalphadResult;
use crate::ternary::{self, MixingTerms};

/// Coefficients of one phase in a binary A-B system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryPhaseCoefficients {
    /// Redlich-Kister coefficients `L0..L3`.
    pub l_mix: [Real; 4],
    /// Pure A reference energy.
    pub f_a: Real,
    /// Pure B reference energy.
    pub f_b: Real,
}

impl BinaryPhaseCoefficients {
    pub fn new(l_mix: [Real; 4], f_a: Real, f_b: Real) -> Self {
        Self { l_mix, f_a, f_b }
    }

    pub fn validate(&self) -> CalphadResult<()> {
        ensure_all_finite(&self.l_mix, "binary l_mix")?;
        ensure_all_finite(&[self.f_a, self.f_b], "binary pure-species energy")?;
        Ok(())
    }

    /// `f(c) = c fA + (1 - c) fB + ideal + excess`
    #[inline]
    pub fn free_energy(&self, rt: Real, c: Real) -> Real {
        c * self.f_a
            + (1.0 - c) * self.f_b
            + binary::ideal_mix(rt, c)
            + binary::excess_mix(&self.l_mix, c)
    }

    /// `df/dc`, the diffusion potential of A relative to B.
    #[inline]
    pub fn chemical_potential(&self, rt: Real, c: Real) -> Real {
        self.f_a - self.f_b
            + binary::ideal_mix_deriv(rt, c)
            + binary::excess_mix_deriv(&self.l_mix, c)
    }

    /// `d2f/dc2`
    #[inline]
    pub fn curvature(&self, rt: Real, c: Real) -> Real {
        binary::ideal_mix_deriv2(rt, c) + binary::excess_mix_deriv2(&self.l_mix, c)
    }
}

/// Coefficients of one phase in a ternary A-B-C system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TernaryPhaseCoefficients {
    pub l_ab: [Real; 4],
    pub l_ac: [Real; 4],
    pub l_bc: [Real; 4],
    pub l_abc: [Real; 3],
    pub f_a: Real,
    pub f_b: Real,
    pub f_c: Real,
}

impl TernaryPhaseCoefficients {
    pub fn validate(&self) -> CalphadResult<()> {
        ensure_all_finite(&self.l_ab, "ternary l_ab")?;
        ensure_all_finite(&self.l_ac, "ternary l_ac")?;
        ensure_all_finite(&self.l_bc, "ternary l_bc")?;
        ensure_all_finite(&self.l_abc, "ternary l_abc")?;
        ensure_all_finite(&[self.f_a, self.f_b, self.f_c], "ternary pure-species energy")?;
        Ok(())
    }

    /// Free energy, diffusion potentials `(df/dca, df/dcb)` and Hessian at
    /// `(ca, cb)`.
    #[inline]
    pub fn energy(&self, rt: Real, ca: Real, cb: Real) -> MixingTerms {
        let cc = 1.0 - ca - cb;
        let mixing = ternary::ideal_mix(rt, ca, cb)
            + ternary::excess_mix(&self.l_ab, &self.l_ac, &self.l_bc, &self.l_abc, ca, cb);
        let reference = MixingTerms {
            value: ca * self.f_a + cb * self.f_b + cc * self.f_c,
            gradient: [self.f_a - self.f_c, self.f_b - self.f_c],
            hessian: [[0.0; 2]; 2],
        };
        reference + mixing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RT: Real = 7483.016_356_2;

    fn liquid() -> BinaryPhaseCoefficients {
        BinaryPhaseCoefficients::new([-20_000.0, 5_000.0, 0.0, 0.0], 0.0, 0.0)
    }

    #[test]
    fn pure_species_limits() {
        let p = BinaryPhaseCoefficients::new([-1.0e4, 0.0, 0.0, 0.0], 1200.0, -300.0);
        // Regularised x ln x leaves a residue of order RT * 1e-8.
        assert!((p.free_energy(RT, 1.0) - 1200.0).abs() < 1e-3);
        assert!((p.free_energy(RT, 0.0) + 300.0).abs() < 1e-3);
    }

    #[test]
    fn curvature_positive_for_attractive_mixing() {
        let p = liquid();
        for c in [0.05, 0.3, 0.5, 0.7, 0.95] {
            assert!(p.curvature(RT, c) > 0.0);
        }
    }

    #[test]
    fn validate_rejects_nan() {
        let mut p = liquid();
        assert!(p.validate().is_ok());
        p.l_mix[2] = Real::NAN;
        assert!(p.validate().is_err());
        let mut p = liquid();
        p.f_b = Real::INFINITY;
        assert!(p.validate().is_err());
    }

    #[test]
    fn ternary_reference_gradient() {
        let p = TernaryPhaseCoefficients {
            l_ab: [0.0; 4],
            l_ac: [0.0; 4],
            l_bc: [0.0; 4],
            l_abc: [0.0; 3],
            f_a: 100.0,
            f_b: 40.0,
            f_c: 10.0,
        };
        let at_center = p.energy(RT, 1.0 / 3.0, 1.0 / 3.0);
        assert!((at_center.gradient[0] - 90.0).abs() < 1e-9);
        assert!((at_center.gradient[1] - 30.0).abs() < 1e-9);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn serde_roundtrip_keeps_coefficients() {
        let p = liquid();
        let json = serde_json::to_string(&p).unwrap();
        let back: BinaryPhaseCoefficients = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
