//! Coefficient sets cached by the concentration solvers.
//!
//! Array lengths are part of the types, so a malformed coefficient set cannot
//! be constructed; `validate` covers the remaining failure mode (NaN or
//! infinite values, non-positive `1/RT`).

use pf_calphad::{BinaryPhaseCoefficients, TernaryPhaseCoefficients};
use pf_core::Real;
use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

fn validate_rt_inv(rt_inv: Real) -> SolverResult<()> {
    if rt_inv.is_finite() && rt_inv > 0.0 {
        Ok(())
    } else {
        Err(SolverError::InvalidCoefficients {
            what: format!("rt_inv must be finite and positive, got {rt_inv}"),
        })
    }
}

/// Liquid/solid pair for the binary two-phase solvers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryCoefficients {
    /// 1/(RT)
    pub rt_inv: Real,
    pub liquid: BinaryPhaseCoefficients,
    pub solid: BinaryPhaseCoefficients,
}

impl BinaryCoefficients {
    /// Build from per-phase arrays; `f_a[0]`/`f_b[0]` belong to the liquid,
    /// index 1 to the solid.
    pub fn new(
        rt_inv: Real,
        l_mix_l: [Real; 4],
        l_mix_s: [Real; 4],
        f_a: [Real; 2],
        f_b: [Real; 2],
    ) -> Self {
        Self {
            rt_inv,
            liquid: BinaryPhaseCoefficients::new(l_mix_l, f_a[0], f_b[0]),
            solid: BinaryPhaseCoefficients::new(l_mix_s, f_a[1], f_b[1]),
        }
    }

    pub fn validate(&self) -> SolverResult<()> {
        validate_rt_inv(self.rt_inv)?;
        self.liquid.validate()?;
        self.solid.validate()?;
        Ok(())
    }

    #[inline]
    pub fn rt(&self) -> Real {
        1.0 / self.rt_inv
    }
}

/// Liquid/solid pair for the ternary two-phase solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TernaryCoefficients {
    /// 1/(RT)
    pub rt_inv: Real,
    pub liquid: TernaryPhaseCoefficients,
    pub solid: TernaryPhaseCoefficients,
}

impl TernaryCoefficients {
    /// Build from the flat per-phase arrays; index 0 of `f_a`, `f_b`, `f_c`
    /// is the liquid, index 1 the solid.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rt_inv: Real,
        l_ab_l: [Real; 4],
        l_ac_l: [Real; 4],
        l_bc_l: [Real; 4],
        l_ab_s: [Real; 4],
        l_ac_s: [Real; 4],
        l_bc_s: [Real; 4],
        l_abc_l: [Real; 3],
        l_abc_s: [Real; 3],
        f_a: [Real; 2],
        f_b: [Real; 2],
        f_c: [Real; 2],
    ) -> Self {
        Self {
            rt_inv,
            liquid: TernaryPhaseCoefficients {
                l_ab: l_ab_l,
                l_ac: l_ac_l,
                l_bc: l_bc_l,
                l_abc: l_abc_l,
                f_a: f_a[0],
                f_b: f_b[0],
                f_c: f_c[0],
            },
            solid: TernaryPhaseCoefficients {
                l_ab: l_ab_s,
                l_ac: l_ac_s,
                l_bc: l_bc_s,
                l_abc: l_abc_s,
                f_a: f_a[1],
                f_b: f_b[1],
                f_c: f_c[1],
            },
        }
    }

    pub fn validate(&self) -> SolverResult<()> {
        validate_rt_inv(self.rt_inv)?;
        self.liquid.validate()?;
        self.solid.validate()?;
        Ok(())
    }

    #[inline]
    pub fn rt(&self) -> Real {
        1.0 / self.rt_inv
    }
}

/// Three binary phases (liquid plus two solids) for the three-phase solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryThreePhaseCoefficients {
    /// 1/(RT)
    pub rt_inv: Real,
    /// Liquid, first solid, second solid.
    pub phases: [BinaryPhaseCoefficients; 3],
}

impl BinaryThreePhaseCoefficients {
    /// `l_mix[p]`, `f_a[p]`, `f_b[p]` belong to phase `p` (liquid first).
    pub fn new(rt_inv: Real, l_mix: [[Real; 4]; 3], f_a: [Real; 3], f_b: [Real; 3]) -> Self {
        Self {
            rt_inv,
            phases: [0, 1, 2].map(|p| BinaryPhaseCoefficients::new(l_mix[p], f_a[p], f_b[p])),
        }
    }

    pub fn validate(&self) -> SolverResult<()> {
        validate_rt_inv(self.rt_inv)?;
        self.phases.iter().try_for_each(|p| p.validate())?;
        Ok(())
    }

    #[inline]
    pub fn rt(&self) -> Real {
        1.0 / self.rt_inv
    }
}
