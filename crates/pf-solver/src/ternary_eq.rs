//! Ternary two-phase equilibrium with the solid phase fraction as unknown.
//!
//! Unknowns `x = (cL_A, cL_B, cS_A, cS_B, phi)`; `c0 = (c_A, c_B)` is the
//! nominal composition and `mu = df/dc` the diffusion potentials:
//!
//! ```text
//! F0 = fL - fS - sum_k (cL_k - cS_k) muL_k
//! F1 = muL_A - muS_A
//! F2 = muL_B - muS_B
//! F3 = phi cS_A + (1 - phi) cL_A - c_A
//! F4 = phi cS_B + (1 - phi) cL_B - c_B
//! ```
//!
//! A root whose `phi` lies outside `[0, 1]` means the nominal composition is
//! not inside the two-phase region; the Newton driver reports it as
//! [`NewtonStatus::InfeasiblePhaseFraction`](crate::newton::NewtonStatus).

use nalgebra::{SMatrix, SVector};
use pf_calphad::{MixingTerms, TernaryPhaseCoefficients};
use pf_core::Real;

use crate::coefficients::TernaryCoefficients;
use crate::error::{SolverError, SolverResult, ensure_finite_input};
use crate::newton::{NewtonConfig, NewtonOutcome, damped_newton};
use crate::system::EquationSystem;

pub type TernaryState = SVector<Real, 5>;
pub type TernaryJacobian = SMatrix<Real, 5, 5>;

/// Relative disagreement between the two mixed partials above which a
/// warning is logged.
pub const MIXED_PARTIAL_RTOL: Real = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TernaryEquilibriumSystem {
    rt: Real,
    liquid: TernaryPhaseCoefficients,
    solid: TernaryPhaseCoefficients,
    nominal: [Real; 2],
}

impl TernaryEquilibriumSystem {
    pub fn new(coefficients: &TernaryCoefficients, nominal: [Real; 2]) -> Self {
        Self {
            rt: coefficients.rt(),
            liquid: coefficients.liquid,
            solid: coefficients.solid,
            nominal,
        }
    }

    /// Liquid and solid energy terms at the compositions in `x`.
    pub fn phase_energies(&self, x: &TernaryState) -> (MixingTerms, MixingTerms) {
        (
            self.liquid.energy(self.rt, x[0], x[1]),
            self.solid.energy(self.rt, x[2], x[3]),
        )
    }
}

fn check_mixed_partials(phase: &'static str, terms: &MixingTerms) {
    let mismatch = terms.mixed_partial_mismatch();
    let scale = 1.0 + terms.hessian[0][1].abs();
    if mismatch > MIXED_PARTIAL_RTOL * scale {
        tracing::warn!(
            phase,
            mismatch,
            h01 = terms.hessian[0][1],
            h10 = terms.hessian[1][0],
            "mixed partial derivatives disagree"
        );
    }
}

impl EquationSystem<5> for TernaryEquilibriumSystem {
    fn residual(&self, x: &TernaryState) -> TernaryState {
        let (el, es) = self.phase_energies(x);
        let (dl0, dl1) = (x[0] - x[2], x[1] - x[3]);
        let phi = x[4];

        TernaryState::from([
            el.value - es.value - dl0 * el.gradient[0] - dl1 * el.gradient[1],
            el.gradient[0] - es.gradient[0],
            el.gradient[1] - es.gradient[1],
            phi * x[2] + (1.0 - phi) * x[0] - self.nominal[0],
            phi * x[3] + (1.0 - phi) * x[1] - self.nominal[1],
        ])
    }

    fn jacobian(&self, x: &TernaryState) -> TernaryJacobian {
        let (el, es) = self.phase_energies(x);
        check_mixed_partials("liquid", &el);
        check_mixed_partials("solid", &es);

        let (dl0, dl1) = (x[0] - x[2], x[1] - x[3]);
        let phi = x[4];
        let hl = &el.hessian;
        let hs = &es.hessian;
        // the upper off-diagonal stands in for both mixed partials
        let (hl01, hs01) = (hl[0][1], hs[0][1]);

        #[rustfmt::skip]
        let jac = TernaryJacobian::from_row_slice(&[
            -dl0 * hl[0][0] - dl1 * hl01, -dl0 * hl01 - dl1 * hl[1][1],
                el.gradient[0] - es.gradient[0], el.gradient[1] - es.gradient[1], 0.0,
            hl[0][0], hl01, -hs[0][0], -hs01, 0.0,
            hl01, hl[1][1], -hs01, -hs[1][1], 0.0,
            1.0 - phi, 0.0, phi, 0.0, x[2] - x[0],
            0.0, 1.0 - phi, 0.0, phi, x[3] - x[1],
        ]);
        jac
    }

    fn phase_fraction_feasible(&self, x: &TernaryState, slack: Real) -> bool {
        (-slack..=1.0 + slack).contains(&x[4])
    }
}

/// Liquid/solid compositions and solid fraction of a ternary alloy.
#[derive(Debug, Clone)]
pub struct TernaryEqPhaseConcSolver {
    coefficients: Option<TernaryCoefficients>,
    nominal: [Real; 2],
    config: NewtonConfig,
}

impl TernaryEqPhaseConcSolver {
    /// Solver for the nominal composition `(c_A, c_B)`.
    pub fn new(nominal: [Real; 2]) -> Self {
        Self {
            coefficients: None,
            nominal,
            config: NewtonConfig::default(),
        }
    }

    pub fn with_config(nominal: [Real; 2], config: NewtonConfig) -> SolverResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(nominal)
        })
    }

    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut NewtonConfig {
        &mut self.config
    }

    pub fn nominal_composition(&self) -> [Real; 2] {
        self.nominal
    }

    pub fn set_nominal_composition(&mut self, nominal: [Real; 2]) {
        self.nominal = nominal;
    }

    /// Cache a full coefficient set. Index 0 of `f_a`, `f_b`, `f_c` is the
    /// liquid.
    #[allow(clippy::too_many_arguments)]
    pub fn setup(
        &mut self,
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
    ) -> SolverResult<()> {
        self.setup_with(TernaryCoefficients::new(
            rt_inv, l_ab_l, l_ac_l, l_bc_l, l_ab_s, l_ac_s, l_bc_s, l_abc_l, l_abc_s, f_a, f_b,
            f_c,
        ))
    }

    pub fn setup_with(&mut self, coefficients: TernaryCoefficients) -> SolverResult<()> {
        coefficients.validate()?;
        self.coefficients = Some(coefficients);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.coefficients.is_some()
    }

    pub fn coefficients(&self) -> Option<&TernaryCoefficients> {
        self.coefficients.as_ref()
    }

    pub fn system(&self) -> SolverResult<TernaryEquilibriumSystem> {
        ensure_finite_input(&self.nominal, "ternary nominal composition")?;
        let coefficients = self.coefficients.as_ref().ok_or(SolverError::Uninitialized {
            what: "ternary equilibrium solver",
        })?;
        Ok(TernaryEquilibriumSystem::new(coefficients, self.nominal))
    }

    pub fn residual(&self, x: &TernaryState) -> SolverResult<TernaryState> {
        Ok(self.system()?.residual(x))
    }

    pub fn jacobian(&self, x: &TernaryState) -> SolverResult<TernaryJacobian> {
        Ok(self.system()?.jacobian(x))
    }

    /// Solve with the cached coefficients from the guess in `x`.
    pub fn compute_concentration(&self, x: &mut TernaryState) -> SolverResult<NewtonOutcome> {
        self.config.validate()?;
        let system = self.system()?;
        Ok(damped_newton(&system, x, &self.config))
    }

    /// Replace the cached coefficients, then solve.
    pub fn compute_concentration_with(
        &mut self,
        x: &mut TernaryState,
        coefficients: TernaryCoefficients,
    ) -> SolverResult<NewtonOutcome> {
        self.setup_with(coefficients)?;
        self.compute_concentration(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newton::NewtonStatus;

    fn ideal_only() -> TernaryCoefficients {
        TernaryCoefficients::new(
            1.0 / (8.314_462_618 * 800.0),
            [0.0; 4],
            [0.0; 4],
            [0.0; 4],
            [0.0; 4],
            [0.0; 4],
            [0.0; 4],
            [0.0; 3],
            [0.0; 3],
            [0.0; 2],
            [0.0; 2],
            [0.0; 2],
        )
    }

    #[test]
    fn uninitialized_and_nan_nominal() {
        let solver = TernaryEqPhaseConcSolver::new([0.3, 0.3]);
        let mut x = TernaryState::from([0.3, 0.3, 0.3, 0.3, 0.5]);
        assert!(matches!(
            solver.compute_concentration(&mut x),
            Err(SolverError::Uninitialized { .. })
        ));

        let mut solver = TernaryEqPhaseConcSolver::new([Real::NAN, 0.3]);
        solver.setup_with(ideal_only()).unwrap();
        assert!(matches!(
            solver.compute_concentration(&mut x),
            Err(SolverError::InvalidInput { .. })
        ));
    }

    #[test]
    fn identical_phases_are_singular() {
        let mut solver = TernaryEqPhaseConcSolver::new([0.3, 0.3]);
        let mut x = TernaryState::from([0.3, 0.3, 0.3, 0.3, 0.5]);
        x[0] = 0.31;
        x[2] = 0.31;
        let outcome = solver.compute_concentration_with(&mut x, ideal_only()).unwrap();
        assert_eq!(outcome.status, NewtonStatus::SingularJacobian);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn mass_balance_rows_are_linear() {
        let mut solver = TernaryEqPhaseConcSolver::new([0.25, 0.4]);
        solver.setup_with(ideal_only()).unwrap();
        let x = TernaryState::from([0.2, 0.5, 0.3, 0.35, 0.5]);
        let r = solver.residual(&x).unwrap();
        assert!((r[3] - 0.0).abs() < 1e-15);
        assert!((r[4] - 0.025).abs() < 1e-15);
        let j = solver.jacobian(&x).unwrap();
        assert!((j[(3, 4)] - 0.1).abs() < 1e-15);
        assert_eq!(j[(4, 0)], 0.0);
        assert_eq!(j[(0, 4)], 0.0);
    }

    #[test]
    fn feasibility_window() {
        let mut solver = TernaryEqPhaseConcSolver::new([0.3, 0.3]);
        solver.setup_with(ideal_only()).unwrap();
        let system = solver.system().unwrap();
        let mut x = TernaryState::from([0.3, 0.3, 0.3, 0.3, 1.0]);
        assert!(system.phase_fraction_feasible(&x, 1e-8));
        x[4] = 1.0 + 1e-6;
        assert!(!system.phase_fraction_feasible(&x, 1e-8));
        x[4] = -1e-9;
        assert!(system.phase_fraction_feasible(&x, 1e-8));
    }
}
