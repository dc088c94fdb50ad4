//! Binary three-phase KKS partition (liquid plus two solids).
//!
//! Unknowns `x = (cL, cA, cB)` with phase weights `h = (hL, hA, hB)`:
//!
//! ```text
//! F0 = dfL/dc(cL) - dfA/dc(cA)
//! F1 = dfL/dc(cL) - dfB/dc(cB)
//! F2 = hL cL + hA cA + hB cB - c
//! ```

use nalgebra::{Matrix3, Vector3};
use pf_calphad::BinaryPhaseCoefficients;
use pf_core::Real;

use crate::coefficients::BinaryThreePhaseCoefficients;
use crate::error::{SolverError, SolverResult, ensure_finite_input};
use crate::newton::{NewtonConfig, NewtonOutcome, damped_newton};
use crate::system::EquationSystem;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryThreePhaseSystem {
    rt: Real,
    phases: [BinaryPhaseCoefficients; 3],
    conc: Real,
    h: [Real; 3],
}

impl BinaryThreePhaseSystem {
    pub fn new(coefficients: &BinaryThreePhaseCoefficients, conc: Real, h: [Real; 3]) -> Self {
        Self {
            rt: coefficients.rt(),
            phases: coefficients.phases,
            conc,
            h,
        }
    }

    /// Chemical potential of each phase at its own composition.
    pub fn chemical_potentials(&self, x: &Vector3<Real>) -> [Real; 3] {
        [0, 1, 2].map(|p| self.phases[p].chemical_potential(self.rt, x[p]))
    }
}

impl EquationSystem<3> for BinaryThreePhaseSystem {
    fn residual(&self, x: &Vector3<Real>) -> Vector3<Real> {
        let [mu_l, mu_a, mu_b] = self.chemical_potentials(x);
        let [hl, ha, hb] = self.h;
        Vector3::new(
            mu_l - mu_a,
            mu_l - mu_b,
            hl * x[0] + ha * x[1] + hb * x[2] - self.conc,
        )
    }

    fn jacobian(&self, x: &Vector3<Real>) -> Matrix3<Real> {
        let [gl, ga, gb] = [0, 1, 2].map(|p| self.phases[p].curvature(self.rt, x[p]));
        let [hl, ha, hb] = self.h;
        #[rustfmt::skip]
        let jac = Matrix3::new(
            gl, -ga, 0.0,
            gl, 0.0, -gb,
            hl, ha, hb,
        );
        jac
    }
}

/// Per-cell phase compositions for three-phase binary KKS models.
#[derive(Debug, Clone, Default)]
pub struct BinaryThreePhaseConcSolver {
    coefficients: Option<BinaryThreePhaseCoefficients>,
    config: NewtonConfig,
}

impl BinaryThreePhaseConcSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NewtonConfig) -> SolverResult<Self> {
        config.validate()?;
        Ok(Self {
            coefficients: None,
            config,
        })
    }

    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut NewtonConfig {
        &mut self.config
    }

    /// `l_mix[p]`, `f_a[p]`, `f_b[p]` belong to phase `p`, liquid first.
    pub fn setup(
        &mut self,
        rt_inv: Real,
        l_mix: [[Real; 4]; 3],
        f_a: [Real; 3],
        f_b: [Real; 3],
    ) -> SolverResult<()> {
        self.setup_with(BinaryThreePhaseCoefficients::new(rt_inv, l_mix, f_a, f_b))
    }

    pub fn setup_with(&mut self, coefficients: BinaryThreePhaseCoefficients) -> SolverResult<()> {
        coefficients.validate()?;
        self.coefficients = Some(coefficients);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.coefficients.is_some()
    }

    pub fn system(&self, conc: Real, h: [Real; 3]) -> SolverResult<BinaryThreePhaseSystem> {
        ensure_finite_input(&[conc, h[0], h[1], h[2]], "three-phase composition and weights")?;
        let coefficients = self.coefficients.as_ref().ok_or(SolverError::Uninitialized {
            what: "binary three-phase solver",
        })?;
        Ok(BinaryThreePhaseSystem::new(coefficients, conc, h))
    }

    pub fn residual(
        &self,
        x: &Vector3<Real>,
        conc: Real,
        h: [Real; 3],
    ) -> SolverResult<Vector3<Real>> {
        Ok(self.system(conc, h)?.residual(x))
    }

    pub fn jacobian(
        &self,
        x: &Vector3<Real>,
        conc: Real,
        h: [Real; 3],
    ) -> SolverResult<Matrix3<Real>> {
        Ok(self.system(conc, h)?.jacobian(x))
    }

    /// Solve for `(cL, cA, cB)` from the guess in `x`.
    pub fn compute_concentration(
        &self,
        x: &mut Vector3<Real>,
        conc: Real,
        h: [Real; 3],
    ) -> SolverResult<NewtonOutcome> {
        self.config.validate()?;
        let system = self.system(conc, h)?;
        Ok(damped_newton(&system, x, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jacobian::jacobian_mismatch;

    fn solver() -> BinaryThreePhaseConcSolver {
        let mut solver = BinaryThreePhaseConcSolver::new();
        solver
            .setup(
                1.0 / (8.314_462_618 * 900.0),
                [
                    [-20_000.0, 5_000.0, 0.0, 0.0],
                    [-15_000.0, 2_000.0, 0.0, 0.0],
                    [-10_000.0, 0.0, 1_000.0, 0.0],
                ],
                [0.0, -1_000.0, 500.0],
                [0.0, 800.0, -300.0],
            )
            .unwrap();
        solver
    }

    #[test]
    fn undamped_solve_balances_potentials() {
        let solver = solver();
        let h = [0.5, 0.4, 0.1];
        let mut x = Vector3::new(0.9, 0.9, 0.9);
        let outcome = solver.compute_concentration(&mut x, 0.9, h).unwrap();
        assert!(outcome.is_converged(), "{outcome:?}");
        assert!(outcome.iterations < 10);

        let mu = solver.system(0.9, h).unwrap().chemical_potentials(&x);
        assert!((mu[0] - mu[1]).abs() < 1e-5);
        assert!((mu[0] - mu[2]).abs() < 1e-5);
        let mass = h[0] * x[0] + h[1] * x[1] + h[2] * x[2];
        assert!((mass - 0.9).abs() < 1e-8);
    }

    #[test]
    fn analytic_jacobian_matches_differences() {
        let system = solver().system(0.5, [0.2, 0.3, 0.5]).unwrap();
        let x = Vector3::new(0.45, 0.6, 0.35);
        assert!(jacobian_mismatch(&system, &x, 1e-6, 10.0) < 1e-6);
    }

    #[test]
    fn uninitialized() {
        let solver = BinaryThreePhaseConcSolver::new();
        assert!(!solver.is_ready());
        assert!(solver.system(0.5, [1.0, 0.0, 0.0]).is_err());
    }
}
