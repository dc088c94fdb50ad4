//! Binary two-phase common-tangent solver.
//!
//! Unknowns `x = (cL, cS)`, the A fraction in the liquid and in the solid:
//!
//! ```text
//! F0 = fL(cL) - fS(cS) - (cL - cS) dfS/dc(cS)
//! F1 = dfL/dc(cL) - dfS/dc(cS)
//! ```

use nalgebra::{Matrix2, Vector2};
use pf_calphad::BinaryPhaseCoefficients;
use pf_core::Real;

use crate::coefficients::BinaryCoefficients;
use crate::error::{SolverError, SolverResult};
use crate::newton::{NewtonConfig, NewtonOutcome, damped_newton};
use crate::system::EquationSystem;

/// Residual/Jacobian pair of the common-tangent construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryEquilibriumSystem {
    rt: Real,
    liquid: BinaryPhaseCoefficients,
    solid: BinaryPhaseCoefficients,
}

impl BinaryEquilibriumSystem {
    pub fn new(coefficients: &BinaryCoefficients) -> Self {
        Self {
            rt: coefficients.rt(),
            liquid: coefficients.liquid,
            solid: coefficients.solid,
        }
    }
}

impl EquationSystem<2> for BinaryEquilibriumSystem {
    fn residual(&self, x: &Vector2<Real>) -> Vector2<Real> {
        let (cl, cs) = (x[0], x[1]);
        let dfl = self.liquid.chemical_potential(self.rt, cl);
        let dfs = self.solid.chemical_potential(self.rt, cs);

        Vector2::new(
            self.liquid.free_energy(self.rt, cl)
                - self.solid.free_energy(self.rt, cs)
                - (cl - cs) * dfs,
            dfl - dfs,
        )
    }

    fn jacobian(&self, x: &Vector2<Real>) -> Matrix2<Real> {
        let (cl, cs) = (x[0], x[1]);
        let dfl = self.liquid.chemical_potential(self.rt, cl);
        let dfs = self.solid.chemical_potential(self.rt, cs);
        let d2fl = self.liquid.curvature(self.rt, cl);
        let d2fs = self.solid.curvature(self.rt, cs);

        Matrix2::new(dfl - dfs, -(cl - cs) * d2fs, d2fl, -d2fs)
    }
}

/// Equilibrium liquid/solid compositions of a binary alloy.
#[derive(Debug, Clone, Default)]
pub struct BinaryEqConcSolver {
    coefficients: Option<BinaryCoefficients>,
    config: NewtonConfig,
}

impl BinaryEqConcSolver {
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

    /// Cache a full coefficient set. Index 0 of `f_a`/`f_b` is the liquid.
    pub fn setup(
        &mut self,
        rt_inv: Real,
        l_mix_l: [Real; 4],
        l_mix_s: [Real; 4],
        f_a: [Real; 2],
        f_b: [Real; 2],
    ) -> SolverResult<()> {
        self.setup_with(BinaryCoefficients::new(rt_inv, l_mix_l, l_mix_s, f_a, f_b))
    }

    pub fn setup_with(&mut self, coefficients: BinaryCoefficients) -> SolverResult<()> {
        coefficients.validate()?;
        self.coefficients = Some(coefficients);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.coefficients.is_some()
    }

    pub fn coefficients(&self) -> Option<&BinaryCoefficients> {
        self.coefficients.as_ref()
    }

    pub fn system(&self) -> SolverResult<BinaryEquilibriumSystem> {
        self.coefficients
            .as_ref()
            .map(BinaryEquilibriumSystem::new)
            .ok_or(SolverError::Uninitialized {
                what: "binary equilibrium solver",
            })
    }

    pub fn residual(&self, x: &Vector2<Real>) -> SolverResult<Vector2<Real>> {
        Ok(self.system()?.residual(x))
    }

    pub fn jacobian(&self, x: &Vector2<Real>) -> SolverResult<Matrix2<Real>> {
        Ok(self.system()?.jacobian(x))
    }

    /// Solve for `(cL, cS)` starting from the guess in `x`; `x` holds the
    /// last iterate on return whatever the outcome.
    pub fn compute_concentration(&self, x: &mut Vector2<Real>) -> SolverResult<NewtonOutcome> {
        self.config.validate()?;
        let system = self.system()?;
        Ok(damped_newton(&system, x, &self.config))
    }

    /// Lever rule: solid fraction of an alloy of A fraction `c` split
    /// between the compositions in `x`. `None` outside the tie line.
    pub fn phase_fraction(x: &Vector2<Real>, c: Real) -> Option<Real> {
        let (cl, cs) = (x[0], x[1]);
        let phi = (c - cl) / (cs - cl);
        (phi.is_finite() && (0.0..=1.0).contains(&phi)).then_some(phi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jacobian::jacobian_mismatch;
    use crate::newton::NewtonStatus;
    use pf_core::units::{k, rt_inverse};

    /// Identical mixing in both phases; the solid reference energies are
    /// tilted by +/- delta so the two curves cross at c = 0.5.
    fn crossing(delta: Real) -> BinaryEqConcSolver {
        let mut solver = BinaryEqConcSolver::new();
        let l = [-5_000.0, 0.0, 0.0, 0.0];
        solver
            .setup(
                rt_inverse(k(900.0)).unwrap(),
                l,
                l,
                [0.0, delta],
                [0.0, -delta],
            )
            .unwrap();
        solver
    }

    #[test]
    fn use_before_setup_is_an_error() {
        let solver = BinaryEqConcSolver::new();
        assert!(!solver.is_ready());
        let mut x = Vector2::new(0.4, 0.6);
        assert!(matches!(
            solver.compute_concentration(&mut x),
            Err(SolverError::Uninitialized { .. })
        ));
        assert!(solver.residual(&x).is_err());
        assert!(solver.jacobian(&x).is_err());
    }

    #[test]
    fn setup_rejects_nan_and_keeps_previous_state() {
        let mut solver = crossing(15.0);
        let err = solver.setup(1.0e-4, [Real::NAN; 4], [0.0; 4], [0.0; 2], [0.0; 2]);
        assert!(err.is_err());
        assert!(solver.is_ready());
        assert_eq!(solver.coefficients().unwrap().solid.f_a, 15.0);
    }

    #[test]
    fn equal_potential_near_crossing_point() {
        let solver = crossing(15.0);
        let mut x = Vector2::new(0.51, 0.49);
        let outcome = solver.compute_concentration(&mut x).unwrap();
        assert!(outcome.is_converged(), "{outcome:?}");

        let c = solver.coefficients().unwrap();
        let rt = c.rt();
        let dfl = c.liquid.chemical_potential(rt, x[0]);
        let dfs = c.solid.chemical_potential(rt, x[1]);
        assert!((dfl - dfs).abs() < 1e-5);
        assert!((x[0] - x[1]).abs() < 1e-2);
        // liquid is the lower curve above 0.5
        assert!(x[0] > 0.5 && x[1] < 0.5);
    }

    #[test]
    fn resolving_a_converged_solution_is_immediate() {
        let solver = crossing(15.0);
        let mut x = Vector2::new(0.52, 0.48);
        assert!(solver.compute_concentration(&mut x).unwrap().is_converged());
        let before = x;
        let again = solver.compute_concentration(&mut x).unwrap();
        assert!(again.is_converged());
        assert!(again.iterations <= 1);
        assert!((x - before).amax() < 1e-10);
    }

    #[test]
    fn lever_rule_inside_and_outside_tie_line() {
        let x = Vector2::new(0.6, 0.4);
        let phi = BinaryEqConcSolver::phase_fraction(&x, 0.45).unwrap();
        assert!((phi - 0.75).abs() < 1e-12);
        assert!(BinaryEqConcSolver::phase_fraction(&x, 0.7).is_none());
        assert!(BinaryEqConcSolver::phase_fraction(&Vector2::new(0.5, 0.5), 0.5).is_none());
    }

    #[test]
    fn tiny_budget_reports_failure_with_partial_progress() {
        let mut solver = crossing(15.0);
        solver.config_mut().set_max_iterations(1).unwrap();
        let mut x = Vector2::new(0.7, 0.3);
        let outcome = solver.compute_concentration(&mut x).unwrap();
        assert_eq!(outcome.status, NewtonStatus::MaxIterationsExceeded);
        assert_eq!(outcome.code(), -1);
        assert_ne!(x, Vector2::new(0.7, 0.3));
    }

    #[test]
    fn invalid_config_is_rejected_at_solve_time() {
        let mut solver = crossing(15.0);
        solver.config_mut().damping = 0.0;
        let mut x = Vector2::new(0.51, 0.49);
        assert!(matches!(
            solver.compute_concentration(&mut x),
            Err(SolverError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn analytic_jacobian_at_sample_point() {
        let solver = BinaryEqConcSolver::new();
        assert!(solver.system().is_err());
        let system = crossing(200.0).system().unwrap();
        let x = Vector2::new(0.3, 0.65);
        assert!(jacobian_mismatch(&system, &x, 1e-6, 10.0) < 1e-6);
    }
}
