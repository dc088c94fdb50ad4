//! Binary two-phase KKS partition at a fixed interpolated phase fraction.
//!
//! Unknowns `x = (cL, cS)` with nominal composition `c` and solid weight `h`:
//!
//! ```text
//! F0 = dfL/dc(cL) - dfS/dc(cS)
//! F1 = h cS + (1 - h) cL - c
//! ```

use nalgebra::{Matrix2, Vector2};
use pf_calphad::BinaryPhaseCoefficients;
use pf_core::Real;

use crate::coefficients::BinaryCoefficients;
use crate::error::{SolverError, SolverResult, ensure_finite_input};
use crate::newton::{NewtonConfig, NewtonOutcome, damped_newton};
use crate::system::EquationSystem;

/// Equal-potential plus mass-balance system for one diffuse-interface cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryKksSystem {
    rt: Real,
    liquid: BinaryPhaseCoefficients,
    solid: BinaryPhaseCoefficients,
    conc: Real,
    h: Real,
}

impl BinaryKksSystem {
    pub fn new(coefficients: &BinaryCoefficients, conc: Real, h: Real) -> Self {
        Self {
            rt: coefficients.rt(),
            liquid: coefficients.liquid,
            solid: coefficients.solid,
            conc,
            h,
        }
    }
}

impl EquationSystem<2> for BinaryKksSystem {
    fn residual(&self, x: &Vector2<Real>) -> Vector2<Real> {
        let (cl, cs) = (x[0], x[1]);
        Vector2::new(
            self.liquid.chemical_potential(self.rt, cl)
                - self.solid.chemical_potential(self.rt, cs),
            self.h * cs + (1.0 - self.h) * cl - self.conc,
        )
    }

    fn jacobian(&self, x: &Vector2<Real>) -> Matrix2<Real> {
        let (cl, cs) = (x[0], x[1]);
        Matrix2::new(
            self.liquid.curvature(self.rt, cl),
            -self.solid.curvature(self.rt, cs),
            1.0 - self.h,
            self.h,
        )
    }
}

/// Per-cell liquid/solid compositions for binary KKS phase-field models.
#[derive(Debug, Clone, Default)]
pub struct BinaryKksConcSolver {
    coefficients: Option<BinaryCoefficients>,
    config: NewtonConfig,
}

impl BinaryKksConcSolver {
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

    /// System for a cell of nominal composition `conc` and solid weight `h`.
    pub fn system(&self, conc: Real, h: Real) -> SolverResult<BinaryKksSystem> {
        ensure_finite_input(&[conc, h], "binary KKS composition and phase fraction")?;
        let coefficients = self.coefficients.as_ref().ok_or(SolverError::Uninitialized {
            what: "binary KKS solver",
        })?;
        Ok(BinaryKksSystem::new(coefficients, conc, h))
    }

    pub fn residual(&self, x: &Vector2<Real>, conc: Real, h: Real) -> SolverResult<Vector2<Real>> {
        Ok(self.system(conc, h)?.residual(x))
    }

    pub fn jacobian(&self, x: &Vector2<Real>, conc: Real, h: Real) -> SolverResult<Matrix2<Real>> {
        Ok(self.system(conc, h)?.jacobian(x))
    }

    /// Solve for `(cL, cS)` from the guess in `x`.
    pub fn compute_concentration(
        &self,
        x: &mut Vector2<Real>,
        conc: Real,
        h: Real,
    ) -> SolverResult<NewtonOutcome> {
        self.config.validate()?;
        let system = self.system(conc, h)?;
        Ok(damped_newton(&system, x, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::{k, rt_inverse};

    fn liquid_solid() -> BinaryKksConcSolver {
        let mut solver = BinaryKksConcSolver::new();
        solver
            .setup(
                rt_inverse(k(900.0)).unwrap(),
                [-20_000.0, 5_000.0, 0.0, 0.0],
                [-15_000.0, 2_000.0, 0.0, 0.0],
                [0.0, -1_000.0],
                [0.0, 800.0],
            )
            .unwrap();
        solver
    }

    #[test]
    fn pure_phase_weights() {
        let solver = liquid_solid();
        for (h, idx) in [(0.0, 0), (1.0, 1)] {
            let mut x = Vector2::new(0.5, 0.5);
            let outcome = solver.compute_concentration(&mut x, 0.5, h).unwrap();
            assert!(outcome.is_converged(), "{outcome:?}");
            // the fully weighted phase carries the nominal composition
            assert!((x[idx] - 0.5).abs() < 1e-8);
        }
    }

    #[test]
    fn rejects_nan_inputs_before_solving() {
        let solver = liquid_solid();
        let mut x = Vector2::new(0.5, 0.5);
        assert!(matches!(
            solver.compute_concentration(&mut x, Real::NAN, 0.5),
            Err(SolverError::InvalidInput { .. })
        ));
        assert!(solver.compute_concentration(&mut x, 0.5, Real::INFINITY).is_err());
        assert_eq!(x, Vector2::new(0.5, 0.5));
    }

    #[test]
    fn uninitialized() {
        let solver = BinaryKksConcSolver::new();
        let mut x = Vector2::new(0.5, 0.5);
        assert!(matches!(
            solver.compute_concentration(&mut x, 0.5, 0.5),
            Err(SolverError::Uninitialized { .. })
        ));
    }

    #[test]
    fn jacobian_mass_balance_row_is_phase_weights() {
        let solver = liquid_solid();
        let j = solver.jacobian(&Vector2::new(0.3, 0.4), 0.35, 0.25).unwrap();
        assert_eq!(j[(1, 0)], 0.75);
        assert_eq!(j[(1, 1)], 0.25);
    }
}
