//! Capability trait for fixed-size nonlinear equilibrium systems.

use nalgebra::{SMatrix, SVector};
use pf_core::Real;

/// A square nonlinear system `F(x) = 0` with `N` unknowns and an analytic
/// Jacobian.
///
/// Implementors hold everything needed to evaluate the residual (cached
/// coefficients, nominal composition, phase fractions), are immutable during
/// a solve and must not allocate: the Newton driver calls them once per
/// iteration for every mesh cell.
pub trait EquationSystem<const N: usize> {
    /// Residual vector `F(x)`.
    fn residual(&self, x: &SVector<Real, N>) -> SVector<Real, N>;

    /// Jacobian `J[i][j] = dF_i/dx_j`.
    fn jacobian(&self, x: &SVector<Real, N>) -> SMatrix<Real, N, N>;

    /// Whether a converged `x` has its phase fractions inside `[0, 1]`
    /// (widened by `slack`). Systems without a phase-fraction unknown accept
    /// every solution.
    fn phase_fraction_feasible(&self, _x: &SVector<Real, N>, _slack: Real) -> bool {
        true
    }
}
