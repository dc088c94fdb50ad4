//! Finite difference Jacobians, used to check the analytic formulas.

use nalgebra::{SMatrix, SVector};
use pf_core::Real;

use crate::system::EquationSystem;

/// Compute Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by epsilon and computes (f(x+e) - f(x))/epsilon.
pub fn forward_difference_jacobian<F, const N: usize>(
    x: &SVector<Real, N>,
    f: F,
    epsilon: Real,
) -> SMatrix<Real, N, N>
where
    F: Fn(&SVector<Real, N>) -> SVector<Real, N>,
{
    let f_x = f(x);
    let mut jac = SMatrix::<Real, N, N>::zeros();

    for j in 0..N {
        let mut x_perturbed = *x;
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] += dx;

        let df = (f(&x_perturbed) - f_x) / dx;
        jac.set_column(j, &df);
    }

    jac
}

/// Compute Jacobian using central finite differences (more accurate but 2x cost).
pub fn central_difference_jacobian<F, const N: usize>(
    x: &SVector<Real, N>,
    f: F,
    epsilon: Real,
) -> SMatrix<Real, N, N>
where
    F: Fn(&SVector<Real, N>) -> SVector<Real, N>,
{
    let mut jac = SMatrix::<Real, N, N>::zeros();

    for j in 0..N {
        let dx = epsilon * x[j].abs().max(1.0);

        let mut x_plus = *x;
        x_plus[j] += dx;
        let mut x_minus = *x;
        x_minus[j] -= dx;

        let df = (f(&x_plus) - f(&x_minus)) / (2.0 * dx);
        jac.set_column(j, &df);
    }

    jac
}

/// Largest scaled disagreement between a system's analytic Jacobian and a
/// central-difference estimate at `x`.
///
/// Entry `(i, j)` contributes `|fd - an| / (|an| + max_k |an_ik| + floor)`,
/// so rows are compared on their own scale and `floor` absorbs round-off in
/// rows built from large energies.
pub fn jacobian_mismatch<S, const N: usize>(
    system: &S,
    x: &SVector<Real, N>,
    epsilon: Real,
    floor: Real,
) -> Real
where
    S: EquationSystem<N> + ?Sized,
{
    let analytic = system.jacobian(x);
    let numeric = central_difference_jacobian(x, |y| system.residual(y), epsilon);

    let mut worst: Real = 0.0;
    for i in 0..N {
        let row_scale = analytic.row(i).amax();
        for j in 0..N {
            let an = analytic[(i, j)];
            let err = (numeric[(i, j)] - an).abs() / (an.abs() + row_scale + floor);
            worst = worst.max(err);
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix1, Vector1, Vector2};

    #[test]
    fn jacobian_linear() {
        // f(x) = 2*x, J = 2
        let f = |x: &Vector1<Real>| Vector1::new(2.0 * x[0]);

        let x = Vector1::new(3.0);
        let jac = forward_difference_jacobian(&x, f, 1e-7);

        assert!((jac[(0, 0)] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn jacobian_quadratic() {
        // f(x) = x^2, J = 2*x
        let f = |x: &Vector1<Real>| Vector1::new(x[0] * x[0]);

        let x = Vector1::new(3.0);
        let jac = central_difference_jacobian(&x, f, 1e-7);

        assert!((jac[(0, 0)] - 6.0).abs() < 1e-6);
    }

    struct Coupled;

    impl EquationSystem<2> for Coupled {
        fn residual(&self, x: &Vector2<Real>) -> Vector2<Real> {
            Vector2::new(x[0] * x[1] - 1.0, x[0].sin() + x[1])
        }

        fn jacobian(&self, x: &Vector2<Real>) -> nalgebra::Matrix2<Real> {
            nalgebra::Matrix2::new(x[1], x[0], x[0].cos(), 1.0)
        }
    }

    #[test]
    fn mismatch_small_for_correct_jacobian() {
        let x = Vector2::new(0.7, -1.3);
        assert!(jacobian_mismatch(&Coupled, &x, 1e-6, 0.0) < 1e-8);
    }

    struct Wrong;

    impl EquationSystem<1> for Wrong {
        fn residual(&self, x: &Vector1<Real>) -> Vector1<Real> {
            Vector1::new(x[0] * x[0])
        }

        fn jacobian(&self, x: &Vector1<Real>) -> Matrix1<Real> {
            Matrix1::new(x[0])
        }
    }

    #[test]
    fn mismatch_flags_wrong_jacobian() {
        let x = Vector1::new(2.0);
        assert!(jacobian_mismatch(&Wrong, &x, 1e-6, 0.0) > 0.1);
    }
}
