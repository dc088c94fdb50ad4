//! Small dense linear algebra for the Newton correction step.
//!
//! Systems have at most [`MAX_DIM`] unknowns, so determinants are expanded by
//! cofactors and the default solve is Cramer's rule. Everything runs on stack
//! copies; nothing allocates.

use nalgebra::{SMatrix, SVector};
use pf_core::Real;
use serde::{Deserialize, Serialize};

/// Largest system handled by the cofactor kernels.
pub const MAX_DIM: usize = 5;

/// `|det J|` below this fraction of the product of row max-norms is treated
/// as singular.
pub const SINGULAR_RTOL: Real = 1e-13;

type Scratch = [[Real; MAX_DIM]; MAX_DIM];

/// Linear solve used for the Newton correction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolver {
    /// Cramer's rule with cofactor determinants.
    #[default]
    Cramer,
    /// Explicit inverse from nalgebra, then a matrix-vector product.
    Inverse,
}

fn cofactor_det(a: &Scratch, n: usize) -> Real {
    match n {
        0 => 1.0,
        1 => a[0][0],
        2 => a[0][0] * a[1][1] - a[0][1] * a[1][0],
        3 => {
            a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
                - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
                + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0])
        }
        _ => {
            let mut det = 0.0;
            let mut sign = 1.0;
            for col in 0..n {
                let pivot = a[0][col];
                if pivot != 0.0 {
                    let mut minor: Scratch = [[0.0; MAX_DIM]; MAX_DIM];
                    for i in 1..n {
                        let mut mj = 0;
                        for j in (0..n).filter(|&j| j != col) {
                            minor[i - 1][mj] = a[i][j];
                            mj += 1;
                        }
                    }
                    det += sign * pivot * cofactor_det(&minor, n - 1);
                }
                sign = -sign;
            }
            det
        }
    }
}

fn to_scratch<const N: usize>(m: &SMatrix<Real, N, N>) -> Scratch {
    let mut a: Scratch = [[0.0; MAX_DIM]; MAX_DIM];
    for (i, row) in a.iter_mut().enumerate().take(N) {
        for (j, v) in row.iter_mut().enumerate().take(N) {
            *v = m[(i, j)];
        }
    }
    a
}

/// Determinant by cofactor expansion.
pub fn determinant<const N: usize>(m: &SMatrix<Real, N, N>) -> Real {
    const { assert!(N >= 1 && N <= MAX_DIM, "cofactor kernels cover 1..=5 unknowns") };
    cofactor_det(&to_scratch(m), N)
}

/// Product over rows of the largest absolute entry (Hadamard-style scale
/// for the determinant).
fn row_scale<const N: usize>(m: &SMatrix<Real, N, N>) -> Real {
    m.row_iter()
        .map(|row| row.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())))
        .product()
}

/// Singularity test shared by every linear solver.
pub fn is_singular<const N: usize>(m: &SMatrix<Real, N, N>, det: Real) -> bool {
    !det.is_finite() || det.abs() <= SINGULAR_RTOL * row_scale(m)
}

/// Solve `m x = b` by Cramer's rule. `None` when `m` is singular.
pub fn solve_cramer<const N: usize>(
    m: &SMatrix<Real, N, N>,
    b: &SVector<Real, N>,
) -> Option<SVector<Real, N>> {
    let det = determinant(m);
    if is_singular(m, det) {
        return None;
    }
    let mut x = SVector::<Real, N>::zeros();
    for i in 0..N {
        let mut mi = *m;
        mi.set_column(i, b);
        x[i] = determinant(&mi) / det;
    }
    Some(x)
}

/// Solve `m x = b` with the requested strategy, after the common singularity
/// test.
pub fn solve<const N: usize>(
    m: &SMatrix<Real, N, N>,
    b: &SVector<Real, N>,
    solver: LinearSolver,
) -> Option<SVector<Real, N>> {
    match solver {
        LinearSolver::Cramer => solve_cramer(m, b),
        LinearSolver::Inverse => {
            if is_singular(m, determinant(m)) {
                return None;
            }
            let x = m.try_inverse()? * b;
            x.iter().all(|v| v.is_finite()).then_some(x)
        }
    }
}
