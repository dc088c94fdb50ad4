//! Three-phase partition of a synthetic liquid + two-solid binary set at 900 K.
//!
//! Expected roots are regression values for these coefficients.

use nalgebra::Vector3;
use pf_core::units::{k, rt_inverse};
use pf_solver::jacobian::jacobian_mismatch;
use pf_solver::{BinaryThreePhaseConcSolver, NewtonConfig};
use proptest::prelude::*;

const H: [f64; 3] = [0.5, 0.4, 0.1];
const CONC: f64 = 0.9;

fn solver(config: NewtonConfig) -> BinaryThreePhaseConcSolver {
    let mut solver = BinaryThreePhaseConcSolver::with_config(config).unwrap();
    solver
        .setup(
            rt_inverse(k(900.0)).unwrap(),
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
fn heavily_damped_partition() {
    let config = NewtonConfig::default()
        .with_damping(0.1)
        .with_max_iterations(10_000);
    let solver = solver(config);

    let mut x = Vector3::new(CONC, CONC, CONC);
    let outcome = solver.compute_concentration(&mut x, CONC, H).unwrap();
    assert!(outcome.is_converged(), "{outcome:?}");
    assert!(outcome.iterations > 20 && outcome.iterations < 1_000);

    let mu = solver.system(CONC, H).unwrap().chemical_potentials(&x);
    assert!((mu[0] - mu[1]).abs() < 1e-5);
    assert!((mu[0] - mu[2]).abs() < 1e-5);
    assert!((mu[1] - mu[2]).abs() < 1e-5);

    let mass = H[0] * x[0] + H[1] * x[1] + H[2] * x[2];
    assert!((mass - CONC).abs() < 1e-8);

    assert!((x[0] - 0.877_68).abs() < 1e-4);
    assert!((x[1] - 0.920_94).abs() < 1e-4);
    assert!((x[2] - 0.927_86).abs() < 1e-4);
}

#[test]
fn damping_changes_path_not_root() {
    let damped = solver(
        NewtonConfig::default()
            .with_damping(0.1)
            .with_max_iterations(10_000),
    );
    let full = solver(NewtonConfig::default());

    let mut a = Vector3::new(CONC, CONC, CONC);
    let mut b = a;
    let slow = damped.compute_concentration(&mut a, CONC, H).unwrap();
    let fast = full.compute_concentration(&mut b, CONC, H).unwrap();
    assert!(slow.is_converged() && fast.is_converged());
    assert!(fast.iterations < slow.iterations);
    assert!((a - b).amax() < 1e-6);
}

#[test]
fn legacy_config_keys() {
    let config = NewtonConfig::from_json_str(r#"{"tol": 1e-8, "max_its": 10000, "alpha": 0.1}"#)
        .unwrap();
    let solver = solver(config);
    let mut x = Vector3::new(CONC, CONC, CONC);
    assert!(solver.compute_concentration(&mut x, CONC, H).unwrap().is_converged());
}

proptest! {
    #[test]
    fn jacobian_matches_differences(
        cl in 0.02..0.98f64,
        ca in 0.02..0.98f64,
        cb in 0.02..0.98f64,
        hl in 0.0..1.0f64,
        ha in 0.0..1.0f64,
    ) {
        let h = [hl, ha * (1.0 - hl), (1.0 - ha) * (1.0 - hl)];
        let system = solver(NewtonConfig::default()).system(0.5, h).unwrap();
        prop_assert!(jacobian_mismatch(&system, &Vector3::new(cl, ca, cb), 1e-6, 10.0) < 1e-6);
    }
}
