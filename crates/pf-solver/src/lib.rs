//! Phase-equilibrium concentration solvers.
//!
//! Each solver caches a CALPHAD coefficient set, builds a small fixed-size
//! nonlinear system (residual plus analytic Jacobian) and drives it to a root
//! with damped Newton:
//!
//! | Solver                        | Unknowns                       | N |
//! |-------------------------------|--------------------------------|---|
//! | [`BinaryEqConcSolver`]        | `cL, cS` (common tangent)      | 2 |
//! | [`BinaryKksConcSolver`]       | `cL, cS` at fixed `h`          | 2 |
//! | [`BinaryThreePhaseConcSolver`]| `cL, cA, cB` at fixed weights  | 3 |
//! | [`TernaryEqPhaseConcSolver`]  | `cL_A, cL_B, cS_A, cS_B, phi`  | 5 |
//!
//! Solves are per mesh cell and allocation free. Failure to converge is a
//! [`NewtonStatus`], not an error; [`SolverError`] is reserved for misuse
//! (missing setup, invalid configuration, NaN inputs).

pub mod batch;
pub mod binary_eq;
pub mod binary_kks;
pub mod binary_three_phase;
pub mod coefficients;
pub mod error;
pub mod jacobian;
pub mod linalg;
pub mod newton;
pub mod system;
pub mod ternary_eq;

pub use batch::{solve_batch, solve_batch_shared};
pub use binary_eq::{BinaryEqConcSolver, BinaryEquilibriumSystem};
pub use binary_kks::{BinaryKksConcSolver, BinaryKksSystem};
pub use binary_three_phase::{BinaryThreePhaseConcSolver, BinaryThreePhaseSystem};
pub use coefficients::{BinaryCoefficients, BinaryThreePhaseCoefficients, TernaryCoefficients};
pub use error::{SolverError, SolverResult};
pub use linalg::LinearSolver;
pub use newton::{NewtonConfig, NewtonOutcome, NewtonStatus, damped_newton};
pub use system::EquationSystem;
pub use ternary_eq::{TernaryEqPhaseConcSolver, TernaryEquilibriumSystem, TernaryState};
