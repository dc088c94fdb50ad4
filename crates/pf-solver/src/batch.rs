//! Parallel per-cell solves.
//!
//! Every cell owns its solution vector and the systems are immutable, so the
//! cells are independent and are spread over the rayon thread pool. Results
//! are identical to solving the cells one after another.

use nalgebra::SVector;
use pf_core::Real;
use rayon::prelude::*;

use crate::error::{SolverError, SolverResult};
use crate::newton::{NewtonConfig, NewtonOutcome, damped_newton};
use crate::system::EquationSystem;

/// Solve `systems[i]` from the guess in `solutions[i]`, in parallel.
pub fn solve_batch<S, const N: usize>(
    systems: &[S],
    solutions: &mut [SVector<Real, N>],
    config: &NewtonConfig,
) -> SolverResult<Vec<NewtonOutcome>>
where
    S: EquationSystem<N> + Sync,
{
    config.validate()?;
    if systems.len() != solutions.len() {
        return Err(SolverError::InvalidInput {
            what: format!(
                "{} systems but {} solution vectors",
                systems.len(),
                solutions.len()
            ),
        });
    }

    let outcomes: Vec<NewtonOutcome> = systems
        .par_iter()
        .zip(solutions.par_iter_mut())
        .map(|(system, x)| damped_newton(system, x, config))
        .collect();
    log_summary(&outcomes);
    Ok(outcomes)
}

/// Solve one system from many starting points, in parallel.
pub fn solve_batch_shared<S, const N: usize>(
    system: &S,
    solutions: &mut [SVector<Real, N>],
    config: &NewtonConfig,
) -> SolverResult<Vec<NewtonOutcome>>
where
    S: EquationSystem<N> + Sync + ?Sized,
{
    config.validate()?;
    let outcomes: Vec<NewtonOutcome> = solutions
        .par_iter_mut()
        .map(|x| damped_newton(system, x, config))
        .collect();
    log_summary(&outcomes);
    Ok(outcomes)
}

fn log_summary(outcomes: &[NewtonOutcome]) {
    let failed = outcomes.iter().filter(|o| !o.is_converged()).count();
    if failed > 0 {
        tracing::debug!(cells = outcomes.len(), failed, "batch solve finished with failures");
    }
}
