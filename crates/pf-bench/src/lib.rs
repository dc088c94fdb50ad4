//! Benchmark framework for the phase-equilibrium concentration solvers.
//!
//! A scenario is a grid of independent mesh cells. Each run solves the grid
//! once serially and once through the rayon batch driver, checks both agree
//! and records the timings.

use std::time::Instant;

use nalgebra::{SVector, Vector2, Vector3};
use pf_core::Real;
use pf_core::units::{k, rt_inverse};
use pf_solver::{
    BinaryCoefficients, BinaryKksSystem, BinaryThreePhaseCoefficients, BinaryThreePhaseSystem,
    EquationSystem, NewtonConfig, NewtonOutcome, SolverError, TernaryCoefficients,
    TernaryEquilibriumSystem, TernaryState, damped_newton, solve_batch,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Invalid scenario {id}: {what}")]
    InvalidScenario { id: String, what: String },

    #[error("Serial and parallel solves disagree in cell {cell} of {id}")]
    Mismatch { id: String, cell: usize },
}

/// Which equilibrium system a scenario exercises.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Liquid/solid partition over a (c, h) grid
    BinaryKks,
    /// Liquid/two-solid partition over a weight grid at c = 0.9
    BinaryThreePhase,
    /// Ternary liquid/solid equilibrium over a nominal-composition grid
    TernaryEquilibrium,
}

/// A benchmark scenario definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkScenario {
    /// Unique identifier for this benchmark.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub kind: ScenarioKind,
    /// Number of mesh cells in the grid.
    pub cells: usize,
    pub config: NewtonConfig,
}

/// A single run's timing breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    pub serial_time_s: f64,
    pub parallel_time_s: f64,
    pub converged: usize,
    pub failed: usize,
    pub total_iterations: usize,
}

/// Aggregated statistics for multiple runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub run_count: usize,
    pub serial_time_median_s: f64,
    pub serial_time_min_s: f64,
    pub serial_time_max_s: f64,
    pub parallel_time_median_s: f64,
    pub parallel_time_min_s: f64,
    pub parallel_time_max_s: f64,
    /// Median serial time over median parallel time
    pub speedup: Option<f64>,
    pub mean_iterations_per_cell: Option<f64>,
}

/// Complete benchmark result for a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub scenario: BenchmarkScenario,
    pub runs: Vec<RunMetrics>,
    pub aggregate: AggregateMetrics,
}

/// Collection of benchmark results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

/// Synthetic liquid/solid pair at 900 K.
pub fn liquid_solid_coefficients() -> Result<BinaryCoefficients, BenchError> {
    Ok(BinaryCoefficients::new(
        rt_inv_900()?,
        [-20_000.0, 5_000.0, 0.0, 0.0],
        [-15_000.0, 2_000.0, 0.0, 0.0],
        [0.0, -1_000.0],
        [0.0, 800.0],
    ))
}

/// Synthetic liquid/two-solid triple at 900 K.
pub fn three_phase_coefficients() -> Result<BinaryThreePhaseCoefficients, BenchError> {
    Ok(BinaryThreePhaseCoefficients::new(
        rt_inv_900()?,
        [
            [-20_000.0, 5_000.0, 0.0, 0.0],
            [-15_000.0, 2_000.0, 0.0, 0.0],
            [-10_000.0, 0.0, 1_000.0, 0.0],
        ],
        [0.0, -1_000.0, 500.0],
        [0.0, 800.0, -300.0],
    ))
}

/// Synthetic ternary liquid/solid pair at 900 K.
pub fn ternary_coefficients() -> Result<TernaryCoefficients, BenchError> {
    Ok(TernaryCoefficients::new(
        rt_inv_900()?,
        [-8_000.0, 1_000.0, 0.0, 0.0],
        [-5_000.0, 0.0, 0.0, 0.0],
        [-6_000.0, 500.0, 0.0, 0.0],
        [-7_000.0, 0.0, 0.0, 0.0],
        [-5_500.0, 300.0, 0.0, 0.0],
        [-6_000.0, 0.0, 0.0, 0.0],
        [2_000.0, 1_000.0, -500.0],
        [0.0, 0.0, 0.0],
        [0.0, 2_500.0],
        [0.0, -2_000.0],
        [0.0, 0.0],
    ))
}

fn rt_inv_900() -> Result<Real, BenchError> {
    rt_inverse(k(900.0)).map_err(|e| BenchError::InvalidScenario {
        id: "fixture".to_string(),
        what: e.to_string(),
    })
}

/// Position of cell `i` on an `n`-point unit interval.
fn unit(i: usize, n: usize) -> Real {
    if n <= 1 {
        0.5
    } else {
        i as Real / (n - 1) as Real
    }
}

fn kks_grid(cells: usize) -> Result<(Vec<BinaryKksSystem>, Vec<Vector2<Real>>), BenchError> {
    let coefficients = liquid_solid_coefficients()?;
    coefficients.validate()?;
    let side = (cells as Real).sqrt().ceil().max(1.0) as usize;
    let mut systems = Vec::with_capacity(cells);
    let mut guesses = Vec::with_capacity(cells);
    for i in 0..cells {
        let c = 0.05 + 0.9 * unit(i % side, side);
        let h = unit(i / side, side);
        systems.push(BinaryKksSystem::new(&coefficients, c, h));
        guesses.push(Vector2::new(c, c));
    }
    Ok((systems, guesses))
}

fn three_phase_grid(
    cells: usize,
) -> Result<(Vec<BinaryThreePhaseSystem>, Vec<Vector3<Real>>), BenchError> {
    let coefficients = three_phase_coefficients()?;
    coefficients.validate()?;
    let conc = 0.9;
    let mut systems = Vec::with_capacity(cells);
    let mut guesses = Vec::with_capacity(cells);
    for i in 0..cells {
        let hl = 0.2 + 0.6 * unit(i, cells);
        let split = 0.8 - 0.6 * unit(i, cells);
        let h = [hl, split * (1.0 - hl), (1.0 - split) * (1.0 - hl)];
        systems.push(BinaryThreePhaseSystem::new(&coefficients, conc, h));
        guesses.push(Vector3::new(conc, conc, conc));
    }
    Ok((systems, guesses))
}

fn ternary_grid(
    cells: usize,
) -> Result<(Vec<TernaryEquilibriumSystem>, Vec<TernaryState>), BenchError> {
    let coefficients = ternary_coefficients()?;
    coefficients.validate()?;
    let side = (cells as Real).sqrt().ceil().max(1.0) as usize;
    let mut systems = Vec::with_capacity(cells);
    let mut guesses = Vec::with_capacity(cells);
    for i in 0..cells {
        let nominal = [
            0.26 + 0.06 * unit(i % side, side),
            0.33 + 0.06 * unit(i / side, side),
        ];
        systems.push(TernaryEquilibriumSystem::new(&coefficients, nominal));
        guesses.push(TernaryState::from([
            nominal[0] + 0.01,
            nominal[1],
            nominal[0] - 0.01,
            nominal[1],
            0.5,
        ]));
    }
    Ok((systems, guesses))
}

fn time_grid<S, const N: usize>(
    id: &str,
    systems: &[S],
    guesses: &[SVector<Real, N>],
    config: &NewtonConfig,
) -> Result<RunMetrics, BenchError>
where
    S: EquationSystem<N> + Sync,
{
    let mut serial = guesses.to_vec();
    let serial_start = Instant::now();
    let serial_outcomes: Vec<NewtonOutcome> = systems
        .iter()
        .zip(serial.iter_mut())
        .map(|(system, x)| damped_newton(system, x, config))
        .collect();
    let serial_time_s = serial_start.elapsed().as_secs_f64();

    let mut parallel = guesses.to_vec();
    let parallel_start = Instant::now();
    let parallel_outcomes = solve_batch(systems, &mut parallel, config)?;
    let parallel_time_s = parallel_start.elapsed().as_secs_f64();

    if let Some(cell) = (0..systems.len()).find(|&i| {
        serial_outcomes[i].status != parallel_outcomes[i].status
            || serial_outcomes[i].iterations != parallel_outcomes[i].iterations
            || (serial[i] - parallel[i]).amax() > 0.0
    }) {
        return Err(BenchError::Mismatch {
            id: id.to_string(),
            cell,
        });
    }

    let converged = serial_outcomes.iter().filter(|o| o.is_converged()).count();
    Ok(RunMetrics {
        serial_time_s,
        parallel_time_s,
        converged,
        failed: serial_outcomes.len() - converged,
        total_iterations: serial_outcomes.iter().map(|o| o.iterations).sum(),
    })
}

/// Run a single benchmark scenario N times.
pub fn run_scenario(
    scenario: &BenchmarkScenario,
    times: usize,
) -> Result<BenchmarkResult, BenchError> {
    if scenario.cells == 0 || times == 0 {
        return Err(BenchError::InvalidScenario {
            id: scenario.id.clone(),
            what: "cells and run count must be positive".to_string(),
        });
    }
    scenario.config.validate()?;

    let mut runs = Vec::with_capacity(times);
    for run in 0..times {
        let metrics = match scenario.kind {
            ScenarioKind::BinaryKks => {
                let (systems, guesses) = kks_grid(scenario.cells)?;
                time_grid(&scenario.id, &systems, &guesses, &scenario.config)?
            }
            ScenarioKind::BinaryThreePhase => {
                let (systems, guesses) = three_phase_grid(scenario.cells)?;
                time_grid(&scenario.id, &systems, &guesses, &scenario.config)?
            }
            ScenarioKind::TernaryEquilibrium => {
                let (systems, guesses) = ternary_grid(scenario.cells)?;
                time_grid(&scenario.id, &systems, &guesses, &scenario.config)?
            }
        };
        tracing::debug!(
            scenario = %scenario.id,
            run,
            serial_s = metrics.serial_time_s,
            parallel_s = metrics.parallel_time_s,
            failed = metrics.failed,
            "benchmark run finished"
        );
        runs.push(metrics);
    }

    let aggregate = compute_aggregates(&runs, scenario.cells);
    Ok(BenchmarkResult {
        scenario: scenario.clone(),
        runs,
        aggregate,
    })
}

fn median_min_max(mut values: Vec<f64>) -> (f64, f64, f64) {
    values.sort_by(|a, b| a.total_cmp(b));
    match (values.first(), values.last()) {
        (Some(&min), Some(&max)) => (values[values.len() / 2], min, max),
        _ => (0.0, 0.0, 0.0),
    }
}

fn compute_aggregates(runs: &[RunMetrics], cells: usize) -> AggregateMetrics {
    let (serial_median, serial_min, serial_max) =
        median_min_max(runs.iter().map(|r| r.serial_time_s).collect());
    let (parallel_median, parallel_min, parallel_max) =
        median_min_max(runs.iter().map(|r| r.parallel_time_s).collect());

    let speedup = (parallel_median > 0.0).then(|| serial_median / parallel_median);
    let mean_iterations_per_cell = runs
        .first()
        .filter(|_| cells > 0)
        .map(|r| r.total_iterations as f64 / cells as f64);

    AggregateMetrics {
        run_count: runs.len(),
        serial_time_median_s: serial_median,
        serial_time_min_s: serial_min,
        serial_time_max_s: serial_max,
        parallel_time_median_s: parallel_median,
        parallel_time_min_s: parallel_min,
        parallel_time_max_s: parallel_max,
        speedup,
        mean_iterations_per_cell,
    }
}

/// Default benchmark scenarios.
pub fn default_benchmarks() -> Vec<BenchmarkScenario> {
    vec![
        BenchmarkScenario {
            id: "binary_kks".to_string(),
            name: "Binary KKS liquid/solid partition".to_string(),
            kind: ScenarioKind::BinaryKks,
            cells: 40_000,
            config: NewtonConfig::default(),
        },
        BenchmarkScenario {
            id: "binary_three_phase".to_string(),
            name: "Binary liquid/two-solid partition".to_string(),
            kind: ScenarioKind::BinaryThreePhase,
            cells: 10_000,
            config: NewtonConfig::default().with_max_iterations(50),
        },
        BenchmarkScenario {
            id: "ternary_equilibrium".to_string(),
            name: "Ternary liquid/solid equilibrium".to_string(),
            kind: ScenarioKind::TernaryEquilibrium,
            cells: 10_000,
            config: NewtonConfig::default(),
        },
    ]
}
