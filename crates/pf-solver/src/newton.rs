//! Damped Newton driver for the fixed-size equilibrium systems.

use nalgebra::SVector;
use pf_core::Real;
use pf_core::numeric::max_abs;
use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};
use crate::linalg::{self, LinearSolver};
use crate::system::EquationSystem;

/// Newton solver configuration.
///
/// Deserializes from the legacy newton-database keys as well
/// (`tol`, `max_its`, `alpha`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonConfig {
    /// Absolute bound on every residual component
    #[serde(alias = "tol")]
    pub tolerance: Real,
    /// Maximum number of Newton updates
    #[serde(alias = "max_its")]
    pub max_iterations: usize,
    /// Damping factor applied to each correction, in (0, 1]
    #[serde(alias = "alpha")]
    pub damping: Real,
    /// Log every iteration at debug level
    pub verbose: bool,
    /// Linear solve used for the correction
    pub linear_solver: LinearSolver,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 20,
            damping: 1.0,
            verbose: false,
            linear_solver: LinearSolver::Cramer,
        }
    }
}

impl NewtonConfig {
    pub fn validate(&self) -> SolverResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SolverError::InvalidConfig {
                what: format!("tolerance must be finite and positive, got {}", self.tolerance),
            });
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig {
                what: "max_iterations must be at least 1".to_string(),
            });
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(SolverError::InvalidConfig {
                what: format!("damping must lie in (0, 1], got {}", self.damping),
            });
        }
        Ok(())
    }

    pub fn set_tolerance(&mut self, tolerance: Real) -> SolverResult<()> {
        let candidate = Self { tolerance, ..*self };
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) -> SolverResult<()> {
        let candidate = Self {
            max_iterations,
            ..*self
        };
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    pub fn set_damping(&mut self, damping: Real) -> SolverResult<()> {
        let candidate = Self { damping, ..*self };
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn with_tolerance(mut self, tolerance: Real) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_damping(mut self, damping: Real) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_linear_solver(mut self, linear_solver: LinearSolver) -> Self {
        self.linear_solver = linear_solver;
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(text: &str) -> SolverResult<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| SolverError::ConfigParse {
            what: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML configuration.
    pub fn from_yaml_str(text: &str) -> SolverResult<Self> {
        let config: Self = serde_yaml::from_str(text).map_err(|e| SolverError::ConfigParse {
            what: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// How a Newton solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NewtonStatus {
    /// Every residual component is below the tolerance.
    Converged,
    /// The iteration budget ran out.
    MaxIterationsExceeded,
    /// The Jacobian was (numerically) singular at the current iterate.
    SingularJacobian,
    /// The residual contained NaN or infinity.
    NonFiniteResidual,
    /// Converged, but to a phase fraction outside `[0, 1]`.
    InfeasiblePhaseFraction,
}

impl NewtonStatus {
    /// Legacy integer code for a failed solve.
    fn failure_code(self) -> i32 {
        match self {
            NewtonStatus::Converged => 0,
            NewtonStatus::MaxIterationsExceeded => -1,
            NewtonStatus::SingularJacobian => -2,
            NewtonStatus::NonFiniteResidual => -3,
            NewtonStatus::InfeasiblePhaseFraction => -4,
        }
    }
}

/// Newton iteration result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewtonOutcome {
    pub status: NewtonStatus,
    /// Number of updates applied to the solution vector
    pub iterations: usize,
    /// Max-norm of the last evaluated residual
    pub residual_norm: Real,
}

impl NewtonOutcome {
    pub fn is_converged(&self) -> bool {
        self.status == NewtonStatus::Converged
    }

    /// Iteration count on convergence, negative sentinel otherwise.
    pub fn code(&self) -> i32 {
        if self.is_converged() {
            i32::try_from(self.iterations).unwrap_or(i32::MAX)
        } else {
            self.status.failure_code()
        }
    }
}

/// Damped Newton iteration on `system`, updating `x` in place.
///
/// Each iteration evaluates the residual, stops once every component is
/// below `config.tolerance`, otherwise solves `J dx = -F` and applies
/// `x += damping * dx`. Partial progress stays in `x` when the solve fails.
/// The config is assumed valid; the concentration solvers validate it before
/// calling in.
pub fn damped_newton<S, const N: usize>(
    system: &S,
    x: &mut SVector<Real, N>,
    config: &NewtonConfig,
) -> NewtonOutcome
where
    S: EquationSystem<N> + ?Sized,
{
    let mut iterations = 0;
    loop {
        let r = system.residual(x);
        let residual_norm = max_abs(r.as_slice());

        let status = if r.iter().any(|v| !v.is_finite()) {
            Some(NewtonStatus::NonFiniteResidual)
        } else if residual_norm < config.tolerance {
            if system.phase_fraction_feasible(x, config.tolerance) {
                Some(NewtonStatus::Converged)
            } else {
                Some(NewtonStatus::InfeasiblePhaseFraction)
            }
        } else if iterations >= config.max_iterations {
            Some(NewtonStatus::MaxIterationsExceeded)
        } else {
            None
        };
        if let Some(status) = status {
            return finish(status, iterations, residual_norm, config);
        }

        let jac = system.jacobian(x);
        let Some(dx) = linalg::solve(&jac, &(-r), config.linear_solver) else {
            return finish(
                NewtonStatus::SingularJacobian,
                iterations,
                residual_norm,
                config,
            );
        };

        *x += dx * config.damping;
        iterations += 1;

        if config.verbose {
            tracing::debug!(iteration = iterations, residual_norm, "newton update");
        }
    }
}

fn finish(
    status: NewtonStatus,
    iterations: usize,
    residual_norm: Real,
    config: &NewtonConfig,
) -> NewtonOutcome {
    if status != NewtonStatus::Converged {
        tracing::debug!(?status, iterations, residual_norm, "newton solve did not converge");
    } else if config.verbose {
        tracing::debug!(iterations, residual_norm, "newton solve converged");
    }
    NewtonOutcome {
        status,
        iterations,
        residual_norm,
    }
}
