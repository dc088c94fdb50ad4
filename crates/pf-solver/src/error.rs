//! Error types for solver operations.
//!
//! Non-convergence is not an error: it is reported through
//! [`NewtonStatus`](crate::newton::NewtonStatus). These variants cover caller
//! mistakes only.

use pf_calphad::CalphadError;
use pf_core::error::PfError;
use thiserror::Error;

/// Errors that can occur while configuring or invoking a concentration solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Solver used before setup: {what}")]
    Uninitialized { what: &'static str },

    #[error("Invalid coefficients: {what}")]
    InvalidCoefficients { what: String },

    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Configuration parse error: {what}")]
    ConfigParse { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

/// Reject NaN or infinite caller inputs (nominal compositions, phase fractions).
pub(crate) fn ensure_finite_input(values: &[pf_core::Real], what: &str) -> SolverResult<()> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(v) => Err(SolverError::InvalidInput {
            what: format!("{what} must be finite, got {v}"),
        }),
        None => Ok(()),
    }
}

impl From<CalphadError> for SolverError {
    fn from(e: CalphadError) -> Self {
        SolverError::InvalidCoefficients {
            what: e.to_string(),
        }
    }
}

impl From<SolverError> for PfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Uninitialized { what: _ } => PfError::Invariant {
                what: "solver used before setup",
            },
            SolverError::InvalidCoefficients { what: _ } => PfError::InvalidArg {
                what: "coefficients",
            },
            SolverError::InvalidConfig { what: _ } => PfError::InvalidArg {
                what: "newton configuration",
            },
            SolverError::InvalidInput { what: _ } => PfError::InvalidArg { what: "input" },
            SolverError::ConfigParse { what: _ } => PfError::InvalidArg {
                what: "configuration text",
            },
        }
    }
}
