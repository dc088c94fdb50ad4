//! Coefficient validation errors.

use pf_core::PfError;
use thiserror::Error;

/// Result type for coefficient handling.
pub type CalphadResult<T> = Result<T, CalphadError>;

/// Errors raised while validating thermodynamic coefficients.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalphadError {
    /// A coefficient is NaN or infinite.
    #[error("Non-finite coefficient {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    /// A scalar parameter is outside its physical domain.
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: &'static str },
}

impl From<PfError> for CalphadError {
    fn from(err: PfError) -> Self {
        match err {
            PfError::NonFinite { what, value } => CalphadError::NonFinite { what, value },
            PfError::InvalidArg { what }
            | PfError::Invariant { what } => CalphadError::InvalidParameter { what },
        }
    }
}

impl From<CalphadError> for PfError {
    fn from(err: CalphadError) -> Self {
        match err {
            CalphadError::NonFinite { what, value } => PfError::NonFinite { what, value },
            CalphadError::InvalidParameter { what } => PfError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CalphadError::NonFinite {
            what: "l_mix",
            value: f64::NAN,
        };
        assert!(err.to_string().contains("l_mix"));
    }

    #[test]
    fn converts_both_ways() {
        let pf: PfError = CalphadError::InvalidParameter { what: "rt" }.into();
        assert!(matches!(pf, PfError::InvalidArg { what: "rt" }));

        let back: CalphadError = PfError::NonFinite {
            what: "f_a",
            value: f64::INFINITY,
        }
        .into();
        assert!(matches!(back, CalphadError::NonFinite { what: "f_a", .. }));
    }
}
