use crate::PfError;

/// Floating point type used throughout the solvers
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PfError::NonFinite { what, value: v })
    }
}

/// Check every entry of a coefficient array, reporting the first offender.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), PfError> {
    values
        .iter()
        .try_for_each(|&v| ensure_finite(v, what).map(|_| ()))
}

/// Largest absolute entry, the norm used for residual convergence checks.
#[inline]
pub fn max_abs(values: &[Real]) -> Real {
    values.iter().fold(0.0, |acc: Real, v| acc.max(v.abs()))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn max_abs_bounds_every_entry(values in prop::collection::vec(-1e6_f64..1e6_f64, 0..8)) {
            let m = max_abs(&values);
            for v in &values {
                prop_assert!(v.abs() <= m);
            }
        }
    }
}
