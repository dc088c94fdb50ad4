//! Regularised `x ln x` kernel.
//!
//! Above [`XLOGX_CUTOFF`] the exact function is used. Below it the function is
//! continued by its second-order Taylor expansion about the cutoff, so the
//! value, first and second derivative stay finite (and mutually consistent)
//! at `x = 0` and for slightly negative trial compositions produced by a
//! Newton step.

use pf_core::Real;

/// Composition below which `x ln x` is replaced by its quadratic extension.
pub const XLOGX_CUTOFF: Real = 1.0e-8;

#[inline]
pub fn xlogx(x: Real) -> Real {
    if x >= XLOGX_CUTOFF {
        x * x.ln()
    } else {
        let d = x - XLOGX_CUTOFF;
        let ln_eps = XLOGX_CUTOFF.ln();
        XLOGX_CUTOFF * ln_eps + (ln_eps + 1.0) * d + 0.5 * d * d / XLOGX_CUTOFF
    }
}

/// d/dx (x ln x) = ln x + 1
#[inline]
pub fn xlogx_deriv(x: Real) -> Real {
    if x >= XLOGX_CUTOFF {
        x.ln() + 1.0
    } else {
        XLOGX_CUTOFF.ln() + 1.0 + (x - XLOGX_CUTOFF) / XLOGX_CUTOFF
    }
}

/// d2/dx2 (x ln x) = 1/x
#[inline]
pub fn xlogx_deriv2(x: Real) -> Real {
    1.0 / x.max(XLOGX_CUTOFF)
}
