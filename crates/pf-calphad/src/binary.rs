//! Binary (A-B) mixing energies.
//!
//! `c` is the mole fraction of species A. The excess term is the
//! Redlich-Kister expansion
//! `c (1 - c) [L0 + L1 (2c - 1) + L2 (2c - 1)^2 + L3 (2c - 1)^3]`.

use pf_core::Real;

use crate::xlogx::{xlogx, xlogx_deriv, xlogx_deriv2};

/// Redlich-Kister polynomial `P(d)` and its first two derivatives in `d`.
#[inline]
pub(crate) fn redlich_kister(l: &[Real; 4], d: Real) -> (Real, Real, Real) {
    let p = l[0] + d * (l[1] + d * (l[2] + d * l[3]));
    let dp = l[1] + d * (2.0 * l[2] + 3.0 * d * l[3]);
    let d2p = 2.0 * l[2] + 6.0 * d * l[3];
    (p, dp, d2p)
}

/// `RT [c ln c + (1 - c) ln (1 - c)]`
#[inline]
pub fn ideal_mix(rt: Real, c: Real) -> Real {
    rt * (xlogx(c) + xlogx(1.0 - c))
}

#[inline]
pub fn ideal_mix_deriv(rt: Real, c: Real) -> Real {
    rt * (xlogx_deriv(c) - xlogx_deriv(1.0 - c))
}

#[inline]
pub fn ideal_mix_deriv2(rt: Real, c: Real) -> Real {
    rt * (xlogx_deriv2(c) + xlogx_deriv2(1.0 - c))
}

#[inline]
pub fn excess_mix(l: &[Real; 4], c: Real) -> Real {
    let d = 2.0 * c - 1.0;
    let (p, _, _) = redlich_kister(l, d);
    c * (1.0 - c) * p
}

/// With `d = 2c - 1` and `c (1 - c) = (1 - d^2) / 4`:
/// `f' = -d P + 2 c (1 - c) P'`.
#[inline]
pub fn excess_mix_deriv(l: &[Real; 4], c: Real) -> Real {
    let d = 2.0 * c - 1.0;
    let (p, dp, _) = redlich_kister(l, d);
    -d * p + 2.0 * c * (1.0 - c) * dp
}

/// `f'' = -2 P - 4 d P' + 4 c (1 - c) P''`
#[inline]
pub fn excess_mix_deriv2(l: &[Real; 4], c: Real) -> Real {
    let d = 2.0 * c - 1.0;
    let (p, dp, d2p) = redlich_kister(l, d);
    -2.0 * p - 4.0 * d * dp + 4.0 * c * (1.0 - c) * d2p
}
