//! Ternary (A-B-C) mixing energies.
//!
//! Independent variables are `(ca, cb)`; `cc = 1 - ca - cb`. The excess
//! energy is
//!
//! ```text
//! ca cb P_AB(ca - cb) + ca cc P_AC(ca - cc) + cb cc P_BC(cb - cc)
//!     + ca cb cc (L_ABC[0] ca + L_ABC[1] cb + L_ABC[2] cc)
//! ```
//!
//! where each `P` is a 4-term Redlich-Kister polynomial.
//!
//! The two mixed second partials are assembled along separate derivation
//! paths (`d/dcb` of `df/dca`, and `d/dca` of `df/dcb`). They agree
//! analytically; [`MixingTerms::mixed_partial_mismatch`] measures how well
//! the implementation honours that.

use pf_core::Real;

use crate::binary::redlich_kister;
use crate::xlogx::{xlogx, xlogx_deriv, xlogx_deriv2};

/// Value, gradient and Hessian of a ternary energy in `(ca, cb)`.
///
/// `hessian[i][j]` is `d/dc_j (df/dc_i)`; the off-diagonal entries are
/// computed independently rather than mirrored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MixingTerms {
    pub value: Real,
    pub gradient: [Real; 2],
    pub hessian: [[Real; 2]; 2],
}

impl MixingTerms {
    #[inline]
    pub fn mixed_partial_mismatch(&self) -> Real {
        (self.hessian[0][1] - self.hessian[1][0]).abs()
    }

    #[inline]
    fn accumulate(&mut self, other: &MixingTerms) {
        self.value += other.value;
        for i in 0..2 {
            self.gradient[i] += other.gradient[i];
            for j in 0..2 {
                self.hessian[i][j] += other.hessian[i][j];
            }
        }
    }
}

impl core::ops::Add for MixingTerms {
    type Output = MixingTerms;

    fn add(mut self, rhs: MixingTerms) -> MixingTerms {
        self.accumulate(&rhs);
        self
    }
}

/// `RT (ca ln ca + cb ln cb + cc ln cc)`
#[inline]
pub fn ideal_mix(rt: Real, ca: Real, cb: Real) -> MixingTerms {
    let cc = 1.0 - ca - cb;
    let dcc = xlogx_deriv(cc);
    let hcc = xlogx_deriv2(cc);
    MixingTerms {
        value: rt * (xlogx(ca) + xlogx(cb) + xlogx(cc)),
        gradient: [rt * (xlogx_deriv(ca) - dcc), rt * (xlogx_deriv(cb) - dcc)],
        hessian: [
            [rt * (xlogx_deriv2(ca) + hcc), rt * hcc],
            [rt * hcc, rt * (xlogx_deriv2(cb) + hcc)],
        ],
    }
}

/// Binary interaction `x y P(x - y)` between two (linear) composition
/// variables with gradients `gx`, `gy` in `(ca, cb)` space.
#[inline]
fn pair_interaction(l: &[Real; 4], x: Real, y: Real, gx: [Real; 2], gy: [Real; 2]) -> MixingTerms {
    let (p, dp, d2p) = redlich_kister(l, x - y);
    let xy = x * y;

    let f_x = y * p + xy * dp;
    let f_y = x * p - xy * dp;
    let f_xx = 2.0 * y * dp + xy * d2p;
    let f_yy = -2.0 * x * dp + xy * d2p;
    // d/dy (f_x) and d/dx (f_y), kept as separate expressions.
    let f_xy = p + (x - y) * dp - xy * d2p;
    let f_yx = p + x * dp - y * dp - xy * d2p;

    let mut out = MixingTerms {
        value: xy * p,
        ..MixingTerms::default()
    };
    for i in 0..2 {
        out.gradient[i] = f_x * gx[i] + f_y * gy[i];
        for j in 0..2 {
            out.hessian[i][j] = f_xx * gx[i] * gx[j]
                + f_xy * gx[i] * gy[j]
                + f_yx * gy[i] * gx[j]
                + f_yy * gy[i] * gy[j];
        }
    }
    out
}

/// `ca cb cc (l0 ca + l1 cb + l2 cc)`
#[inline]
fn ternary_interaction(l: &[Real; 3], ca: Real, cb: Real) -> MixingTerms {
    let cc = 1.0 - ca - cb;
    let u = ca * cb * cc;
    let v = l[0] * ca + l[1] * cb + l[2] * cc;

    let u_a = cb * (cc - ca);
    let u_b = ca * (cc - cb);
    let v_a = l[0] - l[2];
    let v_b = l[1] - l[2];

    let u_aa = -2.0 * cb;
    let u_bb = -2.0 * ca;
    let u_ab = cc - ca - cb;
    let u_ba = (cc - cb) - ca;

    MixingTerms {
        value: u * v,
        gradient: [u_a * v + u * v_a, u_b * v + u * v_b],
        hessian: [
            [u_aa * v + 2.0 * u_a * v_a, u_ab * v + u_a * v_b + u_b * v_a],
            [u_ba * v + u_b * v_a + u_a * v_b, u_bb * v + 2.0 * u_b * v_b],
        ],
    }
}

const D_CA: [Real; 2] = [1.0, 0.0];
const D_CB: [Real; 2] = [0.0, 1.0];
const D_CC: [Real; 2] = [-1.0, -1.0];

/// Excess mixing energy with pairwise Redlich-Kister terms and a ternary
/// interaction.
#[inline]
pub fn excess_mix(
    l_ab: &[Real; 4],
    l_ac: &[Real; 4],
    l_bc: &[Real; 4],
    l_abc: &[Real; 3],
    ca: Real,
    cb: Real,
) -> MixingTerms {
    let cc = 1.0 - ca - cb;
    pair_interaction(l_ab, ca, cb, D_CA, D_CB)
        + pair_interaction(l_ac, ca, cc, D_CA, D_CC)
        + pair_interaction(l_bc, cb, cc, D_CB, D_CC)
        + ternary_interaction(l_abc, ca, cb)
}
