//! pf-calphad: CALPHAD free-energy building blocks.
//!
//! Provides closed-form mixing energies and their composition derivatives
//! for the phase-equilibrium solvers:
//! - Regularised `x ln x` kernel shared by the ideal mixing terms
//! - Binary ideal mixing and 4-term Redlich-Kister excess mixing
//! - Ternary ideal mixing and Muggianu-style excess mixing (three binary
//!   Redlich-Kister pairs plus a 3-coefficient ternary interaction)
//! - Per-phase coefficient sets assembling pure-species references,
//!   ideal and excess contributions
//!
//! Compositions are mole fractions of the independent species: `c` is the
//! fraction of species A in a binary A-B phase; `(ca, cb)` are the fractions
//! of A and B in a ternary A-B-C phase with `cc = 1 - ca - cb`.
//!
//! Every function here is pure, allocation free and branch-light so it can be
//! called per mesh cell inside a Newton iteration.

pub mod binary;
pub mod error;
pub mod phase;
pub mod ternary;
pub mod xlogx;

pub use error::{CalphadError, CalphadResult};
pub use phase::{BinaryPhaseCoefficients, TernaryPhaseCoefficients};
pub use ternary::MixingTerms;
