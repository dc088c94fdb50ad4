//! pf-core: shared foundation for the phase-equilibrium crates.
//!
//! Contains:
//! - units (uom temperature + gas constant / RT helpers)
//! - numeric (Real + finiteness checks + residual norm)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{PfError, PfResult};
pub use numeric::*;
pub use units::*;
