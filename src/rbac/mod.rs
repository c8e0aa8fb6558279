//! RBAC permission probing
//!
//! Probes exercise operations under each service account's credentials and
//! compare the observed outcome against the access the role bindings were
//! meant to grant. An operation that succeeds where a denial was expected
//! is a security finding, not just a failed check.

mod analysis;
mod executor;
mod probe;

pub use analysis::*;
pub use executor::*;
pub use probe::*;
