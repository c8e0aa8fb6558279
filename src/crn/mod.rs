//! Confluent Resource Name (CRN) scope resolution
//!
//! A role binding is granted against a CRN pattern. The resolver picks the
//! narrowest pattern that satisfies the requested scope, so bindings honour
//! least privilege.

mod resolver;

pub use resolver::*;
