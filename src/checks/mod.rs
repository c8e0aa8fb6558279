//! Post-deployment health checks

mod deployment;
mod outcome;

pub use deployment::*;
pub use outcome::*;
