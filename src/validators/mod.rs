//! Manifest validation and role-binding resolution

mod deployment;

pub use deployment::*;
