//! OSO Confluent Deployment Validator
//!
//! Validates declarative Confluent Cloud deployment manifests, resolves
//! RBAC role-binding scopes to CRN patterns, and runs post-deployment
//! health and permission checks against the Confluent Cloud API.

pub mod api;
pub mod checks;
pub mod crn;
pub mod error;
pub mod manifest;
pub mod metrics;
pub mod rbac;
pub mod report;
pub mod validators;

pub use error::{Error, Result};
