//! Prometheus metrics for the Confluent Deployment Validator
//!
//! This module exposes metrics for monitoring validator runs in watch mode.

pub mod prometheus;

pub use prometheus::*;
