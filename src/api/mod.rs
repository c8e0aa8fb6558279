//! Confluent Cloud REST API client

mod confluent;
mod credentials;

pub use confluent::*;
pub use credentials::*;
