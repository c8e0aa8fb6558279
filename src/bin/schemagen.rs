//! Manifest JSON Schema Generator
//!
//! This binary generates the JSON Schema for the deployment manifest,
//! used by editors and CI to validate manifest files.
//!
//! Usage: cargo run --bin schemagen > schemas/deployment-manifest.json

use confluent_deployment_validator::manifest::generate_schemas;

fn main() {
    for schema in generate_schemas() {
        println!("{}", schema);
    }
}
