//! Declarative deployment manifest for a Confluent Cloud environment

mod deployment_manifest;

pub use deployment_manifest::*;

use schemars::schema_for;

/// Generate JSON Schema documents for the manifest types
pub fn generate_schemas() -> Vec<String> {
    vec![serde_json::to_string_pretty(&schema_for!(DeploymentManifest)).unwrap()]
}
