//! Deployment manifest schema
//!
//! A manifest declares the resources expected in a Confluent Cloud
//! environment: the Kafka cluster, topics, connectors, service accounts and
//! the role bindings granting them access. The validator checks a live
//! environment against this document.

use std::collections::BTreeMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::crn::ScopeRequest;
use crate::{Error, Result};

/// Deployment manifest for a single environment
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentManifest {
    /// Target environment
    pub environment: EnvironmentSpec,

    /// Kafka cluster connection and identity
    pub cluster: ClusterSpec,

    /// Topics expected to exist
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<TopicSpec>,

    /// Connectors expected to exist and be running
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connectors: Vec<ConnectorSpec>,

    /// Service accounts referenced by role bindings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_accounts: Vec<ServiceAccountSpec>,

    /// RBAC role bindings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub role_bindings: Vec<RoleBindingSpec>,

    /// Monitoring pipeline configuration
    #[serde(default)]
    pub monitoring: MonitoringSpec,

    /// Schema Registry endpoint, checked when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_registry: Option<SchemaRegistrySpec>,
}

impl DeploymentManifest {
    /// Load a manifest from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read manifest {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&contents).map_err(|e| {
            Error::ConfigError(format!("Failed to parse manifest {}: {}", path.display(), e))
        })
    }

    /// Short fingerprint of the manifest contents, used to detect drift
    /// between validation runs
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        let manifest_json = serde_json::to_string(self).unwrap_or_default();
        hasher.update(manifest_json.as_bytes());
        format!("{:x}", hasher.finalize())[..16].to_string()
    }
}

/// Environment identity
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSpec {
    /// Environment identifier (e.g. env-abc123)
    pub id: String,

    /// Organization identifier
    pub organization_id: String,

    /// Human-readable environment name (e.g. staging, prod)
    pub name: String,
}

/// Kafka cluster identity and connection configuration
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Cluster identifier (e.g. lkc-abc123)
    pub id: String,

    /// Provider-computed RBAC CRN for the cluster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rbac_crn: Option<String>,

    /// Bootstrap servers
    pub bootstrap_servers: Vec<String>,

    /// Kafka REST endpoint of the cluster (used to list topics)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_endpoint: Option<String>,

    /// Security protocol (SASL_SSL in Confluent Cloud)
    #[serde(default = "default_security_protocol")]
    pub security_protocol: String,
}

fn default_security_protocol() -> String {
    "SASL_SSL".to_string()
}

/// Expected topic
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicSpec {
    /// Topic name
    pub name: String,

    /// Partition count
    #[serde(default = "default_partitions")]
    pub partitions: i32,

    /// Topic-level configuration overrides
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}

fn default_partitions() -> i32 {
    6
}

/// Expected connector
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSpec {
    /// Connector name
    pub name: String,

    /// Connector class (e.g. DatagenSource)
    pub class: String,

    /// Maximum number of tasks
    #[serde(default = "default_tasks_max")]
    pub tasks_max: i32,

    /// Connector configuration
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}

fn default_tasks_max() -> i32 {
    1
}

/// Service account declaration
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountSpec {
    /// Account name (e.g. kafka_admin, connector_operator, data_consumer)
    pub name: String,

    /// Description shown in the Confluent console
    #[serde(default)]
    pub description: String,
}

/// RBAC role binding declaration
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleBindingSpec {
    /// Principal the role is granted to (service account name)
    pub principal: String,

    /// Role name (e.g. CloudClusterAdmin, DeveloperRead)
    pub role: String,

    /// Scope the role is granted against
    pub scope: ScopeSpec,
}

/// Scope of a role binding
///
/// The environment identifier is taken from the manifest; everything else
/// is optional and feeds the CRN resolver.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSpec {
    /// Full CRN pattern override, bypasses resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Cluster identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,

    /// Topic name, requires a cluster identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,

    /// Connector identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<String>,
}

impl ScopeSpec {
    /// Combine this scope with the manifest's environment into a resolver
    /// request
    pub fn to_request(&self, environment_id: &str) -> ScopeRequest {
        ScopeRequest {
            explicit_pattern: self.pattern.clone(),
            environment_id: environment_id.to_string(),
            cluster_id: self.cluster_id.clone(),
            topic_name: self.topic_name.clone(),
            connector_id: self.connector_id.clone(),
        }
    }
}

/// Schema Registry connection
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRegistrySpec {
    /// Schema Registry REST endpoint
    pub url: String,
}

/// Monitoring pipeline configuration
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSpec {
    /// Whether monitoring topics are expected
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Topic carrying application logs
    #[serde(default = "default_log_topic")]
    pub log_topic: String,

    /// Topic carrying metrics
    #[serde(default = "default_metrics_topic")]
    pub metrics_topic: String,
}

impl Default for MonitoringSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            log_topic: default_log_topic(),
            metrics_topic: default_metrics_topic(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_topic() -> String {
    "monitoring-logs".to_string()
}

fn default_metrics_topic() -> String {
    "monitoring-metrics".to_string()
}
