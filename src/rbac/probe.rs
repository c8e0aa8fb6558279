//! Probe plan definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manifest::DeploymentManifest;

/// Whether the probed operation is expected to be allowed or denied
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Expectation {
    Allow,
    Deny,
}

/// Operation exercised by a probe
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind", content = "topic")]
pub enum Operation {
    ListTopics,
    CreateTopic(String),
    DeleteTopic(String),
    DescribeCluster,
    ReadTopic(String),
    WriteTopic(String),
}

impl Operation {
    /// Stable name used in reports and metrics
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListTopics => "list_topics",
            Operation::CreateTopic(_) => "create_topic",
            Operation::DeleteTopic(_) => "delete_topic",
            Operation::DescribeCluster => "describe_cluster",
            Operation::ReadTopic(_) => "read_topic",
            Operation::WriteTopic(_) => "write_topic",
        }
    }
}

/// One planned permission probe
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSpec {
    /// Service account whose credentials execute the operation
    pub service_account: String,

    /// Operation to attempt
    pub operation: Operation,

    /// Expected access decision
    pub expectation: Expectation,

    /// Marks probes that attempt to cross a role boundary
    #[serde(default)]
    pub escalation: bool,
}

impl ProbeSpec {
    pub fn new(service_account: &str, operation: Operation, expectation: Expectation) -> Self {
        Self {
            service_account: service_account.to_string(),
            operation,
            expectation,
            escalation: false,
        }
    }

    pub fn escalation(mut self) -> Self {
        self.escalation = true;
        self
    }
}

/// Observed outcome of one probe
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    /// The probe that was executed
    pub spec: ProbeSpec,

    /// Whether the operation was allowed
    pub allowed: bool,

    /// Whether the observation matched the expectation
    pub passed: bool,

    /// Execution error unrelated to the access decision, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time
    pub timestamp: DateTime<Utc>,
}

/// Build the standard probe plan for a manifest
///
/// The plan mirrors the roles the deployment grants: the admin account may
/// manage topics and describe the cluster, the connector operator may only
/// create connector-prefixed topics, and the data consumer is read-only on
/// the monitoring topic. Every non-admin account additionally gets
/// escalation probes that must be denied.
pub fn standard_plan(manifest: &DeploymentManifest) -> Vec<ProbeSpec> {
    let env = &manifest.environment.name;
    let monitoring_topic = &manifest.monitoring.log_topic;
    let mut plan = Vec::new();

    for account in &manifest.service_accounts {
        match account.name.as_str() {
            "kafka_admin" => {
                let probe_topic = format!("{}-rbac-probe", env);
                plan.push(ProbeSpec::new(
                    &account.name,
                    Operation::ListTopics,
                    Expectation::Allow,
                ));
                plan.push(ProbeSpec::new(
                    &account.name,
                    Operation::CreateTopic(probe_topic.clone()),
                    Expectation::Allow,
                ));
                plan.push(ProbeSpec::new(
                    &account.name,
                    Operation::DeleteTopic(probe_topic),
                    Expectation::Allow,
                ));
                plan.push(ProbeSpec::new(
                    &account.name,
                    Operation::DescribeCluster,
                    Expectation::Allow,
                ));
            }
            "connector_operator" => {
                plan.push(ProbeSpec::new(
                    &account.name,
                    Operation::ListTopics,
                    Expectation::Allow,
                ));
                plan.push(ProbeSpec::new(
                    &account.name,
                    Operation::CreateTopic(format!("{}-connector-rbac-probe", env)),
                    Expectation::Allow,
                ));
                plan.push(ProbeSpec::new(
                    &account.name,
                    Operation::CreateTopic(format!("{}-other-topic", env)),
                    Expectation::Deny,
                ));
                plan.push(ProbeSpec::new(
                    &account.name,
                    Operation::DescribeCluster,
                    Expectation::Deny,
                ));
            }
            "data_consumer" => {
                plan.push(ProbeSpec::new(
                    &account.name,
                    Operation::ReadTopic(monitoring_topic.clone()),
                    Expectation::Allow,
                ));
                plan.push(ProbeSpec::new(
                    &account.name,
                    Operation::ReadTopic(format!("{}-admin-logs", env)),
                    Expectation::Deny,
                ));
                plan.push(ProbeSpec::new(
                    &account.name,
                    Operation::WriteTopic(monitoring_topic.clone()),
                    Expectation::Deny,
                ));
            }
            _ => {}
        }

        // Privilege escalation probes for every non-admin account
        if account.name != "kafka_admin" {
            plan.push(
                ProbeSpec::new(
                    &account.name,
                    Operation::CreateTopic(format!("{}-admin-escalation-probe", env)),
                    Expectation::Deny,
                )
                .escalation(),
            );
            plan.push(
                ProbeSpec::new(&account.name, Operation::DescribeCluster, Expectation::Deny)
                    .escalation(),
            );
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{
        ClusterSpec, DeploymentManifest, EnvironmentSpec, MonitoringSpec, ServiceAccountSpec,
    };

    fn manifest_with_accounts(names: &[&str]) -> DeploymentManifest {
        DeploymentManifest {
            environment: EnvironmentSpec {
                id: "env-1".to_string(),
                organization_id: "org-1".to_string(),
                name: "staging".to_string(),
            },
            cluster: ClusterSpec {
                id: "lkc-1".to_string(),
                rbac_crn: None,
                bootstrap_servers: vec!["broker:9092".to_string()],
                rest_endpoint: None,
                security_protocol: "SASL_SSL".to_string(),
            },
            topics: vec![],
            connectors: vec![],
            service_accounts: names
                .iter()
                .map(|n| ServiceAccountSpec {
                    name: n.to_string(),
                    description: String::new(),
                })
                .collect(),
            role_bindings: vec![],
            monitoring: MonitoringSpec::default(),
            schema_registry: None,
        }
    }

    #[test]
    fn admin_plan_contains_no_escalation_probes() {
        let plan = standard_plan(&manifest_with_accounts(&["kafka_admin"]));
        assert_eq!(plan.len(), 4);
        assert!(plan.iter().all(|p| !p.escalation));
        assert!(plan.iter().all(|p| p.expectation == Expectation::Allow));
    }

    #[test]
    fn operator_plan_denies_cluster_describe() {
        let plan = standard_plan(&manifest_with_accounts(&["connector_operator"]));
        let describe = plan
            .iter()
            .find(|p| p.operation == Operation::DescribeCluster && !p.escalation)
            .unwrap();
        assert_eq!(describe.expectation, Expectation::Deny);
    }

    #[test]
    fn non_admin_accounts_get_escalation_probes() {
        let plan = standard_plan(&manifest_with_accounts(&[
            "kafka_admin",
            "connector_operator",
            "data_consumer",
        ]));
        let escalations: Vec<&ProbeSpec> = plan.iter().filter(|p| p.escalation).collect();
        assert_eq!(escalations.len(), 4);
        assert!(escalations
            .iter()
            .all(|p| p.expectation == Expectation::Deny));
        assert!(escalations
            .iter()
            .all(|p| p.service_account != "kafka_admin"));
    }

    #[test]
    fn probe_topics_are_environment_prefixed() {
        let plan = standard_plan(&manifest_with_accounts(&["kafka_admin"]));
        let create = plan
            .iter()
            .find_map(|p| match &p.operation {
                Operation::CreateTopic(name) => Some(name.clone()),
                _ => None,
            })
            .unwrap();
        assert!(create.starts_with("staging-"));
    }

    #[test]
    fn unknown_accounts_only_get_escalation_probes() {
        let plan = standard_plan(&manifest_with_accounts(&["ad_hoc_account"]));
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|p| p.escalation));
    }
}
