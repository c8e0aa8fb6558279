//! Integration tests for manifest validation and role-binding resolution
//!
//! These tests verify that the validation functions for deployment
//! manifests correctly accept valid manifests and reject invalid ones,
//! and that role-binding scopes resolve to the expected CRN patterns.

use confluent_deployment_validator::manifest::{
    ClusterSpec, ConnectorSpec, DeploymentManifest, EnvironmentSpec, MonitoringSpec,
    RoleBindingSpec, ScopeSpec, ServiceAccountSpec, TopicSpec,
};
use confluent_deployment_validator::validators;

// ============================================================================
// Test Helpers
// ============================================================================

fn valid_environment() -> EnvironmentSpec {
    EnvironmentSpec {
        id: "env-1".to_string(),
        organization_id: "org-1".to_string(),
        name: "staging".to_string(),
    }
}

fn valid_cluster() -> ClusterSpec {
    ClusterSpec {
        id: "lkc-1".to_string(),
        rbac_crn: None,
        bootstrap_servers: vec!["pkc-1.eu-west-1.aws.confluent.cloud:9092".to_string()],
        rest_endpoint: Some("https://pkc-1.eu-west-1.aws.confluent.cloud:443".to_string()),
        security_protocol: "SASL_SSL".to_string(),
    }
}

fn valid_topic(name: &str) -> TopicSpec {
    TopicSpec {
        name: name.to_string(),
        partitions: 6,
        config: Default::default(),
    }
}

fn valid_manifest() -> DeploymentManifest {
    DeploymentManifest {
        environment: valid_environment(),
        cluster: valid_cluster(),
        topics: vec![valid_topic("staging-orders")],
        connectors: vec![ConnectorSpec {
            name: "staging-datagen".to_string(),
            class: "DatagenSource".to_string(),
            tasks_max: 1,
            config: Default::default(),
        }],
        service_accounts: vec![
            ServiceAccountSpec {
                name: "kafka_admin".to_string(),
                description: "Cluster administration".to_string(),
            },
            ServiceAccountSpec {
                name: "data_consumer".to_string(),
                description: "Read-only access".to_string(),
            },
        ],
        role_bindings: vec![
            RoleBindingSpec {
                principal: "kafka_admin".to_string(),
                role: "CloudClusterAdmin".to_string(),
                scope: ScopeSpec {
                    cluster_id: Some("lkc-1".to_string()),
                    ..Default::default()
                },
            },
            RoleBindingSpec {
                principal: "data_consumer".to_string(),
                role: "DeveloperRead".to_string(),
                scope: ScopeSpec {
                    cluster_id: Some("lkc-1".to_string()),
                    topic_name: Some("staging-orders".to_string()),
                    ..Default::default()
                },
            },
        ],
        monitoring: MonitoringSpec::default(),
        schema_registry: None,
    }
}

// ============================================================================
// Basic Validation Tests
// ============================================================================

#[test]
fn valid_manifest_passes_validation() {
    let manifest = valid_manifest();
    let result = validators::validate(&manifest);
    if let Err(e) = &result {
        panic!("Validation failed unexpectedly: {:?}", e);
    }
    assert!(result.is_ok());
}

#[test]
fn empty_environment_id_fails_validation() {
    let mut manifest = valid_manifest();
    manifest.environment.id = String::new();

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .to_lowercase()
        .contains("environment"));
}

#[test]
fn empty_organization_id_fails_validation() {
    let mut manifest = valid_manifest();
    manifest.environment.organization_id = String::new();

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .to_lowercase()
        .contains("organization"));
}

// ============================================================================
// Cluster Validation Tests
// ============================================================================

#[test]
fn cluster_id_without_lkc_prefix_fails_validation() {
    let mut manifest = valid_manifest();
    manifest.cluster.id = "cluster-1".to_string();

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("lkc-"));
}

#[test]
fn empty_bootstrap_servers_fails_validation() {
    let mut manifest = valid_manifest();
    manifest.cluster.bootstrap_servers = vec![];

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .to_lowercase()
        .contains("bootstrap"));
}

#[test]
fn invalid_security_protocol_fails_validation() {
    let mut manifest = valid_manifest();
    manifest.cluster.security_protocol = "INVALID".to_string();

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .to_lowercase()
        .contains("security"));
}

#[test]
fn valid_security_protocols_pass_validation() {
    let valid_protocols = vec!["PLAINTEXT", "SSL", "SASL_PLAINTEXT", "SASL_SSL"];

    for protocol in valid_protocols {
        let mut manifest = valid_manifest();
        manifest.cluster.security_protocol = protocol.to_string();

        assert!(
            validators::validate(&manifest).is_ok(),
            "Protocol '{}' should be valid",
            protocol
        );
    }
}

// ============================================================================
// Topic Validation Tests
// ============================================================================

#[test]
fn topic_with_zero_partitions_fails_validation() {
    let mut manifest = valid_manifest();
    manifest.topics[0].partitions = 0;

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .to_lowercase()
        .contains("partitions"));
}

#[test]
fn duplicate_topic_names_fail_validation() {
    let mut manifest = valid_manifest();
    manifest.topics.push(valid_topic("staging-orders"));

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .to_lowercase()
        .contains("duplicate"));
}

// ============================================================================
// Connector Validation Tests
// ============================================================================

#[test]
fn connector_with_empty_class_fails_validation() {
    let mut manifest = valid_manifest();
    manifest.connectors[0].class = String::new();

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .to_lowercase()
        .contains("class"));
}

#[test]
fn connector_with_zero_tasks_fails_validation() {
    let mut manifest = valid_manifest();
    manifest.connectors[0].tasks_max = 0;

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .to_lowercase()
        .contains("tasksmax"));
}

// ============================================================================
// Role Binding Validation Tests
// ============================================================================

#[test]
fn binding_with_unknown_principal_fails_validation() {
    let mut manifest = valid_manifest();
    manifest.role_bindings[0].principal = "ghost_account".to_string();

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("ghost_account"));
}

#[test]
fn binding_with_empty_role_fails_validation() {
    let mut manifest = valid_manifest();
    manifest.role_bindings[0].role = String::new();

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .to_lowercase()
        .contains("role"));
}

#[test]
fn binding_with_topic_but_no_cluster_fails_validation() {
    let mut manifest = valid_manifest();
    manifest.role_bindings[1].scope = ScopeSpec {
        topic_name: Some("staging-orders".to_string()),
        ..Default::default()
    };

    let result = validators::validate(&manifest);

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .to_lowercase()
        .contains("clusterid"));
}

// ============================================================================
// Binding Resolution Tests
// ============================================================================

#[test]
fn bindings_resolve_to_expected_crn_patterns() {
    let manifest = valid_manifest();
    let bindings = validators::resolve_bindings(&manifest).unwrap();

    assert_eq!(bindings.len(), 2);
    assert_eq!(
        bindings[0].crn_pattern,
        "crn://confluent.cloud/organization=org-1/environment=env-1/cloud-cluster=lkc-1"
    );
    assert_eq!(
        bindings[1].crn_pattern,
        "crn://confluent.cloud/organization=org-1/environment=env-1/cloud-cluster=lkc-1/kafka=lkc-1/topic=staging-orders"
    );
}

#[test]
fn cluster_rbac_crn_is_used_when_declared() {
    let mut manifest = valid_manifest();
    manifest.cluster.rbac_crn = Some(
        "crn://confluent.cloud/organization=org-1/environment=env-1/cloud-cluster=lkc-1"
            .to_string(),
    );
    manifest.role_bindings.truncate(1);

    let bindings = validators::resolve_bindings(&manifest).unwrap();
    assert_eq!(
        bindings[0].crn_pattern,
        manifest.cluster.rbac_crn.clone().unwrap()
    );
}

#[test]
fn explicit_pattern_binding_resolves_verbatim() {
    let mut manifest = valid_manifest();
    manifest.role_bindings[0].scope = ScopeSpec {
        pattern: Some("crn://confluent.cloud/organization=org-1/environment=env-1/flink-region=aws.eu-west-1".to_string()),
        ..Default::default()
    };

    let bindings = validators::resolve_bindings(&manifest).unwrap();
    assert_eq!(
        bindings[0].crn_pattern,
        "crn://confluent.cloud/organization=org-1/environment=env-1/flink-region=aws.eu-west-1"
    );
}

#[test]
fn connector_binding_resolves_with_wildcards() {
    let mut manifest = valid_manifest();
    manifest.role_bindings[0].scope = ScopeSpec {
        connector_id: Some("conn-9".to_string()),
        ..Default::default()
    };
    manifest.role_bindings.truncate(1);

    let bindings = validators::resolve_bindings(&manifest).unwrap();
    assert_eq!(
        bindings[0].crn_pattern,
        "crn://confluent.cloud/organization=*/environment=env-1/cloud-cluster=*/connector=conn-9"
    );
}

#[test]
fn resolution_is_deterministic_across_runs() {
    let manifest = valid_manifest();
    let first = validators::resolve_bindings(&manifest).unwrap();
    let second = validators::resolve_bindings(&manifest).unwrap();
    assert_eq!(first, second);
}
