//! Deployment health check runner
//!
//! Each check produces a [`CheckOutcome`]; a failing check never aborts the
//! run, so a single report always covers the full check list.

use std::time::Instant;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::api::ConfluentApi;
use crate::checks::{CheckOutcome, CheckStatus, HealthSummary, OverallStatus};
use crate::manifest::DeploymentManifest;
use crate::metrics::prometheus::{CHECKS, CHECK_DURATION, CHECK_FAILURES, DEPLOYMENT_HEALTH};

/// API latency threshold in production environments
const PROD_LATENCY_THRESHOLD_MS: f64 = 5_000.0;

/// API latency threshold everywhere else
const DEFAULT_LATENCY_THRESHOLD_MS: f64 = 10_000.0;

/// Health check runner for one environment
pub struct HealthChecker<'a> {
    api: &'a ConfluentApi,
    manifest: &'a DeploymentManifest,
}

impl<'a> HealthChecker<'a> {
    pub fn new(api: &'a ConfluentApi, manifest: &'a DeploymentManifest) -> Self {
        Self { api, manifest }
    }

    /// Run the full check list and aggregate the outcomes
    pub async fn run(&self) -> HealthSummary {
        let start = Instant::now();
        let timestamp = Utc::now();

        info!(
            "Starting health checks for environment {} (cluster {})",
            self.manifest.environment.name, self.manifest.cluster.id
        );

        // The API checks are independent of one another; the end-to-end
        // probe uses its own topic and cannot interfere with the listings
        let (connectivity, topics, connectors, schema_registry, monitoring, latency, end_to_end) =
            futures::join!(
                self.check_cluster_connectivity(),
                self.check_topics(),
                self.check_connectors(),
                self.check_schema_registry(),
                self.check_monitoring(),
                self.check_api_latency(),
                self.check_end_to_end(),
            );

        let checks: Vec<CheckOutcome> = [
            connectivity,
            topics,
            connectors,
            schema_registry,
            monitoring,
            self.check_security_configuration(),
            latency,
            end_to_end,
        ]
        .into_iter()
        .map(|outcome| self.record(outcome))
        .collect();

        let overall_status = OverallStatus::from_checks(&checks);
        DEPLOYMENT_HEALTH.set(if overall_status == OverallStatus::Healthy {
            1.0
        } else {
            0.0
        });

        info!(
            "Health checks finished: {:?} ({} checks in {:.2}s)",
            overall_status,
            checks.len(),
            start.elapsed().as_secs_f64()
        );

        HealthSummary {
            environment: self.manifest.environment.name.clone(),
            cluster_id: self.manifest.cluster.id.clone(),
            manifest_fingerprint: self.manifest.fingerprint(),
            timestamp,
            checks,
            overall_status,
            execution_time_seconds: start.elapsed().as_secs_f64(),
        }
    }

    fn record(&self, outcome: CheckOutcome) -> CheckOutcome {
        CHECKS.with_label_values(&[&outcome.name]).inc();
        if outcome.status == CheckStatus::Fail {
            CHECK_FAILURES.with_label_values(&[&outcome.name]).inc();
        }
        outcome
    }

    /// Verify the cluster is reachable and matches the manifest identity
    async fn check_cluster_connectivity(&self) -> CheckOutcome {
        const NAME: &str = "cluster_connectivity";
        let timer = CHECK_DURATION.with_label_values(&[NAME]).start_timer();

        let result = self
            .api
            .describe_cluster(&self.manifest.environment.id, &self.manifest.cluster.id)
            .await;
        timer.observe_duration();

        match result {
            Ok(cluster) => CheckOutcome::pass(
                NAME,
                format!("Successfully connected to cluster {}", cluster.id),
            )
            .with_details(json!({
                "clusterId": cluster.id,
                "displayName": cluster.spec.display_name,
                "bootstrapEndpoint": cluster.spec.kafka_bootstrap_endpoint,
            }))
            .critical(),
            Err(e) => CheckOutcome::fail(NAME, format!("Failed to connect to cluster: {}", e))
                .critical(),
        }
    }

    /// Verify every manifest topic exists with enough partitions
    async fn check_topics(&self) -> CheckOutcome {
        const NAME: &str = "topics_validation";

        let Some(rest_endpoint) = &self.manifest.cluster.rest_endpoint else {
            return CheckOutcome::skip(NAME, "cluster.restEndpoint not configured");
        };

        let timer = CHECK_DURATION.with_label_values(&[NAME]).start_timer();
        let result = self
            .api
            .list_topics(rest_endpoint, &self.manifest.cluster.id)
            .await;
        timer.observe_duration();

        let topics = match result {
            Ok(topics) => topics,
            Err(e) => {
                return CheckOutcome::fail(NAME, format!("Failed to list topics: {}", e));
            }
        };

        let mut missing = Vec::new();
        let mut underprovisioned = Vec::new();
        for expected in &self.manifest.topics {
            match topics.iter().find(|t| t.topic_name == expected.name) {
                None => missing.push(expected.name.clone()),
                Some(actual) if actual.partitions_count < expected.partitions => {
                    underprovisioned.push(json!({
                        "topic": expected.name,
                        "expectedPartitions": expected.partitions,
                        "actualPartitions": actual.partitions_count,
                    }));
                }
                Some(_) => {}
            }
        }

        let missing_count = missing.len();
        let underprovisioned_count = underprovisioned.len();
        let details = json!({
            "totalTopics": topics.len(),
            "expectedTopics": self.manifest.topics.len(),
            "missingTopics": missing,
            "underprovisionedTopics": underprovisioned,
        });

        if missing_count > 0 {
            CheckOutcome::fail(NAME, format!("{} expected topics are missing", missing_count))
                .with_details(details)
        } else if underprovisioned_count > 0 {
            CheckOutcome::warn(
                NAME,
                format!(
                    "{} topics have fewer partitions than declared",
                    underprovisioned_count
                ),
            )
            .with_details(details)
        } else {
            CheckOutcome::pass(
                NAME,
                format!(
                    "Found {} topics ({} expected by manifest)",
                    topics.len(),
                    self.manifest.topics.len()
                ),
            )
            .with_details(details)
        }
    }

    /// Verify every manifest connector exists and is RUNNING
    async fn check_connectors(&self) -> CheckOutcome {
        const NAME: &str = "connectors_validation";

        if self.manifest.connectors.is_empty() {
            return CheckOutcome::skip(NAME, "no connectors declared in manifest");
        }

        let timer = CHECK_DURATION.with_label_values(&[NAME]).start_timer();
        let result = self
            .api
            .list_connectors(&self.manifest.environment.id, &self.manifest.cluster.id)
            .await;
        timer.observe_duration();

        let connectors = match result {
            Ok(connectors) => connectors,
            Err(e) => {
                return CheckOutcome::fail(NAME, format!("Failed to list connectors: {}", e));
            }
        };

        let mut missing = Vec::new();
        let mut not_running = Vec::new();
        for expected in &self.manifest.connectors {
            if !connectors.contains(&expected.name) {
                missing.push(expected.name.clone());
                continue;
            }

            match self
                .api
                .connector_status(
                    &self.manifest.environment.id,
                    &self.manifest.cluster.id,
                    &expected.name,
                )
                .await
            {
                Ok(status) if status.connector.state == "RUNNING" => {}
                Ok(status) => not_running.push(json!({
                    "connector": expected.name,
                    "state": status.connector.state,
                    "tasks": status.tasks.len(),
                })),
                Err(e) => not_running.push(json!({
                    "connector": expected.name,
                    "error": e.to_string(),
                })),
            }
        }

        let missing_count = missing.len();
        let not_running_count = not_running.len();
        let details = json!({
            "totalConnectors": connectors.len(),
            "expectedConnectors": self.manifest.connectors.len(),
            "missingConnectors": missing,
            "notRunning": not_running,
        });

        if missing_count > 0 {
            CheckOutcome::fail(
                NAME,
                format!("{} expected connectors are missing", missing_count),
            )
            .with_details(details)
        } else if not_running_count > 0 {
            CheckOutcome::warn(
                NAME,
                format!("{} connectors are not RUNNING", not_running_count),
            )
            .with_details(details)
        } else {
            CheckOutcome::pass(
                NAME,
                format!("All {} connectors are RUNNING", self.manifest.connectors.len()),
            )
            .with_details(details)
        }
    }

    /// Verify the Schema Registry is reachable
    async fn check_schema_registry(&self) -> CheckOutcome {
        const NAME: &str = "schema_registry";

        let Some(registry) = &self.manifest.schema_registry else {
            return CheckOutcome::skip(NAME, "schemaRegistry not configured");
        };

        let timer = CHECK_DURATION.with_label_values(&[NAME]).start_timer();
        let result = self.api.list_subjects(&registry.url).await;
        timer.observe_duration();

        match result {
            Ok(subjects) => CheckOutcome::pass(
                NAME,
                format!("Schema Registry reachable ({} subjects)", subjects.len()),
            )
            .with_details(json!({
                "url": registry.url,
                "subjectCount": subjects.len(),
            })),
            Err(e) => CheckOutcome::fail(NAME, format!("Schema Registry check failed: {}", e))
                .with_details(json!({ "url": registry.url })),
        }
    }

    /// Verify the monitoring topics exist
    async fn check_monitoring(&self) -> CheckOutcome {
        const NAME: &str = "monitoring_integration";

        if !self.manifest.monitoring.enabled {
            return CheckOutcome::skip(NAME, "monitoring disabled in manifest");
        }

        let Some(rest_endpoint) = &self.manifest.cluster.rest_endpoint else {
            return CheckOutcome::skip(NAME, "cluster.restEndpoint not configured");
        };

        let topics = match self
            .api
            .list_topics(rest_endpoint, &self.manifest.cluster.id)
            .await
        {
            Ok(topics) => topics,
            Err(e) => {
                return CheckOutcome::fail(NAME, format!("Failed to list topics: {}", e));
            }
        };

        let expected = [
            self.manifest.monitoring.log_topic.as_str(),
            self.manifest.monitoring.metrics_topic.as_str(),
        ];
        let missing: Vec<&str> = expected
            .iter()
            .filter(|name| !topics.iter().any(|t| &t.topic_name == *name))
            .copied()
            .collect();

        let details = json!({
            "logTopic": self.manifest.monitoring.log_topic,
            "metricsTopic": self.manifest.monitoring.metrics_topic,
            "missing": missing,
        });

        if missing.is_empty() {
            CheckOutcome::pass(NAME, "Monitoring topics are present").with_details(details)
        } else {
            CheckOutcome::warn(
                NAME,
                format!("{} monitoring topics are missing", missing.len()),
            )
            .with_details(details)
        }
    }

    /// Verify transport security and credential configuration
    fn check_security_configuration(&self) -> CheckOutcome {
        const NAME: &str = "security_configuration";

        let tls_enforced = self.manifest.cluster.security_protocol.contains("SSL");
        let auth_configured = std::env::var(crate::api::API_KEY_ENV).is_ok()
            && std::env::var(crate::api::API_SECRET_ENV).is_ok();

        let details = json!({
            "securityProtocol": self.manifest.cluster.security_protocol,
            "tlsEnforced": tls_enforced,
            "authenticationConfigured": auth_configured,
        });

        if tls_enforced && auth_configured {
            CheckOutcome::pass(NAME, "TLS enforced and API credentials configured")
                .with_details(details)
                .critical()
        } else {
            CheckOutcome::fail(
                NAME,
                format!(
                    "Security validation failed: TLS={}, Auth={}",
                    tls_enforced, auth_configured
                ),
            )
            .with_details(details)
            .critical()
        }
    }

    /// Measure Cloud API latency against an environment-dependent baseline
    async fn check_api_latency(&self) -> CheckOutcome {
        const NAME: &str = "performance_baseline";

        let threshold_ms = if self.manifest.environment.name == "prod" {
            PROD_LATENCY_THRESHOLD_MS
        } else {
            DEFAULT_LATENCY_THRESHOLD_MS
        };

        let start = Instant::now();
        let result = self
            .api
            .describe_cluster(&self.manifest.environment.id, &self.manifest.cluster.id)
            .await;
        let latency_ms = start.elapsed().as_secs_f64() * 1_000.0;

        if let Err(e) = result {
            return CheckOutcome::fail(NAME, format!("Latency probe failed: {}", e));
        }

        let details = json!({
            "apiLatencyMs": (latency_ms * 100.0).round() / 100.0,
            "thresholdMs": threshold_ms,
        });

        if latency_ms < threshold_ms {
            CheckOutcome::pass(
                NAME,
                format!("API latency {:.2}ms (threshold {:.0}ms)", latency_ms, threshold_ms),
            )
            .with_details(details)
        } else {
            CheckOutcome::warn(
                NAME,
                format!(
                    "API latency {:.2}ms exceeds threshold {:.0}ms",
                    latency_ms, threshold_ms
                ),
            )
            .with_details(details)
        }
    }

    /// Create, write, read and delete a probe topic to verify the full
    /// data path through the cluster
    async fn check_end_to_end(&self) -> CheckOutcome {
        const NAME: &str = "end_to_end_flow";

        let Some(rest_endpoint) = &self.manifest.cluster.rest_endpoint else {
            return CheckOutcome::skip(NAME, "cluster.restEndpoint not configured");
        };

        let cluster_id = &self.manifest.cluster.id;
        let probe_topic = format!("{}-health-check-probe", self.manifest.environment.name);
        let timer = CHECK_DURATION.with_label_values(&[NAME]).start_timer();

        let flow = async {
            self.api
                .create_topic(rest_endpoint, cluster_id, &probe_topic, 1)
                .await?;
            let record = json!({
                "healthCheck": true,
                "timestamp": Utc::now().to_rfc3339(),
            });
            self.api
                .produce_record(rest_endpoint, cluster_id, &probe_topic, &record)
                .await?;
            self.api
                .read_topic(rest_endpoint, cluster_id, &probe_topic)
                .await
        };
        let result = flow.await;

        // The probe topic must not accumulate between runs
        let cleanup = self
            .api
            .delete_topic(rest_endpoint, cluster_id, &probe_topic)
            .await;
        timer.observe_duration();

        let details = json!({ "probeTopic": probe_topic });
        match (result, cleanup) {
            (Ok(()), Ok(())) => CheckOutcome::pass(
                NAME,
                "Produced and read a probe record through the cluster",
            )
            .with_details(details)
            .critical(),
            (Ok(()), Err(e)) => CheckOutcome::warn(
                NAME,
                format!("Flow succeeded but probe topic cleanup failed: {}", e),
            )
            .with_details(details)
            .critical(),
            (Err(e), _) => CheckOutcome::fail(NAME, format!("End-to-end flow failed: {}", e))
                .with_details(details)
                .critical(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Credentials;
    use crate::manifest::{
        ClusterSpec, DeploymentManifest, EnvironmentSpec, MonitoringSpec, SchemaRegistrySpec,
    };

    fn manifest() -> DeploymentManifest {
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
            service_accounts: vec![],
            role_bindings: vec![],
            monitoring: MonitoringSpec::default(),
            schema_registry: None,
        }
    }

    // Nothing listens on this port, so any request fails immediately
    fn unreachable_api() -> ConfluentApi {
        ConfluentApi::with_base_url(Credentials::new("key", "secret"), "http://127.0.0.1:1")
            .unwrap()
    }

    #[tokio::test]
    async fn schema_registry_check_skips_when_unconfigured() {
        let manifest = manifest();
        let api = unreachable_api();

        let outcome = HealthChecker::new(&api, &manifest)
            .check_schema_registry()
            .await;
        assert_eq!(outcome.status, CheckStatus::Skip);
    }

    #[tokio::test]
    async fn unreachable_schema_registry_fails_the_check() {
        let mut manifest = manifest();
        manifest.schema_registry = Some(SchemaRegistrySpec {
            url: "http://127.0.0.1:1".to_string(),
        });
        let api = unreachable_api();

        let outcome = HealthChecker::new(&api, &manifest)
            .check_schema_registry()
            .await;
        assert_eq!(outcome.status, CheckStatus::Fail);
        assert!(!outcome.critical);
    }

    #[tokio::test]
    async fn end_to_end_check_skips_without_rest_endpoint() {
        let manifest = manifest();
        let api = unreachable_api();

        let outcome = HealthChecker::new(&api, &manifest).check_end_to_end().await;
        assert_eq!(outcome.status, CheckStatus::Skip);
    }

    #[tokio::test]
    async fn end_to_end_failure_is_critical() {
        let mut manifest = manifest();
        manifest.cluster.rest_endpoint = Some("http://127.0.0.1:1".to_string());
        let api = unreachable_api();

        let outcome = HealthChecker::new(&api, &manifest).check_end_to_end().await;
        assert_eq!(outcome.status, CheckStatus::Fail);
        assert!(outcome.critical);
        assert_eq!(outcome.name, "end_to_end_flow");
    }
}
