//! Probe execution

use chrono::Utc;
use tracing::{info, warn};

use crate::api::{ConfluentApi, Credentials};
use crate::manifest::DeploymentManifest;
use crate::metrics::prometheus::RBAC_PROBES;
use crate::rbac::{Expectation, Operation, ProbeOutcome, ProbeSpec};
use crate::{Error, Result};

/// Executes a single probe and reports whether the operation was allowed
///
/// The live implementation talks to Confluent Cloud under the probed
/// service account's credentials; tests substitute a scripted executor.
pub trait ProbeExecutor {
    fn execute(
        &self,
        probe: &ProbeSpec,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

/// Run a probe plan and collect outcomes
///
/// Execution errors unrelated to the access decision (network failures,
/// missing credentials) mark the probe as failed without aborting the run.
pub async fn run_plan<E: ProbeExecutor>(executor: &E, plan: &[ProbeSpec]) -> Vec<ProbeOutcome> {
    let mut outcomes = Vec::with_capacity(plan.len());

    for probe in plan {
        let timestamp = Utc::now();
        let outcome = match executor.execute(probe).await {
            Ok(allowed) => {
                let passed = allowed == (probe.expectation == Expectation::Allow);
                ProbeOutcome {
                    spec: probe.clone(),
                    allowed,
                    passed,
                    error: None,
                    timestamp,
                }
            }
            Err(e) => {
                warn!(
                    "Probe {}/{} failed to execute: {}",
                    probe.service_account,
                    probe.operation.name(),
                    e
                );
                ProbeOutcome {
                    spec: probe.clone(),
                    allowed: false,
                    passed: false,
                    error: Some(e.to_string()),
                    timestamp,
                }
            }
        };

        RBAC_PROBES
            .with_label_values(&[if outcome.passed { "passed" } else { "failed" }])
            .inc();
        outcomes.push(outcome);
    }

    info!(
        "Executed {} probes, {} passed",
        outcomes.len(),
        outcomes.iter().filter(|o| o.passed).count()
    );

    outcomes
}

/// Live executor running probes against Confluent Cloud
pub struct ApiProbeExecutor<'a> {
    manifest: &'a DeploymentManifest,
}

impl<'a> ApiProbeExecutor<'a> {
    pub fn new(manifest: &'a DeploymentManifest) -> Self {
        Self { manifest }
    }

    /// Per-account credentials are injected as `<ACCOUNT>_API_KEY` and
    /// `<ACCOUNT>_API_SECRET` environment variables by the CI pipeline.
    fn account_client(&self, service_account: &str) -> Result<ConfluentApi> {
        let prefix = service_account.to_uppercase();
        let api_key = std::env::var(format!("{}_API_KEY", prefix)).map_err(|_| {
            Error::CredentialsError(format!("{}_API_KEY is not set", prefix))
        })?;
        let api_secret = std::env::var(format!("{}_API_SECRET", prefix)).map_err(|_| {
            Error::CredentialsError(format!("{}_API_SECRET is not set", prefix))
        })?;

        ConfluentApi::new(Credentials::new(api_key, api_secret))
    }

    fn rest_endpoint(&self) -> Result<&str> {
        self.manifest
            .cluster
            .rest_endpoint
            .as_deref()
            .ok_or_else(|| {
                Error::ConfigError(
                    "cluster.restEndpoint is required for RBAC probes".to_string(),
                )
            })
    }
}

impl ProbeExecutor for ApiProbeExecutor<'_> {
    async fn execute(&self, probe: &ProbeSpec) -> Result<bool> {
        let api = self.account_client(&probe.service_account)?;
        let cluster_id = &self.manifest.cluster.id;
        let environment_id = &self.manifest.environment.id;

        let result = match &probe.operation {
            Operation::ListTopics => api
                .list_topics(self.rest_endpoint()?, cluster_id)
                .await
                .map(|_| ()),
            Operation::CreateTopic(name) => {
                api.create_topic(self.rest_endpoint()?, cluster_id, name, 1)
                    .await
            }
            Operation::DeleteTopic(name) => {
                api.delete_topic(self.rest_endpoint()?, cluster_id, name)
                    .await
            }
            Operation::DescribeCluster => api
                .describe_cluster(environment_id, cluster_id)
                .await
                .map(|_| ()),
            Operation::ReadTopic(name) => {
                api.read_topic(self.rest_endpoint()?, cluster_id, name).await
            }
            Operation::WriteTopic(name) => {
                let value = serde_json::json!({
                    "probe": true,
                    "serviceAccount": probe.service_account,
                    "timestamp": Utc::now().to_rfc3339(),
                });
                api.produce_record(self.rest_endpoint()?, cluster_id, name, &value)
                    .await
            }
        };

        match result {
            Ok(()) => Ok(true),
            Err(Error::PermissionDenied(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
