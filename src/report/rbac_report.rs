//! RBAC test report assembly

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manifest::DeploymentManifest;
use crate::rbac::{self, Finding, ProbeOutcome};

/// Aggregate pass/fail summary
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    pub success_rate: f64,
}

impl Summary {
    pub fn from_outcomes(outcomes: &[ProbeOutcome]) -> Self {
        let total = outcomes.len();
        let passed = outcomes.iter().filter(|o| o.passed).count();
        Self {
            total_tests: total,
            passed_tests: passed,
            failed_tests: total - passed,
            success_rate: if total > 0 {
                passed as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed_tests == 0
    }
}

/// Full RBAC test report
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RbacReport {
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    pub cluster_id: String,
    pub summary: Summary,
    pub outcomes: Vec<ProbeOutcome>,
    pub security_findings: Vec<Finding>,
    pub recommendations: Vec<String>,
}

impl RbacReport {
    /// Assemble a report from probe outcomes
    pub fn build(manifest: &DeploymentManifest, outcomes: Vec<ProbeOutcome>) -> Self {
        let summary = Summary::from_outcomes(&outcomes);
        let security_findings = rbac::analyze(&outcomes);
        let recommendations = rbac::recommendations(&outcomes);

        Self {
            timestamp: Utc::now(),
            environment: manifest.environment.name.clone(),
            cluster_id: manifest.cluster.id.clone(),
            summary,
            outcomes,
            security_findings,
            recommendations,
        }
    }
}
