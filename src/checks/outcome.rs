//! Health check outcome types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a single health check
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

/// Outcome of a single health check
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    /// Check name (stable identifier)
    pub name: String,

    /// Check result
    pub status: CheckStatus,

    /// Human-readable summary
    pub message: String,

    /// Structured details for the report
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,

    /// A critical failure makes the whole deployment unhealthy
    pub critical: bool,
}

impl CheckOutcome {
    pub fn pass(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Pass, message)
    }

    pub fn warn(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Warn, message)
    }

    pub fn fail(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Fail, message)
    }

    pub fn skip(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Skip, message)
    }

    fn new(name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            details: serde_json::Value::Null,
            critical: false,
        }
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// Overall deployment status derived from individual checks
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Healthy,
    Warning,
    Critical,
}

impl OverallStatus {
    /// Any failed critical check makes the deployment critical; any other
    /// failure or warning downgrades it to warning.
    pub fn from_checks(checks: &[CheckOutcome]) -> Self {
        let failed: Vec<&CheckOutcome> = checks
            .iter()
            .filter(|c| matches!(c.status, CheckStatus::Fail | CheckStatus::Warn))
            .collect();

        if failed
            .iter()
            .any(|c| c.critical && c.status == CheckStatus::Fail)
        {
            OverallStatus::Critical
        } else if !failed.is_empty() {
            OverallStatus::Warning
        } else {
            OverallStatus::Healthy
        }
    }

    /// Process exit code for CI pipelines
    pub fn exit_code(&self) -> i32 {
        match self {
            OverallStatus::Healthy => 0,
            OverallStatus::Warning => 1,
            OverallStatus::Critical => 2,
        }
    }
}

/// Aggregated health check report for one run
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    /// Environment name
    pub environment: String,

    /// Cluster identifier
    pub cluster_id: String,

    /// Fingerprint of the manifest the run was checked against
    pub manifest_fingerprint: String,

    /// Run start time
    pub timestamp: DateTime<Utc>,

    /// Individual check outcomes
    pub checks: Vec<CheckOutcome>,

    /// Derived overall status
    pub overall_status: OverallStatus,

    /// Wall-clock duration of the run
    pub execution_time_seconds: f64,
}
