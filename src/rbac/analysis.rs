//! Security analysis of probe outcomes

use serde::{Deserialize, Serialize};

use crate::rbac::{Expectation, ProbeOutcome};

/// Finding severity
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Medium,
}

/// A security finding derived from probe outcomes
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub severity: Severity,
    pub finding: String,
    pub details: String,
    pub recommendation: String,
}

/// Derive security findings from probe outcomes
///
/// An unexpected allow means the account holds wider access than its role
/// bindings were meant to grant (High). An unexpected deny means the
/// configuration is tighter than declared (Medium).
pub fn analyze(outcomes: &[ProbeOutcome]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for outcome in outcomes {
        if outcome.passed || outcome.error.is_some() {
            continue;
        }

        match outcome.spec.expectation {
            Expectation::Deny if outcome.allowed => findings.push(Finding {
                severity: Severity::High,
                finding: "Unauthorized access detected".to_string(),
                details: format!(
                    "Service account {} was able to perform {} when it should have been denied",
                    outcome.spec.service_account,
                    outcome.spec.operation.name()
                ),
                recommendation: "Review RBAC configuration and role bindings".to_string(),
            }),
            Expectation::Allow if !outcome.allowed => findings.push(Finding {
                severity: Severity::Medium,
                finding: "Expected access denied".to_string(),
                details: format!(
                    "Service account {} was denied {} when it should have been allowed",
                    outcome.spec.service_account,
                    outcome.spec.operation.name()
                ),
                recommendation: "Review RBAC configuration - may be too restrictive".to_string(),
            }),
            _ => {}
        }
    }

    findings
}

/// Generate remediation recommendations from probe outcomes
pub fn recommendations(outcomes: &[ProbeOutcome]) -> Vec<String> {
    let mut recommendations = Vec::new();

    if outcomes.iter().any(|o| !o.passed) {
        recommendations.push("Review and update RBAC role bindings".to_string());
        recommendations.push("Validate role scopes for service accounts".to_string());
        recommendations
            .push("Consider applying the principle of least privilege".to_string());
    }

    let successful_escalations = outcomes
        .iter()
        .filter(|o| o.spec.escalation && o.allowed)
        .count();
    if successful_escalations > 0 {
        recommendations.push(
            "CRITICAL: Privilege escalation detected - immediate review required".to_string(),
        );
        recommendations
            .push("Implement additional access controls and monitoring".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::{Operation, ProbeSpec};
    use chrono::Utc;

    fn outcome(
        account: &str,
        expectation: Expectation,
        allowed: bool,
        escalation: bool,
    ) -> ProbeOutcome {
        let mut spec = ProbeSpec::new(account, Operation::DescribeCluster, expectation);
        if escalation {
            spec = spec.escalation();
        }
        let passed = allowed == (expectation == Expectation::Allow);
        ProbeOutcome {
            spec,
            allowed,
            passed,
            error: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn unexpected_allow_is_a_high_finding() {
        let outcomes = vec![outcome("consumer", Expectation::Deny, true, false)];
        let findings = analyze(&outcomes);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert!(findings[0].details.contains("consumer"));
    }

    #[test]
    fn unexpected_deny_is_a_medium_finding() {
        let outcomes = vec![outcome("admin", Expectation::Allow, false, false)];
        let findings = analyze(&outcomes);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn passing_outcomes_produce_no_findings() {
        let outcomes = vec![
            outcome("admin", Expectation::Allow, true, false),
            outcome("consumer", Expectation::Deny, false, false),
        ];
        assert!(analyze(&outcomes).is_empty());
        assert!(recommendations(&outcomes).is_empty());
    }

    #[test]
    fn successful_escalation_triggers_critical_recommendation() {
        let outcomes = vec![outcome("consumer", Expectation::Deny, true, true)];
        let recs = recommendations(&outcomes);
        assert!(recs.iter().any(|r| r.starts_with("CRITICAL")));
    }

    #[test]
    fn execution_errors_are_not_security_findings() {
        let mut o = outcome("admin", Expectation::Allow, false, false);
        o.error = Some("network unreachable".to_string());
        assert!(analyze(&[o]).is_empty());
    }
}
