//! Validation logic for deployment manifests

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::crn::{self, CrnContext};
use crate::manifest::DeploymentManifest;
use crate::{Error, Result};

/// A role binding with its scope resolved to a concrete CRN pattern
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBinding {
    /// Principal the role is granted to
    pub principal: String,
    /// Role name
    pub role: String,
    /// Resolved CRN pattern
    pub crn_pattern: String,
}

/// Validate a deployment manifest
pub fn validate(manifest: &DeploymentManifest) -> Result<()> {
    // Validate environment identity
    if manifest.environment.id.is_empty() {
        return Err(Error::ValidationError(
            "environment.id cannot be empty".to_string(),
        ));
    }

    if manifest.environment.organization_id.is_empty() {
        return Err(Error::ValidationError(
            "environment.organizationId cannot be empty".to_string(),
        ));
    }

    // Validate cluster
    if !manifest.cluster.id.starts_with("lkc-") {
        return Err(Error::ValidationError(format!(
            "cluster.id '{}' must start with 'lkc-'",
            manifest.cluster.id
        )));
    }

    if manifest.cluster.bootstrap_servers.is_empty() {
        return Err(Error::ValidationError(
            "cluster.bootstrapServers cannot be empty".to_string(),
        ));
    }

    let valid_protocols = ["PLAINTEXT", "SSL", "SASL_PLAINTEXT", "SASL_SSL"];
    if !valid_protocols.contains(&manifest.cluster.security_protocol.as_str()) {
        return Err(Error::ValidationError(format!(
            "cluster.securityProtocol must be one of: {:?}",
            valid_protocols
        )));
    }

    // Validate topics
    let mut seen_topics = BTreeSet::new();
    for topic in &manifest.topics {
        if topic.name.is_empty() {
            return Err(Error::ValidationError(
                "topic name cannot be empty".to_string(),
            ));
        }

        if topic.partitions < 1 {
            return Err(Error::ValidationError(format!(
                "topic '{}' partitions must be >= 1",
                topic.name
            )));
        }

        if !seen_topics.insert(topic.name.as_str()) {
            return Err(Error::ValidationError(format!(
                "duplicate topic '{}'",
                topic.name
            )));
        }
    }

    // Validate connectors
    for connector in &manifest.connectors {
        if connector.class.is_empty() {
            return Err(Error::ValidationError(format!(
                "connector '{}' class cannot be empty",
                connector.name
            )));
        }

        if connector.tasks_max < 1 {
            return Err(Error::ValidationError(format!(
                "connector '{}' tasksMax must be >= 1",
                connector.name
            )));
        }
    }

    // Validate role bindings, including scope resolvability
    let known_accounts: BTreeSet<&str> = manifest
        .service_accounts
        .iter()
        .map(|sa| sa.name.as_str())
        .collect();

    for binding in &manifest.role_bindings {
        if binding.role.is_empty() {
            return Err(Error::ValidationError(format!(
                "role binding for '{}' has an empty role",
                binding.principal
            )));
        }

        if !known_accounts.is_empty() && !known_accounts.contains(binding.principal.as_str()) {
            return Err(Error::ValidationError(format!(
                "role binding principal '{}' is not a declared service account",
                binding.principal
            )));
        }
    }

    // A manifest whose scopes cannot be resolved is invalid
    resolve_bindings(manifest)?;

    Ok(())
}

/// Resolve every role binding in the manifest to its CRN pattern
pub fn resolve_bindings(manifest: &DeploymentManifest) -> Result<Vec<ResolvedBinding>> {
    let mut ctx = CrnContext::new(manifest.environment.organization_id.clone());
    if let Some(rbac_crn) = &manifest.cluster.rbac_crn {
        ctx = ctx.with_cluster_crn(rbac_crn.clone());
    }

    let mut resolved = Vec::with_capacity(manifest.role_bindings.len());
    for binding in &manifest.role_bindings {
        let request = binding.scope.to_request(&manifest.environment.id);
        let crn_pattern = crn::resolve(&ctx, &request).map_err(|e| {
            Error::ValidationError(format!(
                "role binding for '{}' ({}): {}",
                binding.principal, binding.role, e
            ))
        })?;

        resolved.push(ResolvedBinding {
            principal: binding.principal.clone(),
            role: binding.role.clone(),
            crn_pattern,
        });
    }

    info!(
        "Resolved {} role bindings for environment {}",
        resolved.len(),
        manifest.environment.id
    );

    Ok(resolved)
}
