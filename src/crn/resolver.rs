//! Scope-to-CRN pattern resolution

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// CRN scheme and authority prefix shared by all constructed patterns
const CRN_PREFIX: &str = "crn://confluent.cloud";

/// Requested scope for a role binding
///
/// `environment_id` is always required. The remaining identifiers are
/// independently optional; `None` means "not specified" (the upstream
/// configuration used an empty string for this).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRequest {
    /// Caller-supplied pattern override, highest precedence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit_pattern: Option<String>,

    /// Environment identifier (e.g. `env-abc123`)
    pub environment_id: String,

    /// Cluster identifier (e.g. `lkc-abc123`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,

    /// Topic name, only meaningful together with `cluster_id`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,

    /// Connector identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<String>,
}

/// Shared identifiers threaded explicitly into resolution
///
/// The cluster RBAC CRN is computed by the provider and treated as an opaque
/// string. When it is absent the cluster-scoped pattern is constructed from
/// the organization, environment and cluster identifiers instead.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrnContext {
    /// Organization identifier
    pub organization_id: String,

    /// Provider-computed RBAC CRN for the cluster, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_crn: Option<String>,
}

impl CrnContext {
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            cluster_crn: None,
        }
    }

    pub fn with_cluster_crn(mut self, crn: impl Into<String>) -> Self {
        self.cluster_crn = Some(crn.into());
        self
    }
}

/// One entry in the scope precedence chain
///
/// The chain is an explicit ordered table so the precedence order is
/// auditable and each rule can be tested in isolation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeRule {
    /// Caller override, returned verbatim
    ExplicitOverride,
    /// Topic within a cluster
    TopicScoped,
    /// Connector, organization- and cluster-agnostic
    ConnectorScoped,
    /// Whole cluster
    ClusterScoped,
    /// Whole environment, the broadest applicable scope
    EnvironmentScoped,
}

/// Precedence order: first applicable rule wins
pub const PRECEDENCE: &[ScopeRule] = &[
    ScopeRule::ExplicitOverride,
    ScopeRule::TopicScoped,
    ScopeRule::ConnectorScoped,
    ScopeRule::ClusterScoped,
    ScopeRule::EnvironmentScoped,
];

impl ScopeRule {
    /// Whether this rule applies to the given request
    pub fn applies(&self, request: &ScopeRequest) -> bool {
        match self {
            ScopeRule::ExplicitOverride => is_set(&request.explicit_pattern),
            ScopeRule::TopicScoped => {
                is_set(&request.topic_name) && is_set(&request.cluster_id)
            }
            ScopeRule::ConnectorScoped => is_set(&request.connector_id),
            ScopeRule::ClusterScoped => is_set(&request.cluster_id),
            ScopeRule::EnvironmentScoped => true,
        }
    }

    /// Build the CRN pattern for this rule
    ///
    /// Callers must only invoke this for a rule that `applies`.
    fn build(&self, ctx: &CrnContext, request: &ScopeRequest) -> String {
        match self {
            ScopeRule::ExplicitOverride => {
                request.explicit_pattern.clone().unwrap_or_default()
            }
            ScopeRule::TopicScoped => {
                let cluster_id = request.cluster_id.as_deref().unwrap_or_default();
                let topic = request.topic_name.as_deref().unwrap_or_default();
                format!(
                    "{}/kafka={}/topic={}",
                    cluster_pattern(ctx, request),
                    cluster_id,
                    topic
                )
            }
            ScopeRule::ConnectorScoped => {
                let connector = request.connector_id.as_deref().unwrap_or_default();
                format!(
                    "{}/organization=*/environment={}/cloud-cluster=*/connector={}",
                    CRN_PREFIX, request.environment_id, connector
                )
            }
            ScopeRule::ClusterScoped => cluster_pattern(ctx, request),
            ScopeRule::EnvironmentScoped => environment_pattern(ctx, request),
        }
    }
}

/// Resolve the narrowest CRN pattern satisfying the requested scope
///
/// Walks the precedence table and returns the pattern of the first rule
/// that applies. Pure and deterministic; the same request always produces
/// the same pattern.
///
/// Errors:
/// - empty `environment_id`
/// - `topic_name` set without a `cluster_id` (a topic scope cannot be
///   expressed without its cluster, and silently broadening the grant
///   would hand out wider access than the caller asked for)
pub fn resolve(ctx: &CrnContext, request: &ScopeRequest) -> Result<String> {
    if request.environment_id.is_empty() {
        return Err(Error::ValidationError(
            "scope.environmentId cannot be empty".to_string(),
        ));
    }

    if is_set(&request.topic_name)
        && !is_set(&request.cluster_id)
        && !is_set(&request.explicit_pattern)
    {
        return Err(Error::ValidationError(format!(
            "scope.topicName '{}' requires scope.clusterId; refusing to broaden the grant",
            request.topic_name.as_deref().unwrap_or_default()
        )));
    }

    let rule = PRECEDENCE
        .iter()
        .find(|rule| rule.applies(request))
        .copied()
        // EnvironmentScoped always applies
        .unwrap_or(ScopeRule::EnvironmentScoped);

    Ok(rule.build(ctx, request))
}

/// Cluster-scoped pattern: the provider-computed cluster CRN when known,
/// otherwise constructed from the context identifiers
fn cluster_pattern(ctx: &CrnContext, request: &ScopeRequest) -> String {
    if let Some(crn) = &ctx.cluster_crn {
        return crn.clone();
    }
    format!(
        "{}/cloud-cluster={}",
        environment_pattern(ctx, request),
        request.cluster_id.as_deref().unwrap_or_default()
    )
}

/// Environment-scoped pattern
fn environment_pattern(ctx: &CrnContext, request: &ScopeRequest) -> String {
    format!(
        "{}/organization={}/environment={}",
        CRN_PREFIX, ctx.organization_id, request.environment_id
    )
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}
