//! Typed client for the Confluent Cloud REST API
//!
//! Covers the small slice of the API the health and RBAC checks need:
//! cluster description, topic listing via the cluster's Kafka REST
//! endpoint, and connector listing/status via the Connect API.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::api::Credentials;
use crate::{Error, Result};

/// Default Cloud API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.confluent.cloud";

/// Request timeout for all API calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Confluent Cloud API client
#[derive(Clone, Debug)]
pub struct ConfluentApi {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

/// Cluster description from the CMK API
#[derive(Clone, Debug, Deserialize)]
pub struct ClusterInfo {
    pub id: String,
    pub spec: ClusterInfoSpec,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClusterInfoSpec {
    pub display_name: String,
    #[serde(default)]
    pub kafka_bootstrap_endpoint: Option<String>,
}

/// Topic description from the Kafka REST v3 API
#[derive(Clone, Debug, Deserialize)]
pub struct TopicInfo {
    pub topic_name: String,
    pub partitions_count: i32,
}

#[derive(Debug, Deserialize)]
struct TopicListResponse {
    data: Vec<TopicInfo>,
}

/// Connector status from the Connect API
#[derive(Clone, Debug, Deserialize)]
pub struct ConnectorStatus {
    pub connector: ConnectorState,
    #[serde(default)]
    pub tasks: Vec<ConnectorTask>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConnectorState {
    pub state: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConnectorTask {
    pub id: i32,
    pub state: String,
}

impl ConfluentApi {
    /// Create a client against the default Cloud API endpoint
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (used in tests)
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::ApiError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Describe a Kafka cluster
    pub async fn describe_cluster(
        &self,
        environment_id: &str,
        cluster_id: &str,
    ) -> Result<ClusterInfo> {
        let url = format!(
            "{}/cmk/v2/clusters/{}?environment={}",
            self.base_url, cluster_id, environment_id
        );
        self.get_json(&url).await
    }

    /// List topics through the cluster's Kafka REST endpoint
    pub async fn list_topics(
        &self,
        rest_endpoint: &str,
        cluster_id: &str,
    ) -> Result<Vec<TopicInfo>> {
        let url = format!(
            "{}/kafka/v3/clusters/{}/topics",
            rest_endpoint.trim_end_matches('/'),
            cluster_id
        );
        let response: TopicListResponse = self.get_json(&url).await?;
        Ok(response.data)
    }

    /// List connector names in a Connect cluster
    pub async fn list_connectors(
        &self,
        environment_id: &str,
        cluster_id: &str,
    ) -> Result<Vec<String>> {
        let url = format!(
            "{}/connect/v1/environments/{}/clusters/{}/connectors",
            self.base_url, environment_id, cluster_id
        );
        self.get_json(&url).await
    }

    /// Fetch the status of a single connector
    pub async fn connector_status(
        &self,
        environment_id: &str,
        cluster_id: &str,
        connector_name: &str,
    ) -> Result<ConnectorStatus> {
        let url = format!(
            "{}/connect/v1/environments/{}/clusters/{}/connectors/{}/status",
            self.base_url, environment_id, cluster_id, connector_name
        );
        self.get_json(&url).await
    }

    /// List Schema Registry subjects
    pub async fn list_subjects(&self, schema_registry_url: &str) -> Result<Vec<String>> {
        let url = format!("{}/subjects", schema_registry_url.trim_end_matches('/'));
        self.get_json(&url).await
    }

    /// Create a topic through the cluster's Kafka REST endpoint
    pub async fn create_topic(
        &self,
        rest_endpoint: &str,
        cluster_id: &str,
        topic_name: &str,
        partitions: i32,
    ) -> Result<()> {
        let url = format!(
            "{}/kafka/v3/clusters/{}/topics",
            rest_endpoint.trim_end_matches('/'),
            cluster_id
        );
        let body = serde_json::json!({
            "topic_name": topic_name,
            "partitions_count": partitions,
        });
        let request = self.client.post(&url).json(&body);
        self.send_expect_success(request, "POST", &url).await
    }

    /// Delete a topic through the cluster's Kafka REST endpoint
    pub async fn delete_topic(
        &self,
        rest_endpoint: &str,
        cluster_id: &str,
        topic_name: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/kafka/v3/clusters/{}/topics/{}",
            rest_endpoint.trim_end_matches('/'),
            cluster_id,
            topic_name
        );
        let request = self.client.delete(&url);
        self.send_expect_success(request, "DELETE", &url).await
    }

    /// Fetch topic metadata; requires read access on the topic
    pub async fn read_topic(
        &self,
        rest_endpoint: &str,
        cluster_id: &str,
        topic_name: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/kafka/v3/clusters/{}/topics/{}",
            rest_endpoint.trim_end_matches('/'),
            cluster_id,
            topic_name
        );
        let request = self.client.get(&url);
        self.send_expect_success(request, "GET", &url).await
    }

    /// Produce a single probe record; requires write access on the topic
    pub async fn produce_record(
        &self,
        rest_endpoint: &str,
        cluster_id: &str,
        topic_name: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        let url = format!(
            "{}/kafka/v3/clusters/{}/topics/{}/records",
            rest_endpoint.trim_end_matches('/'),
            cluster_id,
            topic_name
        );
        let body = serde_json::json!({
            "value": { "type": "JSON", "data": value },
        });
        let request = self.client.post(&url).json(&body);
        self.send_expect_success(request, "POST", &url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(Error::PermissionDenied(format!("GET {}: {}", url, body)));
            }
            return Err(Error::ApiError(format!(
                "GET {} returned HTTP {}: {}",
                url, status, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::ApiError(format!("Failed to decode response from {}: {}", url, e)))
    }

    async fn send_expect_success(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        url: &str,
    ) -> Result<()> {
        debug!("{} {}", method, url);

        let response = request
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::PermissionDenied(format!(
                "{} {}: {}",
                method, url, body
            )));
        }

        Err(Error::ApiError(format!(
            "{} {} returned HTTP {}: {}",
            method, url, status, body
        )))
    }
}
