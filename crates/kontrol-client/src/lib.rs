//! Kontrol Client - Interface to the Kontrol topology API
//!
//! This crate provides a typed HTTP client for the one endpoint the topology
//! view consumes:
//!
//! ```text
//! TopologyPoller  -->  TopologyClient  -->  Kontrol API
//!                      (this crate)         GET /tenant/{uuid}/topology
//! ```
//!
//! The [`TopologySource`] trait is the seam the poller depends on, so tests and
//! alternative transports can stand in for the HTTP client.

mod types;

pub use types::*;

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Default Kontrol API URL
pub const DEFAULT_KONTROL_API_URL: &str = "http://localhost:8080";

/// Request timeout for a single topology fetch
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Error types for topology fetches
#[derive(Debug, thiserror::Error)]
pub enum TopologyClientError {
    #[error("Kontrol API not reachable at {url}: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    #[error("Kontrol API returned error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed topology response: {0}")]
    Malformed(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(reqwest::Error),
}

impl TopologyClientError {
    /// Network and HTTP status failures. Everything else means the server
    /// answered with something that is not a topology.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. } | Self::Build(_))
    }
}

/// Anything that can produce the current cluster topology
#[async_trait]
pub trait TopologySource: Send + Sync {
    async fn fetch_topology(&self) -> Result<ClusterTopology, TopologyClientError>;
}

/// Client for the Kontrol topology endpoint of a single tenant
#[derive(Debug, Clone)]
pub struct TopologyClient {
    base_url: String,
    tenant: Uuid,
    client: reqwest::Client,
}

impl TopologyClient {
    /// Create a client for `tenant` against the API at `url`
    pub fn new(url: &str, tenant: Uuid) -> Result<Self, TopologyClientError> {
        Self::with_timeout(url, tenant, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        url: &str,
        tenant: Uuid,
        timeout: Duration,
    ) -> Result<Self, TopologyClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TopologyClientError::Build)?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            tenant,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tenant(&self) -> Uuid {
        self.tenant
    }

    pub fn topology_url(&self) -> String {
        format!("{}/tenant/{}/topology", self.base_url, self.tenant)
    }

    /// Fetch the current topology of this tenant
    pub async fn get_topology(&self) -> Result<ClusterTopology, TopologyClientError> {
        let url = self.topology_url();
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TopologyClientError::Transport {
                url: url.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TopologyClientError::Status { status, body });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| TopologyClientError::Transport { url, source: e })?;

        let topology = parse_topology(&text)?;
        debug!(
            "Got topology from Kontrol: {} nodes, {} edges",
            topology.nodes.len(),
            topology.edges.len()
        );
        Ok(topology)
    }
}

#[async_trait]
impl TopologySource for TopologyClient {
    async fn fetch_topology(&self) -> Result<ClusterTopology, TopologyClientError> {
        self.get_topology().await
    }
}

/// Parse a topology body, rejecting the shapes the API produces when it has
/// nothing usable to say (empty, `null`, or an HTML page from a proxy).
pub fn parse_topology(body: &str) -> Result<ClusterTopology, TopologyClientError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(TopologyClientError::Malformed(
            "response body is empty".to_string(),
        ));
    }
    if trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html") {
        return Err(TopologyClientError::Malformed(
            "API returned HTML instead of a topology".to_string(),
        ));
    }

    serde_json::from_str(trimmed).map_err(|e| TopologyClientError::Malformed(e.to_string()))
}
