//! Type definitions for Kontrol topology responses
//!
//! These types mirror the JSON served by `GET /tenant/{uuid}/topology`.
//! Optional fields are tolerated here; it is the view's normalizer that
//! makes them total.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One deployed variant of a node.
///
/// `image_tag == None` marks an externally owned service that has no image
/// to report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct NodeVersion {
    pub flow_id: String,
    #[serde(default)]
    pub image_tag: Option<String>,
    #[serde(default)]
    pub is_baseline: bool,
}

impl NodeVersion {
    pub fn new(flow_id: impl Into<String>, image_tag: Option<&str>, is_baseline: bool) -> Self {
        Self {
            flow_id: flow_id.into(),
            image_tag: image_tag.map(String::from),
            is_baseline,
        }
    }

    pub fn is_external(&self) -> bool {
        self.image_tag.is_none()
    }
}

/// Kind of a topology node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Gateway,
    #[default]
    Service,
    ServiceVersion,
    Redis,
    External,
    #[serde(other)]
    Other,
}

/// A service, gateway or data store in the mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub versions: Option<Vec<NodeVersion>>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: Some(id.clone()),
            id,
            node_type: NodeType::Service,
            parent: None,
            versions: None,
        }
    }

    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    pub fn with_versions(mut self, versions: Vec<NodeVersion>) -> Self {
        self.versions = Some(versions);
        self
    }
}

/// A call relationship between two nodes.
///
/// The backend may attach its own `id`; it is not stable across polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            id: None,
            label: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Full topology response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct ClusterTopology {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}
