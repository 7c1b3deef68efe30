//! Element model for the rendered topology

use kontrol_client::{NodeType, NodeVersion};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Visual category of a node or edge.
///
/// Nodes are only ever `Prod` or `Dev`; `DevGhost` marks an edge whose
/// endpoints are both dev, i.e. a path fully shadowed by a dev overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
pub enum ElementClass {
    #[serde(rename = "prod")]
    Prod,
    #[serde(rename = "dev")]
    Dev,
    #[serde(rename = "dev ghost")]
    DevGhost,
}

impl ElementClass {
    pub fn is_dev(self) -> bool {
        matches!(self, Self::Dev | Self::DevGhost)
    }

    pub fn is_ghost(self) -> bool {
        matches!(self, Self::DevGhost)
    }

    /// Class names as the renderer's selectors know them
    pub fn class_names(self) -> &'static [&'static str] {
        match self {
            Self::Prod => &["prod"],
            Self::Dev => &["dev"],
            Self::DevGhost => &["dev", "ghost"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Never empty after normalization
    pub versions: Vec<NodeVersion>,
}

impl NodeData {
    pub fn is_external(&self) -> bool {
        self.node_type == NodeType::External
    }

    pub fn baseline(&self) -> Option<&NodeVersion> {
        self.versions.iter().find(|v| v.is_baseline)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct NodeElement {
    pub data: NodeData,
    pub classes: ElementClass,
}

impl NodeElement {
    pub fn id(&self) -> &str {
        &self.data.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct EdgeData {
    /// Always `edge-{source}-{target}`
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct EdgeElement {
    pub data: EdgeData,
    pub classes: ElementClass,
    /// Target is an external service
    pub dashed: bool,
    /// An endpoint is missing from the node list
    pub dangling: bool,
}

impl EdgeElement {
    pub fn id(&self) -> &str {
        &self.data.id
    }
}

/// Canonical, diff-stable set of renderable elements.
///
/// Nodes are ordered by id. Edges are ordered prod first, then dev, each
/// group by id, because later edges render on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct ElementSet {
    pub nodes: Vec<NodeElement>,
    pub edges: Vec<EdgeElement>,
}

impl ElementSet {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&NodeElement> {
        self.nodes
            .binary_search_by(|n| n.data.id.as_str().cmp(id))
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeElement> {
        self.edges.iter().find(|e| e.data.id == id)
    }

    pub fn dev_nodes(&self) -> impl Iterator<Item = &NodeElement> {
        self.nodes.iter().filter(|n| n.classes.is_dev())
    }

    /// The serialization the poller's diff gate compares byte for byte
    pub fn canonical_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
