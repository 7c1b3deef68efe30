//! Graph normalizer - raw topology to canonical element set
//!
//! Normalization is pure. Two responses that describe the same topology,
//! whatever their node/edge order or backend-assigned edge ids, produce the
//! same [`ElementSet`] and therefore the same canonical serialization.

use std::cmp::Ordering;

use kontrol_client::{ClusterTopology, Edge, Node, NodeType, NodeVersion};

use super::elements::{EdgeData, EdgeElement, ElementClass, ElementSet, NodeData, NodeElement};

/// Flow id given to nodes that report no versions at all
pub const UNKNOWN_FLOW: &str = "UNKNOWN";

pub struct GraphNormalizer;

impl GraphNormalizer {
    /// Normalize a raw topology into its canonical element set
    pub fn normalize(topology: &ClusterTopology) -> ElementSet {
        let nodes = Self::normalize_nodes(&topology.nodes);
        let edges = Self::normalize_edges(&topology.edges, &nodes);
        ElementSet { nodes, edges }
    }

    /// Deterministic edge identity
    pub fn edge_id(source: &str, target: &str) -> String {
        format!("edge-{}-{}", source, target)
    }

    pub fn extend_node(node: &Node) -> NodeElement {
        let versions = match &node.versions {
            Some(versions) if !versions.is_empty() => versions.clone(),
            _ => vec![NodeVersion {
                flow_id: UNKNOWN_FLOW.to_string(),
                image_tag: None,
                is_baseline: true,
            }],
        };

        let classes = if versions.len() >= 2 {
            ElementClass::Dev
        } else {
            ElementClass::Prod
        };

        let label = node
            .label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&node.id)
            .to_string();

        NodeElement {
            data: NodeData {
                id: node.id.clone(),
                label,
                node_type: node.node_type,
                parent: node.parent.clone(),
                versions,
            },
            classes,
        }
    }

    /// Classify an edge from the already-normalized (id-ordered) node list
    pub fn extend_edge(edge: &Edge, nodes: &[NodeElement]) -> EdgeElement {
        let source = find_node(nodes, &edge.source);
        let target = find_node(nodes, &edge.target);

        let source_is_dev = source.is_some_and(|n| n.classes.is_dev());
        let target_is_dev = target.is_some_and(|n| n.classes.is_dev());

        let classes = match (source_is_dev, target_is_dev) {
            (true, true) => ElementClass::DevGhost,
            (false, true) => ElementClass::Dev,
            _ => ElementClass::Prod,
        };

        EdgeElement {
            data: EdgeData {
                id: Self::edge_id(&edge.source, &edge.target),
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: edge.label.clone(),
            },
            classes,
            dashed: target.is_some_and(|n| n.data.node_type == NodeType::External),
            dangling: source.is_none() || target.is_none(),
        }
    }

    fn normalize_nodes(raw: &[Node]) -> Vec<NodeElement> {
        let mut nodes: Vec<NodeElement> = raw.iter().map(Self::extend_node).collect();

        // Ties on id are broken by content so duplicates resolve the same way
        // regardless of response order.
        nodes.sort_by(|a, b| {
            a.data
                .id
                .cmp(&b.data.id)
                .then_with(|| content_order(a, b))
        });
        nodes.dedup_by(|later, kept| {
            let duplicate = later.data.id == kept.data.id;
            if duplicate {
                tracing::debug!("[NORMALIZER] Dropping duplicate node {}", later.data.id);
            }
            duplicate
        });
        nodes
    }

    fn normalize_edges(raw: &[Edge], nodes: &[NodeElement]) -> Vec<EdgeElement> {
        let mut edges: Vec<EdgeElement> = raw
            .iter()
            .filter(|e| !e.source.is_empty() && !e.target.is_empty())
            .map(|e| Self::extend_edge(e, nodes))
            .collect();

        // prod edges first so dev edges render on top
        edges.sort_by(|a, b| {
            a.classes
                .is_dev()
                .cmp(&b.classes.is_dev())
                .then_with(|| a.data.id.cmp(&b.data.id))
                .then_with(|| a.data.source.cmp(&b.data.source))
                .then_with(|| a.data.label.cmp(&b.data.label))
        });
        edges.dedup_by(|later, kept| {
            if later.data.id != kept.data.id {
                return false;
            }
            if later.data.source == kept.data.source && later.data.target == kept.data.target {
                tracing::debug!("[NORMALIZER] Dropping duplicate edge {}", later.data.id);
            } else {
                tracing::warn!(
                    "[NORMALIZER] Edge {} -> {} collides with {} -> {} on id {}, dropping it",
                    later.data.source,
                    later.data.target,
                    kept.data.source,
                    kept.data.target,
                    later.data.id
                );
            }
            true
        });
        edges
    }
}

fn find_node<'a>(nodes: &'a [NodeElement], id: &str) -> Option<&'a NodeElement> {
    nodes
        .binary_search_by(|n| n.data.id.as_str().cmp(id))
        .ok()
        .map(|idx| &nodes[idx])
}

fn content_order(a: &NodeElement, b: &NodeElement) -> Ordering {
    let a = serde_json::to_string(a).unwrap_or_default();
    let b = serde_json::to_string(b).unwrap_or_default();
    a.cmp(&b)
}
