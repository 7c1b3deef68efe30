//! # Topoview - Live Service-Mesh Topology View
//!
//! The engine behind the traffic view of the dashboard: it keeps a rendered
//! picture of the mesh in sync with the Kontrol API and animates traffic on
//! every edge.
//!
//! ## Pipeline
//!
//! ```text
//! TopologyClient -> GraphNormalizer -> TopologyPoller (diff gate)
//!     -> RenderFrame -> LayoutEngine (positions)
//!     -> TrafficAnimationScheduler (per-edge tokens) <- InteractionController
//! ```
//!
//! - **Normalization** turns the raw topology into a canonical element set with
//!   derived visual classes, so equivalent responses serialize identically.
//! - **Polling** publishes only when that serialization changes.
//! - **Layout** is a deterministic left-to-right layered layout, snapped to a grid.
//! - **Animation** keeps at most one traffic token per edge and purges them on
//!   pause and on every topology change.
//! - **Interaction** pauses animation while the user drags and owns the single
//!   tooltip instance.

pub mod animation;
pub mod config;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod poller;
pub mod style;
pub mod surface;
pub mod view;

pub use animation::{
    AnimationControl, AnimationEvent, AnimationHandle, SpawnReport, TokenFrame,
    TrafficAnimationScheduler, TrafficToken,
};
pub use config::{AnimationConfig, InteractionConfig, LayoutConfig, ViewConfig};
pub use graph::{
    legend::{FlowLegend, FlowSummary},
    normalize::GraphNormalizer,
    EdgeData, EdgeElement, ElementClass, ElementSet, NodeData, NodeElement,
};
pub use interaction::{InteractionController, InteractionEvent, Tooltip, TooltipLine};
pub use layout::{Layout, LayoutEngine, Position};
pub use poller::{PollOutcome, PollState, PublishedTopology, TopologyPoller};
pub use style::Stylesheet;
pub use surface::{LayoutDescriptor, SurfaceEvent, SurfaceProps};
pub use view::{RenderFrame, TopologyView};

use kontrol_client::TopologyClientError;

/// Main error types for topology view operations
#[derive(Debug, thiserror::Error)]
pub enum TopoviewError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Topology transport error: {0}")]
    Transport(TopologyClientError),

    #[error("Malformed topology response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot spawn traffic on edge {edge_id}: {reason}")]
    Spawn { edge_id: String, reason: String },

    #[error("Topology view is stopped")]
    Stopped,
}

impl From<TopologyClientError> for TopoviewError {
    fn from(err: TopologyClientError) -> Self {
        match err {
            TopologyClientError::Malformed(msg) => Self::MalformedResponse(msg),
            other => Self::Transport(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, TopoviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_split_into_taxonomy() {
        let malformed: TopoviewError = TopologyClientError::Malformed("null".into()).into();
        assert!(matches!(malformed, TopoviewError::MalformedResponse(_)));

        let status: TopoviewError = TopologyClientError::Status {
            status: 502,
            body: String::new(),
        }
        .into();
        assert!(matches!(status, TopoviewError::Transport(_)));
    }
}
