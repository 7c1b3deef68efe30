//! Rendering surface contract
//!
//! What the dashboard shell hands to the graph widget, and what the widget
//! reports back.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::LayoutConfig;
use crate::graph::ElementSet;
use crate::interaction::Tooltip;
use crate::style::Stylesheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
pub enum RankDir {
    LR,
    TB,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
pub enum Align {
    UL,
    UR,
    DL,
    DR,
}

/// Layout options for renderers that run their own layered layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDescriptor {
    pub name: String,
    pub rank_dir: RankDir,
    pub align: Align,
    pub node_sep: f64,
    pub rank_sep: f64,
}

impl From<&LayoutConfig> for LayoutDescriptor {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            name: "dagre".to_string(),
            rank_dir: RankDir::LR,
            align: Align::UL,
            node_sep: config.node_sep,
            rank_sep: config.rank_sep,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct SurfaceProps {
    pub elements: ElementSet,
    pub stylesheet: Stylesheet,
    pub layout: LayoutDescriptor,
}

impl SurfaceProps {
    pub fn new(elements: ElementSet, config: &LayoutConfig) -> Self {
        Self {
            elements,
            stylesheet: Stylesheet::new(config),
            layout: LayoutDescriptor::from(config),
        }
    }
}

/// Callbacks raised by the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceEvent {
    NodeClicked { node_id: String },
    NodeHovered { node_id: String },
    HoverCleared,
    TooltipShown { tooltip: Tooltip },
    TooltipHidden { node_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_is_left_to_right() {
        let descriptor = LayoutDescriptor::from(&LayoutConfig::default());
        assert_eq!(descriptor.name, "dagre");
        assert_eq!(descriptor.rank_dir, RankDir::LR);
        assert_eq!(descriptor.node_sep, 50.0);

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["rankDir"], "LR");
        assert_eq!(json["align"], "UL");
    }

    #[test]
    fn test_event_wire_shape() {
        let event = SurfaceEvent::NodeClicked {
            node_id: "svc".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "node_clicked");
        assert_eq!(json["node_id"], "svc");
    }
}
