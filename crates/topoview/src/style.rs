//! Stylesheet - element classes and decorations mapped to visual style
//!
//! Classes stay typed ([`ElementClass`] plus the dashed/external/selected
//! decorations) all the way to this boundary; only here do they become
//! colors and sizes. Later rules in the cascade win, in this order:
//! base, dev, ghost, dashed, selected, external.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::animation::TRAFFIC_ID_PREFIX;
use crate::config::LayoutConfig;
use crate::graph::{EdgeElement, NodeElement};

pub mod colors {
    pub const BLUE: &str = "#2170CB";
    pub const PURPLE: &str = "#9053C6";
    pub const ORANGE: &str = "#EF5B2B";
    pub const GRAY: &str = "#8d8d8d";

    pub const PROD_BACKGROUND: &str = "#EFF6FF";
    pub const PROD_BORDER: &str = "#c0bfbf";
    pub const PROD_TEXT: &str = "#5A5A59";
    pub const DEV_BACKGROUND: &str = "#FFF9ED";
    pub const DEV_LINE: &str = "#FFB79F";
    pub const DEV_TEXT: &str = "#ef5b2b";
    pub const EXTERNAL_BACKGROUND: &str = "#f2ebf8";
    pub const EDGE_LINE: &str = "#DCDCDC";
    pub const UNDERLAY: &str = "#999";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dotted,
}

/// Count bubble drawn at the left of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Badge {
    pub text: String,
    pub fill: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct GhostStyle {
    pub offset_x: f64,
    pub offset_y: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Underlay {
    pub color: String,
    pub padding: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub background_color: String,
    pub border_color: String,
    pub border_style: LineStyle,
    pub text_color: String,
    pub badge: Badge,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlay: Option<Underlay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub width: f64,
    pub line_color: String,
    pub arrow_color: String,
    pub line_style: LineStyle,
    pub z_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ghost: Option<GhostStyle>,
}

/// The moving dot drawn for a traffic token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TokenStyle {
    pub size: f64,
    pub color: String,
    pub z_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Stylesheet {
    pub node_height: f64,
    pub label_char_width: f64,
    pub label_padding: f64,
    pub corner_radius: f64,
    pub token: TokenStyle,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

impl Stylesheet {
    /// Node boxes share their dimensions with the layout
    pub fn new(layout: &LayoutConfig) -> Self {
        Self {
            node_height: layout.node_height,
            label_char_width: layout.label_char_width,
            label_padding: layout.label_padding,
            corner_radius: 12.0,
            token: TokenStyle {
                size: 5.0,
                color: colors::BLUE.to_string(),
                z_index: 1,
            },
        }
    }

    pub fn is_traffic_id(id: &str) -> bool {
        id.starts_with(TRAFFIC_ID_PREFIX)
    }

    pub fn node_width(&self, label: &str) -> f64 {
        label.chars().count() as f64 * self.label_char_width + self.label_padding
    }

    pub fn badge(&self, node: &NodeElement) -> Badge {
        if node.data.is_external() {
            return Badge {
                text: "~".to_string(),
                fill: colors::PURPLE.to_string(),
            };
        }
        let fill = if node.classes.is_dev() {
            colors::ORANGE
        } else {
            colors::GRAY
        };
        Badge {
            text: node.data.versions.len().to_string(),
            fill: fill.to_string(),
        }
    }

    pub fn node_style(&self, node: &NodeElement, selected: bool) -> NodeStyle {
        let mut style = NodeStyle {
            width: self.node_width(&node.data.label),
            height: self.node_height,
            corner_radius: self.corner_radius,
            background_color: colors::PROD_BACKGROUND.to_string(),
            border_color: colors::PROD_BORDER.to_string(),
            border_style: LineStyle::Solid,
            text_color: colors::PROD_TEXT.to_string(),
            badge: self.badge(node),
            underlay: None,
        };

        if node.classes.is_dev() {
            style.background_color = colors::DEV_BACKGROUND.to_string();
            style.border_color = colors::DEV_LINE.to_string();
            style.text_color = colors::DEV_TEXT.to_string();
        }
        if selected {
            style.underlay = Some(Underlay {
                color: colors::UNDERLAY.to_string(),
                padding: 24.0,
                opacity: 0.2,
            });
        }
        if node.data.is_external() {
            style.border_style = LineStyle::Dotted;
            style.background_color = colors::EXTERNAL_BACKGROUND.to_string();
            style.border_color = colors::PURPLE.to_string();
            style.text_color = colors::PROD_TEXT.to_string();
        }
        style
    }

    pub fn edge_style(&self, edge: &EdgeElement) -> EdgeStyle {
        let mut style = EdgeStyle {
            width: 2.0,
            line_color: colors::EDGE_LINE.to_string(),
            arrow_color: colors::EDGE_LINE.to_string(),
            line_style: LineStyle::Solid,
            z_index: 0,
            ghost: None,
        };

        if edge.classes.is_dev() {
            style.line_color = colors::DEV_LINE.to_string();
            style.arrow_color = colors::DEV_LINE.to_string();
            style.width = 3.0;
            style.z_index = 10;
        }
        if edge.classes.is_ghost() {
            style.ghost = Some(GhostStyle {
                offset_x: 0.0,
                offset_y: 12.0,
                opacity: 0.4,
            });
            style.width = 4.0;
        }
        if edge.dashed {
            style.line_style = LineStyle::Dotted;
        }
        style
    }
}
