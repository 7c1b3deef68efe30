//! Graph module - Normalized, render-ready topology elements

pub mod elements;
pub mod legend;
pub mod normalize;

pub use elements::{EdgeData, EdgeElement, ElementClass, ElementSet, NodeData, NodeElement};
pub use legend::{FlowLegend, FlowSummary};
pub use normalize::{GraphNormalizer, UNKNOWN_FLOW};
