//! Interaction controller - pointer, hover and viewport events
//!
//! Dragging pauses traffic animation; releasing resumes it after a grace
//! delay. Hovering a node shows its version tooltip. At most one tooltip
//! exists at a time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;
use ts_rs::TS;

use crate::animation::AnimationControl;
use crate::config::InteractionConfig;
use crate::graph::{ElementSet, NodeElement, UNKNOWN_FLOW};
use crate::surface::SurfaceEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    PointerDown,
    PointerUp,
    HoverIn { node_id: String },
    HoverOut,
    Pan,
    Zoom,
    NodeClick { node_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TooltipLine {
    pub flow_id: String,
    /// Image tag, or `external service` when the flow ships no image
    pub detail: String,
    pub is_baseline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub node_id: String,
    pub lines: Vec<TooltipLine>,
}

impl Tooltip {
    /// None when the node has no real version to describe
    pub fn for_node(node: &NodeElement) -> Option<Self> {
        let lines: Vec<TooltipLine> = node
            .data
            .versions
            .iter()
            .filter(|v| v.flow_id != UNKNOWN_FLOW)
            .map(|v| TooltipLine {
                flow_id: v.flow_id.clone(),
                detail: v
                    .image_tag
                    .clone()
                    .unwrap_or_else(|| "external service".to_string()),
                is_baseline: v.is_baseline,
            })
            .collect();

        if lines.is_empty() {
            return None;
        }
        Some(Self {
            node_id: node.data.id.clone(),
            lines,
        })
    }

    /// Plain-text rendering, one version per line
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                let marker = if line.is_baseline { " (baseline)" } else { "" };
                format!("{}: {}{}", line.flow_id, line.detail, marker)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct InteractionController {
    animation: Arc<dyn AnimationControl>,
    config: InteractionConfig,
    elements: Arc<ElementSet>,
    tooltip: Option<Tooltip>,
    selected: Option<String>,
    pointer_down: bool,
    pending_resume: Option<JoinHandle<()>>,
    events: broadcast::Sender<SurfaceEvent>,
}

impl InteractionController {
    pub fn new(animation: Arc<dyn AnimationControl>, config: InteractionConfig) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            animation,
            config,
            elements: Arc::new(ElementSet::default()),
            tooltip: None,
            selected: None,
            pointer_down: false,
            pending_resume: None,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.events.subscribe()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    /// Track the currently rendered elements. A tooltip or selection whose
    /// node disappeared is dropped; a surviving tooltip is rebuilt from the
    /// node's current versions.
    pub fn set_elements(&mut self, elements: Arc<ElementSet>) {
        self.elements = elements;

        if let Some(current) = &self.tooltip {
            let rebuilt = self
                .elements
                .node(&current.node_id)
                .and_then(Tooltip::for_node);
            if rebuilt.as_ref() != Some(current) {
                let node_id = current.node_id.clone();
                self.hide_tooltip();
                if rebuilt.is_some() {
                    self.show_tooltip(&node_id);
                }
            }
        }
        if let Some(selected) = &self.selected {
            if self.elements.node(selected).is_none() {
                self.selected = None;
            }
        }
    }

    pub fn handle(&mut self, event: InteractionEvent) {
        match event {
            InteractionEvent::PointerDown => {
                self.cancel_pending_resume();
                self.pointer_down = true;
                self.animation.pause();
            }
            InteractionEvent::PointerUp => {
                self.pointer_down = false;
                self.schedule_resume();
            }
            InteractionEvent::HoverIn { node_id } => {
                self.hide_tooltip();
                let _ = self.events.send(SurfaceEvent::NodeHovered {
                    node_id: node_id.clone(),
                });
                self.show_tooltip(&node_id);
            }
            InteractionEvent::HoverOut => {
                self.hide_tooltip();
                let _ = self.events.send(SurfaceEvent::HoverCleared);
            }
            InteractionEvent::Pan | InteractionEvent::Zoom => self.hide_tooltip(),
            InteractionEvent::NodeClick { node_id } => {
                self.selected = Some(node_id.clone());
                let _ = self.events.send(SurfaceEvent::NodeClicked { node_id });
            }
        }
    }

    /// Tear down: pending resume cancelled, tooltip destroyed, selection cleared
    pub fn shutdown(&mut self) {
        self.cancel_pending_resume();
        self.hide_tooltip();
        self.selected = None;
        self.pointer_down = false;
    }

    fn schedule_resume(&mut self) {
        self.cancel_pending_resume();

        let grace = self.config.resume_grace();
        if grace.is_zero() {
            self.animation.resume();
            return;
        }

        let animation = self.animation.clone();
        self.pending_resume = Some(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            animation.resume();
        }));
    }

    fn cancel_pending_resume(&mut self) {
        if let Some(pending) = self.pending_resume.take() {
            pending.abort();
        }
    }

    fn show_tooltip(&mut self, node_id: &str) {
        let Some(node) = self.elements.node(node_id) else {
            debug!("[INTERACTION] Hover on unknown node {}", node_id);
            return;
        };
        if let Some(tooltip) = Tooltip::for_node(node) {
            self.tooltip = Some(tooltip.clone());
            let _ = self.events.send(SurfaceEvent::TooltipShown { tooltip });
        }
    }

    fn hide_tooltip(&mut self) {
        if let Some(tooltip) = self.tooltip.take() {
            let _ = self.events.send(SurfaceEvent::TooltipHidden {
                node_id: tooltip.node_id,
            });
        }
    }
}

impl Drop for InteractionController {
    fn drop(&mut self) {
        self.cancel_pending_resume();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphNormalizer;
    use kontrol_client::{ClusterTopology, Edge, Node, NodeType, NodeVersion};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingControl {
        pauses: AtomicUsize,
        resumes: AtomicUsize,
    }

    impl AnimationControl for CountingControl {
        fn pause(&self) {
            self.pauses.fetch_add(1, Ordering::SeqCst);
        }

        fn resume(&self) {
            self.resumes.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl CountingControl {
        fn resumes(&self) -> usize {
            self.resumes.load(Ordering::SeqCst)
        }
    }

    fn elements() -> Arc<ElementSet> {
        Arc::new(GraphNormalizer::normalize(&ClusterTopology {
            nodes: vec![
                Node::new("svc").with_versions(vec![
                    NodeVersion::new("prod", Some("svc:main"), true),
                    NodeVersion::new("dev-1", Some("svc:dev"), false),
                ]),
                Node::new("stripe")
                    .with_type(NodeType::External)
                    .with_versions(vec![NodeVersion::new("prod", None, true)]),
                Node::new("mystery"),
            ],
            edges: vec![Edge::new("svc", "stripe")],
        }))
    }

    fn controller(grace_ms: u64) -> (InteractionController, Arc<CountingControl>) {
        let control = Arc::new(CountingControl::default());
        let mut controller = InteractionController::new(
            control.clone(),
            InteractionConfig {
                resume_grace_ms: grace_ms,
            },
        );
        controller.set_elements(elements());
        (controller, control)
    }

    #[test]
    fn test_tooltip_lines() {
        let elements = elements();
        let tooltip = Tooltip::for_node(elements.node("svc").unwrap()).unwrap();
        assert_eq!(tooltip.lines.len(), 2);
        assert_eq!(tooltip.lines[0].detail, "svc:main");
        assert_eq!(tooltip.render(), "prod: svc:main (baseline)\ndev-1: svc:dev");

        let external = Tooltip::for_node(elements.node("stripe").unwrap()).unwrap();
        assert_eq!(external.lines[0].detail, "external service");

        assert!(Tooltip::for_node(elements.node("mystery").unwrap()).is_none());
    }

    #[tokio::test]
    async fn test_drag_pauses_and_release_resumes() {
        let (mut controller, control) = controller(0);

        controller.handle(InteractionEvent::PointerDown);
        assert!(controller.is_pointer_down());
        assert_eq!(control.pauses.load(Ordering::SeqCst), 1);
        assert_eq!(control.resumes(), 0);

        controller.handle(InteractionEvent::PointerUp);
        assert_eq!(control.resumes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_waits_for_grace_delay() {
        let (mut controller, control) = controller(100);

        controller.handle(InteractionEvent::PointerDown);
        controller.handle(InteractionEvent::PointerUp);
        assert_eq!(control.resumes(), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(control.resumes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_second_press_cancels_pending_resume() {
        let (mut controller, control) = controller(100);

        controller.handle(InteractionEvent::PointerDown);
        controller.handle(InteractionEvent::PointerUp);
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.handle(InteractionEvent::PointerDown);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(control.resumes(), 0);

        controller.handle(InteractionEvent::PointerUp);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(control.resumes(), 1);
    }

    #[tokio::test]
    async fn test_single_tooltip_instance() {
        let (mut controller, _) = controller(0);
        let mut events = controller.subscribe();

        controller.handle(InteractionEvent::HoverIn {
            node_id: "svc".into(),
        });
        controller.handle(InteractionEvent::HoverIn {
            node_id: "stripe".into(),
        });
        assert_eq!(controller.tooltip().unwrap().node_id, "stripe");

        let mut shown = 0;
        let mut hidden = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                SurfaceEvent::TooltipShown { .. } => shown += 1,
                SurfaceEvent::TooltipHidden { .. } => hidden += 1,
                _ => {}
            }
        }
        assert_eq!(shown - hidden, 1);
    }

    #[tokio::test]
    async fn test_tooltip_destroyed_on_hover_out_pan_zoom() {
        let (mut controller, _) = controller(0);
        let hover = || InteractionEvent::HoverIn {
            node_id: "svc".into(),
        };

        for teardown in [
            InteractionEvent::HoverOut,
            InteractionEvent::Pan,
            InteractionEvent::Zoom,
        ] {
            controller.handle(hover());
            assert!(controller.tooltip().is_some());
            controller.handle(teardown);
            assert!(controller.tooltip().is_none());
        }
    }

    #[tokio::test]
    async fn test_hover_without_versions_shows_nothing() {
        let (mut controller, _) = controller(0);
        controller.handle(InteractionEvent::HoverIn {
            node_id: "mystery".into(),
        });
        assert!(controller.tooltip().is_none());
    }

    #[tokio::test]
    async fn test_click_selects_and_notifies() {
        let (mut controller, _) = controller(0);
        let mut events = controller.subscribe();

        controller.handle(InteractionEvent::NodeClick {
            node_id: "svc".into(),
        });
        assert_eq!(controller.selected(), Some("svc"));
        assert_eq!(
            events.try_recv().unwrap(),
            SurfaceEvent::NodeClicked {
                node_id: "svc".into()
            }
        );
    }

    #[tokio::test]
    async fn test_topology_change_drops_stale_tooltip() {
        let (mut controller, _) = controller(0);
        controller.handle(InteractionEvent::HoverIn {
            node_id: "svc".into(),
        });
        controller.handle(InteractionEvent::NodeClick {
            node_id: "svc".into(),
        });

        controller.set_elements(Arc::new(ElementSet::default()));
        assert!(controller.tooltip().is_none());
        assert!(controller.selected().is_none());
    }

    #[tokio::test]
    async fn test_topology_change_refreshes_tooltip_lines() {
        let (mut controller, _) = controller(0);
        controller.handle(InteractionEvent::HoverIn {
            node_id: "svc".into(),
        });
        let mut events = controller.subscribe();

        let redeployed = Arc::new(GraphNormalizer::normalize(&ClusterTopology {
            nodes: vec![Node::new("svc").with_versions(vec![
                NodeVersion::new("prod", Some("svc:main"), true),
                NodeVersion::new("dev-2", Some("svc:feature"), false),
            ])],
            edges: vec![],
        }));
        controller.set_elements(redeployed);

        let tooltip = controller.tooltip().unwrap();
        assert_eq!(tooltip.render(), "prod: svc:main (baseline)\ndev-2: svc:feature");
        assert!(matches!(
            events.try_recv().unwrap(),
            SurfaceEvent::TooltipHidden { .. }
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            SurfaceEvent::TooltipShown { .. }
        ));

        // Unchanged versions keep the tooltip without churn
        controller.set_elements(controller.elements.clone());
        assert!(events.try_recv().is_err());
        assert!(controller.tooltip().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_tears_everything_down() {
        let (mut controller, control) = controller(100);
        controller.handle(InteractionEvent::HoverIn {
            node_id: "svc".into(),
        });
        controller.handle(InteractionEvent::PointerDown);
        controller.handle(InteractionEvent::PointerUp);

        controller.shutdown();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(controller.tooltip().is_none());
        assert_eq!(control.resumes(), 0);
    }
}
