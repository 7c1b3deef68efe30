//! Topology view - wires the poller, layout, animation and interaction
//! together behind one start/stop lifecycle.
//!
//! Each published topology is applied in a fixed order: in-flight tokens are
//! purged, the layout is computed once, the positioned topology goes to the
//! scheduler, and only then is the frame handed to the surface.

use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Utc};
use kontrol_client::{TopologyClient, TopologySource};
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::animation::{AnimationEvent, AnimationHandle, TokenFrame, TrafficAnimationScheduler};
use crate::config::ViewConfig;
use crate::graph::{ElementSet, FlowLegend};
use crate::interaction::{InteractionController, InteractionEvent};
use crate::layout::{Layout, LayoutEngine};
use crate::poller::{PollOutcome, PublishedTopology, TopologyPoller};
use crate::surface::{SurfaceEvent, SurfaceProps};
use crate::{Result, TopoviewError};

/// A positioned topology, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub revision: u64,
    pub elements: Arc<ElementSet>,
    pub layout: Arc<Layout>,
    pub published_at: DateTime<Utc>,
}

impl RenderFrame {
    pub fn legend(&self) -> FlowLegend {
        FlowLegend::from_elements(&self.elements)
    }
}

type FrameSender = watch::Sender<Option<Arc<RenderFrame>>>;

pub struct TopologyView {
    config: ViewConfig,
    poller: Arc<TopologyPoller>,
    engine: Arc<LayoutEngine>,
    animation: Arc<AnimationHandle>,
    interaction: Arc<Mutex<InteractionController>>,
    frames: Arc<FrameSender>,
    is_running: Arc<RwLock<bool>>,
    cancel: CancellationToken,
    relay: StdMutex<Option<JoinHandle<()>>>,
}

impl TopologyView {
    /// Build a view against the Kontrol API. Fails on configuration errors,
    /// which are never retried.
    pub fn from_config(config: ViewConfig) -> Result<Self> {
        config.validate()?;
        let client = TopologyClient::new(&config.api_url, config.tenant()?)?;
        Self::from_parts(config, Arc::new(client))
    }

    /// Build a view over any topology source. The tenant is not required,
    /// but intervals and grid sizes are still checked.
    pub fn from_parts(config: ViewConfig, source: Arc<dyn TopologySource>) -> Result<Self> {
        config.validate_timing()?;

        let poller = Arc::new(TopologyPoller::new(source, config.poll_interval()));
        let engine = Arc::new(LayoutEngine::new(config.layout.clone()));
        let animation = Arc::new(AnimationHandle::new(TrafficAnimationScheduler::new(
            config.animation.clone(),
        )));
        let interaction = Arc::new(Mutex::new(InteractionController::new(
            animation.clone(),
            config.interaction.clone(),
        )));
        let (frames, _) = watch::channel(None);

        Ok(Self {
            config,
            poller,
            engine,
            animation,
            interaction,
            frames: Arc::new(frames),
            is_running: Arc::new(RwLock::new(false)),
            cancel: CancellationToken::new(),
            relay: StdMutex::new(None),
        })
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Start animation, the publish relay and polling. Idempotent.
    pub async fn start(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(TopoviewError::Stopped);
        }

        let mut running = self.is_running.write().await;
        if *running {
            return Ok(());
        }
        *running = true;
        drop(running);

        self.animation.start()?;

        let mut published = self.poller.subscribe();
        let cancel = self.cancel.clone();
        let engine = self.engine.clone();
        let animation = self.animation.clone();
        let interaction = self.interaction.clone();
        let frames = self.frames.clone();

        let relay = tokio::spawn(async move {
            // A revision published by `refresh()` before start is already
            // marked seen on this receiver.
            let current = published.borrow_and_update().clone();
            if let Some(topology) = current {
                apply_published(&topology, &engine, &animation, &interaction, &frames).await;
            }

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = published.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let latest = published.borrow_and_update().clone();
                        if let Some(topology) = latest {
                            apply_published(&topology, &engine, &animation, &interaction, &frames)
                                .await;
                        }
                    }
                }
            }
        });
        if let Ok(mut slot) = self.relay.lock() {
            *slot = Some(relay);
        }

        self.poller.start().await?;
        info!(
            "[TOPOLOGY_VIEW] Started for tenant {}",
            self.config
                .tenant_id
                .map(|t| t.to_string())
                .unwrap_or_else(|| "<injected source>".to_string())
        );
        Ok(())
    }

    /// Tear down in order: polling, publish relay, animation, interaction.
    /// Idempotent; a stopped view cannot be restarted.
    pub async fn stop(&self) {
        self.poller.stop().await;

        self.cancel.cancel();
        let relay = self.relay.lock().ok().and_then(|mut slot| slot.take());
        if let Some(relay) = relay {
            if let Err(e) = relay.await {
                warn!("[TOPOLOGY_VIEW] Publish relay ended abnormally: {}", e);
            }
        }

        self.animation.stop().await;
        self.interaction.lock().await.shutdown();

        let mut running = self.is_running.write().await;
        if *running {
            *running = false;
            info!("[TOPOLOGY_VIEW] Stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Poll once, outside the timer
    pub async fn refresh(&self) -> PollOutcome {
        self.poller.poll_once().await
    }

    /// Topology revision of the latest rendered frame, 0 before the first
    pub fn revision(&self) -> u64 {
        self.frames
            .borrow()
            .as_ref()
            .map(|frame| frame.revision)
            .unwrap_or(0)
    }

    pub fn latest_frame(&self) -> Option<Arc<RenderFrame>> {
        self.frames.borrow().clone()
    }

    pub fn frames(&self) -> watch::Receiver<Option<Arc<RenderFrame>>> {
        self.frames.subscribe()
    }

    pub fn legend(&self) -> Option<FlowLegend> {
        self.latest_frame().map(|frame| frame.legend())
    }

    pub fn surface_props(&self) -> Option<SurfaceProps> {
        self.latest_frame()
            .map(|frame| SurfaceProps::new((*frame.elements).clone(), &self.config.layout))
    }

    pub async fn handle_interaction(&self, event: InteractionEvent) {
        self.interaction.lock().await.handle(event);
    }

    pub async fn surface_events(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.interaction.lock().await.subscribe()
    }

    pub fn animation_events(&self) -> broadcast::Receiver<AnimationEvent> {
        self.animation.subscribe()
    }

    pub async fn tokens(&self) -> Result<Vec<TokenFrame>> {
        self.animation.snapshot().await
    }
}

async fn apply_published(
    topology: &PublishedTopology,
    engine: &LayoutEngine,
    animation: &AnimationHandle,
    interaction: &Mutex<InteractionController>,
    frames: &FrameSender,
) {
    animation.purge();

    let elements = Arc::new(topology.elements.clone());
    let layout = Arc::new(engine.layout(&elements));
    animation.set_topology(elements.clone(), layout.clone());
    interaction.lock().await.set_elements(elements.clone());

    info!(
        "[TOPOLOGY_VIEW] Rendering revision {} ({} ranks)",
        topology.revision, layout.rank_count
    );
    frames.send_replace(Some(Arc::new(RenderFrame {
        revision: topology.revision,
        elements,
        layout,
        published_at: topology.published_at,
    })));
}
