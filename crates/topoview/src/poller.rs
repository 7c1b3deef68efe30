//! Topology poller - fetch, normalize, diff, publish
//!
//! A poll moves through an explicit state machine:
//!
//! ```text
//! Idle -> Fetching -> Diffing -> Publishing -> Idle
//!             |           |
//!             +-> Idle    +-> Idle (unchanged)
//! ```
//!
//! A tick that finds a poll outside `Idle` is skipped, so fetches never
//! overlap. `Stopped` is terminal: once reached, nothing a late response
//! carries is published.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use kontrol_client::TopologySource;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::graph::{ElementSet, GraphNormalizer};
use crate::{Result, TopoviewError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Diffing,
    Publishing,
    Stopped,
}

/// An accepted topology, as handed to downstream consumers
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedTopology {
    /// Starts at 1 and increments on every publish
    pub revision: u64,
    pub elements: ElementSet,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum PollOutcome {
    Published(Arc<PublishedTopology>),
    /// The normalized topology matched the last published one
    Unchanged,
    /// The previous snapshot is retained
    Failed(TopoviewError),
    /// Another fetch was still outstanding
    Skipped,
    Cancelled,
}

struct PollerInner {
    source: Arc<dyn TopologySource>,
    state: RwLock<PollState>,
    // only the diff step writes this
    last_published: RwLock<Option<String>>,
    revision: AtomicU64,
    published: watch::Sender<Option<Arc<PublishedTopology>>>,
    cancel: CancellationToken,
}

impl PollerInner {
    async fn poll(&self) -> PollOutcome {
        {
            let mut state = self.state.write().await;
            match *state {
                PollState::Stopped => return PollOutcome::Cancelled,
                PollState::Idle => *state = PollState::Fetching,
                busy => {
                    debug!("[TOPOLOGY_POLLER] Poll in state {:?}, skipping tick", busy);
                    return PollOutcome::Skipped;
                }
            }
        }

        let outcome = self.fetch_and_diff().await;

        let mut state = self.state.write().await;
        if *state != PollState::Stopped {
            *state = PollState::Idle;
        }
        outcome
    }

    async fn fetch_and_diff(&self) -> PollOutcome {
        let fetched = tokio::select! {
            _ = self.cancel.cancelled() => return PollOutcome::Cancelled,
            result = self.source.fetch_topology() => result,
        };

        let topology = match fetched {
            Ok(topology) => topology,
            Err(e) => {
                let err = TopoviewError::from(e);
                warn!("[TOPOLOGY_POLLER] Fetch failed, keeping last snapshot: {}", err);
                return PollOutcome::Failed(err);
            }
        };

        {
            let mut state = self.state.write().await;
            if *state == PollState::Stopped {
                return PollOutcome::Cancelled;
            }
            *state = PollState::Diffing;
        }

        let elements = GraphNormalizer::normalize(&topology);
        let serialized = match elements.canonical_json() {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("[TOPOLOGY_POLLER] Could not serialize topology: {}", e);
                return PollOutcome::Failed(e.into());
            }
        };

        let mut last = self.last_published.write().await;
        if last.as_deref() == Some(serialized.as_str()) {
            debug!("[TOPOLOGY_POLLER] Topology unchanged");
            return PollOutcome::Unchanged;
        }

        // held through the publish so stop() cannot slip in between
        let mut state = self.state.write().await;
        if *state == PollState::Stopped || self.cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }
        *state = PollState::Publishing;

        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        let published = Arc::new(PublishedTopology {
            revision,
            elements,
            published_at: Utc::now(),
        });
        *last = Some(serialized);
        self.published.send_replace(Some(published.clone()));

        info!(
            "[TOPOLOGY_POLLER] Published revision {} ({} nodes, {} edges)",
            revision,
            published.elements.nodes.len(),
            published.elements.edges.len()
        );
        PollOutcome::Published(published)
    }
}

/// Periodically fetches the topology and publishes it when it changes
pub struct TopologyPoller {
    inner: Arc<PollerInner>,
    interval: Duration,
    is_running: Arc<RwLock<bool>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TopologyPoller {
    pub fn new(source: Arc<dyn TopologySource>, interval: Duration) -> Self {
        let (published, _) = watch::channel(None);
        Self {
            inner: Arc::new(PollerInner {
                source,
                state: RwLock::new(PollState::Idle),
                last_published: RwLock::new(None),
                revision: AtomicU64::new(0),
                published,
                cancel: CancellationToken::new(),
            }),
            interval,
            is_running: Arc::new(RwLock::new(false)),
            task: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the polling loop. The first poll runs immediately.
    pub async fn start(&self) -> Result<()> {
        if self.inner.cancel.is_cancelled() {
            return Err(TopoviewError::Stopped);
        }

        let mut running = self.is_running.write().await;
        if *running {
            return Ok(());
        }
        *running = true;
        drop(running);

        let inner = self.inner.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            info!(
                "[TOPOLOGY_POLLER] Started - polling every {}ms",
                period.as_millis()
            );

            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = inner.cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        inner.poll().await;
                    }
                }
            }

            info!("[TOPOLOGY_POLLER] Stopped");
        });

        if let Ok(mut slot) = self.task.lock() {
            *slot = Some(handle);
        }
        Ok(())
    }

    /// Stop polling and suppress any response still in flight. Idempotent.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        *self.inner.state.write().await = PollState::Stopped;
        *self.is_running.write().await = false;

        let task = self.task.lock().ok().and_then(|mut slot| slot.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("[TOPOLOGY_POLLER] Poll task ended abnormally: {}", e);
            }
        }
    }

    /// Run a single poll outside the timer
    pub async fn poll_once(&self) -> PollOutcome {
        self.inner.poll().await
    }

    pub async fn state(&self) -> PollState {
        *self.inner.state.read().await
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Number of publishes so far
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::SeqCst)
    }

    pub fn latest(&self) -> Option<Arc<PublishedTopology>> {
        self.inner.published.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<PublishedTopology>>> {
        self.inner.published.subscribe()
    }
}
