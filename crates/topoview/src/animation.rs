//! Traffic animation - one moving token per rendered edge
//!
//! [`TrafficAnimationScheduler`] is the synchronous core: it owns the live
//! tokens and is driven with explicit instants, which keeps it testable.
//! [`AnimationHandle`] runs it on its own task, fed by a spawn timer, a frame
//! timer and a command channel, so token state is only ever touched from
//! that one task.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use indexmap::IndexMap;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::config::AnimationConfig;
use crate::graph::ElementSet;
use crate::layout::{Layout, Position};
use crate::{Result, TopoviewError};

/// Id prefix that tells traffic tokens apart from topology nodes
pub const TRAFFIC_ID_PREFIX: &str = "traffic:";

pub fn token_id(source: &str, target: &str) -> String {
    format!("{}{}:{}", TRAFFIC_ID_PREFIX, source, target)
}

fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// An animated marker travelling along one edge
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficToken {
    /// `traffic:{source}:{target}`
    pub id: String,
    /// Id of the edge this token travels on
    pub edge_ref: String,
    pub start_pos: Position,
    pub end_pos: Position,
    pub duration: Duration,
    /// Tokens wait at `start_pos` until departure
    pub departs_at: Instant,
}

impl TrafficToken {
    pub fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    pub fn arrives_at(&self) -> Instant {
        self.departs_at + self.duration
    }

    /// Fraction of the trip covered at `now`
    pub fn progress(&self, now: Instant) -> f64 {
        if now <= self.departs_at || self.duration.is_zero() {
            return if now >= self.arrives_at() { 1.0 } else { 0.0 };
        }
        let elapsed = now.duration_since(self.departs_at).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn position_at(&self, now: Instant) -> Position {
        self.start_pos
            .lerp(self.end_pos, ease_in_out_cubic(self.progress(now)))
    }

    pub fn has_arrived(&self, now: Instant) -> bool {
        now >= self.arrives_at()
    }
}

/// Where a token is at one instant, for the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TokenFrame {
    pub id: String,
    pub edge_ref: String,
    pub position: Position,
}

/// Outcome of one spawn pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Ids of the tokens created
    pub spawned: Vec<String>,
    /// Edges skipped because their token is still in flight
    pub already_live: usize,
    /// Edges whose token could not be created
    pub failed: Vec<String>,
}

#[derive(Debug, Clone)]
struct TrafficEdge {
    edge_id: String,
    token_id: String,
    start: Option<Position>,
    end: Option<Position>,
}

/// Owner of all live traffic tokens
pub struct TrafficAnimationScheduler {
    config: AnimationConfig,
    rng: StdRng,
    edges: Vec<TrafficEdge>,
    tokens: IndexMap<String, TrafficToken>,
    paused: bool,
    cycle: u64,
}

impl TrafficAnimationScheduler {
    pub fn new(config: AnimationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng,
            edges: Vec::new(),
            tokens: IndexMap::new(),
            paused: false,
            cycle: 0,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Replace the animated edges. In-flight tokens reference positions that
    /// may have moved, so they are purged first.
    pub fn set_topology(&mut self, elements: &ElementSet, layout: &Layout) -> usize {
        let purged = self.purge();
        self.edges = elements
            .edges
            .iter()
            .map(|edge| TrafficEdge {
                edge_id: edge.data.id.clone(),
                token_id: token_id(&edge.data.source, &edge.data.target),
                start: layout.position(&edge.data.source),
                end: layout.position(&edge.data.target),
            })
            .collect();
        debug!(
            "[TRAFFIC_ANIMATION] Topology set: {} edges, {} tokens purged",
            self.edges.len(),
            purged
        );
        purged
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Remove every live token, returning how many were removed
    pub fn purge(&mut self) -> usize {
        let count = self.tokens.len();
        self.tokens.clear();
        count
    }

    /// Stop spawning and drop all live tokens immediately
    pub fn pause(&mut self) -> usize {
        self.paused = true;
        self.purge()
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of spawn passes run so far
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Create a token for every edge that has none in flight
    pub fn spawn_pass(&mut self, now: Instant) -> SpawnReport {
        let mut report = SpawnReport::default();
        if self.paused {
            return report;
        }
        self.cycle += 1;

        for idx in 0..self.edges.len() {
            if self.tokens.contains_key(&self.edges[idx].token_id) {
                report.already_live += 1;
                continue;
            }
            match self.spawn_on(idx, now) {
                Ok(id) => report.spawned.push(id),
                Err(e) => {
                    warn!("[TRAFFIC_ANIMATION] {}", e);
                    report.failed.push(self.edges[idx].edge_id.clone());
                }
            }
        }
        report
    }

    fn spawn_on(&mut self, idx: usize, now: Instant) -> Result<String> {
        let edge = &self.edges[idx];
        let (start_pos, end_pos) = match (edge.start, edge.end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(TopoviewError::Spawn {
                    edge_id: edge.edge_id.clone(),
                    reason: "endpoint has no position".to_string(),
                })
            }
        };

        let duration_ms = self.config.base_duration_ms
            + self.rng.gen_range(0..=self.config.duration_jitter_ms);
        let stagger_ms = self.rng.gen_range(0..=self.config.spawn_stagger_ms);

        let token = TrafficToken {
            id: edge.token_id.clone(),
            edge_ref: edge.edge_id.clone(),
            start_pos,
            end_pos,
            duration: Duration::from_millis(duration_ms),
            departs_at: now + Duration::from_millis(stagger_ms),
        };
        let id = token.id.clone();
        self.tokens.insert(id.clone(), token);
        Ok(id)
    }

    /// Remove tokens that reached their target, returning their ids
    pub fn retire_arrived(&mut self, now: Instant) -> Vec<String> {
        let arrived: Vec<String> = self
            .tokens
            .values()
            .filter(|t| t.has_arrived(now))
            .map(|t| t.id.clone())
            .collect();
        for id in &arrived {
            self.tokens.shift_remove(id);
        }
        arrived
    }

    pub fn live_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn token(&self, id: &str) -> Option<&TrafficToken> {
        self.tokens.get(id)
    }

    pub fn live_tokens(&self) -> impl Iterator<Item = &TrafficToken> {
        self.tokens.values()
    }

    /// Current position of every live token
    pub fn frame(&self, now: Instant) -> Vec<TokenFrame> {
        self.tokens
            .values()
            .map(|t| TokenFrame {
                id: t.id.clone(),
                edge_ref: t.edge_ref.clone(),
                position: t.position_at(now),
            })
            .collect()
    }
}

/// Pause/resume seam used by interaction handling
pub trait AnimationControl: Send + Sync {
    fn pause(&self);
    fn resume(&self);
}

/// Token lifecycle notifications for the rendering surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationEvent {
    TokenSpawned {
        id: String,
        edge_ref: String,
        start_pos: Position,
        end_pos: Position,
        duration_ms: u64,
        delay_ms: u64,
    },
    TokenRetired {
        id: String,
    },
    Purged {
        count: usize,
    },
    Paused,
    Resumed,
}

enum SchedulerCommand {
    Pause,
    Resume,
    Purge,
    Topology {
        elements: Arc<ElementSet>,
        layout: Arc<Layout>,
    },
    Snapshot(oneshot::Sender<Vec<TokenFrame>>),
}

type Pending = (
    TrafficAnimationScheduler,
    mpsc::UnboundedReceiver<SchedulerCommand>,
);

/// Handle to a scheduler driven on its own task.
///
/// Commands sent before [`AnimationHandle::start`] are queued and applied in
/// order once the task runs.
pub struct AnimationHandle {
    commands: mpsc::UnboundedSender<SchedulerCommand>,
    events: broadcast::Sender<AnimationEvent>,
    cancel: CancellationToken,
    pending: Mutex<Option<Pending>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AnimationHandle {
    pub fn new(scheduler: TrafficAnimationScheduler) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(1024);

        Self {
            commands,
            events,
            cancel: CancellationToken::new(),
            pending: Mutex::new(Some((scheduler, rx))),
            task: Mutex::new(None),
        }
    }

    /// Spawn the scheduler task. Must be called inside a tokio runtime;
    /// calling it again while running is a no-op.
    pub fn start(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(TopoviewError::Stopped);
        }
        let pending = self.pending.lock().ok().and_then(|mut slot| slot.take());
        let Some((scheduler, rx)) = pending else {
            return Ok(());
        };

        let task = tokio::spawn(run_scheduler(
            scheduler,
            rx,
            self.events.clone(),
            self.cancel.clone(),
        ));
        if let Ok(mut slot) = self.task.lock() {
            *slot = Some(task);
        }
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AnimationEvent> {
        self.events.subscribe()
    }

    pub fn purge(&self) {
        self.send(SchedulerCommand::Purge);
    }

    /// Hand a freshly laid-out topology to the scheduler
    pub fn set_topology(&self, elements: Arc<ElementSet>, layout: Arc<Layout>) {
        self.send(SchedulerCommand::Topology { elements, layout });
    }

    /// Positions of all live tokens, after every previously sent command
    pub async fn snapshot(&self) -> Result<Vec<TokenFrame>> {
        if !self.is_running() {
            return Err(TopoviewError::Stopped);
        }
        let (tx, rx) = oneshot::channel();
        if self.commands.send(SchedulerCommand::Snapshot(tx)).is_err() {
            return Err(TopoviewError::Stopped);
        }
        rx.await.map_err(|_| TopoviewError::Stopped)
    }

    pub fn is_running(&self) -> bool {
        let started = self.task.lock().map(|slot| slot.is_some()).unwrap_or(false);
        started && !self.cancel.is_cancelled()
    }

    /// Stop the scheduler task. Safe to call more than once, and terminal.
    pub async fn stop(&self) {
        self.cancel.cancel();
        if let Ok(mut pending) = self.pending.lock() {
            pending.take();
        }
        let task = self.task.lock().ok().and_then(|mut slot| slot.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("[TRAFFIC_ANIMATION] Scheduler task ended abnormally: {}", e);
            }
        }
    }

    fn send(&self, command: SchedulerCommand) {
        if self.commands.send(command).is_err() {
            debug!("[TRAFFIC_ANIMATION] Command dropped, scheduler is stopped");
        }
    }
}

impl AnimationControl for AnimationHandle {
    fn pause(&self) {
        self.send(SchedulerCommand::Pause);
    }

    fn resume(&self) {
        self.send(SchedulerCommand::Resume);
    }
}

fn emit_spawned(
    scheduler: &TrafficAnimationScheduler,
    report: &SpawnReport,
    events: &broadcast::Sender<AnimationEvent>,
    now: Instant,
) {
    for id in &report.spawned {
        if let Some(token) = scheduler.token(id) {
            let _ = events.send(AnimationEvent::TokenSpawned {
                id: token.id.clone(),
                edge_ref: token.edge_ref.clone(),
                start_pos: token.start_pos,
                end_pos: token.end_pos,
                duration_ms: token.duration_ms(),
                delay_ms: token.departs_at.saturating_duration_since(now).as_millis() as u64,
            });
        }
    }
}

async fn run_scheduler(
    mut scheduler: TrafficAnimationScheduler,
    mut commands: mpsc::UnboundedReceiver<SchedulerCommand>,
    events: broadcast::Sender<AnimationEvent>,
    cancel: CancellationToken,
) {
    let mut spawn_tick = interval(scheduler.config().spawn_interval());
    spawn_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frame_tick = interval(scheduler.config().frame_interval());
    frame_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "[TRAFFIC_ANIMATION] Started - spawning every {}ms",
        scheduler.config().spawn_interval_ms
    );

    loop {
        tokio::select! {
            // commands first: a topology swap queued before a tick must land
            // before that tick reads positions
            biased;

            _ = cancel.cancelled() => break,

            Some(command) = commands.recv() => match command {
                SchedulerCommand::Pause => {
                    let count = scheduler.pause();
                    let _ = events.send(AnimationEvent::Paused);
                    if count > 0 {
                        let _ = events.send(AnimationEvent::Purged { count });
                    }
                }
                SchedulerCommand::Resume => {
                    if scheduler.is_paused() {
                        scheduler.resume();
                        let _ = events.send(AnimationEvent::Resumed);
                        let now = Instant::now();
                        let report = scheduler.spawn_pass(now);
                        emit_spawned(&scheduler, &report, &events, now);
                        spawn_tick.reset();
                    }
                }
                SchedulerCommand::Purge => {
                    let count = scheduler.purge();
                    let _ = events.send(AnimationEvent::Purged { count });
                }
                SchedulerCommand::Topology { elements, layout } => {
                    let count = scheduler.set_topology(&elements, &layout);
                    if count > 0 {
                        let _ = events.send(AnimationEvent::Purged { count });
                    }
                }
                SchedulerCommand::Snapshot(reply) => {
                    let _ = reply.send(scheduler.frame(Instant::now()));
                }
            },

            _ = spawn_tick.tick() => {
                let now = Instant::now();
                let report = scheduler.spawn_pass(now);
                if !report.spawned.is_empty() {
                    debug!(
                        "[TRAFFIC_ANIMATION] Cycle {}: {} spawned, {} in flight, {} failed",
                        scheduler.cycle(),
                        report.spawned.len(),
                        report.already_live,
                        report.failed.len()
                    );
                }
                emit_spawned(&scheduler, &report, &events, now);
            }

            _ = frame_tick.tick() => {
                for id in scheduler.retire_arrived(Instant::now()) {
                    let _ = events.send(AnimationEvent::TokenRetired { id });
                }
            }
        }
    }

    scheduler.purge();
    info!("[TRAFFIC_ANIMATION] Stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphNormalizer;
    use crate::layout::LayoutEngine;
    use kontrol_client::{ClusterTopology, Edge, Node, NodeVersion};

    fn config() -> AnimationConfig {
        AnimationConfig {
            seed: Some(42),
            ..AnimationConfig::default()
        }
    }

    fn topology() -> ClusterTopology {
        let v = |f: &str| NodeVersion::new(f, Some("img"), f == "prod");
        ClusterTopology {
            nodes: vec![
                Node::new("gw").with_versions(vec![v("prod")]),
                Node::new("svc").with_versions(vec![v("prod"), v("dev")]),
                Node::new("db").with_versions(vec![v("prod")]),
            ],
            edges: vec![Edge::new("gw", "svc"), Edge::new("svc", "db")],
        }
    }

    fn scheduler_for(topology: &ClusterTopology) -> TrafficAnimationScheduler {
        let elements = GraphNormalizer::normalize(topology);
        let layout = LayoutEngine::default().layout(&elements);
        let mut scheduler = TrafficAnimationScheduler::new(config());
        scheduler.set_topology(&elements, &layout);
        scheduler
    }

    #[test]
    fn test_token_id_format() {
        assert_eq!(token_id("gw", "svc"), "traffic:gw:svc");
    }

    #[test]
    fn test_spawn_one_token_per_edge() {
        let mut scheduler = scheduler_for(&topology());
        let report = scheduler.spawn_pass(Instant::now());

        assert_eq!(report.spawned.len(), 2);
        assert_eq!(scheduler.live_count(), 2);
        let token = scheduler.token("traffic:gw:svc").unwrap();
        assert_eq!(token.edge_ref, "edge-gw-svc");
    }

    #[test]
    fn test_spawn_is_idempotent_within_a_cycle() {
        let mut scheduler = scheduler_for(&topology());
        let now = Instant::now();
        scheduler.spawn_pass(now);
        let second = scheduler.spawn_pass(now);

        assert!(second.spawned.is_empty());
        assert_eq!(second.already_live, 2);
        assert_eq!(scheduler.live_count(), 2);
    }

    #[test]
    fn test_pause_purges_and_blocks_spawning() {
        let mut scheduler = scheduler_for(&topology());
        let now = Instant::now();
        scheduler.spawn_pass(now);
        assert_eq!(scheduler.live_count(), 2);

        assert_eq!(scheduler.pause(), 2);
        assert_eq!(scheduler.live_count(), 0);
        assert!(scheduler.spawn_pass(now).spawned.is_empty());
        assert_eq!(scheduler.live_count(), 0);

        scheduler.resume();
        let report = scheduler.spawn_pass(now);
        assert!(report.spawned.len() <= scheduler.edge_count());
        assert_eq!(scheduler.live_count(), 2);
    }

    #[test]
    fn test_topology_change_purges_in_flight_tokens() {
        let mut scheduler = scheduler_for(&topology());
        scheduler.spawn_pass(Instant::now());

        let mut smaller = topology();
        smaller.edges.pop();
        let elements = GraphNormalizer::normalize(&smaller);
        let layout = LayoutEngine::default().layout(&elements);

        assert_eq!(scheduler.set_topology(&elements, &layout), 2);
        assert_eq!(scheduler.live_count(), 0);
        assert_eq!(scheduler.edge_count(), 1);
    }

    #[test]
    fn test_durations_within_jitter_window() {
        let mut scheduler = scheduler_for(&topology());
        let now = Instant::now();
        scheduler.spawn_pass(now);

        for token in scheduler.live_tokens() {
            assert!(token.duration_ms() >= 2000);
            assert!(token.duration_ms() <= 2500);
            assert!(token.departs_at >= now);
            assert!(token.departs_at <= now + Duration::from_millis(250));
        }
    }

    #[test]
    fn test_tokens_retire_on_arrival() {
        let mut scheduler = scheduler_for(&topology());
        let now = Instant::now();
        scheduler.spawn_pass(now);

        assert!(scheduler.retire_arrived(now).is_empty());
        let later = now + Duration::from_millis(2000 + 500 + 250);
        assert_eq!(scheduler.retire_arrived(later).len(), 2);
        assert_eq!(scheduler.live_count(), 0);

        // the next pass starts fresh tokens
        assert_eq!(scheduler.spawn_pass(later).spawned.len(), 2);
    }

    #[test]
    fn test_failing_edge_does_not_block_others() {
        let mut topology = topology();
        topology.edges.push(Edge::new("db", "decommissioned"));
        let mut scheduler = scheduler_for(&topology);

        let report = scheduler.spawn_pass(Instant::now());
        assert_eq!(report.failed, vec!["edge-db-decommissioned".to_string()]);
        assert_eq!(report.spawned.len(), 2);
    }

    #[test]
    fn test_token_moves_from_source_to_target() {
        let now = Instant::now();
        let token = TrafficToken {
            id: token_id("a", "b"),
            edge_ref: "edge-a-b".into(),
            start_pos: Position::new(0.0, 0.0),
            end_pos: Position::new(200.0, 100.0),
            duration: Duration::from_millis(2000),
            departs_at: now,
        };

        assert_eq!(token.position_at(now), token.start_pos);
        assert_eq!(
            token.position_at(now + Duration::from_millis(1000)),
            Position::new(100.0, 50.0)
        );
        assert_eq!(token.position_at(now + Duration::from_secs(5)), token.end_pos);
        assert!(token.has_arrived(now + Duration::from_millis(2000)));
    }

    #[test]
    fn test_seeded_schedulers_agree() {
        let mut a = scheduler_for(&topology());
        let mut b = scheduler_for(&topology());
        let now = Instant::now();
        a.spawn_pass(now);
        b.spawn_pass(now);

        let a: Vec<_> = a.live_tokens().map(|t| t.duration).collect();
        let b: Vec<_> = b.live_tokens().map(|t| t.duration).collect();
        assert_eq!(a, b);
    }

    fn frame_inputs() -> (Arc<ElementSet>, Arc<Layout>) {
        let elements = GraphNormalizer::normalize(&topology());
        let layout = LayoutEngine::default().layout(&elements);
        (Arc::new(elements), Arc::new(layout))
    }

    fn started(config: AnimationConfig) -> AnimationHandle {
        let handle = AnimationHandle::new(TrafficAnimationScheduler::new(config));
        handle.start().unwrap();
        let (elements, layout) = frame_inputs();
        handle.set_topology(elements, layout);
        handle
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_spawns_on_first_tick() {
        let handle = started(config());

        // the topology command lands before the first tick
        assert!(handle.snapshot().await.unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.snapshot().await.unwrap().len(), 2);

        tokio::time::sleep(Duration::from_millis(2600)).await;
        assert!(handle.snapshot().await.unwrap().len() <= 2);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_pause_clears_then_resume_respawns() {
        let handle = started(config());
        let mut events = handle.subscribe();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.snapshot().await.unwrap().len(), 2);

        handle.pause();
        assert!(handle.snapshot().await.unwrap().is_empty());

        // paused ticks spawn nothing
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(handle.snapshot().await.unwrap().is_empty());

        handle.resume();
        assert_eq!(handle.snapshot().await.unwrap().len(), 2);

        let mut saw_pause = false;
        while let Ok(event) = events.try_recv() {
            if event == AnimationEvent::Paused {
                saw_pause = true;
            }
        }
        assert!(saw_pause);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_retires_tokens() {
        let handle = started(AnimationConfig {
            spawn_interval_ms: 10_000,
            ..config()
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.snapshot().await.unwrap().len(), 2);

        // past the longest possible trip, before the next spawn tick
        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert!(handle.snapshot().await.unwrap().is_empty());

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_snapshot_before_start_fails() {
        let handle = AnimationHandle::new(TrafficAnimationScheduler::new(config()));
        assert!(matches!(handle.snapshot().await, Err(TopoviewError::Stopped)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_stop_is_idempotent() {
        let handle = AnimationHandle::new(TrafficAnimationScheduler::new(config()));
        handle.start().unwrap();
        handle.stop().await;
        handle.stop().await;

        assert!(!handle.is_running());
        assert!(handle.snapshot().await.is_err());
    }
}
