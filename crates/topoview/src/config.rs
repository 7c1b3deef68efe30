//! Configuration for the topology view

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::{Result, TopoviewError};

/// Environment variable overriding the API base URL
pub const ENV_API_URL: &str = "KONTROL_API_URL";
/// Environment variable providing the tenant id
pub const ENV_TENANT_ID: &str = "KARDINAL_TENANT_ID";

/// Traffic animation timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Shortest travel time of a token along an edge
    pub base_duration_ms: u64,
    /// Random extra travel time, drawn per token from `0..=duration_jitter_ms`
    pub duration_jitter_ms: u64,
    /// Period of the spawn pass
    pub spawn_interval_ms: u64,
    /// Random per-edge start offset so edges do not pulse in sync
    pub spawn_stagger_ms: u64,
    /// How often arrived tokens are retired
    pub frame_interval_ms: u64,
    /// Fixed RNG seed for reproducible animation
    pub seed: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            base_duration_ms: 2000,
            duration_jitter_ms: 500,
            spawn_interval_ms: 2500,
            spawn_stagger_ms: 250,
            frame_interval_ms: 50,
            seed: None,
        }
    }
}

impl AnimationConfig {
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Layered layout geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between neighbouring nodes of one rank
    pub node_sep: f64,
    /// Gap between ranks
    pub rank_sep: f64,
    pub node_height: f64,
    pub label_char_width: f64,
    pub label_padding: f64,
    /// Vertical bucket size positions are snapped to
    pub vertical_grid: f64,
    /// Horizontal bucket size positions are snapped to
    pub horizontal_grid: f64,
    /// Barycenter ordering passes (each pass sweeps down and back up)
    pub ordering_sweeps: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_sep: 50.0,
            rank_sep: 70.0,
            node_height: 48.0,
            label_char_width: 8.0,
            label_padding: 72.0,
            vertical_grid: 100.0,
            horizontal_grid: 10.0,
            ordering_sweeps: 4,
        }
    }
}

impl LayoutConfig {
    /// Width of the box drawn for a node with this label
    pub fn node_width(&self, label: &str) -> f64 {
        label.chars().count() as f64 * self.label_char_width + self.label_padding
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Delay between pointer release and animation resume
    pub resume_grace_ms: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self { resume_grace_ms: 0 }
    }
}

impl InteractionConfig {
    pub fn resume_grace(&self) -> Duration {
        Duration::from_millis(self.resume_grace_ms)
    }
}

/// Core configuration for a topology view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Base URL of the Kontrol API
    pub api_url: String,
    /// Tenant whose topology is shown
    pub tenant_id: Option<Uuid>,
    /// Topology polling period
    pub poll_interval_ms: u64,
    pub animation: AnimationConfig,
    pub layout: LayoutConfig,
    pub interaction: InteractionConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            api_url: kontrol_client::DEFAULT_KONTROL_API_URL.to_string(),
            tenant_id: None,
            poll_interval_ms: 1000,
            animation: AnimationConfig::default(),
            layout: LayoutConfig::default(),
            interaction: InteractionConfig::default(),
        }
    }
}

impl ViewConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TopoviewError::Configuration(e.to_string()))
    }

    /// Apply `KONTROL_API_URL` and `KARDINAL_TENANT_ID` from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(raw) = lookup(ENV_TENANT_ID).filter(|t| !t.trim().is_empty()) {
            let tenant = Uuid::parse_str(raw.trim()).map_err(|e| {
                TopoviewError::Configuration(format!("invalid {}: {}", ENV_TENANT_ID, e))
            })?;
            self.tenant_id = Some(tenant);
        }
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The tenant, or the configuration error that makes the view unusable
    pub fn tenant(&self) -> Result<Uuid> {
        self.tenant_id
            .ok_or_else(|| TopoviewError::Configuration("Invalid or missing tenant UUID".into()))
    }

    /// Reject configurations the view cannot run with
    pub fn validate(&self) -> Result<()> {
        self.tenant()?;

        if self.api_url.trim().is_empty() {
            return Err(TopoviewError::Configuration("api_url is empty".into()));
        }
        self.validate_timing()
    }

    /// Checks that do not depend on where the topology comes from: timer
    /// intervals and layout grid
    pub fn validate_timing(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(TopoviewError::Configuration(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.animation.spawn_interval_ms == 0 || self.animation.frame_interval_ms == 0 {
            return Err(TopoviewError::Configuration(
                "animation intervals must be greater than zero".into(),
            ));
        }
        if self.layout.vertical_grid <= 0.0 || self.layout.horizontal_grid <= 0.0 {
            return Err(TopoviewError::Configuration(
                "layout grid sizes must be positive".into(),
            ));
        }
        Ok(())
    }
}
