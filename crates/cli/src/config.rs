//! Configuration management for the topoview CLI
//!
//! Handles loading and saving configuration from ~/.topoview/config.toml.
//! Precedence, lowest first: defaults, config file, environment, flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use topoview::ViewConfig;
use uuid::Uuid;

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub tenant: Option<Uuid>,
    pub interval_ms: Option<u64>,
}

/// Get the path to the config file
pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".topoview")
        .join("config.toml")
}

/// Load configuration from file, or return defaults if not found
pub fn load_from(path: &Path) -> Result<ViewConfig> {
    if !path.exists() {
        return Ok(ViewConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = ViewConfig::from_toml_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_to(config: &ViewConfig, path: &Path) -> Result<()> {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn apply_overrides(mut config: ViewConfig, overrides: &Overrides) -> ViewConfig {
    if let Some(url) = &overrides.api_url {
        config.api_url = url.clone();
    }
    if let Some(tenant) = overrides.tenant {
        config.tenant_id = Some(tenant);
    }
    if let Some(interval) = overrides.interval_ms {
        config.poll_interval_ms = interval;
    }
    config
}

/// Build the effective configuration
pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<ViewConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    let config = load_from(&path)?.with_env_overrides()?;
    Ok(apply_overrides(config, overrides))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TENANT: &str = "5e3b0d52-8a41-4c1f-9f2e-7d6c5b4a3f21";

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, ViewConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ViewConfig::default();
        config.tenant_id = Some(Uuid::parse_str(TENANT).unwrap());
        config.animation.seed = Some(3);
        save_to(&config, &path).unwrap();

        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"http://kontrol.internal:8080\"\n\n[animation]\nspawn_interval_ms = 3000\n",
        )
        .unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.api_url, "http://kontrol.internal:8080");
        assert_eq!(config.animation.spawn_interval_ms, 3000);
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_ms = \"soon\"").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_flags_win() {
        let overrides = Overrides {
            api_url: Some("http://flag:1".into()),
            tenant: Some(Uuid::parse_str(TENANT).unwrap()),
            interval_ms: Some(250),
        };
        let config = apply_overrides(ViewConfig::default(), &overrides);

        assert_eq!(config.api_url, "http://flag:1");
        assert_eq!(config.poll_interval_ms, 250);
        assert!(config.validate().is_ok());
    }
}
