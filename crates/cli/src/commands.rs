//! CLI subcommand handlers

use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use kontrol_client::TopologyClient;
use serde::Serialize;
use topoview::{
    ElementSet, FlowLegend, GraphNormalizer, Layout, LayoutEngine, TopologyView, ViewConfig,
};
use tracing::debug;

use crate::{config, output::OutputHandler};

/// How often `watch` prints the traffic summary
const TRAFFIC_SUMMARY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct PositionedSnapshot<'a> {
    elements: &'a ElementSet,
    layout: &'a Layout,
}

async fn fetch_elements(config: &ViewConfig) -> Result<ElementSet> {
    config.validate()?;
    let client = TopologyClient::new(&config.api_url, config.tenant()?)?;
    let topology = client
        .get_topology()
        .await
        .with_context(|| format!("Failed to fetch topology from {}", client.topology_url()))?;
    Ok(GraphNormalizer::normalize(&topology))
}

/// Run the live view until Ctrl-C
pub async fn watch(config: ViewConfig, show_positions: bool) -> Result<()> {
    let output = OutputHandler::new(show_positions);
    let view = TopologyView::from_config(config)?;
    let mut frames = view.frames();

    view.start().await?;
    output.print_success(&format!(
        "Watching {} (Ctrl-C to stop)",
        view.config().api_url
    ));

    let mut summary = tokio::time::interval(TRAFFIC_SUMMARY_INTERVAL);
    summary.tick().await;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = frames.borrow_and_update().clone();
                if let Some(frame) = frame {
                    output.print_frame(&frame);
                    output.print_legend(&frame.legend());
                }
            }
            _ = summary.tick() => {
                let edges = view
                    .latest_frame()
                    .map(|frame| frame.elements.edges.len())
                    .unwrap_or(0);
                match view.tokens().await {
                    Ok(tokens) => output.print_traffic(tokens.len(), edges),
                    Err(e) => debug!("Traffic summary unavailable: {}", e),
                }
            }
        }
    }

    println!();
    output.print_info("Stopping...");
    view.stop().await;
    Ok(())
}

/// Fetch once and print the normalized elements
pub async fn snapshot(config: ViewConfig, with_layout: bool) -> Result<()> {
    let elements = fetch_elements(&config).await?;

    let json = if with_layout {
        let layout = LayoutEngine::new(config.layout.clone()).layout(&elements);
        serde_json::to_string_pretty(&PositionedSnapshot {
            elements: &elements,
            layout: &layout,
        })?
    } else {
        elements.canonical_json()?
    };
    println!("{}", json);
    Ok(())
}

/// Fetch once and print the flow legend
pub async fn legend(config: ViewConfig) -> Result<()> {
    let output = OutputHandler::new(false);
    let elements = fetch_elements(&config).await?;

    output.print_header("Flows");
    output.print_legend(&FlowLegend::from_elements(&elements));
    Ok(())
}

/// Show the effective configuration
pub fn show_config(config: &ViewConfig) -> Result<()> {
    let output = OutputHandler::new(false);
    output.print_header("Configuration");

    println!("  {} {}", "File:".dimmed(), config::config_path().display());
    if let Err(e) = config.validate() {
        output.print_warning(&e.to_string());
    }
    println!();
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Write the effective configuration to the config file
pub fn save_config(config: &ViewConfig) -> Result<()> {
    let path = config::config_path();
    config::save_to(config, &path)?;
    OutputHandler::new(false).print_success(&format!("Saved {}", path.display()));
    Ok(())
}
