//! Topoview CLI - Live Service-Mesh Topology in the Terminal
//!
//! Runs the topology view engine against a Kontrol API and prints each
//! published revision, its flows and a running traffic summary.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::output::OutputHandler;

/// Topoview - live service-mesh topology view
#[derive(Parser)]
#[command(name = "topoview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Watch a live service-mesh topology and the flows deployed on it")]
#[command(long_about = r#"
Topoview polls the Kontrol API for a tenant's cluster topology and keeps a
normalized, laid-out picture of it, publishing only when something changed.

Examples:
  topoview --tenant <uuid>                 # Watch the topology live
  topoview snapshot --layout               # Print normalized elements with positions
  topoview legend                          # Print the deployed flows
  topoview config --show                   # Print the effective configuration
"#)]
struct Cli {
    /// Kontrol API base URL
    #[arg(long, env = "KONTROL_API_URL")]
    api_url: Option<String>,

    /// Tenant UUID
    #[arg(short, long, env = "KARDINAL_TENANT_ID")]
    tenant: Option<Uuid>,

    /// Polling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Config file (defaults to ~/.topoview/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the topology live (default)
    Watch {
        /// Print node positions with each revision
        #[arg(long)]
        positions: bool,
    },

    /// Fetch once and print the normalized elements as JSON
    Snapshot {
        /// Include layout positions
        #[arg(long)]
        layout: bool,
    },

    /// Fetch once and print the flow legend
    Legend,

    /// Configuration management
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Save the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        OutputHandler::new(false).print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "topoview={},kontrol_client={},topoview_cli={},warn",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let overrides = config::Overrides {
        api_url: cli.api_url,
        tenant: cli.tenant,
        interval_ms: cli.interval_ms,
    };
    let config = config::resolve(cli.config.as_deref(), &overrides)?;

    match cli.command.unwrap_or(Commands::Watch { positions: false }) {
        Commands::Watch { positions } => commands::watch(config, positions).await?,
        Commands::Snapshot { layout } => commands::snapshot(config, layout).await?,
        Commands::Legend => commands::legend(config).await?,
        Commands::Config { show, save } => {
            if save {
                commands::save_config(&config)?;
            }
            if show || !save {
                commands::show_config(&config)?;
            }
        }
    }

    Ok(())
}
