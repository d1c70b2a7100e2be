//! claw-logd - Clawbernetes log node
//!
//! Serves this node's logs to the rest of the cluster and fetches logs from
//! any registered node.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use claw_logfetch::{FetchOptions, LogNode, NodeConfig, DEFAULT_CONFIG_PATH};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "claw-logd")]
#[command(about = "Clawbernetes log node")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve this node's logs to the cluster
    Serve {
        /// Path to config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Fetch one log from a node and print it
    Fetch {
        /// Path to config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Node to read from: `self` or `host:port`
        #[arg(long, default_value = "self")]
        node: String,

        /// Log category (trace, debug, info, warn, error, fatal, httpd, stdout, stderr)
        #[arg(long)]
        name: Option<String>,

        /// Seconds to wait for a remote node
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Generate a sample config file
    InitConfig {
        /// Path to write config
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("claw_logfetch=info".parse()?)
                .add_directive("claw_logd=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config).await?,
        Commands::Fetch {
            config,
            node,
            name,
            timeout,
        } => fetch(config, &node, name.as_deref(), timeout).await?,
        Commands::InitConfig { output } => init_config(&output)?,
    }

    Ok(())
}

async fn serve(config_path: PathBuf) -> anyhow::Result<()> {
    info!(config = %config_path.display(), "starting claw-logd");

    let config = NodeConfig::load(&config_path)?;
    let node = LogNode::from_config(config)?;

    tokio::select! {
        result = node.run() => {
            if let Err(e) = &result {
                error!(error = %e, "task server failed");
            }
            result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("interrupt received");
            node.shutdown();
        }
    }

    Ok(())
}

async fn fetch(
    config_path: PathBuf,
    target: &str,
    name: Option<&str>,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    let config = NodeConfig::load(&config_path)?;
    let node = LogNode::from_config(config)?;

    let mut options = FetchOptions::new();
    if let Some(secs) = timeout {
        options = options.with_deadline(Duration::from_secs(secs));
    }

    match node.service().fetch_with(target, name, &options).await {
        Ok(response) => {
            print!("{}", response.log);
            Ok(())
        }
        Err(e) => {
            error!(node = %target, status = e.status_code(), error = %e, "fetch failed");
            Err(e.into())
        }
    }
}

fn init_config(output: &std::path::Path) -> anyhow::Result<()> {
    let config = NodeConfig::sample();
    config.save(output)?;

    println!("Config written to {}", output.display());
    println!();
    println!("Add the cluster's members, then run:");
    println!("  claw-logd serve --config {}", output.display());

    Ok(())
}
