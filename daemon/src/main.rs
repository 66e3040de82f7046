//! VeriTag daemon - entry point for running a verification node.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use veritag_node::{init_logging, NodeConfig, ShutdownController, VeritagNode, VerifyCommand};
use veritag_rpc::{ApiState, RpcServer};
use veritag_types::VerificationRequest;

#[derive(Parser)]
#[command(name = "veritag-daemon", about = "VeriTag product verification node")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "VERITAG_CONFIG")]
    config: Option<PathBuf>,

    /// Address the HTTP API listens on.
    #[arg(long, env = "VERITAG_BIND_ADDR")]
    bind_addr: Option<String>,

    /// Base URL of the ledger gateway.
    #[arg(long, env = "VERITAG_LEDGER_URL")]
    ledger_url: Option<String>,

    /// Base URL of the content store.
    #[arg(long, env = "VERITAG_CONTENT_STORE_URL")]
    content_store_url: Option<String>,

    /// JSON file with the products and manufacturers to serve.
    #[arg(long, env = "VERITAG_REGISTRY_SEED")]
    registry_seed: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VERITAG_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VERITAG_LOG_FORMAT")]
    log_format: Option<String>,

    /// Do not write verdicts to the ledger.
    #[arg(long, env = "VERITAG_NO_ANCHOR")]
    no_anchor: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve the HTTP API until SIGINT/SIGTERM.
    Serve,

    /// Verify a single scan and print the response as JSON.
    Verify {
        #[arg(long)]
        product_id: u64,

        /// Hex SHA-256 of the scanned QR code.
        #[arg(long)]
        qr: String,

        #[arg(long)]
        content_hash: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    fn node_config(&self) -> anyhow::Result<NodeConfig> {
        let base = match &self.config {
            Some(path) => {
                let path = path.to_string_lossy();
                NodeConfig::from_toml_file(&path)
                    .with_context(|| format!("failed to load config from {path}"))?
            }
            None => NodeConfig::default(),
        };

        let config = NodeConfig {
            bind_addr: self.bind_addr.clone().unwrap_or(base.bind_addr),
            ledger_url: self.ledger_url.clone().or(base.ledger_url),
            content_store_url: self.content_store_url.clone().or(base.content_store_url),
            registry_seed: self.registry_seed.clone().or(base.registry_seed),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            log_format: self.log_format.clone().unwrap_or(base.log_format),
            anchor_on_ledger: base.anchor_on_ledger && !self.no_anchor,
            ..base
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.node_config()?;

    match cli.command {
        Command::Config => print!("{}", config.to_toml_string()?),
        Command::Serve => serve(start_node(config)?).await?,
        Command::Verify {
            product_id,
            qr,
            content_hash,
            location,
            notes,
        } => {
            let node = start_node(config)?;
            let response = node
                .service
                .verify(VerifyCommand {
                    request: VerificationRequest {
                        product_id: Some(product_id),
                        claimed_qr_hash: qr,
                        claimed_content_hash: content_hash,
                        location,
                        notes,
                    },
                    verifier_id: None,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn start_node(config: NodeConfig) -> anyhow::Result<VeritagNode> {
    init_logging(config.log_format()?, &config.log_level)?;
    VeritagNode::new(config).context("failed to start node")
}

async fn serve(node: VeritagNode) -> anyhow::Result<()> {
    let shutdown = ShutdownController::new();
    let signals = shutdown.clone();
    tokio::spawn(async move { signals.wait_for_signal().await });

    tracing::info!(
        bind = %node.config.bind_addr,
        ledger = node.config.ledger_url.as_deref().unwrap_or("off"),
        content_store = node.config.content_store_url.as_deref().unwrap_or("off"),
        metrics = node.config.enable_metrics,
        "starting VeriTag node"
    );
    let state = ApiState::for_node(&node, shutdown);
    RpcServer::new(node.config.bind_addr.clone())
        .start(state)
        .await?;

    tracing::info!("VeriTag daemon exited cleanly");
    Ok(())
}
