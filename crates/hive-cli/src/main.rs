use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hive_core::providers::AnthropicProvider;
use hive_core::{AgentRegistry, AgentStore, HandoffRunner, Hive};
use hive_mcp::{McpServer, ToolRouter};

mod config;

use config::HiveConfig;

#[derive(Parser)]
#[command(name = "hive")]
#[command(version)]
#[command(about = "Hive - a swarm of hand-off capable Claude agents served over MCP")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdin/stdout (default)
    Serve,

    /// Initialize config directory and default config
    Init,

    /// Show current configuration
    Config,

    /// List registered agents
    Agents,

    /// Send a one-shot message to the swarm
    Ask {
        /// The message to send
        message: String,

        /// Agent that should take the first turn
        #[arg(short, long)]
        agent: Option<String>,
    },

    /// Create the preset finance team
    Team {
        /// Company the specialists work for
        #[arg(long)]
        company: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout is reserved for protocol frames, so logs go to stderr
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve(&cli.config).await,
        Commands::Init => cmd_init().await,
        Commands::Config => cmd_config(&cli.config).await,
        Commands::Agents => cmd_tool(&cli.config, "list_agents", json!({})).await,
        Commands::Ask { message, agent } => {
            cmd_tool(
                &cli.config,
                "chat_with_swarm",
                json!({"message": message, "agent_name": agent}),
            )
            .await
        }
        Commands::Team { company } => {
            cmd_tool(&cli.config, "create_finance_team", json!({"company_name": company})).await
        }
    }
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config::default_config_path();
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
    } else {
        let default_config = include_str!("../../../config/default.toml");
        tokio::fs::write(&config_path, default_config).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&config_path, std::fs::Permissions::from_mode(0o600))
                .await?;
        }
        info!("Created default config at {}", config_path.display());
    }

    let data_dir = config_dir.join("data");
    tokio::fs::create_dir_all(&data_dir).await?;

    println!("Hive initialized at {}", config_dir.display());
    println!("Edit {} to configure your API key.", config_path.display());
    Ok(())
}

async fn cmd_config(config_path: &Option<PathBuf>) -> Result<()> {
    let mut cfg = HiveConfig::load(config_path)?;
    cfg.providers.anthropic.api_key = config::mask_secret(&cfg.providers.anthropic.api_key);
    println!("{}", toml::to_string_pretty(&cfg)?);
    Ok(())
}

async fn cmd_serve(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = HiveConfig::load(config_path)?;
    let hive = build_hive(&cfg)?;
    info!(
        "Starting Hive MCP server ({} agents, agents file: {})",
        hive.registry().len(),
        cfg.agents_file().display()
    );

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C");
            ctrl_c.cancel();
        }
    });

    let router = ToolRouter::with_swarm_tools(hive.registry().default_model());
    let mut server = McpServer::new(hive, router);
    server.serve_stdio(cancel).await?;
    info!("Hive stopped");

    // A pending stdin read keeps a blocking thread alive and would stall
    // runtime shutdown
    std::process::exit(0);
}

/// Run one tool against the persisted registry and print its text
async fn cmd_tool(config_path: &Option<PathBuf>, tool: &str, arguments: serde_json::Value) -> Result<()> {
    let cfg = HiveConfig::load(config_path)?;
    let mut hive = build_hive(&cfg)?;
    let router = ToolRouter::with_swarm_tools(hive.registry().default_model());

    let output = router.dispatch(&mut hive, tool, arguments).await;
    if output.is_error {
        anyhow::bail!("{}", output.text);
    }
    println!("{}", output.text);
    Ok(())
}

fn build_hive(cfg: &HiveConfig) -> Result<Hive> {
    let registry = AgentRegistry::open(AgentStore::new(cfg.agents_file()))
        .with_default_model(cfg.agent.default_model.clone());

    let anthropic = &cfg.providers.anthropic;
    if anthropic.api_key.trim().is_empty() {
        warn!("No Anthropic API key configured; chat requests will fail. Set ANTHROPIC_API_KEY.");
    }
    let provider = AnthropicProvider::new(
        anthropic.api_key.clone(),
        anthropic.base_url.clone(),
        cfg.agent.max_tokens,
    )?;
    let runner = HandoffRunner::new(Arc::new(provider), cfg.swarm.runner_config());

    Ok(Hive::new(registry, Arc::new(runner)))
}
