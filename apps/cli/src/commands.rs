//! CLI command definitions, routing, and tracing setup.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use kubeintent_cluster::{KubeGateway, MemoryGateway};
use kubeintent_core::{BridgeOutcome, BridgeProgress, run_bridge};
use kubeintent_server::AppState;
use kubeintent_shared::{
    AppConfig, BridgeConfig, ClusterGateway, init_config, load_config, parse_url,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// kubeintent: turn operator intent into cluster actions.
#[derive(Parser)]
#[command(
    name = "kubeintent",
    version,
    about = "Turn free-form operator intent into validated, idempotent deployment changes.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the agent: accept intent documents and apply them to the cluster.
    Serve {
        /// Address to listen on (overrides server.bind).
        #[arg(long)]
        bind: Option<String>,

        /// Keep workloads in memory instead of talking to a cluster.
        #[arg(long)]
        in_memory: bool,
    },

    /// Ask the reasoning engine for an intent and forward it to the agent.
    Prompt {
        /// What you want done, in plain words.
        text: String,

        /// Reasoning engine base URL (overrides engine.url).
        #[arg(long)]
        engine_url: Option<String>,

        /// Model to prompt (overrides engine.model).
        #[arg(long)]
        model: Option<String>,

        /// Agent base URL (overrides agent.url).
        #[arg(long)]
        agent_url: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "kubeintent=info,kubeintent_core=info,kubeintent_server=info,kubeintent_cluster=info,kubeintent_engine=info",
        1 => "kubeintent=debug,kubeintent_core=debug,kubeintent_server=debug,kubeintent_cluster=debug,kubeintent_engine=debug",
        _ => "kubeintent=trace,kubeintent_core=trace,kubeintent_server=trace,kubeintent_cluster=trace,kubeintent_engine=trace,kubeintent_shared=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { bind, in_memory } => cmd_serve(bind, in_memory).await,
        Command::Prompt {
            text,
            engine_url,
            model,
            agent_url,
        } => cmd_prompt(&text, engine_url, model, agent_url).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_serve(bind: Option<String>, in_memory: bool) -> Result<()> {
    let config = load_config()?;
    let bind = bind.unwrap_or(config.server.bind);

    let gateway: Arc<dyn ClusterGateway> = if in_memory {
        info!("using in-memory gateway, no cluster changes will be made");
        Arc::new(MemoryGateway::new())
    } else {
        Arc::new(KubeGateway::new(config.cluster))
    };

    kubeintent_server::serve(&bind, AppState::new(gateway)).await?;
    Ok(())
}

async fn cmd_prompt(
    text: &str,
    engine_url: Option<String>,
    model: Option<String>,
    agent_url: Option<String>,
) -> Result<()> {
    if text.trim().is_empty() {
        return Err(eyre!("prompt text must not be empty"));
    }

    let config = bridge_config(&load_config()?, engine_url, model, agent_url)?;
    info!(engine = %config.engine_url, agent = %config.agent_url, "running bridge");

    let reporter = CliProgress::new();
    let outcome = run_bridge(&config, text, &reporter).await;
    reporter.spinner.finish_and_clear();
    let outcome = outcome?;

    println!();
    println!("  Document:");
    println!("    {}", outcome.document);
    println!("  Agent:    HTTP {}", outcome.status);
    println!("    {}", outcome.body.trim());
    println!("  Time:     {:.1}s", outcome.elapsed.as_secs_f64());
    println!();

    if !(200..300).contains(&outcome.status) {
        return Err(eyre!("agent rejected the document (HTTP {})", outcome.status));
    }
    Ok(())
}

/// Resolve bridge settings: flags win over the config file.
fn bridge_config(
    config: &AppConfig,
    engine_url: Option<String>,
    model: Option<String>,
    agent_url: Option<String>,
) -> Result<BridgeConfig> {
    let mut bridge = BridgeConfig::try_from(config)?;
    if let Some(url) = engine_url {
        bridge.engine_url = parse_url("--engine-url", &url)?;
    }
    if let Some(model) = model {
        bridge.model = model;
    }
    if let Some(url) = agent_url {
        bridge.agent_url = parse_url("--agent-url", &url)?;
    }
    Ok(bridge)
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl BridgeProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn fragment_received(&self, fragments: usize, bytes: usize) {
        self.spinner
            .set_message(format!("Assembling document ({fragments} fragments, {bytes} bytes)"));
    }

    fn done(&self, outcome: &BridgeOutcome) {
        self.spinner
            .set_message(format!("Agent answered HTTP {}", outcome.status));
    }
}
