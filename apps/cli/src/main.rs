//! kubeintent CLI: the agent server and the prompt bridge.
//!
//! `serve` runs the agent that validates intent documents and applies them
//! to a cluster; `prompt` asks a reasoning engine for a document and
//! forwards it to the agent.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
