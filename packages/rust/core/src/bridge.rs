//! Bridge driver: operator prompt → reasoning engine → assembled document → agent.

use std::time::{Duration, Instant};

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, instrument};
use url::Url;

use kubeintent_engine::{EngineClient, render_prompt};
use kubeintent_shared::{BridgeConfig, KubeIntentError, Result};

use crate::assembler::{self, FragmentAssembler};

/// Result of one bridge run.
#[derive(Debug)]
pub struct BridgeOutcome {
    /// The document exactly as it was forwarded.
    pub document: String,
    /// HTTP status returned by the agent.
    pub status: u16,
    /// Response body returned by the agent.
    pub body: String,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting bridge status.
pub trait BridgeProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each fragment is appended.
    fn fragment_received(&self, fragments: usize, bytes: usize);
    /// Called when the agent has answered.
    fn done(&self, outcome: &BridgeOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentBridgeProgress;

impl BridgeProgress for SilentBridgeProgress {
    fn phase(&self, _name: &str) {}
    fn fragment_received(&self, _fragments: usize, _bytes: usize) {}
    fn done(&self, _outcome: &BridgeOutcome) {}
}

/// Run the bridge once.
///
/// 1. Render the instruction template around `prompt`
/// 2. Stream the engine's reply into a fresh [`FragmentAssembler`]
/// 3. POST the assembled document verbatim to `<agent>/apply`
///
/// A broken stream returns [`KubeIntentError::StreamBroken`] and forwards
/// nothing. Non-2xx agent responses are not errors; they are reported in
/// the outcome.
#[instrument(skip_all, fields(engine = %config.engine_url, model = %config.model))]
pub async fn run_bridge(
    config: &BridgeConfig,
    prompt: &str,
    progress: &dyn BridgeProgress,
) -> Result<BridgeOutcome> {
    let start = Instant::now();
    let engine = EngineClient::new(config.engine_url.clone(), config.model.clone())?;

    // --- Phase 1: Generate ---
    progress.phase("Prompting reasoning engine");
    let fragments = engine.generate(&render_prompt(prompt)).await?;

    // --- Phase 2: Assemble ---
    progress.phase("Assembling document");
    let document = assembler::assemble(fragments, |a: &FragmentAssembler| {
        progress.fragment_received(a.fragment_count(), a.len())
    })
    .await?;
    info!(%document, "engine output");

    // --- Phase 3: Forward ---
    progress.phase("Forwarding to agent");
    let (status, body) = forward(&config.agent_url, &document).await?;
    info!(status, %body, "agent response");

    let outcome = BridgeOutcome {
        document,
        status,
        body,
        elapsed: start.elapsed(),
    };
    progress.done(&outcome);
    Ok(outcome)
}

/// POST `document` to the agent's `/apply` and return its status and body.
pub async fn forward(agent_url: &Url, document: &str) -> Result<(u16, String)> {
    let url = format!("{}/apply", agent_url.as_str().trim_end_matches('/'));

    let response = Client::new()
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .body(document.to_string())
        .send()
        .await
        .map_err(|e| KubeIntentError::Network(format!("agent request to {url} failed: {e}")))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| KubeIntentError::Network(format!("failed to read agent response: {e}")))?;
    Ok((status, body))
}
