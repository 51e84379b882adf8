//! Reasoning-engine client.
//!
//! Sends an operator prompt to an Ollama-compatible `/api/generate` endpoint
//! and exposes the streamed reply as a [`FragmentStream`]: one item per text
//! slice, in arrival order. Completion is signaled by the stream ending.

mod framing;
mod prompt;

use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use kubeintent_shared::{KubeIntentError, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument};
use url::Url;

pub use prompt::render_prompt;

use framing::{LineDecoder, parse_line};

/// User-Agent string for engine requests.
const USER_AGENT: &str = concat!("kubeintent/", env!("CARGO_PKG_VERSION"));

/// Ordered text fragments; an `Err` item means the stream broke.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Body of a generate request.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Client for a single reasoning engine.
#[derive(Debug, Clone)]
pub struct EngineClient {
    client: Client,
    base_url: Url,
    model: String,
}

impl EngineClient {
    /// Build a client for the engine at `base_url`, prompting `model`.
    pub fn new(base_url: Url, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| KubeIntentError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            model: model.into(),
        })
    }

    /// Send `prompt` as-is and stream back the generated fragments.
    ///
    /// Errors before the first byte (unreachable engine, non-2xx status) are
    /// [`KubeIntentError::Network`]; anything that goes wrong once streaming
    /// has started is yielded as [`KubeIntentError::StreamBroken`].
    #[instrument(skip_all, fields(model = %self.model))]
    pub async fn generate(&self, prompt: &str) -> Result<FragmentStream> {
        let url = format!("{}/api/generate", self.base_url.as_str().trim_end_matches('/'));
        info!(%url, "prompting reasoning engine");

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
            })
            .send()
            .await
            .map_err(|e| KubeIntentError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KubeIntentError::Network(format!(
                "{url}: HTTP {status}: {}",
                body.trim()
            )));
        }

        Ok(Box::pin(fragments(response)))
    }
}

/// Decode a streaming generate response into text fragments.
fn fragments(response: reqwest::Response) -> impl Stream<Item = Result<String>> + Send {
    async_stream::try_stream! {
        let mut bytes = response.bytes_stream();
        let mut decoder = LineDecoder::default();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(|e| {
                KubeIntentError::StreamBroken(format!("engine connection failed: {e}"))
            })?;
            for line in decoder.push(&chunk) {
                if let Some(fragment) = parse_line(&line)? {
                    yield fragment;
                }
            }
        }

        if let Some(rest) = decoder.finish() {
            if let Some(fragment) = parse_line(&rest)? {
                yield fragment;
            }
        }
        debug!("engine stream ended");
    }
}
