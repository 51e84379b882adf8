//! Newline-delimited JSON framing for the engine's streamed reply.
//!
//! The engine writes one JSON object per line. Network chunks do not line up
//! with object boundaries, so bytes are buffered until a full line is
//! available.

use serde::Deserialize;

use kubeintent_shared::{KubeIntentError, Result};

/// One line of the engine's generate stream.
#[derive(Debug, Deserialize)]
struct GenerateChunk {
    /// Incremental slice of the generated text.
    #[serde(default)]
    response: Option<String>,
    /// Engine-side failure reported mid-stream.
    #[serde(default)]
    error: Option<String>,
}

/// Splits a byte stream into complete lines.
#[derive(Debug, Default)]
pub(crate) struct LineDecoder {
    pending: Vec<u8>,
    /// Prefix of `pending` already known to hold no newline.
    scanned: usize,
}

impl LineDecoder {
    /// Append `bytes` and drain every complete line.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(offset) = self.pending[self.scanned..].iter().position(|b| *b == b'\n') {
            let pos = self.scanned + offset;
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
            self.scanned = 0;
        }
        self.scanned = self.pending.len();
        lines
    }

    /// Whatever is left after the last newline, if anything.
    pub(crate) fn finish(self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }
}

/// Extract the text fragment carried by one stream line.
///
/// Blank lines and lines without a `response` field yield `None`.
pub(crate) fn parse_line(line: &str) -> Result<Option<String>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let chunk: GenerateChunk = serde_json::from_str(line).map_err(|e| {
        KubeIntentError::StreamBroken(format!(
            "undecodable stream line: {e} (got: {})",
            line.chars().take(200).collect::<String>()
        ))
    })?;

    if let Some(error) = chunk.error {
        return Err(KubeIntentError::StreamBroken(format!("engine error: {error}")));
    }

    Ok(chunk.response)
}
