//! Fragment assembler.
//!
//! Rebuilds one complete document from the text fragments streamed back by
//! the reasoning engine. Fragments are appended verbatim in arrival order;
//! judging the result is left to the validator.

use futures_util::{Stream, StreamExt, pin_mut};
use tracing::{debug, warn};

use kubeintent_shared::{KubeIntentError, Result};

/// Accumulates fragments for exactly one stream.
///
/// [`finish`](Self::finish) consumes the assembler, so a buffer can never be
/// reused for a second stream. Dropping it without calling `finish`
/// discards everything fed so far.
#[derive(Debug, Default)]
pub struct FragmentAssembler {
    buffer: String,
    fragments: usize,
}

impl FragmentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `fragment` to the buffer.
    pub fn feed(&mut self, fragment: &str) {
        self.buffer.push_str(fragment);
        self.fragments += 1;
    }

    /// Number of fragments fed so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Bytes buffered so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Hand off the completed document.
    pub fn finish(self) -> String {
        debug!(fragments = self.fragments, bytes = self.buffer.len(), "document assembled");
        self.buffer
    }
}

/// Drain `fragments` into a fresh assembler and return the document.
///
/// `observe` sees the assembler after every fragment (progress reporting).
/// If the stream yields an error, the partial buffer is dropped and
/// [`KubeIntentError::StreamBroken`] is returned; no document is produced.
pub async fn assemble<S, F>(fragments: S, mut observe: F) -> Result<String>
where
    S: Stream<Item = Result<String>>,
    F: FnMut(&FragmentAssembler),
{
    pin_mut!(fragments);
    let mut assembler = FragmentAssembler::new();

    while let Some(fragment) = fragments.next().await {
        match fragment {
            Ok(fragment) => {
                assembler.feed(&fragment);
                observe(&assembler);
            }
            Err(err) => {
                warn!(
                    fragments = assembler.fragment_count(),
                    bytes = assembler.len(),
                    error = %err,
                    "fragment stream broke, discarding partial document"
                );
                return Err(match err {
                    KubeIntentError::StreamBroken(_) => err,
                    other => KubeIntentError::StreamBroken(other.to_string()),
                });
            }
        }
    }

    Ok(assembler.finish())
}
