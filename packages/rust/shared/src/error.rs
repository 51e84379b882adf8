//! Error types for kubeintent.
//!
//! Library crates use [`KubeIntentError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use crate::types::CauseKind;

/// Top-level error type for all kubeintent operations.
#[derive(Debug, thiserror::Error)]
pub enum KubeIntentError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Network/HTTP error talking to the reasoning engine or the agent.
    #[error("network error: {0}")]
    Network(String),

    /// The fragment stream ended or errored before a document was assembled.
    #[error("stream broken: {0}")]
    StreamBroken(String),

    /// The request body is not a structured document.
    #[error("malformed document: {message}")]
    MalformedDocument { message: String },

    /// `action` is missing or not one of `create`, `delete`.
    #[error("unrecognized action: {message}")]
    UnrecognizedAction { message: String },

    /// `resource_type` is not the supported workload kind.
    #[error("unsupported resource kind '{kind}'")]
    UnsupportedResourceKind { kind: String },

    /// The `spec` block is missing required fields or carries invalid values.
    #[error("invalid spec: {message}")]
    InvalidSpec { message: String },

    /// The gateway reports that the targeted workload does not exist.
    #[error("deployment {namespace}/{name} not found")]
    NotFound { name: String, namespace: String },

    /// The cluster mutation or session setup failed.
    #[error("{0}")]
    Gateway(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KubeIntentError>;

impl KubeIntentError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-document rejection.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: msg.into(),
        }
    }

    /// Create an unrecognized-action rejection.
    pub fn unrecognized_action(msg: impl Into<String>) -> Self {
        Self::UnrecognizedAction {
            message: msg.into(),
        }
    }

    /// Create an invalid-spec rejection.
    pub fn invalid_spec(msg: impl Into<String>) -> Self {
        Self::InvalidSpec {
            message: msg.into(),
        }
    }

    /// Create a gateway failure from any displayable message.
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors raised while validating an inbound document.
    pub fn is_rejection(&self) -> bool {
        self.cause_kind().is_some_and(|cause| cause.is_rejection())
    }

    /// Classify the error for the response envelope.
    ///
    /// Returns `None` for local errors (config, I/O) that never reach a
    /// request/response exchange.
    pub fn cause_kind(&self) -> Option<CauseKind> {
        match self {
            Self::StreamBroken(_) => Some(CauseKind::StreamBroken),
            Self::MalformedDocument { .. } => Some(CauseKind::MalformedDocument),
            Self::UnrecognizedAction { .. } => Some(CauseKind::UnrecognizedAction),
            Self::UnsupportedResourceKind { .. } => Some(CauseKind::UnsupportedResourceKind),
            Self::InvalidSpec { .. } => Some(CauseKind::InvalidSpec),
            Self::NotFound { .. } | Self::Gateway(_) => Some(CauseKind::GatewayFailure),
            Self::Config { .. } | Self::Io { .. } | Self::Network(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = KubeIntentError::config("missing bind address");
        assert_eq!(err.to_string(), "config error: missing bind address");

        let err = KubeIntentError::UnsupportedResourceKind {
            kind: "statefulset".into(),
        };
        assert_eq!(err.to_string(), "unsupported resource kind 'statefulset'");

        let err = KubeIntentError::NotFound {
            name: "nginx-app".into(),
            namespace: "default".into(),
        };
        assert_eq!(err.to_string(), "deployment default/nginx-app not found");
    }

    #[test]
    fn gateway_message_passes_through() {
        let err = KubeIntentError::gateway("deployments.apps is forbidden");
        assert_eq!(err.to_string(), "deployments.apps is forbidden");
        assert_eq!(err.cause_kind(), Some(CauseKind::GatewayFailure));
    }

    #[test]
    fn rejections_are_classified() {
        assert!(KubeIntentError::malformed("eof").is_rejection());
        assert!(KubeIntentError::unrecognized_action("scale").is_rejection());
        assert!(KubeIntentError::invalid_spec("name is empty").is_rejection());
        assert!(!KubeIntentError::gateway("boom").is_rejection());
        assert!(!KubeIntentError::StreamBroken("reset".into()).is_rejection());
        assert_eq!(KubeIntentError::config("x").cause_kind(), None);
    }
}
