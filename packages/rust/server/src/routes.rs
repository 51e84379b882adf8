//! Request handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use kubeintent_core::StatusReport;
use kubeintent_shared::{CauseKind, DispatchResult, DispatchStatus, KubeIntentError};

use crate::AppState;

/// `POST /apply`: validate and dispatch one intent document.
pub(crate) async fn apply(State(state): State<AppState>, body: Bytes) -> Response {
    state.status.increment();
    let span = info_span!("apply", request_id = %Uuid::now_v7());

    async move {
        let result = match std::str::from_utf8(&body) {
            Ok(raw) => state.dispatcher.handle_document(raw).await,
            Err(e) => DispatchResult::failure(&KubeIntentError::malformed(format!(
                "request body is not UTF-8: {e}"
            ))),
        };
        info!(status = ?result.status, cause = ?result.cause_kind, "apply handled");
        (status_code(&result), Json(result)).into_response()
    }
    .instrument(span)
    .await
}

/// `GET /context`: node and pod inventory from the gateway.
pub(crate) async fn context(State(state): State<AppState>) -> Response {
    state.status.increment();
    let span = info_span!("context", request_id = %Uuid::now_v7());

    async move {
        match state.dispatcher.gateway().context().await {
            Ok(ctx) => {
                info!(nodes = ctx.node_count, pods = ctx.pod_count, "context served");
                Json(ctx).into_response()
            }
            Err(err) => {
                warn!(error = %err, "context lookup failed");
                let err = match err {
                    KubeIntentError::Gateway(_) => err,
                    other => KubeIntentError::gateway(other.to_string()),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(DispatchResult::failure(&err)))
                    .into_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// `GET /health`
pub(crate) async fn health() -> &'static str {
    debug!("health probe");
    "ok"
}

/// `GET /status`
pub(crate) async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(state.status.snapshot())
}

/// HTTP status for a dispatch outcome.
pub(crate) fn status_code(result: &DispatchResult) -> StatusCode {
    match (result.status, result.cause_kind) {
        (DispatchStatus::Success, _) => StatusCode::OK,
        (DispatchStatus::Failure, Some(cause)) if cause.is_rejection() => StatusCode::BAD_REQUEST,
        (DispatchStatus::Failure, _) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(cause: CauseKind) -> DispatchResult {
        DispatchResult {
            status: DispatchStatus::Failure,
            message: "x".into(),
            cause_kind: Some(cause),
        }
    }

    #[test]
    fn every_rejection_kind_maps_to_400() {
        for cause in [
            CauseKind::MalformedDocument,
            CauseKind::UnrecognizedAction,
            CauseKind::UnsupportedResourceKind,
            CauseKind::InvalidSpec,
        ] {
            assert_eq!(status_code(&failure(cause)), StatusCode::BAD_REQUEST, "{cause:?}");
        }
    }

    #[test]
    fn non_rejection_failures_map_to_500() {
        assert_eq!(
            status_code(&failure(CauseKind::GatewayFailure)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_code(&failure(CauseKind::StreamBroken)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_code(&DispatchResult::success("ok")), StatusCode::OK);
    }
}
