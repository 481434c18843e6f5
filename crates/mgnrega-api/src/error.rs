//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use mgnrega_sync::{RunFailure, SyncError, TriggerError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("{0}")]
  Trigger(#[from] TriggerError),

  /// The run started but ended in `Failed`.
  #[error("sync failed: {message}")]
  RunFailed {
    kind:            &'static str,
    message:         String,
    persisted:       u64,
    status_recorded: bool,
    /// `true` when the upstream source failed rather than the store.
    upstream:        bool,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn run_failed(failure: &RunFailure, status_recorded: bool) -> Self {
    Self::RunFailed {
      kind: failure.error.kind(),
      message: failure.error.to_string(),
      persisted: failure.persisted,
      status_recorded,
      upstream: matches!(failure.error, SyncError::SourceUnavailable(_)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::Trigger(TriggerError::MissingCredential) => (
        StatusCode::BAD_REQUEST,
        json!({ "error": self.to_string(), "kind": "missing_credential" }),
      ),
      ApiError::Trigger(TriggerError::AlreadyRunning) => (
        StatusCode::CONFLICT,
        json!({ "error": self.to_string(), "kind": "already_running" }),
      ),
      ApiError::RunFailed { kind, message, persisted, status_recorded, upstream } => {
        let status = if *upstream {
          StatusCode::BAD_GATEWAY
        } else {
          StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, json!({
          "error": message,
          "kind": kind,
          "persisted_before_failure": persisted,
          "status_recorded": status_recorded,
        }))
      }
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() })),
    };
    (status, Json(body)).into_response()
  }
}
