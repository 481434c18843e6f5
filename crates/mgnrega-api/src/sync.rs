//! Handlers for `/sync`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/sync` | Body: `{"api_key":"..."}` (`apiKey` also accepted); runs the pipeline |
//! | `GET`  | `/sync` | Status row plus live record count |

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use mgnrega_core::{source::RecordSource, store::DatasetStore};
use mgnrega_sync::{RunOutcome, RunSummary, StatusView, SyncService};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Trigger ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TriggerBody {
  #[serde(default, alias = "apiKey")]
  pub api_key: Option<String>,
}

/// Body of a successful `POST /sync`.
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
  pub success:         bool,
  pub message:         &'static str,
  pub summary:         RunSummary,
  pub status_recorded: bool,
  pub started_at:      DateTime<Utc>,
  pub finished_at:     DateTime<Utc>,
}

/// `POST /sync`. Runs to completion before responding. The body is optional;
/// without one the request fails as a missing credential.
pub async fn trigger<S, Src>(
  State(service): State<Arc<SyncService<S, Src>>>,
  body: Option<Json<TriggerBody>>,
) -> Result<Json<TriggerResponse>, ApiError>
where
  S: DatasetStore + 'static,
  Src: RecordSource + 'static,
{
  // A request without a JSON body carries no key.
  let api_key = body.and_then(|Json(b)| b.api_key);
  let report = service.trigger(api_key).await?;

  match report.outcome {
    RunOutcome::Completed(summary) => Ok(Json(TriggerResponse {
      success: true,
      message: "Data synced successfully",
      summary,
      status_recorded: report.status_recorded,
      started_at: report.started_at,
      finished_at: report.finished_at,
    })),
    RunOutcome::Failed(failure) => Err(ApiError::run_failed(&failure, report.status_recorded)),
  }
}

// ─── Status ───────────────────────────────────────────────────────────────────

/// `GET /sync`
pub async fn status<S, Src>(
  State(service): State<Arc<SyncService<S, Src>>>,
) -> Result<Json<StatusView>, ApiError>
where
  S: DatasetStore + 'static,
  Src: RecordSource + 'static,
{
  let view = service
    .status()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(view))
}
