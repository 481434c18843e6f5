//! Writes the outcome of a finished run to the singleton status row.

use chrono::Utc;
use mgnrega_core::{
  status::{SourceStatus, SyncStatus},
  store::DatasetStore,
};
use tracing::warn;

use crate::RunOutcome;

/// The only write path to [`SyncStatus`]. Called once per run, after it has
/// reached a terminal state.
pub struct StatusRecorder<'a, S> {
  store: &'a S,
}

impl<'a, S: DatasetStore> StatusRecorder<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Overwrite the status row for `outcome` and return what was written.
  ///
  /// `total_records` is the store's live count. If counting fails the
  /// previous row's count is carried forward so the displayed total never
  /// regresses.
  pub async fn record_run(&self, outcome: &RunOutcome) -> Result<SyncStatus, S::Error> {
    let total_records = match self.store.count_records().await {
      Ok(n) => n,
      Err(e) => {
        warn!(error = %e, "live record count unavailable; keeping previous total");
        self
          .store
          .get_status()
          .await?
          .map(|s| s.total_records)
          .unwrap_or(0)
      }
    };

    let status = SyncStatus {
      last_updated: Utc::now(),
      source_status: source_status(outcome),
      total_records,
      notes: Some(notes(outcome)),
    };
    self.store.put_status(status.clone()).await?;
    Ok(status)
  }
}

fn source_status(outcome: &RunOutcome) -> SourceStatus {
  match outcome {
    RunOutcome::Completed(_) => SourceStatus::Active,
    RunOutcome::Failed(f) if f.persisted > 0 => SourceStatus::Degraded,
    RunOutcome::Failed(_) => SourceStatus::Error,
  }
}

fn notes(outcome: &RunOutcome) -> String {
  match outcome {
    RunOutcome::Completed(s) => format!(
      "synced {} of {} fetched records over {} pages; dropped {} unresolved, {} malformed",
      s.persisted, s.fetched, s.pages, s.dropped_unresolved, s.dropped_malformed
    ),
    RunOutcome::Failed(f) => format!(
      "{} after {} pages: {}; {} records persisted before failure",
      f.error.kind(),
      f.pages,
      f.error,
      f.persisted
    ),
  }
}
