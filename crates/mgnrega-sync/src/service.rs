//! Trigger and status-query façade over the pipeline.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mgnrega_core::{
  credential::ApiKey,
  source::RecordSource,
  status::SourceStatus,
  store::DatasetStore,
};
use serde::Serialize;
use tracing::{Instrument as _, info_span, warn};

use crate::{Orchestrator, RunLock, RunOutcome, StatusRecorder, TriggerError};

/// Everything known about one finished run.
#[derive(Debug)]
pub struct RunReport {
  pub outcome:         RunOutcome,
  /// `false` if the status row could not be written. The outcome above is
  /// authoritative either way.
  pub status_recorded: bool,
  pub started_at:      DateTime<Utc>,
  pub finished_at:     DateTime<Utc>,
}

/// Response of the status query: the cached status row plus a live count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
  pub last_updated:   Option<DateTime<Utc>>,
  pub source_status:  Option<SourceStatus>,
  /// Live count of persisted records, independent of the status row.
  pub total_records:  u64,
  /// Count recorded by the last run.
  pub recorded_total: Option<u64>,
  pub notes:          Option<String>,
  /// Whether a run currently holds the lock.
  pub running:        bool,
}

/// Owns the store, the source and the run lock.
pub struct SyncService<S, Src> {
  store:  Arc<S>,
  source: Arc<Src>,
  lock:   RunLock,
}

impl<S, Src> SyncService<S, Src>
where
  S: DatasetStore,
  Src: RecordSource,
{
  pub fn new(store: Arc<S>, source: Arc<Src>) -> Self {
    Self { store, source, lock: RunLock::new() }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn source(&self) -> &Arc<Src> { &self.source }

  pub fn lock(&self) -> &RunLock { &self.lock }

  /// Start a run with a caller-supplied credential.
  pub async fn trigger(&self, api_key: Option<String>) -> Result<RunReport, TriggerError> {
    let api_key = ApiKey::from_optional(api_key).map_err(|_| TriggerError::MissingCredential)?;
    self.run(&api_key).await
  }

  /// Start a run, refusing if another one holds the lock.
  pub async fn run(&self, api_key: &ApiKey) -> Result<RunReport, TriggerError> {
    let lease = self.lock.try_acquire().ok_or(TriggerError::AlreadyRunning)?;
    let started_at = Utc::now();

    let span = info_span!("sync_run", %started_at);
    let report = async {
      let outcome = Orchestrator::new(&*self.store, &*self.source, &lease)
        .run(api_key)
        .await;

      let status_recorded = match StatusRecorder::new(&*self.store).record_run(&outcome).await {
        Ok(_) => true,
        Err(e) => {
          warn!(error = %e, "failed to write sync status");
          false
        }
      };

      RunReport { outcome, status_recorded, started_at, finished_at: Utc::now() }
    }
    .instrument(span)
    .await;

    drop(lease);
    Ok(report)
  }

  /// Current freshness information for consumers.
  pub async fn status(&self) -> Result<StatusView, S::Error> {
    let row = self.store.get_status().await?;
    let live = self.store.count_records().await?;
    Ok(StatusView {
      last_updated:   row.as_ref().map(|s| s.last_updated),
      source_status:  row.as_ref().map(|s| s.source_status),
      total_records:  live,
      recorded_total: row.as_ref().map(|s| s.total_records),
      notes:          row.and_then(|s| s.notes),
      running:        self.lock.is_held(),
    })
  }
}
