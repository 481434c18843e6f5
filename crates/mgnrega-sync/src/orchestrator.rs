//! The per-run state machine.
//!
//! ```text
//! Idle → Fetching → Transforming → Upserting ─┬→ Fetching   (offset < total)
//!           │                          │       └→ Completed
//!           └──────────────────────────┴────────→ Failed
//! ```
//!
//! Pages are processed strictly one after another. The loop condition uses
//! the `total` reported by the most recently fetched page, so a source whose
//! dataset grows or shrinks mid-run is followed rather than cached.

use mgnrega_core::{
  credential::ApiKey,
  raw::RawExternalRecord,
  record::NewPerformanceRecord,
  resolver::ResolverIndex,
  source::{RecordSource, SourcePage},
  store::DatasetStore,
  transform::{DropReason, Transformed, transform},
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{RunLease, SyncError};

/// Observable phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
  Idle,
  Fetching,
  Transforming,
  Upserting,
  Completed,
  Failed,
}

/// Statistics of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
  pub pages:              u64,
  /// `total` as reported by the last page fetched.
  pub upstream_total:     u64,
  /// Raw records received across all pages.
  pub fetched:            u64,
  pub persisted:          u64,
  pub dropped_unresolved: u64,
  pub dropped_malformed:  u64,
}

impl RunSummary {
  pub fn dropped(&self) -> u64 { self.dropped_unresolved + self.dropped_malformed }
}

/// A run that ended in `Failed`, with the progress committed before it.
#[derive(Debug)]
pub struct RunFailure {
  pub error:     SyncError,
  pub pages:     u64,
  pub fetched:   u64,
  /// Records committed by earlier pages of this run. They stay in the store.
  pub persisted: u64,
}

#[derive(Debug)]
pub enum RunOutcome {
  Completed(RunSummary),
  Failed(RunFailure),
}

impl RunOutcome {
  pub fn state(&self) -> RunState {
    match self {
      Self::Completed(_) => RunState::Completed,
      Self::Failed(_) => RunState::Failed,
    }
  }

  pub fn persisted(&self) -> u64 {
    match self {
      Self::Completed(s) => s.persisted,
      Self::Failed(f) => f.persisted,
    }
  }

  pub fn is_completed(&self) -> bool { matches!(self, Self::Completed(_)) }
}

/// In-flight state carried between transitions.
enum Step {
  Fetching { offset: u64 },
  Transforming { offset: u64, page: SourcePage },
  Upserting { offset: u64, total: u64, batch: Vec<NewPerformanceRecord> },
}

impl Step {
  fn state(&self) -> RunState {
    match self {
      Self::Fetching { .. } => RunState::Fetching,
      Self::Transforming { .. } => RunState::Transforming,
      Self::Upserting { .. } => RunState::Upserting,
    }
  }
}

/// Drives one run from `Idle` to `Completed` or `Failed`.
///
/// Only [`crate::SyncService`] builds one, from the lease it has just taken
/// on its own [`crate::RunLock`]. The orchestrator borrows that lease for its
/// whole lifetime, so the lock stays held until the run is over.
pub(crate) struct Orchestrator<'a, S, Src> {
  store:  &'a S,
  source: &'a Src,
  _lease: &'a RunLease,
}

impl<'a, S, Src> Orchestrator<'a, S, Src>
where
  S: DatasetStore,
  Src: RecordSource,
{
  pub(crate) fn new(store: &'a S, source: &'a Src, lease: &'a RunLease) -> Self {
    Self { store, source, _lease: lease }
  }

  /// Execute a full run.
  ///
  /// Never retries: a failed page ends the run. Re-running is always safe
  /// because every page is applied as an upsert.
  pub(crate) async fn run(&self, api_key: &ApiKey) -> RunOutcome {
    let mut progress = RunSummary::default();
    debug!(state = ?RunState::Idle, "sync transition");

    let index = match self.build_index().await {
      Ok(index) => index,
      Err(e) => return fail(e, &progress),
    };
    info!(districts = index.len(), "sync run started");
    if index.is_empty() {
      warn!("no districts seeded; every fetched record will be dropped");
    }

    let page_size = self.source.page_size().max(1);
    let mut last_total: Option<u64> = None;
    let mut step = Step::Fetching { offset: 0 };

    loop {
      debug!(state = ?step.state(), "sync transition");
      step = match step {
        Step::Fetching { offset } => match self.source.fetch_page(api_key, offset).await {
          Ok(page) => {
            if let Some(prev) = last_total
              && page.total < prev
            {
              warn!(previous = prev, current = page.total, offset, "upstream total shrank mid-run");
            }
            last_total = Some(page.total);
            progress.pages += 1;
            progress.upstream_total = page.total;
            progress.fetched += page.records.len() as u64;
            Step::Transforming { offset, page }
          }
          Err(e) => return fail(SyncError::SourceUnavailable(Box::new(e)), &progress),
        },

        Step::Transforming { offset, page } => {
          let batch = transform_page(&page.records, &index, &mut progress);
          Step::Upserting { offset, total: page.total, batch }
        }

        Step::Upserting { offset, total, batch } => {
          let size = batch.len();
          match self.store.upsert_records(batch).await {
            Ok(written) => progress.persisted += written,
            Err(e) => return fail(SyncError::PersistenceFailure(Box::new(e)), &progress),
          }
          debug!(offset, total, upserted = size, "page applied");

          let next = offset + page_size;
          if next < total {
            Step::Fetching { offset: next }
          } else {
            info!(
              pages = progress.pages,
              fetched = progress.fetched,
              persisted = progress.persisted,
              dropped = progress.dropped(),
              "sync run completed"
            );
            return RunOutcome::Completed(progress);
          }
        }
      };
    }
  }

  /// The resolver index is rebuilt for every run and never cached.
  async fn build_index(&self) -> Result<ResolverIndex, SyncError> {
    let districts = self
      .store
      .list_districts()
      .await
      .map_err(|e| SyncError::PersistenceFailure(Box::new(e)))?;
    ResolverIndex::build(&districts).map_err(SyncError::InvalidDistrictSet)
  }
}

fn transform_page(
  records: &[RawExternalRecord],
  index: &ResolverIndex,
  progress: &mut RunSummary,
) -> Vec<NewPerformanceRecord> {
  let mut batch = Vec::with_capacity(records.len());
  for raw in records {
    match transform(raw, index) {
      Transformed::Record(record) => batch.push(record),
      Transformed::Dropped(DropReason::UnresolvedDistrict) => progress.dropped_unresolved += 1,
      Transformed::Dropped(DropReason::Malformed) => progress.dropped_malformed += 1,
    }
  }
  batch
}

fn fail(error: SyncError, progress: &RunSummary) -> RunOutcome {
  error!(
    error = %error,
    pages = progress.pages,
    persisted = progress.persisted,
    "sync run failed"
  );
  RunOutcome::Failed(RunFailure {
    error,
    pages: progress.pages,
    fetched: progress.fetched,
    persisted: progress.persisted,
  })
}
