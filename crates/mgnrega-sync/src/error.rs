//! Run-level error taxonomy.
//!
//! Records for untracked districts are not errors: they are dropped and
//! tallied in [`crate::RunSummary`]. Status write failures are not errors
//! either; they surface as `status_recorded = false` on the report.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a run ended in the `Failed` state.
#[derive(Debug, Error)]
pub enum SyncError {
  /// Upstream HTTP or payload failure on some page.
  #[error("source unavailable: {0}")]
  SourceUnavailable(#[source] BoxError),

  /// A store read or write failed. Pages upserted earlier stay committed.
  #[error("persistence failure: {0}")]
  PersistenceFailure(#[source] BoxError),

  /// The district set breaks the case-insensitive uniqueness invariant.
  #[error("invalid district set: {0}")]
  InvalidDistrictSet(#[source] mgnrega_core::Error),
}

impl SyncError {
  /// Stable machine-readable name for API responses and status notes.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::SourceUnavailable(_) => "source_unavailable",
      Self::PersistenceFailure(_) => "persistence_failure",
      Self::InvalidDistrictSet(_) => "invalid_district_set",
    }
  }
}

/// Preconditions checked before a run starts. No network call has been made
/// when one of these is returned.
#[derive(Debug, Error)]
pub enum TriggerError {
  #[error("data.gov.in API key is required")]
  MissingCredential,

  #[error("a sync run is already in progress")]
  AlreadyRunning,
}
