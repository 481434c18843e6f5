//! The ingestion pipeline: fetch → resolve → transform → upsert, page by
//! page, followed by a single status write.
//!
//! [`SyncService`] is the entry point used by the API and the scheduler. It
//! checks the credential, takes the [`RunLock`], drives the per-run state
//! machine to a terminal state and records the outcome through the
//! [`StatusRecorder`]. It is the only way to start a run.

pub mod error;
pub mod lock;
pub mod orchestrator;
pub mod recorder;
pub mod service;

pub use error::{BoxError, SyncError, TriggerError};
pub use lock::{RunLease, RunLock};
pub use orchestrator::{RunFailure, RunOutcome, RunState, RunSummary};
pub(crate) use orchestrator::Orchestrator;
pub use recorder::StatusRecorder;
pub use service::{RunReport, StatusView, SyncService};
