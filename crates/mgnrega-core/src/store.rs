//! The `DatasetStore` trait: the read/write contract the pipeline needs
//! from persistence.
//!
//! The trait is implemented by storage backends (e.g. `mgnrega-store-sqlite`).
//! The orchestrator and the API depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  district::{District, NewDistrict},
  record::{NewPerformanceRecord, PerformanceRecord},
  status::SyncStatus,
};

/// Abstraction over the persisted dataset.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DatasetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Districts ─────────────────────────────────────────────────────────

  /// Seed a district. Fails if the name collides case-insensitively with an
  /// existing district.
  fn add_district(
    &self,
    input: NewDistrict,
  ) -> impl Future<Output = Result<District, Self::Error>> + Send + '_;

  /// All known districts, ordered by name.
  fn list_districts(
    &self,
  ) -> impl Future<Output = Result<Vec<District>, Self::Error>> + Send + '_;

  // ── Performance records ───────────────────────────────────────────────

  /// Insert or overwrite `records` keyed on `(district_id, fiscal_year,
  /// month)` as one atomic unit. On conflict every mutable field is
  /// replaced and `updated_at` is refreshed; `created_at` is kept.
  ///
  /// Returns the number of rows written. An empty batch is a no-op.
  fn upsert_records(
    &self,
    records: Vec<NewPerformanceRecord>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Live count of persisted performance records.
  fn count_records(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Districts that have at least one performance record, ordered by name.
  fn tracked_districts(
    &self,
  ) -> impl Future<Output = Result<Vec<District>, Self::Error>> + Send + '_;

  /// The time-ordered series for one district: fiscal year ascending, then
  /// April through March.
  fn district_series(
    &self,
    district_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PerformanceRecord>, Self::Error>> + Send + '_;

  // ── Sync status ───────────────────────────────────────────────────────

  /// The singleton status row, or `None` before the first run.
  fn get_status(
    &self,
  ) -> impl Future<Output = Result<Option<SyncStatus>, Self::Error>> + Send + '_;

  /// Overwrite the singleton status row in full.
  fn put_status(
    &self,
    status: SyncStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
