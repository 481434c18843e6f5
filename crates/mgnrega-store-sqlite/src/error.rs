//! Error type for `mgnrega-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] mgnrega_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column held a value outside its domain.
  #[error("corrupt column {column}: {value:?}")]
  Corrupt { column: &'static str, value: String },

  #[error("a district named {0:?} already exists")]
  DuplicateDistrict(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
