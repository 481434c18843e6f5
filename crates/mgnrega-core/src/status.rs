//! The singleton freshness record written at the end of every run.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Health flag shown by the dashboard's freshness indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
  /// The last run completed.
  Active,
  /// The last run failed after committing part of the dataset.
  Degraded,
  /// The last run failed without committing anything.
  Error,
}

impl SourceStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Degraded => "degraded",
      Self::Error => "error",
    }
  }
}

impl fmt::Display for SourceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SourceStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "active" => Ok(Self::Active),
      "degraded" => Ok(Self::Degraded),
      "error" => Ok(Self::Error),
      other => Err(Error::UnknownSourceStatus(other.to_owned())),
    }
  }
}

/// The single status row. Overwritten in full once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
  pub last_updated:  DateTime<Utc>,
  pub source_status: SourceStatus,
  /// Number of persisted records as of `last_updated`.
  pub total_records: u64,
  pub notes:         Option<String>,
}
