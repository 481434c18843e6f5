//! Districts: the canonical administrative units records are joined against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked district. Created out-of-band (seed data) and never modified by
/// a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
  pub id:         Uuid,
  /// Natural join key against upstream data; unique case-insensitively.
  pub name:       String,
  pub state:      String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::DatasetStore::add_district`]; also the shape of a
/// seed-file entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDistrict {
  pub name:  String,
  pub state: String,
}

impl NewDistrict {
  pub fn new(name: impl Into<String>, state: impl Into<String>) -> Self {
    Self { name: name.into(), state: state.into() }
  }
}
