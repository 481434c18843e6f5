//! Performance records, one row per `(district, fiscal year, month)`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Month ───────────────────────────────────────────────────────────────────

const MONTH_NAMES: [&str; 12] = [
  "January", "February", "March", "April", "May", "June", "July", "August",
  "September", "October", "November", "December",
];

/// A calendar month, 1 (January) through 12 (December).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(u8);

impl Month {
  pub fn new(number: u8) -> Option<Self> {
    (1..=12).contains(&number).then_some(Self(number))
  }

  /// Parse an upstream month label: a full English name, its three-letter
  /// abbreviation (either case-insensitive), or a number.
  pub fn parse(label: &str) -> Option<Self> {
    let label = label.trim();
    if let Ok(n) = label.parse::<u8>() {
      return Self::new(n);
    }
    MONTH_NAMES
      .iter()
      .position(|name| {
        name.eq_ignore_ascii_case(label)
          || (label.len() == 3 && name[..3].eq_ignore_ascii_case(label))
      })
      .map(|i| Self(i as u8 + 1))
  }

  pub fn number(self) -> u8 { self.0 }

  /// Position within the Indian fiscal year: April is 0, March is 11.
  pub fn fiscal_index(self) -> u8 { (self.0 + 8) % 12 }
}

impl TryFrom<u8> for Month {
  type Error = Error;

  fn try_from(n: u8) -> Result<Self> {
    Self::new(n).ok_or_else(|| Error::InvalidMonth(n.to_string()))
  }
}

impl From<Month> for u8 {
  fn from(m: Month) -> u8 { m.0 }
}

impl fmt::Display for Month {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = MONTH_NAMES[usize::from(self.0 - 1)];
    f.write_str(&name[..3])
  }
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// Government metrics copied verbatim from the upstream record.
///
/// Monetary columns keep the source's units; scaling for display is the
/// presentation layer's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
  pub households_worked:             Option<i64>,
  pub individuals_worked:            Option<i64>,
  pub persondays:                    Option<i64>,
  pub women_persondays:              Option<i64>,
  pub sc_persondays:                 Option<i64>,
  pub st_persondays:                 Option<i64>,
  pub wages:                         Option<f64>,
  pub material_and_skilled_wages:    Option<f64>,
  pub total_expenditure:             Option<f64>,
  pub admin_expenditure:             Option<f64>,
  pub average_wage_rate:             Option<f64>,
  pub average_days_per_household:    Option<f64>,
  pub approved_labour_budget:        Option<f64>,
  pub households_completed_100_days: Option<i64>,
  pub completed_works:               Option<i64>,
  pub ongoing_works:                 Option<i64>,
  pub remarks:                       Option<String>,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Identity of a performance record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
  pub district_id: Uuid,
  pub fiscal_year: String,
  pub month:       Month,
}

/// Canonical record produced by the transformer and handed to
/// [`crate::store::DatasetStore::upsert_records`]. Timestamps are assigned by
/// the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPerformanceRecord {
  pub district_id:             Uuid,
  pub fiscal_year:             String,
  pub month:                   Month,
  pub metrics:                 Metrics,
  /// Share of person-days worked by women, in percent. `None` when the
  /// ratio is undefined.
  pub women_participation_pct: Option<f64>,
  pub sc_participation_pct:    Option<f64>,
  pub st_participation_pct:    Option<f64>,
}

impl NewPerformanceRecord {
  pub fn key(&self) -> RecordKey {
    RecordKey {
      district_id: self.district_id,
      fiscal_year: self.fiscal_year.clone(),
      month:       self.month,
    }
  }
}

/// A persisted performance record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
  pub district_id:             Uuid,
  pub fiscal_year:             String,
  pub month:                   Month,
  pub metrics:                 Metrics,
  pub women_participation_pct: Option<f64>,
  pub sc_participation_pct:    Option<f64>,
  pub st_participation_pct:    Option<f64>,
  /// Set on first insert; preserved across overwrites.
  pub created_at:              DateTime<Utc>,
  /// Bumped on every write.
  pub updated_at:              DateTime<Utc>,
}

impl PerformanceRecord {
  pub fn key(&self) -> RecordKey {
    RecordKey {
      district_id: self.district_id,
      fiscal_year: self.fiscal_year.clone(),
      month:       self.month,
    }
  }
}
