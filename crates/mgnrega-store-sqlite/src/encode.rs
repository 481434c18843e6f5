//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings and [`Metrics`] as compact JSON.

use chrono::{DateTime, Utc};
use mgnrega_core::{
  district::District,
  record::{Metrics, Month, NewPerformanceRecord, PerformanceRecord},
  status::{SourceStatus, SyncStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Month ───────────────────────────────────────────────────────────────────

pub fn decode_month(n: i64) -> Result<Month> {
  u8::try_from(n)
    .ok()
    .and_then(Month::new)
    .ok_or(Error::Corrupt { column: "month", value: n.to_string() })
}

// ─── Counts ──────────────────────────────────────────────────────────────────

pub fn decode_count(n: i64) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::Corrupt { column: "total_records", value: n.to_string() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column values for one upsert, prepared before entering the connection
/// thread.
pub struct EncodedRecord {
  pub district_id:             String,
  pub fiscal_year:             String,
  pub month:                   i64,
  pub metrics_json:            String,
  pub women_participation_pct: Option<f64>,
  pub sc_participation_pct:    Option<f64>,
  pub st_participation_pct:    Option<f64>,
}

impl EncodedRecord {
  pub fn encode(record: &NewPerformanceRecord) -> Result<Self> {
    Ok(Self {
      district_id:             encode_uuid(record.district_id),
      fiscal_year:             record.fiscal_year.clone(),
      month:                   i64::from(record.month.number()),
      metrics_json:            serde_json::to_string(&record.metrics)?,
      women_participation_pct: record.women_participation_pct,
      sc_participation_pct:    record.sc_participation_pct,
      st_participation_pct:    record.st_participation_pct,
    })
  }
}

/// Raw values read directly from a `districts` row.
pub struct RawDistrict {
  pub id:         String,
  pub name:       String,
  pub state:      String,
  pub created_at: String,
}

impl RawDistrict {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      state:      row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_district(self) -> Result<District> {
    Ok(District {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      state:      self.state,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `performance_records` row.
pub struct RawRecord {
  pub district_id:             String,
  pub fiscal_year:             String,
  pub month:                   i64,
  pub metrics_json:            String,
  pub women_participation_pct: Option<f64>,
  pub sc_participation_pct:    Option<f64>,
  pub st_participation_pct:    Option<f64>,
  pub created_at:              String,
  pub updated_at:              String,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      district_id:             row.get(0)?,
      fiscal_year:             row.get(1)?,
      month:                   row.get(2)?,
      metrics_json:            row.get(3)?,
      women_participation_pct: row.get(4)?,
      sc_participation_pct:    row.get(5)?,
      st_participation_pct:    row.get(6)?,
      created_at:              row.get(7)?,
      updated_at:              row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<PerformanceRecord> {
    let metrics: Metrics = serde_json::from_str(&self.metrics_json)?;
    Ok(PerformanceRecord {
      district_id: decode_uuid(&self.district_id)?,
      fiscal_year: self.fiscal_year,
      month: decode_month(self.month)?,
      metrics,
      women_participation_pct: self.women_participation_pct,
      sc_participation_pct: self.sc_participation_pct,
      st_participation_pct: self.st_participation_pct,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from the `sync_status` row.
pub struct RawStatus {
  pub last_updated:  String,
  pub source_status: String,
  pub total_records: i64,
  pub notes:         Option<String>,
}

impl RawStatus {
  pub fn into_status(self) -> Result<SyncStatus> {
    Ok(SyncStatus {
      last_updated:  decode_dt(&self.last_updated)?,
      source_status: self.source_status.parse::<SourceStatus>()?,
      total_records: decode_count(self.total_records)?,
      notes:         self.notes,
    })
  }
}
