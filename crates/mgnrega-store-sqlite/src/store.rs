//! [`SqliteStore`], the SQLite implementation of [`DatasetStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use mgnrega_core::{
  district::{District, NewDistrict},
  record::{NewPerformanceRecord, PerformanceRecord},
  status::SyncStatus,
  store::DatasetStore,
};

use crate::{
  Error, Result,
  encode::{EncodedRecord, RawDistrict, RawRecord, RawStatus, encode_dt, encode_uuid},
  schema::SCHEMA,
};

const UPSERT_RECORD: &str = "
INSERT INTO performance_records (
    district_id, fiscal_year, month, metrics_json,
    women_participation_pct, sc_participation_pct, st_participation_pct,
    created_at, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
ON CONFLICT (district_id, fiscal_year, month) DO UPDATE SET
    metrics_json            = excluded.metrics_json,
    women_participation_pct = excluded.women_participation_pct,
    sc_participation_pct    = excluded.sc_participation_pct,
    st_participation_pct    = excluded.st_participation_pct,
    updated_at              = excluded.updated_at";

const RECORD_COLUMNS: &str = "
    district_id, fiscal_year, month, metrics_json,
    women_participation_pct, sc_participation_pct, st_participation_pct,
    created_at, updated_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// An MGNREGA dataset backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── DatasetStore impl ───────────────────────────────────────────────────────

impl DatasetStore for SqliteStore {
  type Error = Error;

  // ── Districts ─────────────────────────────────────────────────────────────

  async fn add_district(&self, input: NewDistrict) -> Result<District> {
    let name = input.name.trim().to_owned();
    if name.is_empty() {
      return Err(mgnrega_core::Error::EmptyDistrictName.into());
    }

    let district = District {
      id:         Uuid::new_v4(),
      name,
      state:      input.state.trim().to_owned(),
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(district.id);
    let name   = district.name.clone();
    let state  = district.state.clone();
    let at_str = encode_dt(district.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        // NOCASE only folds ASCII, so the uniqueness check is repeated here
        // with full Unicode case folding.
        let folded = name.to_lowercase();
        let mut stmt = conn.prepare("SELECT name FROM districts")?;
        let clash = stmt
          .query_map([], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?
          .iter()
          .any(|existing| existing.to_lowercase() == folded);
        if clash {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO districts (id, name, state, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, state, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateDistrict(district.name));
    }
    Ok(district)
  }

  async fn list_districts(&self) -> Result<Vec<District>> {
    let raws: Vec<RawDistrict> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT id, name, state, created_at FROM districts ORDER BY name")?;
        let rows = stmt
          .query_map([], RawDistrict::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDistrict::into_district).collect()
  }

  // ── Performance records ───────────────────────────────────────────────────

  async fn upsert_records(&self, records: Vec<NewPerformanceRecord>) -> Result<u64> {
    if records.is_empty() {
      return Ok(0);
    }

    let rows = records
      .iter()
      .map(EncodedRecord::encode)
      .collect::<Result<Vec<_>>>()?;
    let now_str = encode_dt(Utc::now());

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare_cached(UPSERT_RECORD)?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              row.district_id,
              row.fiscal_year,
              row.month,
              row.metrics_json,
              row.women_participation_pct,
              row.sc_participation_pct,
              row.st_participation_pct,
              now_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len() as u64)
      })
      .await?;

    Ok(written)
  }

  async fn count_records(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM performance_records", [], |r| r.get(0))?)
      })
      .await?;
    crate::encode::decode_count(count)
  }

  async fn tracked_districts(&self) -> Result<Vec<District>> {
    let raws: Vec<RawDistrict> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT d.id, d.name, d.state, d.created_at
           FROM districts d
           WHERE EXISTS (
             SELECT 1 FROM performance_records r WHERE r.district_id = d.id
           )
           ORDER BY d.name",
        )?;
        let rows = stmt
          .query_map([], RawDistrict::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDistrict::into_district).collect()
  }

  async fn district_series(&self, district_id: Uuid) -> Result<Vec<PerformanceRecord>> {
    let id_str = encode_uuid(district_id);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {RECORD_COLUMNS}
           FROM performance_records
           WHERE district_id = ?1
           ORDER BY fiscal_year"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut records = raws
      .into_iter()
      .map(RawRecord::into_record)
      .collect::<Result<Vec<_>>>()?;
    // Within a fiscal year, April comes first and March last.
    records.sort_by(|a, b| {
      a.fiscal_year
        .cmp(&b.fiscal_year)
        .then(a.month.fiscal_index().cmp(&b.month.fiscal_index()))
    });
    Ok(records)
  }

  // ── Sync status ───────────────────────────────────────────────────────────

  async fn get_status(&self) -> Result<Option<SyncStatus>> {
    let raw: Option<RawStatus> = self
      .conn
      .call(|conn| {
        Ok(conn
          .query_row(
            "SELECT last_updated, source_status, total_records, notes
             FROM sync_status WHERE id = 1",
            [],
            |row| {
              Ok(RawStatus {
                last_updated:  row.get(0)?,
                source_status: row.get(1)?,
                total_records: row.get(2)?,
                notes:         row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawStatus::into_status).transpose()
  }

  async fn put_status(&self, status: SyncStatus) -> Result<()> {
    let at_str     = encode_dt(status.last_updated);
    let status_str = status.source_status.as_str();
    let total      = i64::try_from(status.total_records).unwrap_or(i64::MAX);
    let notes      = status.notes;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sync_status (id, last_updated, source_status, total_records, notes)
           VALUES (1, ?1, ?2, ?3, ?4)
           ON CONFLICT (id) DO UPDATE SET
             last_updated  = excluded.last_updated,
             source_status = excluded.source_status,
             total_records = excluded.total_records,
             notes         = excluded.notes",
          rusqlite::params![at_str, status_str, total, notes],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
