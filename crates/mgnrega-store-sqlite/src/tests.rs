//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use mgnrega_core::{
  district::NewDistrict,
  record::{Metrics, Month, NewPerformanceRecord},
  status::{SourceStatus, SyncStatus},
  store::DatasetStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn record(district_id: Uuid, fiscal_year: &str, month: u8, persondays: i64) -> NewPerformanceRecord {
  NewPerformanceRecord {
    district_id,
    fiscal_year: fiscal_year.into(),
    month: Month::new(month).unwrap(),
    metrics: Metrics {
      persondays: Some(persondays),
      women_persondays: Some(persondays / 2),
      total_expenditure: Some(1_000.5),
      ..Default::default()
    },
    women_participation_pct: Some(50.0),
    sc_participation_pct: None,
    st_participation_pct: None,
  }
}

// ─── Districts ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_list_districts() {
  let s = store().await;
  s.add_district(NewDistrict::new("Pune", "Maharashtra")).await.unwrap();
  s.add_district(NewDistrict::new("Ajmer", "Rajasthan")).await.unwrap();

  let all = s.list_districts().await.unwrap();
  let names: Vec<_> = all.iter().map(|d| d.name.as_str()).collect();
  assert_eq!(names, ["Ajmer", "Pune"]);
}

#[tokio::test]
async fn district_names_are_unique_ignoring_case() {
  let s = store().await;
  s.add_district(NewDistrict::new("Pune", "Maharashtra")).await.unwrap();

  let err = s
    .add_district(NewDistrict::new("PUNE", "Maharashtra"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateDistrict(name) if name == "PUNE"));
  assert_eq!(s.list_districts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn blank_district_name_is_rejected() {
  let s = store().await;
  let err = s.add_district(NewDistrict::new("  ", "Goa")).await.unwrap_err();
  assert!(matches!(err, Error::Core(mgnrega_core::Error::EmptyDistrictName)));
}

// ─── Upserts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_upsert_is_a_no_op() {
  let s = store().await;
  assert_eq!(s.upsert_records(Vec::new()).await.unwrap(), 0);
  assert_eq!(s.count_records().await.unwrap(), 0);
}

#[tokio::test]
async fn upsert_inserts_new_keys() {
  let s = store().await;
  let d = s.add_district(NewDistrict::new("Pune", "Maharashtra")).await.unwrap();

  let written = s
    .upsert_records(vec![
      record(d.id, "2024-2025", 4, 100),
      record(d.id, "2024-2025", 5, 200),
    ])
    .await
    .unwrap();
  assert_eq!(written, 2);
  assert_eq!(s.count_records().await.unwrap(), 2);
}

#[tokio::test]
async fn upsert_conflict_is_last_write_wins() {
  let s = store().await;
  let d = s.add_district(NewDistrict::new("Pune", "Maharashtra")).await.unwrap();

  s.upsert_records(vec![record(d.id, "2024-2025", 4, 100)]).await.unwrap();
  let first = s.district_series(d.id).await.unwrap().remove(0);

  let mut newer = record(d.id, "2024-2025", 4, 900);
  newer.women_participation_pct = None;
  s.upsert_records(vec![newer]).await.unwrap();

  let series = s.district_series(d.id).await.unwrap();
  assert_eq!(series.len(), 1);
  let second = &series[0];
  assert_eq!(second.metrics.persondays, Some(900));
  assert_eq!(second.women_participation_pct, None);
  assert_eq!(second.created_at, first.created_at);
  assert!(second.updated_at >= first.updated_at);
}

#[tokio::test]
async fn metrics_survive_storage() {
  let s = store().await;
  let d = s.add_district(NewDistrict::new("Pune", "Maharashtra")).await.unwrap();
  let mut input = record(d.id, "2023-2024", 12, 4242);
  input.metrics.remarks = Some("revised".into());
  input.sc_participation_pct = Some(12.5);

  s.upsert_records(vec![input.clone()]).await.unwrap();

  let stored = s.district_series(d.id).await.unwrap().remove(0);
  assert_eq!(stored.metrics, input.metrics);
  assert_eq!(stored.month, input.month);
  assert_eq!(stored.sc_participation_pct, Some(12.5));
}

// ─── Consumer reads ──────────────────────────────────────────────────────────

#[tokio::test]
async fn series_is_in_fiscal_order() {
  let s = store().await;
  let d = s.add_district(NewDistrict::new("Pune", "Maharashtra")).await.unwrap();

  s.upsert_records(vec![
    record(d.id, "2024-2025", 1, 1),
    record(d.id, "2023-2024", 6, 2),
    record(d.id, "2024-2025", 4, 3),
    record(d.id, "2024-2025", 12, 4),
    record(d.id, "2024-2025", 3, 5),
  ])
  .await
  .unwrap();

  let order: Vec<(String, u8)> = s
    .district_series(d.id)
    .await
    .unwrap()
    .into_iter()
    .map(|r| (r.fiscal_year, r.month.number()))
    .collect();

  assert_eq!(order, [
    ("2023-2024".to_string(), 6),
    ("2024-2025".to_string(), 4),
    ("2024-2025".to_string(), 12),
    ("2024-2025".to_string(), 1),
    ("2024-2025".to_string(), 3),
  ]);
}

#[tokio::test]
async fn tracked_districts_only_lists_districts_with_data() {
  let s = store().await;
  let pune = s.add_district(NewDistrict::new("Pune", "Maharashtra")).await.unwrap();
  s.add_district(NewDistrict::new("Ajmer", "Rajasthan")).await.unwrap();

  assert!(s.tracked_districts().await.unwrap().is_empty());

  s.upsert_records(vec![record(pune.id, "2024-2025", 4, 10)]).await.unwrap();
  let tracked = s.tracked_districts().await.unwrap();
  assert_eq!(tracked.len(), 1);
  assert_eq!(tracked[0].id, pune.id);
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn status_is_absent_before_first_write() {
  let s = store().await;
  assert!(s.get_status().await.unwrap().is_none());
}

#[tokio::test]
async fn status_row_is_overwritten_in_full() {
  let s = store().await;

  s.put_status(SyncStatus {
    last_updated:  Utc::now(),
    source_status: SourceStatus::Error,
    total_records: 0,
    notes:         Some("first".into()),
  })
  .await
  .unwrap();

  let second = SyncStatus {
    last_updated:  Utc::now(),
    source_status: SourceStatus::Active,
    total_records: 250,
    notes:         None,
  };
  s.put_status(second.clone()).await.unwrap();

  assert_eq!(s.get_status().await.unwrap(), Some(second));
}
