//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use mgnrega_core::{
  credential::ApiKey,
  district::NewDistrict,
  raw::RawExternalRecord,
  source::{RecordSource, SourcePage},
  store::DatasetStore,
};
use mgnrega_store_sqlite::SqliteStore;
use mgnrega_sync::SyncService;
use serde_json::Value;
use tower::ServiceExt as _;

use crate::api_router;

#[derive(Debug, thiserror::Error)]
#[error("upstream unavailable")]
struct Unavailable;

/// Serves fixed pages of `page_size`; fails at `fail_at` if set.
struct FixedSource {
  records:   Vec<RawExternalRecord>,
  page_size: u64,
  fail_at:   Option<u64>,
}

impl RecordSource for FixedSource {
  type Error = Unavailable;

  fn page_size(&self) -> u64 { self.page_size }

  async fn fetch_page<'a>(&'a self, _api_key: &'a ApiKey, offset: u64) -> Result<SourcePage, Unavailable> {
    if self.fail_at == Some(offset) {
      return Err(Unavailable);
    }
    let start = (offset as usize).min(self.records.len());
    let end = (start + self.page_size as usize).min(self.records.len());
    Ok(SourcePage {
      records: self.records[start..end].to_vec(),
      total:   self.records.len() as u64,
    })
  }
}

fn raw(district: &str, month: &str, persondays: i64) -> RawExternalRecord {
  RawExternalRecord {
    fin_year: "2024-2025".into(),
    month: month.into(),
    district_name: district.into(),
    persondays: Some(persondays),
    women_persondays: Some(persondays / 2),
    ..Default::default()
  }
}

fn sample_records() -> Vec<RawExternalRecord> {
  vec![
    raw("PUNE", "May", 100),
    raw("Pune", "Apr", 200),
    raw("Nagpur", "Apr", 300),
    raw("Atlantis", "Apr", 400),
  ]
}

async fn app(fail_at: Option<u64>) -> (Router, Arc<SyncService<SqliteStore, FixedSource>>) {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store.add_district(NewDistrict::new("Pune", "Maharashtra")).await.unwrap();
  store.add_district(NewDistrict::new("Nagpur", "Maharashtra")).await.unwrap();
  store.add_district(NewDistrict::new("Ajmer", "Rajasthan")).await.unwrap();

  let source = FixedSource { records: sample_records(), page_size: 2, fail_at };
  let service = Arc::new(SyncService::new(Arc::new(store), Arc::new(source)));
  (api_router(service.clone()), service)
}

async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if body.is_some() {
    builder = builder.header(header::CONTENT_TYPE, "application/json");
  }
  let req = builder
    .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, json)
}

// ── Trigger ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn trigger_without_key_is_bad_request() {
  let (app, service) = app(None).await;

  let (status, body) = send(app.clone(), "POST", "/sync", Some("{}")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "missing_credential");

  let (status, _) = send(app, "POST", "/sync", Some(r#"{"api_key":"  "}"#)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(service.store().count_records().await.unwrap(), 0);
}

#[tokio::test]
async fn trigger_without_body_is_bad_request() {
  let (app, service) = app(None).await;

  let (status, body) = send(app, "POST", "/sync", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "missing_credential");
  assert!(body["error"].is_string());
  assert!(service.store().get_status().await.unwrap().is_none());
}

#[tokio::test]
async fn trigger_runs_the_pipeline() {
  let (app, service) = app(None).await;

  let (status, body) = send(app, "POST", "/sync", Some(r#"{"apiKey":"k"}"#)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);
  assert_eq!(body["summary"]["pages"], 2);
  assert_eq!(body["summary"]["fetched"], 4);
  assert_eq!(body["summary"]["persisted"], 3);
  assert_eq!(body["summary"]["dropped_unresolved"], 1);
  assert_eq!(service.store().count_records().await.unwrap(), 3);
}

#[tokio::test]
async fn failed_run_reports_partial_progress() {
  let (app, _) = app(Some(2)).await;

  let (status, body) = send(app, "POST", "/sync", Some(r#"{"api_key":"k"}"#)).await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert_eq!(body["kind"], "source_unavailable");
  assert_eq!(body["persisted_before_failure"], 2);
  assert_eq!(body["status_recorded"], true);
}

#[tokio::test]
async fn concurrent_trigger_conflicts() {
  let (app, service) = app(None).await;
  let _lease = service.lock().try_acquire().unwrap();

  let (status, body) = send(app, "POST", "/sync", Some(r#"{"api_key":"k"}"#)).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["kind"], "already_running");
}

// ── Status ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn status_reports_live_count() {
  let (app, _) = app(None).await;

  let (status, body) = send(app.clone(), "GET", "/sync", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total_records"], 0);
  assert_eq!(body["last_updated"], Value::Null);

  send(app.clone(), "POST", "/sync", Some(r#"{"api_key":"k"}"#)).await;

  let (_, body) = send(app, "GET", "/sync", None).await;
  assert_eq!(body["total_records"], 3);
  assert_eq!(body["recorded_total"], 3);
  assert_eq!(body["source_status"], "active");
  assert_eq!(body["running"], false);
}

// ── Consumer reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn districts_and_series() {
  let (app, service) = app(None).await;
  send(app.clone(), "POST", "/sync", Some(r#"{"api_key":"k"}"#)).await;

  let (status, body) = send(app.clone(), "GET", "/districts", None).await;
  assert_eq!(status, StatusCode::OK);
  let names: Vec<_> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|d| d["name"].as_str().unwrap().to_string())
    .collect();
  assert_eq!(names, ["Nagpur", "Pune"]);

  let pune = service
    .store()
    .list_districts()
    .await
    .unwrap()
    .into_iter()
    .find(|d| d.name == "Pune")
    .unwrap();
  let (status, body) = send(app.clone(), "GET", &format!("/districts/{}/records", pune.id), None).await;
  assert_eq!(status, StatusCode::OK);
  let months: Vec<_> = body.as_array().unwrap().iter().map(|r| r["month"].as_u64().unwrap()).collect();
  assert_eq!(months, [4, 5]);
  assert_eq!(body[0]["women_participation_pct"], 50.0);

  let (status, _) = send(
    app,
    "GET",
    "/districts/00000000-0000-0000-0000-000000000000/records",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
