//! Read-only consumer endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/districts` | Districts with at least one record, by name |
//! | `GET`  | `/districts/{id}/records` | Time-ordered series; 404 if the district is unknown |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use mgnrega_core::{
  district::District,
  record::PerformanceRecord,
  source::RecordSource,
  store::DatasetStore,
};
use mgnrega_sync::SyncService;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /districts`
pub async fn list<S, Src>(
  State(service): State<Arc<SyncService<S, Src>>>,
) -> Result<Json<Vec<District>>, ApiError>
where
  S: DatasetStore + 'static,
  Src: RecordSource + 'static,
{
  let districts = service
    .store()
    .tracked_districts()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(districts))
}

/// `GET /districts/:id/records`
pub async fn series<S, Src>(
  State(service): State<Arc<SyncService<S, Src>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<PerformanceRecord>>, ApiError>
where
  S: DatasetStore + 'static,
  Src: RecordSource + 'static,
{
  let store = service.store();
  let known = store
    .list_districts()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .iter()
    .any(|d| d.id == id);
  if !known {
    return Err(ApiError::NotFound(format!("district {id} not found")));
  }

  let records = store
    .district_series(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(records))
}
