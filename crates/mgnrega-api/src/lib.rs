//! JSON REST API for the MGNREGA dataset.
//!
//! Exposes an axum [`Router`] backed by a [`SyncService`]. Auth, TLS, CORS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", mgnrega_api::api_router(service.clone()))
//! ```

pub mod districts;
pub mod error;
pub mod sync;

use std::sync::Arc;

use axum::{Router, routing::get};
use mgnrega_core::{source::RecordSource, store::DatasetStore};
use mgnrega_sync::SyncService;

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, Src>(service: Arc<SyncService<S, Src>>) -> Router<()>
where
  S: DatasetStore + 'static,
  Src: RecordSource + 'static,
{
  Router::new()
    // Ingestion
    .route("/sync", get(sync::status::<S, Src>).post(sync::trigger::<S, Src>))
    // Consumer reads
    .route("/districts", get(districts::list::<S, Src>))
    .route("/districts/{id}/records", get(districts::series::<S, Src>))
    .with_state(service)
}

#[cfg(test)]
mod tests;
