//! Wiring for the MGNREGA sync server: configuration, district seeding, the
//! periodic ingestion task and the HTTP application.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use axum::Router;
use mgnrega_core::{
  credential::ApiKey,
  district::NewDistrict,
  source::RecordSource,
  store::DatasetStore,
};
use mgnrega_source::SourceConfig;
use mgnrega_store_sqlite::SqliteStore;
use mgnrega_sync::{RunOutcome, SyncService, TriggerError};
use serde::Deserialize;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `MGNREGA_*` environment variables.
///
/// Not `Debug`: it carries the API key.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  /// Credential for scheduled and `--sync-once` runs. HTTP triggers bring
  /// their own.
  #[serde(default)]
  pub api_key:            Option<String>,
  /// Run the pipeline on this interval when `api_key` is also set.
  #[serde(default)]
  pub sync_interval_secs: Option<u64>,
  #[serde(default)]
  pub source:             SourceConfig,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("mgnrega.db") }

impl ServerConfig {
  /// Layer the optional TOML file under `MGNREGA_*` environment variables
  /// (`__` separates nested keys, e.g. `MGNREGA_SOURCE__PAGE_SIZE`).
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("MGNREGA")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  /// The configured interval, if periodic ingestion is enabled.
  pub fn sync_interval(&self) -> Option<Duration> {
    self
      .sync_interval_secs
      .filter(|secs| *secs > 0)
      .map(Duration::from_secs)
  }
}

// ─── Seeding ──────────────────────────────────────────────────────────────────

/// Load districts from a JSON array of `{"name", "state"}` objects.
///
/// Names that already exist are skipped, so re-seeding is harmless. Returns
/// the number of districts added.
pub async fn seed_districts(store: &SqliteStore, path: &Path) -> anyhow::Result<usize> {
  let raw = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("reading seed file {}", path.display()))?;
  let seeds: Vec<NewDistrict> =
    serde_json::from_str(&raw).context("parsing seed file")?;

  let mut added = 0;
  for seed in seeds {
    match store.add_district(seed).await {
      Ok(d) => {
        tracing::debug!(name = %d.name, state = %d.state, "seeded district");
        added += 1;
      }
      Err(mgnrega_store_sqlite::Error::DuplicateDistrict(name)) => {
        tracing::debug!(%name, "district already present");
      }
      Err(e) => return Err(e).context("seeding districts"),
    }
  }
  Ok(added)
}

// ─── Scheduling ───────────────────────────────────────────────────────────────

/// Run the pipeline every `every`, starting immediately. A tick that finds a
/// run already in progress is skipped.
pub fn spawn_periodic_sync<S, Src>(
  service: Arc<SyncService<S, Src>>,
  api_key: ApiKey,
  every: Duration,
) -> JoinHandle<()>
where
  S: DatasetStore + 'static,
  Src: RecordSource + 'static,
{
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
      ticker.tick().await;
      match service.run(&api_key).await {
        Ok(report) => match &report.outcome {
          RunOutcome::Completed(s) => tracing::info!(
            persisted = s.persisted,
            dropped = s.dropped(),
            "scheduled sync completed"
          ),
          RunOutcome::Failed(f) => tracing::warn!(
            error = %f.error,
            persisted = f.persisted,
            "scheduled sync failed; retrying next interval"
          ),
        },
        Err(TriggerError::AlreadyRunning) => {
          tracing::info!("sync already in progress; skipping scheduled run");
        }
        Err(e) => tracing::warn!(error = %e, "scheduled sync not started"),
      }
    }
  })
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Mount the JSON API under `/api` with request tracing and permissive CORS
/// for the dashboard.
pub fn app<S, Src>(service: Arc<SyncService<S, Src>>) -> Router
where
  S: DatasetStore + 'static,
  Src: RecordSource + 'static,
{
  Router::new()
    .nest("/api", mgnrega_api::api_router(service))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}
