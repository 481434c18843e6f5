//! mgnrega-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `MGNREGA_*` environment variables, opens the SQLite store and serves the
//! sync API over HTTP. With `sync_interval_secs` and `api_key` configured it
//! also runs the pipeline on a schedule.
//!
//! ```sh
//! cargo run -p mgnrega-server -- --seed districts.json --sync-once
//! ```

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use mgnrega_core::credential::ApiKey;
use mgnrega_server::{ServerConfig, app, seed_districts, spawn_periodic_sync};
use mgnrega_source::DataGovClient;
use mgnrega_store_sqlite::SqliteStore;
use mgnrega_sync::{RunOutcome, SyncService};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "MGNREGA district data sync server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// JSON file of `{"name", "state"}` districts to add before starting.
  #[arg(long)]
  seed: Option<PathBuf>,

  /// Run one ingestion with the configured API key and exit.
  #[arg(long)]
  sync_once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(seed) = &cli.seed {
    let added = seed_districts(&store, seed).await?;
    tracing::info!(added, path = %seed.display(), "applied district seed");
  }

  let source = DataGovClient::new(server_cfg.source.clone())
    .context("failed to build data.gov.in client")?;
  let service = Arc::new(SyncService::new(Arc::new(store), Arc::new(source)));

  let api_key = server_cfg
    .api_key
    .clone()
    .and_then(|k| ApiKey::new(k).ok());

  // One-shot mode: ingest and exit.
  if cli.sync_once {
    let api_key = api_key.context("--sync-once requires `api_key` to be configured")?;
    let report = service.run(&api_key).await?;
    return Ok(match &report.outcome {
      RunOutcome::Completed(s) => {
        tracing::info!(
          pages = s.pages,
          persisted = s.persisted,
          dropped = s.dropped(),
          "sync completed"
        );
        ExitCode::SUCCESS
      }
      RunOutcome::Failed(f) => {
        tracing::error!(error = %f.error, persisted = f.persisted, "sync failed");
        ExitCode::FAILURE
      }
    });
  }

  match (server_cfg.sync_interval(), api_key) {
    (Some(every), Some(key)) => {
      tracing::info!(interval_secs = every.as_secs(), "scheduled sync enabled");
      spawn_periodic_sync(service.clone(), key, every);
    }
    (Some(_), None) => {
      tracing::warn!("sync_interval_secs is set but no api_key is configured; scheduled sync disabled");
    }
    (None, _) => {}
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(service))
    .await
    .context("server error")?;

  Ok(ExitCode::SUCCESS)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
