//! Async HTTP client for the data.gov.in resource API.

use std::time::Duration;

use mgnrega_core::{
  credential::ApiKey,
  raw::{RawExternalRecord, lenient},
  source::{RecordSource, SourcePage},
};
use reqwest::{Client, header};
use serde::Deserialize;

use crate::{Error, Result};

/// Longest slice of an error response body kept in [`Error::Status`].
const MAX_ERROR_BODY: usize = 256;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Upstream connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
  pub base_url:     String,
  pub resource_id:  String,
  /// Records requested per page.
  pub page_size:    u64,
  pub timeout_secs: u64,
}

impl Default for SourceConfig {
  fn default() -> Self {
    Self {
      base_url:     "https://api.data.gov.in/resource".to_string(),
      resource_id:  "ee03643a-ee4c-48c2-ac30-9f2ff26ab722".to_string(),
      page_size:    100,
      timeout_secs: 30,
    }
  }
}

// ─── Wire envelope ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Envelope {
  #[serde(default)]
  status:  Option<String>,
  #[serde(default)]
  message: Option<String>,
  #[serde(default, deserialize_with = "lenient_total")]
  total:   Option<u64>,
  #[serde(default)]
  records: Vec<RawExternalRecord>,
}

fn lenient_total<'de, D>(d: D) -> std::result::Result<Option<u64>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  lenient::count(d).map(Some)
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// data.gov.in implementation of [`RecordSource`].
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct DataGovClient {
  client: Client,
  config: SourceConfig,
}

impl DataGovClient {
  pub fn new(config: SourceConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/{}",
      self.config.base_url.trim_end_matches('/'),
      self.config.resource_id
    )
  }

  async fn get_page(&self, api_key: &ApiKey, offset: u64) -> Result<SourcePage> {
    let resp = self
      .client
      .get(self.url())
      .header(header::ACCEPT, "application/json")
      .query(&[
        ("api-key", api_key.expose().to_string()),
        ("format", "json".to_string()),
        ("offset", offset.to_string()),
        ("limit", self.config.page_size.to_string()),
      ])
      .send()
      .await?;

    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
      let mut body = body;
      if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
          .rev()
          .find(|i| body.is_char_boundary(*i))
          .unwrap_or(0);
        body.truncate(cut);
      }
      return Err(Error::Status { status, body });
    }

    let envelope: Envelope = serde_json::from_str(&body)?;
    if envelope.status.as_deref() == Some("error") {
      return Err(Error::Upstream(
        envelope.message.unwrap_or_else(|| "unspecified error".to_string()),
      ));
    }
    let Some(total) = envelope.total else {
      return Err(Error::Upstream("response carries no total".to_string()));
    };

    tracing::debug!(offset, total, records = envelope.records.len(), "fetched page");
    Ok(SourcePage { records: envelope.records, total })
  }
}

impl RecordSource for DataGovClient {
  type Error = Error;

  fn page_size(&self) -> u64 { self.config.page_size }

  async fn fetch_page<'a>(&'a self, api_key: &'a ApiKey, offset: u64) -> Result<SourcePage> {
    self.get_page(api_key, offset).await
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
