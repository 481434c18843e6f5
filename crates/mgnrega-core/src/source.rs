//! The `RecordSource` trait: a paginated upstream feed of raw records.

use std::future::Future;

use crate::{credential::ApiKey, raw::RawExternalRecord};

/// One page of the upstream dataset.
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
  pub records: Vec<RawExternalRecord>,
  /// Total record count reported by the source on this page. May differ
  /// between pages if the upstream dataset changes mid-run.
  pub total:   u64,
}

/// Abstraction over the upstream open-data API.
///
/// Implementations issue exactly one request per call and have no other
/// side effects.
pub trait RecordSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fixed number of records requested per page.
  fn page_size(&self) -> u64;

  /// Fetch the page starting at the zero-based `offset`.
  fn fetch_page<'a>(
    &'a self,
    api_key: &'a ApiKey,
    offset: u64,
  ) -> impl Future<Output = Result<SourcePage, Self::Error>> + Send + 'a;
}
