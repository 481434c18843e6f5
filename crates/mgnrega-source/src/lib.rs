//! data.gov.in client for the MGNREGA "district-wise data at a glance"
//! resource.
//!
//! Implements [`mgnrega_core::source::RecordSource`]: one offset/limit page per
//! call, authenticated with a per-request `api-key` query parameter.

pub mod client;
pub mod error;

pub use client::{DataGovClient, SourceConfig};
pub use error::{Error, Result};
