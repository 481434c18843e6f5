//! Core types and trait definitions for the MGNREGA ingestion pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store and the upstream source are expressed as traits; the resolver and
//! the transformer are pure functions over the types defined here.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod credential;
pub mod district;
pub mod error;
pub mod raw;
pub mod record;
pub mod resolver;
pub mod source;
pub mod status;
pub mod store;
pub mod transform;

pub use error::{Error, Result};
