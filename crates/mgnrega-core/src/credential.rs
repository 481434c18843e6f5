//! The caller-supplied credential for the upstream API.

use std::fmt;

use crate::{Error, Result};

/// A non-empty data.gov.in API key.
///
/// The key is passed through to the upstream request and nowhere else; its
/// `Debug` output is redacted so it never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
  /// Wrap a key, rejecting empty or whitespace-only input.
  pub fn new(key: impl Into<String>) -> Result<Self> {
    let key = key.into();
    let trimmed = key.trim();
    if trimmed.is_empty() {
      return Err(Error::MissingCredential);
    }
    Ok(Self(trimmed.to_owned()))
  }

  /// Convenience for request bodies where the key may be absent.
  pub fn from_optional(key: Option<String>) -> Result<Self> {
    key.ok_or(Error::MissingCredential).and_then(Self::new)
  }

  pub fn expose(&self) -> &str { &self.0 }
}

impl fmt::Debug for ApiKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("ApiKey(***)")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_key_is_missing_credential() {
    assert!(matches!(ApiKey::new("   "), Err(Error::MissingCredential)));
    assert!(matches!(ApiKey::from_optional(None), Err(Error::MissingCredential)));
  }

  #[test]
  fn key_is_trimmed_and_redacted() {
    let key = ApiKey::new(" abc123 ").unwrap();
    assert_eq!(key.expose(), "abc123");
    assert_eq!(format!("{key:?}"), "ApiKey(***)");
  }
}
