//! Case-insensitive district name resolution.
//!
//! The index is built fresh at the start of every run from the store's
//! current district set, so districts seeded between runs are picked up
//! without a restart.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{Error, Result, district::District};

/// In-memory `name → district id` mapping. Matching is exact apart from
/// case; there is no trimming, fuzzy or partial matching.
#[derive(Debug, Clone, Default)]
pub struct ResolverIndex {
  by_name: HashMap<String, Uuid>,
}

fn fold(name: &str) -> String { name.to_lowercase() }

impl ResolverIndex {
  /// Build an index, failing if two districts share a name ignoring case.
  pub fn build(districts: &[District]) -> Result<Self> {
    let mut by_name = HashMap::with_capacity(districts.len());
    for d in districts {
      if by_name.insert(fold(&d.name), d.id).is_some() {
        return Err(Error::DuplicateDistrictName(d.name.clone()));
      }
    }
    Ok(Self { by_name })
  }

  /// Look up a district id. `None` is an expected outcome for districts
  /// outside the tracked set.
  pub fn resolve(&self, name: &str) -> Option<Uuid> {
    self.by_name.get(&fold(name)).copied()
  }

  pub fn len(&self) -> usize { self.by_name.len() }

  pub fn is_empty(&self) -> bool { self.by_name.is_empty() }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn district(name: &str) -> District {
    District {
      id:         Uuid::new_v4(),
      name:       name.into(),
      state:      "Maharashtra".into(),
      created_at: Utc::now(),
    }
  }

  #[test]
  fn resolves_ignoring_case() {
    let pune = district("Pune");
    let index = ResolverIndex::build(&[pune.clone(), district("Nagpur")]).unwrap();

    assert_eq!(index.resolve("PUNE"), Some(pune.id));
    assert_eq!(index.resolve("pune"), Some(pune.id));
    assert_eq!(index.len(), 2);
  }

  #[test]
  fn no_partial_or_padded_matches() {
    let index = ResolverIndex::build(&[district("Pune")]).unwrap();
    assert_eq!(index.resolve("Pun"), None);
    assert_eq!(index.resolve("Pune "), None);
    assert_eq!(index.resolve("Pune City"), None);
  }

  #[test]
  fn duplicate_names_are_rejected() {
    let err = ResolverIndex::build(&[district("Pune"), district("PUNE")]).unwrap_err();
    assert!(matches!(err, Error::DuplicateDistrictName(name) if name == "PUNE"));
  }
}
