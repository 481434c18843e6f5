//! Raw upstream record → canonical record.

use crate::{
  raw::RawExternalRecord,
  record::{Metrics, Month, NewPerformanceRecord},
  resolver::ResolverIndex,
};

/// Why a raw record did not make it into the canonical batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
  /// The district name has no match in the tracked set.
  UnresolvedDistrict,
  /// The fiscal year or month could not be read.
  Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transformed {
  Record(NewPerformanceRecord),
  Dropped(DropReason),
}

/// Map one upstream record onto the canonical schema.
///
/// District resolution is checked first, so a record that is both
/// unresolvable and malformed counts as unresolved.
pub fn transform(raw: &RawExternalRecord, index: &ResolverIndex) -> Transformed {
  let Some(district_id) = index.resolve(&raw.district_name) else {
    return Transformed::Dropped(DropReason::UnresolvedDistrict);
  };

  let fiscal_year = raw.fin_year.trim();
  let Some(month) = Month::parse(&raw.month) else {
    return Transformed::Dropped(DropReason::Malformed);
  };
  if fiscal_year.is_empty() {
    return Transformed::Dropped(DropReason::Malformed);
  }

  let metrics = copy_metrics(raw);
  Transformed::Record(NewPerformanceRecord {
    district_id,
    fiscal_year: fiscal_year.to_owned(),
    month,
    women_participation_pct: participation_pct(metrics.women_persondays, metrics.persondays),
    sc_participation_pct: participation_pct(metrics.sc_persondays, metrics.persondays),
    st_participation_pct: participation_pct(metrics.st_persondays, metrics.persondays),
    metrics,
  })
}

/// `100 × part / total`, clamped to `[0, 100]`.
///
/// Returns `None` when the ratio is undefined: a zero or missing total, or a
/// missing numerator.
pub fn participation_pct(part: Option<i64>, total: Option<i64>) -> Option<f64> {
  let (part, total) = (part?, total?);
  if total <= 0 {
    return None;
  }
  Some((part as f64 * 100.0 / total as f64).clamp(0.0, 100.0))
}

fn copy_metrics(raw: &RawExternalRecord) -> Metrics {
  let remarks = raw.remarks.trim();
  Metrics {
    households_worked:             raw.total_households_worked,
    individuals_worked:            raw.total_individuals_worked,
    persondays:                    raw.persondays,
    women_persondays:              raw.women_persondays,
    sc_persondays:                 raw.sc_persondays,
    st_persondays:                 raw.st_persondays,
    wages:                         raw.wages,
    material_and_skilled_wages:    raw.material_and_skilled_wages,
    total_expenditure:             raw.total_exp,
    admin_expenditure:             raw.total_adm_expenditure,
    average_wage_rate:             raw.average_wage_rate,
    average_days_per_household:    raw.average_days_per_household,
    approved_labour_budget:        raw.approved_labour_budget,
    households_completed_100_days: raw.households_completed_100_days,
    completed_works:               raw.completed_works,
    ongoing_works:                 raw.ongoing_works,
    remarks:                       (!remarks.is_empty()).then(|| remarks.to_owned()),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::district::District;

  fn index_with(name: &str) -> (ResolverIndex, Uuid) {
    let id = Uuid::new_v4();
    let index = ResolverIndex::build(&[District {
      id,
      name: name.into(),
      state: "Rajasthan".into(),
      created_at: Utc::now(),
    }])
    .unwrap();
    (index, id)
  }

  fn raw(district: &str, persondays: Option<i64>, women: Option<i64>) -> RawExternalRecord {
    RawExternalRecord {
      fin_year: "2024-2025".into(),
      month: "Dec".into(),
      district_name: district.into(),
      persondays,
      women_persondays: women,
      total_exp: Some(98_765.4),
      ..Default::default()
    }
  }

  #[test]
  fn resolved_record_is_mapped_with_derived_ratio() {
    let (index, id) = index_with("Ajmer");
    let Transformed::Record(rec) = transform(&raw("AJMER", Some(1000), Some(600)), &index) else {
      panic!("expected a record");
    };
    assert_eq!(rec.district_id, id);
    assert_eq!(rec.fiscal_year, "2024-2025");
    assert_eq!(rec.month.number(), 12);
    assert_eq!(rec.women_participation_pct, Some(60.0));
    // Source units are kept as-is.
    assert_eq!(rec.metrics.total_expenditure, Some(98_765.4));
    assert_eq!(rec.metrics.remarks, None);
  }

  #[test]
  fn unresolved_district_is_dropped() {
    let (index, _) = index_with("Ajmer");
    assert_eq!(
      transform(&raw("Jaipur", Some(10), Some(5)), &index),
      Transformed::Dropped(DropReason::UnresolvedDistrict)
    );
  }

  #[test]
  fn bad_month_or_year_is_malformed() {
    let (index, _) = index_with("Ajmer");
    let mut bad_month = raw("Ajmer", None, None);
    bad_month.month = "Smarch".into();
    assert_eq!(transform(&bad_month, &index), Transformed::Dropped(DropReason::Malformed));

    let mut bad_year = raw("Ajmer", None, None);
    bad_year.fin_year = "  ".into();
    assert_eq!(transform(&bad_year, &index), Transformed::Dropped(DropReason::Malformed));
  }

  #[test]
  fn zero_persondays_yields_sentinel() {
    assert_eq!(participation_pct(Some(0), Some(0)), None);
    assert_eq!(participation_pct(Some(5), None), None);
    assert_eq!(participation_pct(None, Some(5)), None);
  }

  #[test]
  fn participation_is_bounded() {
    assert_eq!(participation_pct(Some(150), Some(100)), Some(100.0));
    assert_eq!(participation_pct(Some(-3), Some(100)), Some(0.0));
    assert_eq!(participation_pct(Some(1), Some(3)).map(|p| (p * 100.0).round()), Some(3333.0));
  }
}
