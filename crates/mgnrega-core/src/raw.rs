//! Upstream record shape, as published by the data.gov.in MGNREGA resource.
//!
//! A [`RawExternalRecord`] only ever lives inside a fetched page. It is never
//! persisted verbatim; the transformer maps it onto the canonical schema.
//!
//! The upstream API is loose about types: the same column can arrive as a
//! JSON number, a numeric string with thousands separators, an empty string
//! or `"NA"`. The [`lenient`] helpers absorb those variations.

use serde::{Deserialize, Serialize};

/// One row of the upstream dataset. Unknown columns are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawExternalRecord {
  /// Fiscal year, e.g. `"2024-2025"`.
  #[serde(default, deserialize_with = "lenient::text")]
  pub fin_year:      String,
  /// Month as a name (`"Dec"`, `"December"`) or number.
  #[serde(default, deserialize_with = "lenient::text")]
  pub month:         String,
  #[serde(default, deserialize_with = "lenient::text")]
  pub state_name:    String,
  #[serde(default, deserialize_with = "lenient::text")]
  pub district_name: String,
  #[serde(default, deserialize_with = "lenient::text")]
  pub district_code: String,

  #[serde(rename = "Total_Households_Worked", default, deserialize_with = "lenient::integer")]
  pub total_households_worked: Option<i64>,
  #[serde(rename = "Total_Individuals_Worked", default, deserialize_with = "lenient::integer")]
  pub total_individuals_worked: Option<i64>,
  #[serde(
    rename = "Persondays_of_Central_Liability_so_far",
    default,
    deserialize_with = "lenient::integer"
  )]
  pub persondays: Option<i64>,
  #[serde(rename = "Women_Persondays", default, deserialize_with = "lenient::integer")]
  pub women_persondays: Option<i64>,
  #[serde(rename = "SC_persondays", default, deserialize_with = "lenient::integer")]
  pub sc_persondays: Option<i64>,
  #[serde(rename = "ST_persondays", default, deserialize_with = "lenient::integer")]
  pub st_persondays: Option<i64>,
  #[serde(rename = "Wages", default, deserialize_with = "lenient::number")]
  pub wages: Option<f64>,
  #[serde(rename = "Material_and_skilled_Wages", default, deserialize_with = "lenient::number")]
  pub material_and_skilled_wages: Option<f64>,
  #[serde(rename = "Total_Exp", default, deserialize_with = "lenient::number")]
  pub total_exp: Option<f64>,
  #[serde(rename = "Total_Adm_Expenditure", default, deserialize_with = "lenient::number")]
  pub total_adm_expenditure: Option<f64>,
  #[serde(
    rename = "Average_Wage_rate_per_day_per_person",
    default,
    deserialize_with = "lenient::number"
  )]
  pub average_wage_rate: Option<f64>,
  #[serde(
    rename = "Average_days_of_employment_provided_per_Household",
    default,
    deserialize_with = "lenient::number"
  )]
  pub average_days_per_household: Option<f64>,
  #[serde(rename = "Approved_Labour_Budget", default, deserialize_with = "lenient::number")]
  pub approved_labour_budget: Option<f64>,
  #[serde(
    rename = "Total_No_of_HHs_completed_100_Days_of_Wage_Employment",
    default,
    deserialize_with = "lenient::integer"
  )]
  pub households_completed_100_days: Option<i64>,
  #[serde(rename = "Number_of_Completed_Works", default, deserialize_with = "lenient::integer")]
  pub completed_works: Option<i64>,
  #[serde(rename = "Number_of_Ongoing_Works", default, deserialize_with = "lenient::integer")]
  pub ongoing_works: Option<i64>,
  #[serde(rename = "Remarks", default, deserialize_with = "lenient::text")]
  pub remarks: String,
}

/// `deserialize_with` helpers for loosely-typed upstream columns.
pub mod lenient {
  use serde::{Deserialize, Deserializer, de::IgnoredAny};

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Loose {
    Num(f64),
    Text(String),
    Other(IgnoredAny),
  }

  /// Parse a numeric string, tolerating surrounding whitespace and `,`
  /// thousands separators. Placeholders like `""`, `"NA"` and `"-"` are
  /// absent values.
  pub fn parse_numeric(s: &str) -> Option<f64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.as_str() {
      "" | "-" => None,
      t if t.eq_ignore_ascii_case("na") || t.eq_ignore_ascii_case("null") => None,
      t => t.parse::<f64>().ok().filter(|n| n.is_finite()),
    }
  }

  /// A floating-point column.
  pub fn number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<Loose>::deserialize(d)? {
      Some(Loose::Num(n)) if n.is_finite() => Some(n),
      Some(Loose::Text(s)) => parse_numeric(&s),
      _ => None,
    })
  }

  /// An integral column. Fractional values are rounded to the nearest
  /// integer.
  pub fn integer<'de, D>(d: D) -> Result<Option<i64>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(number(d)?.map(|n| n.round() as i64))
  }

  /// A required non-negative count (e.g. the page envelope's `total`).
  pub fn count<'de, D>(d: D) -> Result<u64, D::Error>
  where
    D: Deserializer<'de>,
  {
    match number(d)? {
      Some(n) if n >= 0.0 => Ok(n.round() as u64),
      _ => Err(serde::de::Error::custom("expected a non-negative count")),
    }
  }

  /// A text column. Numbers are rendered without a trailing `.0`; `null`
  /// becomes the empty string.
  pub fn text<'de, D>(d: D) -> Result<String, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<Loose>::deserialize(d)? {
      Some(Loose::Text(s)) => s,
      Some(Loose::Num(n)) if n.fract() == 0.0 => format!("{}", n as i64),
      Some(Loose::Num(n)) => n.to_string(),
      _ => String::new(),
    })
  }
}
