//! Compilation of raw listing filters into a typed [`FilterSpec`].
//!
//! Filters arrive as optional strings straight off the query string. Nothing
//! here rejects a request: a value that cannot be understood is dropped and
//! reported as a [`FilterIssue`], and the listing query runs without it.

use serde::Deserialize;

use crate::{
  listing::Purpose,
  store::{CityMatch, CountMatch, ListingPredicate, Range},
};

// ─── Raw input ───────────────────────────────────────────────────────────────

/// Filter parameters exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFilters {
  pub city:      Option<String>,
  pub purpose:   Option<String>,
  #[serde(rename = "type")]
  pub kind:      Option<String>,
  pub bedrooms:  Option<String>,
  pub bathrooms: Option<String>,
  pub min_price: Option<String>,
  pub max_price: Option<String>,
  pub min_area:  Option<String>,
  pub max_area:  Option<String>,
  pub location:  Option<String>,
}

// ─── Compiled output ─────────────────────────────────────────────────────────

/// One optional field per recognised filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
  pub city:          Option<String>,
  pub purpose:       Option<Purpose>,
  pub property_type: Option<String>,
  pub bedrooms:      Option<CountMatch>,
  pub bathrooms:     Option<CountMatch>,
  pub price:         Range,
  pub area:          Range,
  pub location:      Option<String>,
}

/// A filter value that was ignored during compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterIssue {
  pub filter: &'static str,
  pub value:  String,
}

impl std::fmt::Display for FilterIssue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "ignored malformed `{}` filter: {:?}", self.filter, self.value)
  }
}

/// Result of [`FilterSpec::compile`].
#[derive(Debug, Clone, Default)]
pub struct Compiled {
  pub spec:   FilterSpec,
  pub issues: Vec<FilterIssue>,
}

// ─── Compiler ────────────────────────────────────────────────────────────────

impl FilterSpec {
  /// Normalise raw parameters. Never fails.
  pub fn compile(raw: &RawFilters) -> Compiled {
    let mut issues = Vec::new();

    let city = present(&raw.city)
      .filter(|v| !v.eq_ignore_ascii_case("all"))
      .map(str::to_owned);

    let purpose = present(&raw.purpose)
      .filter(|v| !v.eq_ignore_ascii_case("all"))
      .and_then(|v| note(&mut issues, "purpose", v, Purpose::from_wire(v)));

    let property_type = present(&raw.kind)
      .filter(|v| !v.eq_ignore_ascii_case("all"))
      .map(str::to_owned);

    let bedrooms = present(&raw.bedrooms)
      .filter(|v| !v.eq_ignore_ascii_case("any"))
      .and_then(|v| note(&mut issues, "bedrooms", v, parse_count(v)));

    let bathrooms = present(&raw.bathrooms)
      .filter(|v| !v.eq_ignore_ascii_case("any"))
      .and_then(|v| note(&mut issues, "bathrooms", v, parse_count(v)));

    let price = Range {
      min: number(&mut issues, "minPrice", &raw.min_price),
      max: number(&mut issues, "maxPrice", &raw.max_price),
    };

    let area = Range {
      min: number(&mut issues, "minArea", &raw.min_area),
      max: number(&mut issues, "maxArea", &raw.max_area),
    };

    let location = present(&raw.location).map(str::to_owned);

    Compiled {
      spec: FilterSpec {
        city,
        purpose,
        property_type,
        bedrooms,
        bathrooms,
        price,
        area,
        location,
      },
      issues,
    }
  }

  /// Lower into a store predicate. Visibility stays at its public default.
  pub fn into_predicate(self) -> ListingPredicate {
    ListingPredicate {
      city: self.city.map(CityMatch::Name),
      purpose: self.purpose,
      property_type: self.property_type,
      bedrooms: self.bedrooms,
      bathrooms: self.bathrooms,
      price: self.price,
      area: self.area,
      text: self.location,
      ..ListingPredicate::default()
    }
  }
}

/// Trimmed, non-empty value.
fn present(v: &Option<String>) -> Option<&str> {
  v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Record an issue when `parsed` is `None`, then pass it through.
fn note<T>(
  issues: &mut Vec<FilterIssue>,
  filter: &'static str,
  value: &str,
  parsed: Option<T>,
) -> Option<T> {
  if parsed.is_none() {
    issues.push(FilterIssue { filter, value: value.to_owned() });
  }
  parsed
}

fn number(
  issues: &mut Vec<FilterIssue>,
  filter: &'static str,
  raw: &Option<String>,
) -> Option<f64> {
  let v = present(raw)?;
  let parsed = v.parse::<f64>().ok().filter(|n| n.is_finite());
  note(issues, filter, v, parsed)
}

/// `"3"` → exactly 3, `"5+"` → at least 5.
fn parse_count(v: &str) -> Option<CountMatch> {
  match v.strip_suffix('+') {
    Some(n) => n.trim().parse().ok().map(CountMatch::AtLeast),
    None => v.parse().ok().map(CountMatch::Exactly),
  }
}
