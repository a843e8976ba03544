//! The `ListingStore` trait and the predicate type it evaluates.
//!
//! The trait is implemented by storage backends (e.g. `estate-store-sqlite`).
//! The search executor, the personalization matcher and the HTTP layer
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  listing::{DealStatus, Listing, Purpose},
  preference::UserPreference,
};

// ─── Predicate fragments ─────────────────────────────────────────────────────

/// Which listings a query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
  /// Hide every listing that has a deal with status `Completed`. Public
  /// search, detail and personalization all use this.
  #[default]
  Public,
  /// No deal-based filtering. Only for the owning agent's inventory view.
  All,
}

/// A constraint on a room count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMatch {
  Exactly(u32),
  AtLeast(u32),
}

impl CountMatch {
  pub fn matches(self, n: u32) -> bool {
    match self {
      Self::Exactly(want) => n == want,
      Self::AtLeast(min) => n >= min,
    }
  }
}

/// Inclusive numeric bounds; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
  pub min: Option<f64>,
  pub max: Option<f64>,
}

impl Range {
  pub fn between(min: f64, max: f64) -> Self {
    Self { min: Some(min), max: Some(max) }
  }

  pub fn is_open(&self) -> bool { self.min.is_none() && self.max.is_none() }

  pub fn contains(&self, v: f64) -> bool {
    self.min.is_none_or(|min| v >= min) && self.max.is_none_or(|max| v <= max)
  }
}

/// How a predicate identifies a city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityMatch {
  /// Case-insensitive name equality.
  Name(String),
  /// Exact reference, as stored on a user preference.
  Id(String),
}

/// Constraint on a listing's project linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectLink {
  #[default]
  Any,
  /// Standalone listings only.
  Without,
  /// Listings belonging to some project.
  With,
}

// ─── Predicate ───────────────────────────────────────────────────────────────

/// A fully-typed listing predicate. Every populated field is AND-ed; the
/// free-text `text` match is OR-ed across title, area name and city name.
///
/// `Default` yields the unconstrained *public* predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPredicate {
  pub city:          Option<CityMatch>,
  pub purpose:       Option<Purpose>,
  /// Case-insensitive property-type name.
  pub property_type: Option<String>,
  pub bedrooms:      Option<CountMatch>,
  pub bathrooms:     Option<CountMatch>,
  pub price:         Range,
  pub area:          Range,
  /// Case-insensitive substring.
  pub text:          Option<String>,
  pub project:       ProjectLink,
  /// Restrict to one agent's listings.
  pub agent_id:      Option<String>,
  pub visibility:    Visibility,
}

/// A slice of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
  pub offset: u64,
  pub limit:  u64,
}

impl Window {
  pub fn first(limit: u64) -> Self { Self { offset: 0, limit } }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read access to listings plus the one user-owned write (preferences).
///
/// Ordering contract for [`ListingStore::find_listings`]: creation time
/// descending, then listing id descending.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait ListingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Count listings matching `predicate`.
  fn count_listings<'a>(
    &'a self,
    predicate: &'a ListingPredicate,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Fetch one window of listings matching `predicate`, relations resolved.
  fn find_listings<'a>(
    &'a self,
    predicate: &'a ListingPredicate,
    window: Window,
  ) -> impl Future<Output = Result<Vec<Listing>, Self::Error>> + Send + 'a;

  /// Retrieve a single listing by id regardless of visibility. Returns `None`
  /// if not found.
  fn get_listing<'a>(
    &'a self,
    listing_id: &'a str,
  ) -> impl Future<Output = Result<Option<Listing>, Self::Error>> + Send + 'a;

  /// Whether any deal on `listing_id` has the given status.
  fn has_deal_with_status<'a>(
    &'a self,
    listing_id: &'a str,
    status: DealStatus,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Look up the preference record owned by `user_id`.
  fn get_preference<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<UserPreference>, Self::Error>> + Send + 'a;

  /// Create or wholesale-replace the preference record for
  /// `preference.user_id`.
  fn upsert_preference(
    &self,
    preference: UserPreference,
  ) -> impl Future<Output = Result<UserPreference, Self::Error>> + Send + '_;
}
