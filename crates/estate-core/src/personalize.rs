//! The "for you" matcher.
//!
//! A user's stored preference becomes a strict predicate. When that finds
//! nothing, a relaxed predicate that keeps only the price band and purpose
//! runs instead, and the result is labelled as a near match.

use crate::{
  Error, Result,
  listing::Listing,
  preference::{StyleIntent, UserPreference},
  store::{CityMatch, ListingPredicate, ListingStore, ProjectLink, Range, Window},
};

/// Maximum number of recommendations returned by either tier.
pub const RECOMMENDATION_LIMIT: u64 = 20;

pub const NO_PREFERENCE_MESSAGE: &str =
  "Set your preferences to get personalized recommendations.";

pub const NEAR_MATCH_MESSAGE: &str =
  "No exact matches for your preferences. Showing properties in your budget instead.";

/// Outcome of [`recommend`].
#[derive(Debug, Clone)]
pub enum Recommendation {
  /// The user has not saved a preference yet.
  NoPreference,
  /// Listings matching every stored preference.
  Exact(Vec<Listing>),
  /// Nothing matched exactly; these match price band and purpose only.
  Relaxed(Vec<Listing>),
  /// Nothing matched even after relaxing.
  Empty,
}

impl Recommendation {
  pub fn is_near_match(&self) -> bool { matches!(self, Self::Relaxed(_)) }

  pub fn message(&self) -> Option<&'static str> {
    match self {
      Self::NoPreference => Some(NO_PREFERENCE_MESSAGE),
      Self::Relaxed(_) => Some(NEAR_MATCH_MESSAGE),
      Self::Exact(_) | Self::Empty => None,
    }
  }

  pub fn listings(&self) -> &[Listing] {
    match self {
      Self::Exact(l) | Self::Relaxed(l) => l,
      Self::NoPreference | Self::Empty => &[],
    }
  }
}

/// Every stored constraint.
pub fn strict_predicate(pref: &UserPreference) -> ListingPredicate {
  ListingPredicate {
    city: pref.city_id.clone().map(CityMatch::Id),
    property_type: pref.property_type.clone(),
    project: match pref.style {
      StyleIntent::Normal => ProjectLink::Without,
      StyleIntent::Project => ProjectLink::With,
      StyleIntent::Both => ProjectLink::Any,
    },
    ..relaxed_predicate(pref)
  }
}

/// Price band and purpose only.
pub fn relaxed_predicate(pref: &UserPreference) -> ListingPredicate {
  ListingPredicate {
    purpose: pref.purpose.purpose(),
    price: Range::between(pref.min_price, pref.max_price),
    ..ListingPredicate::default()
  }
}

/// Recommend listings for `user_id`.
///
/// Both tiers use the public visibility, so listings with a completed deal
/// are never recommended.
pub async fn recommend<S>(store: &S, user_id: &str) -> Result<Recommendation>
where
  S: ListingStore,
{
  let Some(pref) = store.get_preference(user_id).await.map_err(Error::query)? else {
    return Ok(Recommendation::NoPreference);
  };

  let window = Window::first(RECOMMENDATION_LIMIT);

  let strict = strict_predicate(&pref);
  let exact = store
    .find_listings(&strict, window)
    .await
    .map_err(Error::query)?;
  if !exact.is_empty() {
    return Ok(Recommendation::Exact(exact));
  }

  let relaxed = relaxed_predicate(&pref);
  let near = store
    .find_listings(&relaxed, window)
    .await
    .map_err(Error::query)?;

  tracing::info!(
    user_id,
    near_matches = near.len(),
    "no exact recommendations, fell back to price and purpose"
  );

  if near.is_empty() {
    Ok(Recommendation::Empty)
  } else {
    Ok(Recommendation::Relaxed(near))
  }
}
