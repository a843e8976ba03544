//! Handlers for `/preferences`: the caller's own recommendation settings.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/preferences` | 404 until the first save |
//! | `PUT`  | `/preferences` | Body: [`PreferenceBody`]; overwrites wholesale |

use axum::{Json, extract::State};
use estate_core::{
  preference::{PurposeIntent, StyleIntent, UserPreference},
  store::ListingStore,
};
use serde::Deserialize;

use crate::{
  ApiState,
  auth::Caller,
  error::{ApiError, Result},
};

// ─── Get ─────────────────────────────────────────────────────────────────────

/// `GET /preferences`
pub async fn get<S, R>(
  State(state): State<ApiState<S, R>>,
  Caller(user_id): Caller,
) -> Result<Json<UserPreference>>
where
  S: ListingStore,
  R: Send + Sync,
{
  let preference = state
    .store
    .get_preference(&user_id)
    .await
    .map_err(ApiError::upstream)?
    .ok_or_else(|| ApiError::NotFound("no preferences saved".to_owned()))?;
  Ok(Json(preference))
}

// ─── Put ─────────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /preferences`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceBody {
  pub purpose:       PurposeIntent,
  pub city_id:       Option<String>,
  /// Property-type name; `"BOTH"` or blank means any type.
  pub property_type: Option<String>,
  pub style:         StyleIntent,
  pub min_price:     f64,
  pub max_price:     f64,
}

impl PreferenceBody {
  fn into_preference(self, user_id: String) -> Result<UserPreference> {
    for (name, value) in [("minPrice", self.min_price), ("maxPrice", self.max_price)] {
      if !value.is_finite() || value < 0.0 {
        return Err(ApiError::BadRequest(format!("{name} must be a non-negative number")));
      }
    }
    if self.min_price > self.max_price {
      return Err(ApiError::BadRequest("minPrice must not exceed maxPrice".to_owned()));
    }

    let blank_to_none = |v: Option<String>| {
      v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
    };

    Ok(UserPreference {
      user_id,
      purpose: self.purpose,
      city_id: blank_to_none(self.city_id),
      property_type: blank_to_none(self.property_type)
        .filter(|t| !t.eq_ignore_ascii_case("both")),
      style: self.style,
      min_price: self.min_price,
      max_price: self.max_price,
    })
  }
}

/// `PUT /preferences`. Returns the stored record.
pub async fn put<S, R>(
  State(state): State<ApiState<S, R>>,
  Caller(user_id): Caller,
  Json(body): Json<PreferenceBody>,
) -> Result<Json<UserPreference>>
where
  S: ListingStore,
  R: Send + Sync,
{
  let preference = body.into_preference(user_id)?;
  let stored = state
    .store
    .upsert_preference(preference)
    .await
    .map_err(ApiError::upstream)?;
  Ok(Json(stored))
}
