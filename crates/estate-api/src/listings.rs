//! Handlers for listing endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/properties` | Filters plus `page` / `limit`; public visibility |
//! | `GET`  | `/properties/{id}` | 404 if unknown or sold |
//! | `GET`  | `/agents/{id}/properties` | Caller must be that agent; no visibility rule |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use estate_core::{
  filter::{FilterSpec, RawFilters},
  image::ImageResolver,
  listing::DealStatus,
  pagination::{PageRequest, Pagination},
  project::{ListingDto, project_listing, project_page},
  search::execute,
  store::{ListingPredicate, ListingStore, Visibility},
};
use serde::Serialize;

use crate::{
  ApiState,
  auth::Caller,
  error::{ApiError, Result},
};

// ─── Shared ──────────────────────────────────────────────────────────────────

/// Filters and paging read from the query string.
///
/// Built from raw key/value pairs rather than a derived deserialiser so that
/// a repeated key never rejects the request. The first occurrence wins and
/// unknown keys are ignored.
#[derive(Debug, Default, PartialEq)]
pub struct SearchParams {
  pub filters: RawFilters,
  pub page:    Option<String>,
  pub limit:   Option<String>,
}

impl SearchParams {
  pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
    let mut params = Self::default();
    for (key, value) in pairs {
      let f = &mut params.filters;
      let slot = match key.as_str() {
        "city" => &mut f.city,
        "purpose" => &mut f.purpose,
        "type" => &mut f.kind,
        "bedrooms" => &mut f.bedrooms,
        "bathrooms" => &mut f.bathrooms,
        "minPrice" => &mut f.min_price,
        "maxPrice" => &mut f.max_price,
        "minArea" => &mut f.min_area,
        "maxArea" => &mut f.max_area,
        "location" => &mut f.location,
        "page" => &mut params.page,
        "limit" => &mut params.limit,
        _ => continue,
      };
      if slot.is_none() {
        *slot = Some(value);
      }
    }
    params
  }
}

/// Response body of the paged listing endpoints.
#[derive(Debug, Serialize)]
pub struct ListingPage {
  pub properties: Vec<ListingDto>,
  pub pagination: Pagination,
}

/// Compile filters, logging anything that had to be dropped.
fn predicate(filters: &RawFilters) -> ListingPredicate {
  let compiled = FilterSpec::compile(filters);
  for issue in &compiled.issues {
    tracing::debug!(filter = issue.filter, value = %issue.value, "{issue}");
  }
  compiled.spec.into_predicate()
}

async fn page<S, R>(
  state: &ApiState<S, R>,
  predicate: &ListingPredicate,
  params: &SearchParams,
) -> Result<ListingPage>
where
  S: ListingStore,
  R: ImageResolver,
{
  let request = PageRequest::parse(
    params.page.as_deref(),
    params.limit.as_deref(),
    state.config.default_page_size,
    state.config.max_page_size,
  );

  let found = execute(&*state.store, predicate, request.window()).await?;
  let properties = project_page(&*state.images, &found.listings).await?;

  Ok(ListingPage { properties, pagination: request.envelope(found.total) })
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// `GET /properties[?city=..][&purpose=..][&type=..][&bedrooms=..]...[&page=..][&limit=..]`
pub async fn search<S, R>(
  State(state): State<ApiState<S, R>>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListingPage>>
where
  S: ListingStore,
  R: ImageResolver,
{
  let params = SearchParams::from_pairs(pairs);
  let predicate = predicate(&params.filters);
  Ok(Json(page(&state, &predicate, &params).await?))
}

// ─── Detail ──────────────────────────────────────────────────────────────────

/// `GET /properties/{id}`
pub async fn detail<S, R>(
  State(state): State<ApiState<S, R>>,
  Path(id): Path<String>,
) -> Result<Json<ListingDto>>
where
  S: ListingStore,
  R: ImageResolver,
{
  let not_found = || ApiError::NotFound(format!("property {id} not found"));

  let listing = state
    .store
    .get_listing(&id)
    .await
    .map_err(ApiError::upstream)?
    .ok_or_else(not_found)?;

  let sold = state
    .store
    .has_deal_with_status(&id, DealStatus::Completed)
    .await
    .map_err(ApiError::upstream)?;
  if sold {
    return Err(not_found());
  }

  Ok(Json(project_listing(&*state.images, &listing).await?))
}

// ─── Agent inventory ─────────────────────────────────────────────────────────

/// `GET /agents/{id}/properties`: the agent's own listings, sold ones
/// included.
pub async fn agent_inventory<S, R>(
  State(state): State<ApiState<S, R>>,
  Caller(user_id): Caller,
  Path(agent_id): Path<String>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListingPage>>
where
  S: ListingStore,
  R: ImageResolver,
{
  if user_id != agent_id {
    return Err(ApiError::Forbidden);
  }

  let params = SearchParams::from_pairs(pairs);
  let predicate = ListingPredicate {
    agent_id: Some(agent_id),
    visibility: Visibility::All,
    ..predicate(&params.filters)
  };
  Ok(Json(page(&state, &predicate, &params).await?))
}
