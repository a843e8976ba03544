//! Handler for `GET /properties/for-you`.

use axum::{Json, extract::State};
use estate_core::{
  image::ImageResolver,
  personalize::recommend,
  project::{ListingDto, project_page},
  store::ListingStore,
};
use serde::Serialize;

use crate::{ApiState, auth::Caller, error::Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForYou {
  pub properties:    Vec<ListingDto>,
  pub is_near_match: bool,
  pub message:       Option<&'static str>,
}

/// `GET /properties/for-you`
pub async fn for_you<S, R>(
  State(state): State<ApiState<S, R>>,
  Caller(user_id): Caller,
) -> Result<Json<ForYou>>
where
  S: ListingStore,
  R: ImageResolver,
{
  let recommendation = recommend(&*state.store, &user_id).await?;
  let properties = project_page(&*state.images, recommendation.listings()).await?;

  Ok(Json(ForYou {
    properties,
    is_near_match: recommendation.is_near_match(),
    message: recommendation.message(),
  }))
}
