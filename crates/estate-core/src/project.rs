//! Projection of [`Listing`] entities into flat response DTOs.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;

use crate::{
  Error, Result,
  image::ImageResolver,
  listing::{Agent, Listing, Purpose},
};

/// Shown when a listing has no property type.
pub const FALLBACK_TYPE_LABEL: &str = "Property";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDto {
  pub id:    String,
  pub name:  String,
  pub phone: Option<String>,
  pub email: Option<String>,
}

impl From<&Agent> for AgentDto {
  fn from(a: &Agent) -> Self {
    Self {
      id:    a.agent_id.clone(),
      name:  a.name.clone(),
      phone: a.phone.clone(),
      email: a.email.clone(),
    }
  }
}

/// The client-facing shape of a listing. Relation names are always strings,
/// never null.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDto {
  pub id:            String,
  pub title:         String,
  pub price:         f64,
  pub purpose:       Purpose,
  pub area:          f64,
  pub bedrooms:      u32,
  pub bathrooms:     u32,
  pub rooms:         u32,
  pub garage:        bool,
  pub balcony:       bool,
  pub city:          String,
  /// Area (neighbourhood) name.
  pub location:      String,
  pub property_type: String,
  pub agent:         Option<AgentDto>,
  pub image:         Option<String>,
  pub images:        Vec<String>,
  pub amenities:     Vec<String>,
  pub project_id:    Option<String>,
  pub created_at:    DateTime<Utc>,
}

/// Display order of a listing's images.
///
/// The gallery keeps its stored order. The primary image appears once: in
/// its gallery position if it is part of the gallery, otherwise first.
pub fn image_order(listing: &Listing) -> Vec<&str> {
  let mut out: Vec<&str> = Vec::with_capacity(listing.gallery.len() + 1);
  if let Some(primary) = listing.image.as_deref()
    && !listing.gallery.iter().any(|g| g == primary)
  {
    out.push(primary);
  }
  for g in &listing.gallery {
    if !out.contains(&g.as_str()) {
      out.push(g.as_str());
    }
  }
  out
}

/// Project a single listing. All of its image references resolve
/// concurrently.
pub async fn project_listing<R>(resolver: &R, listing: &Listing) -> Result<ListingDto>
where
  R: ImageResolver,
{
  let order = image_order(listing);
  let (image, images) = futures::try_join!(
    resolver.resolve(listing.image.as_deref()),
    try_join_all(order.iter().map(|r| resolver.resolve(Some(*r)))),
  )
  .map_err(Error::image)?;

  Ok(ListingDto {
    id: listing.listing_id.clone(),
    title: listing.title.clone(),
    price: listing.price,
    purpose: listing.purpose,
    area: listing.area,
    bedrooms: listing.bedrooms,
    bathrooms: listing.bathrooms,
    rooms: listing.rooms,
    garage: listing.garage,
    balcony: listing.balcony,
    city: listing.city_name().unwrap_or_default().to_owned(),
    location: listing.area_name().unwrap_or_default().to_owned(),
    property_type: listing
      .property_type
      .as_ref()
      .map(|t| t.name.clone())
      .filter(|n| !n.is_empty())
      .unwrap_or_else(|| FALLBACK_TYPE_LABEL.to_owned()),
    agent: listing.agent.as_ref().map(AgentDto::from),
    image,
    images: images.into_iter().flatten().collect(),
    amenities: listing.amenities.iter().map(|a| a.name.clone()).collect(),
    project_id: listing.project_id.clone(),
    created_at: listing.created_at,
  })
}

/// Project a page of listings. Every image on the page resolves
/// concurrently; any failure fails the whole page.
pub async fn project_page<R>(resolver: &R, listings: &[Listing]) -> Result<Vec<ListingDto>>
where
  R: ImageResolver,
{
  try_join_all(listings.iter().map(|l| project_listing(resolver, l))).await
}
