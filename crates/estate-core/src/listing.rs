//! Listing types: the property records the search core reads.
//!
//! Listings, locations, agents and deals are owned by the administrative and
//! agent-management side of the marketplace. This crate only reads them, so
//! every relation is optional: the core must tolerate whatever state those
//! subsystems leave behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Whether a listing is offered for sale or for rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Purpose {
  Sale,
  Rent,
}

impl Purpose {
  /// Parse the wire form (`SALE` / `RENT`). Matching is exact.
  pub fn from_wire(s: &str) -> Option<Self> {
    match s {
      "SALE" => Some(Self::Sale),
      "RENT" => Some(Self::Rent),
      _ => None,
    }
  }
}

/// The outcome state of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DealStatus {
  Pending,
  Completed,
  Cancelled,
}

// ─── Relations ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
  pub city_id: String,
  pub name:    String,
}

/// An area within a city. A listing's effective city is derived through
/// this relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub location_id: String,
  pub name:        String,
  pub city:        Option<City>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
  pub agent_id: String,
  pub name:     String,
  pub phone:    Option<String>,
  pub email:    Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyType {
  pub type_id: String,
  pub name:    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
  pub amenity_id: String,
  pub name:       String,
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// A property offered on the marketplace, with its relations resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
  pub listing_id:    String,
  pub title:         String,
  /// Currency-agnostic; never negative.
  pub price:         f64,
  pub purpose:       Purpose,
  /// Square meters.
  pub area:          f64,
  pub bedrooms:      u32,
  pub bathrooms:     u32,
  pub rooms:         u32,
  pub garage:        bool,
  pub balcony:       bool,
  /// Primary image reference (storage key or absolute URL).
  pub image:         Option<String>,
  /// Gallery image references in display order.
  pub gallery:       Vec<String>,
  pub amenities:     Vec<Amenity>,
  pub location:      Option<Location>,
  pub agent:         Option<Agent>,
  pub property_type: Option<PropertyType>,
  pub project_id:    Option<String>,
  pub created_at:    DateTime<Utc>,
}

impl Listing {
  pub fn city_name(&self) -> Option<&str> {
    self
      .location
      .as_ref()
      .and_then(|l| l.city.as_ref())
      .map(|c| c.name.as_str())
  }

  pub fn area_name(&self) -> Option<&str> {
    self.location.as_ref().map(|l| l.name.as_str())
  }
}

// ─── Deal ────────────────────────────────────────────────────────────────────

/// A transaction tying a listing to an agent and an outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
  pub deal_id:    String,
  pub listing_id: String,
  pub agent_id:   String,
  pub kind:       Purpose,
  pub status:     DealStatus,
  pub created_at: DateTime<Utc>,
}
