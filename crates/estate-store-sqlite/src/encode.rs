//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with fixed microsecond precision, so that
//! lexical `ORDER BY` on the column is chronological. Enums are lowercase
//! strings. Ids are hyphenated UUID v4 strings, but are treated as opaque on
//! read.

use chrono::{DateTime, SecondsFormat, Utc};
use estate_core::{
  listing::{Agent, Amenity, City, DealStatus, Listing, Location, PropertyType, Purpose},
  preference::{PurposeIntent, StyleIntent, UserPreference},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Ids ─────────────────────────────────────────────────────────────────────

pub fn new_id() -> String { Uuid::new_v4().hyphenated().to_string() }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

fn unknown(column: &'static str, value: &str) -> Error {
  Error::UnknownValue { column, value: value.to_owned() }
}

pub fn encode_purpose(p: Purpose) -> &'static str {
  match p {
    Purpose::Sale => "sale",
    Purpose::Rent => "rent",
  }
}

pub fn decode_purpose(s: &str) -> Result<Purpose> {
  match s {
    "sale" => Ok(Purpose::Sale),
    "rent" => Ok(Purpose::Rent),
    other => Err(unknown("purpose", other)),
  }
}

pub fn encode_deal_status(s: DealStatus) -> &'static str {
  match s {
    DealStatus::Pending => "pending",
    DealStatus::Completed => "completed",
    DealStatus::Cancelled => "cancelled",
  }
}

pub fn decode_deal_status(s: &str) -> Result<DealStatus> {
  match s {
    "pending" => Ok(DealStatus::Pending),
    "completed" => Ok(DealStatus::Completed),
    "cancelled" => Ok(DealStatus::Cancelled),
    other => Err(unknown("deal status", other)),
  }
}

pub fn encode_purpose_intent(p: PurposeIntent) -> &'static str {
  match p {
    PurposeIntent::Buy => "buy",
    PurposeIntent::Rent => "rent",
    PurposeIntent::Both => "both",
  }
}

pub fn decode_purpose_intent(s: &str) -> Result<PurposeIntent> {
  match s {
    "buy" => Ok(PurposeIntent::Buy),
    "rent" => Ok(PurposeIntent::Rent),
    "both" => Ok(PurposeIntent::Both),
    other => Err(unknown("purpose intent", other)),
  }
}

pub fn encode_style(s: StyleIntent) -> &'static str {
  match s {
    StyleIntent::Normal => "normal",
    StyleIntent::Project => "project",
    StyleIntent::Both => "both",
  }
}

pub fn decode_style(s: &str) -> Result<StyleIntent> {
  match s {
    "normal" => Ok(StyleIntent::Normal),
    "project" => Ok(StyleIntent::Project),
    "both" => Ok(StyleIntent::Both),
    other => Err(unknown("style", other)),
  }
}

fn count(column: &'static str, v: i64) -> Result<u32> {
  u32::try_from(v).map_err(|_| Error::OutOfRange { column, value: v })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `listings` row joined with its many-to-one
/// relations. Every joined column is nullable.
#[derive(Debug)]
pub struct RawListing {
  pub listing_id:    String,
  pub title:         String,
  pub price:         f64,
  pub purpose:       String,
  pub area:          f64,
  pub bedrooms:      i64,
  pub bathrooms:     i64,
  pub rooms:         i64,
  pub garage:        bool,
  pub balcony:       bool,
  pub image:         Option<String>,
  pub project_id:    Option<String>,
  pub created_at:    String,
  // locations / cities join
  pub location_id:   Option<String>,
  pub location_name: Option<String>,
  pub city_id:       Option<String>,
  pub city_name:     Option<String>,
  // agents join
  pub agent_id:      Option<String>,
  pub agent_name:    Option<String>,
  pub agent_phone:   Option<String>,
  pub agent_email:   Option<String>,
  // property_types join
  pub type_id:       Option<String>,
  pub type_name:     Option<String>,
  // child tables, filled in after the main query
  pub gallery:       Vec<String>,
  pub amenities:     Vec<(String, String)>,
}

impl RawListing {
  /// Map a row selected with [`crate::query::LISTING_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      listing_id:    row.get(0)?,
      title:         row.get(1)?,
      price:         row.get(2)?,
      purpose:       row.get(3)?,
      area:          row.get(4)?,
      bedrooms:      row.get(5)?,
      bathrooms:     row.get(6)?,
      rooms:         row.get(7)?,
      garage:        row.get(8)?,
      balcony:       row.get(9)?,
      image:         row.get(10)?,
      project_id:    row.get(11)?,
      created_at:    row.get(12)?,
      location_id:   row.get(13)?,
      location_name: row.get(14)?,
      city_id:       row.get(15)?,
      city_name:     row.get(16)?,
      agent_id:      row.get(17)?,
      agent_name:    row.get(18)?,
      agent_phone:   row.get(19)?,
      agent_email:   row.get(20)?,
      type_id:       row.get(21)?,
      type_name:     row.get(22)?,
      gallery:       Vec::new(),
      amenities:     Vec::new(),
    })
  }

  pub fn into_listing(self) -> Result<Listing> {
    let city = match (self.city_id, self.city_name) {
      (Some(city_id), Some(name)) => Some(City { city_id, name }),
      _ => None,
    };
    let location = match (self.location_id, self.location_name) {
      (Some(location_id), Some(name)) => Some(Location { location_id, name, city }),
      _ => None,
    };
    let agent = match (self.agent_id, self.agent_name) {
      (Some(agent_id), Some(name)) => Some(Agent {
        agent_id,
        name,
        phone: self.agent_phone,
        email: self.agent_email,
      }),
      _ => None,
    };
    let property_type = match (self.type_id, self.type_name) {
      (Some(type_id), Some(name)) => Some(PropertyType { type_id, name }),
      _ => None,
    };

    Ok(Listing {
      listing_id: self.listing_id,
      title: self.title,
      price: self.price,
      purpose: decode_purpose(&self.purpose)?,
      area: self.area,
      bedrooms: count("bedrooms", self.bedrooms)?,
      bathrooms: count("bathrooms", self.bathrooms)?,
      rooms: count("rooms", self.rooms)?,
      garage: self.garage,
      balcony: self.balcony,
      image: self.image,
      gallery: self.gallery,
      amenities: self
        .amenities
        .into_iter()
        .map(|(amenity_id, name)| Amenity { amenity_id, name })
        .collect(),
      location,
      agent,
      property_type,
      project_id: self.project_id,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `user_preferences` row.
pub struct RawPreference {
  pub user_id:       String,
  pub purpose:       String,
  pub city_id:       Option<String>,
  pub property_type: Option<String>,
  pub style:         String,
  pub min_price:     f64,
  pub max_price:     f64,
}

impl RawPreference {
  pub fn into_preference(self) -> Result<UserPreference> {
    Ok(UserPreference {
      user_id:       self.user_id,
      purpose:       decode_purpose_intent(&self.purpose)?,
      city_id:       self.city_id,
      property_type: self.property_type,
      style:         decode_style(&self.style)?,
      min_price:     self.min_price,
      max_price:     self.max_price,
    })
  }
}
