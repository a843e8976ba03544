//! Write helpers for the entities the search core only reads.
//!
//! Cities, agents, listings and deals are owned by the administrative side of
//! the marketplace. These inherent methods let tests and local fixtures
//! populate a store without going through that subsystem.

use chrono::{DateTime, Utc};
use estate_core::listing::{
  Agent, Amenity, City, Deal, DealStatus, Location, PropertyType, Purpose,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result, SqliteStore,
  encode::{
    decode_deal_status, decode_dt, decode_purpose, encode_deal_status, encode_dt,
    encode_purpose, new_id,
  },
};

/// Input to [`SqliteStore::add_listing`].
#[derive(Debug, Clone)]
pub struct NewListing {
  pub title:       String,
  pub price:       f64,
  pub purpose:     Purpose,
  pub area:        f64,
  pub bedrooms:    u32,
  pub bathrooms:   u32,
  pub rooms:       u32,
  pub garage:      bool,
  pub balcony:     bool,
  pub image:       Option<String>,
  /// Gallery references in display order.
  pub gallery:     Vec<String>,
  pub amenity_ids: Vec<String>,
  pub location_id: Option<String>,
  pub agent_id:    Option<String>,
  pub type_id:     Option<String>,
  pub project_id:  Option<String>,
  pub created_at:  DateTime<Utc>,
}

impl NewListing {
  /// Convenience constructor with every optional field empty and
  /// `created_at` set to now.
  pub fn new(title: impl Into<String>, price: f64, purpose: Purpose) -> Self {
    Self {
      title: title.into(),
      price,
      purpose,
      area: 0.0,
      bedrooms: 0,
      bathrooms: 0,
      rooms: 0,
      garage: false,
      balcony: false,
      image: None,
      gallery: Vec::new(),
      amenity_ids: Vec::new(),
      location_id: None,
      agent_id: None,
      type_id: None,
      project_id: None,
      created_at: Utc::now(),
    }
  }
}

impl SqliteStore {
  /// Insert a row into a two-column `(id, name)` table.
  async fn add_named(
    &self,
    table:     &'static str,
    id_column: &'static str,
    name:      &str,
  ) -> Result<String> {
    let id       = new_id();
    let id_str   = id.clone();
    let name_str = name.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO {table} ({id_column}, name) VALUES (?1, ?2)"),
          rusqlite::params![id_str, name_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(id)
  }

  pub async fn add_city(&self, name: &str) -> Result<City> {
    let city_id = self.add_named("cities", "city_id", name).await?;
    Ok(City { city_id, name: name.to_owned() })
  }

  pub async fn add_property_type(&self, name: &str) -> Result<PropertyType> {
    let type_id = self.add_named("property_types", "type_id", name).await?;
    Ok(PropertyType { type_id, name: name.to_owned() })
  }

  pub async fn add_amenity(&self, name: &str) -> Result<Amenity> {
    let amenity_id = self.add_named("amenities", "amenity_id", name).await?;
    Ok(Amenity { amenity_id, name: name.to_owned() })
  }

  /// Returns the new project id.
  pub async fn add_project(&self, name: &str) -> Result<String> {
    self.add_named("projects", "project_id", name).await
  }

  pub async fn add_location(&self, name: &str, city: Option<&City>) -> Result<Location> {
    let location = Location {
      location_id: new_id(),
      name:        name.to_owned(),
      city:        city.cloned(),
    };

    let id_str   = location.location_id.clone();
    let name_str = location.name.clone();
    let city_id  = city.map(|c| c.city_id.clone());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO locations (location_id, name, city_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, city_id],
        )?;
        Ok(())
      })
      .await?;

    Ok(location)
  }

  pub async fn add_agent(
    &self,
    name:  &str,
    phone: Option<&str>,
    email: Option<&str>,
  ) -> Result<Agent> {
    let agent = Agent {
      agent_id: new_id(),
      name:     name.to_owned(),
      phone:    phone.map(str::to_owned),
      email:    email.map(str::to_owned),
    };

    let a = agent.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO agents (agent_id, name, phone, email) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![a.agent_id, a.name, a.phone, a.email],
        )?;
        Ok(())
      })
      .await?;

    Ok(agent)
  }

  /// Insert a listing with its gallery and amenities in one transaction.
  /// Returns the new listing id.
  pub async fn add_listing(&self, input: NewListing) -> Result<String> {
    let listing_id = new_id();
    let id_str     = listing_id.clone();
    let purpose    = encode_purpose(input.purpose);
    let at_str     = encode_dt(input.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO listings (
             listing_id, title, price, purpose, area,
             bedrooms, bathrooms, rooms, garage, balcony,
             image, location_id, agent_id, type_id, project_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
          rusqlite::params![
            id_str,
            input.title,
            input.price,
            purpose,
            input.area,
            input.bedrooms,
            input.bathrooms,
            input.rooms,
            input.garage,
            input.balcony,
            input.image,
            input.location_id,
            input.agent_id,
            input.type_id,
            input.project_id,
            at_str,
          ],
        )?;
        for (position, reference) in input.gallery.iter().enumerate() {
          tx.execute(
            "INSERT INTO listing_images (listing_id, position, reference) VALUES (?1, ?2, ?3)",
            rusqlite::params![id_str, position as i64, reference],
          )?;
        }
        for amenity_id in &input.amenity_ids {
          tx.execute(
            "INSERT INTO listing_amenities (listing_id, amenity_id) VALUES (?1, ?2)",
            rusqlite::params![id_str, amenity_id],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(listing_id)
  }

  pub async fn add_deal(
    &self,
    listing_id: &str,
    agent_id:   &str,
    kind:       Purpose,
    status:     DealStatus,
  ) -> Result<Deal> {
    let deal = Deal {
      deal_id:    new_id(),
      listing_id: listing_id.to_owned(),
      agent_id:   agent_id.to_owned(),
      kind,
      status,
      created_at: Utc::now(),
    };

    let id_str      = deal.deal_id.clone();
    let listing_str = deal.listing_id.clone();
    let agent_str   = deal.agent_id.clone();
    let kind_str    = encode_purpose(kind);
    let status_str  = encode_deal_status(status);
    let at_str      = encode_dt(deal.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO deals (deal_id, listing_id, agent_id, kind, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, listing_str, agent_str, kind_str, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(deal)
  }

  /// Change a deal's status, e.g. when a pending sale closes.
  pub async fn set_deal_status(&self, deal_id: &str, status: DealStatus) -> Result<Option<Deal>> {
    let id_str     = deal_id.to_owned();
    let status_str = encode_deal_status(status);

    let raw: Option<(String, String, String, String, String, String)> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE deals SET status = ?2 WHERE deal_id = ?1",
          rusqlite::params![id_str, status_str],
        )?;
        Ok(
          conn
            .query_row(
              "SELECT deal_id, listing_id, agent_id, kind, status, created_at
               FROM deals WHERE deal_id = ?1",
              rusqlite::params![id_str],
              |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(deal_id, listing_id, agent_id, kind, status, created_at)| {
        Ok::<_, Error>(Deal {
          deal_id,
          listing_id,
          agent_id,
          kind: decode_purpose(&kind)?,
          status: decode_deal_status(&status)?,
          created_at: decode_dt(&created_at)?,
        })
      })
      .transpose()
  }
}
