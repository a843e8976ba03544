//! [`SqliteStore`], the SQLite implementation of [`ListingStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use estate_core::{
  listing::{DealStatus, Listing},
  preference::UserPreference,
  store::{ListingPredicate, ListingStore, Window},
};
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value};

use crate::{
  Result,
  encode::{
    RawListing, RawPreference, encode_deal_status, encode_dt, encode_purpose_intent,
    encode_style,
  },
  query::{LISTING_COLUMNS, LISTING_FROM, LISTING_ORDER, compile, register_functions},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A listing store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  /// Register SQL functions, then run the schema.
  async fn init(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row loading ─────────────────────────────────────────────────────────────

/// Run a listing `SELECT` and attach gallery and amenities to each row.
///
/// Child rows are fetched with one `IN (…)` query per table for the whole
/// page, never per listing.
fn load_listings(
  conn: &rusqlite::Connection,
  sql: &str,
  params: &[Value],
) -> rusqlite::Result<Vec<RawListing>> {
  let mut stmt = conn.prepare(sql)?;
  let mut rows = stmt
    .query_map(params_from_iter(params.iter()), RawListing::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  if rows.is_empty() {
    return Ok(rows);
  }

  let ids: Vec<String> = rows.iter().map(|r| r.listing_id.clone()).collect();
  let index: HashMap<String, usize> = ids
    .iter()
    .enumerate()
    .map(|(i, id)| (id.clone(), i))
    .collect();
  let placeholders = vec!["?"; ids.len()].join(", ");

  let mut stmt = conn.prepare(&format!(
    "SELECT listing_id, reference FROM listing_images
     WHERE listing_id IN ({placeholders})
     ORDER BY listing_id, position"
  ))?;
  let images = stmt.query_map(params_from_iter(ids.iter()), |row| {
    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
  })?;
  for image in images {
    let (listing_id, reference) = image?;
    if let Some(&i) = index.get(&listing_id) {
      rows[i].gallery.push(reference);
    }
  }

  let mut stmt = conn.prepare(&format!(
    "SELECT la.listing_id, am.amenity_id, am.name
     FROM listing_amenities la
     JOIN amenities am ON am.amenity_id = la.amenity_id
     WHERE la.listing_id IN ({placeholders})
     ORDER BY am.name"
  ))?;
  let amenities = stmt.query_map(params_from_iter(ids.iter()), |row| {
    Ok((
      row.get::<_, String>(0)?,
      row.get::<_, String>(1)?,
      row.get::<_, String>(2)?,
    ))
  })?;
  for amenity in amenities {
    let (listing_id, amenity_id, name) = amenity?;
    if let Some(&i) = index.get(&listing_id) {
      rows[i].amenities.push((amenity_id, name));
    }
  }

  Ok(rows)
}

fn to_i64(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── ListingStore impl ───────────────────────────────────────────────────────

impl ListingStore for SqliteStore {
  type Error = crate::Error;

  async fn count_listings(&self, predicate: &ListingPredicate) -> Result<u64> {
    let compiled = compile(predicate);
    let sql = format!("SELECT COUNT(*) {LISTING_FROM} {}", compiled.where_clause);

    let total: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, params_from_iter(compiled.params.iter()), |r| r.get(0))?)
      })
      .await?;

    Ok(u64::try_from(total).unwrap_or_default())
  }

  async fn find_listings(
    &self,
    predicate: &ListingPredicate,
    window:    Window,
  ) -> Result<Vec<Listing>> {
    let compiled = compile(predicate);
    let sql = format!(
      "SELECT {LISTING_COLUMNS} {LISTING_FROM}
       {}
       {LISTING_ORDER}
       LIMIT ? OFFSET ?",
      compiled.where_clause
    );
    let mut params = compiled.params;
    params.push(Value::Integer(to_i64(window.limit)));
    params.push(Value::Integer(to_i64(window.offset)));

    let raws: Vec<RawListing> = self
      .conn
      .call(move |conn| Ok(load_listings(conn, &sql, &params)?))
      .await?;

    raws.into_iter().map(RawListing::into_listing).collect()
  }

  async fn get_listing(&self, listing_id: &str) -> Result<Option<Listing>> {
    let sql = format!("SELECT {LISTING_COLUMNS} {LISTING_FROM} WHERE l.listing_id = ?");
    let params = vec![Value::Text(listing_id.to_owned())];

    let raws: Vec<RawListing> = self
      .conn
      .call(move |conn| Ok(load_listings(conn, &sql, &params)?))
      .await?;

    raws.into_iter().next().map(RawListing::into_listing).transpose()
  }

  async fn has_deal_with_status(&self, listing_id: &str, status: DealStatus) -> Result<bool> {
    let id_str     = listing_id.to_owned();
    let status_str = encode_deal_status(status);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (
             SELECT 1 FROM deals WHERE listing_id = ?1 AND status = ?2
           )",
          rusqlite::params![id_str, status_str],
          |r| r.get::<_, bool>(0),
        )?)
      })
      .await?;

    Ok(exists)
  }

  async fn get_preference(&self, user_id: &str) -> Result<Option<UserPreference>> {
    let id_str = user_id.to_owned();

    let raw: Option<RawPreference> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, purpose, city_id, property_type, style, min_price, max_price
               FROM user_preferences WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawPreference {
                  user_id:       row.get(0)?,
                  purpose:       row.get(1)?,
                  city_id:       row.get(2)?,
                  property_type: row.get(3)?,
                  style:         row.get(4)?,
                  min_price:     row.get(5)?,
                  max_price:     row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPreference::into_preference).transpose()
  }

  async fn upsert_preference(&self, preference: UserPreference) -> Result<UserPreference> {
    let user_id       = preference.user_id.clone();
    let purpose       = encode_purpose_intent(preference.purpose);
    let city_id       = preference.city_id.clone();
    let property_type = preference.property_type.clone();
    let style         = encode_style(preference.style);
    let min_price     = preference.min_price;
    let max_price     = preference.max_price;
    let at_str        = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO user_preferences (
             user_id, purpose, city_id, property_type, style,
             min_price, max_price, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT (user_id) DO UPDATE SET
             purpose       = excluded.purpose,
             city_id       = excluded.city_id,
             property_type = excluded.property_type,
             style         = excluded.style,
             min_price     = excluded.min_price,
             max_price     = excluded.max_price,
             updated_at    = excluded.updated_at",
          rusqlite::params![
            user_id,
            purpose,
            city_id,
            property_type,
            style,
            min_price,
            max_price,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(preference)
  }
}
