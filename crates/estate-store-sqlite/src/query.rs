//! Compilation of a [`ListingPredicate`] into an SQL `WHERE` clause with
//! positional parameters.
//!
//! Relations are many-to-one `LEFT JOIN`s, so a listing is never repeated.
//! Deals are one-to-many and are only ever consulted through `NOT EXISTS`.
//!
//! Case-insensitive comparisons fold both sides with [`FOLD_FUNCTION`], a
//! Unicode-aware lowercase registered on every connection. SQLite's own
//! `NOCASE` and `LIKE` only fold ASCII.

use estate_core::{
  listing::DealStatus,
  store::{CityMatch, CountMatch, ListingPredicate, ProjectLink, Range, Visibility},
};
use rusqlite::{functions::FunctionFlags, types::Value};

use crate::encode::{encode_deal_status, encode_purpose};

/// Name of the scalar SQL function that lowercases its text argument.
pub const FOLD_FUNCTION: &str = "fold_case";

/// Register [`FOLD_FUNCTION`] on `conn`. `NULL` folds to `NULL`.
pub fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD_FUNCTION,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
  )
}

/// Columns decoded by [`crate::encode::RawListing::from_row`], in order.
pub const LISTING_COLUMNS: &str = "
  l.listing_id, l.title, l.price, l.purpose, l.area,
  l.bedrooms, l.bathrooms, l.rooms, l.garage, l.balcony,
  l.image, l.project_id, l.created_at,
  loc.location_id, loc.name, c.city_id, c.name,
  a.agent_id, a.name, a.phone, a.email,
  pt.type_id, pt.name";

pub const LISTING_FROM: &str = "
  FROM listings l
  LEFT JOIN locations      loc ON loc.location_id = l.location_id
  LEFT JOIN cities         c   ON c.city_id       = loc.city_id
  LEFT JOIN property_types pt  ON pt.type_id      = l.type_id
  LEFT JOIN agents         a   ON a.agent_id      = l.agent_id";

/// Newest first; the id makes the order total.
pub const LISTING_ORDER: &str = "ORDER BY l.created_at DESC, l.listing_id DESC";

/// A compiled `WHERE` clause (possibly empty) and its parameters.
#[derive(Debug, Default)]
pub struct Compiled {
  pub where_clause: String,
  pub params:       Vec<Value>,
}

#[derive(Default)]
struct Builder {
  conds:  Vec<String>,
  params: Vec<Value>,
}

impl Builder {
  fn push(&mut self, cond: impl Into<String>, params: impl IntoIterator<Item = Value>) {
    self.conds.push(cond.into());
    self.params.extend(params);
  }

  fn cond(&mut self, cond: &str) { self.conds.push(cond.to_owned()); }

  fn count(&mut self, column: &str, m: Option<CountMatch>) {
    match m {
      Some(CountMatch::Exactly(n)) => {
        self.push(format!("{column} = ?"), [Value::Integer(n.into())])
      }
      Some(CountMatch::AtLeast(n)) => {
        self.push(format!("{column} >= ?"), [Value::Integer(n.into())])
      }
      None => {}
    }
  }

  fn range(&mut self, column: &str, r: Range) {
    if let Some(min) = r.min {
      self.push(format!("{column} >= ?"), [Value::Real(min)]);
    }
    if let Some(max) = r.max {
      self.push(format!("{column} <= ?"), [Value::Real(max)]);
    }
  }

  fn finish(self) -> Compiled {
    let where_clause = if self.conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.conds.join("\n    AND "))
    };
    Compiled { where_clause, params: self.params }
  }
}

/// The visibility rule: no deal on the listing is completed.
pub fn visibility_fragment() -> (String, Value) {
  (
    "NOT EXISTS (
       SELECT 1 FROM deals d
       WHERE d.listing_id = l.listing_id AND d.status = ?
     )"
      .to_owned(),
    text(encode_deal_status(DealStatus::Completed)),
  )
}

fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

/// Lowercase, escape `LIKE` metacharacters and wrap in `%…%`.
fn like_pattern(needle: &str) -> String {
  let mut out = String::with_capacity(needle.len() + 2);
  out.push('%');
  for ch in needle.to_lowercase().chars() {
    if matches!(ch, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(ch);
  }
  out.push('%');
  out
}

pub fn compile(p: &ListingPredicate) -> Compiled {
  let mut b = Builder::default();

  match &p.city {
    Some(CityMatch::Name(name)) => {
      b.push(format!("{FOLD_FUNCTION}(c.name) = ?"), [text(name.to_lowercase())])
    }
    Some(CityMatch::Id(id)) => b.push("loc.city_id = ?", [text(id.as_str())]),
    None => {}
  }

  if let Some(purpose) = p.purpose {
    b.push("l.purpose = ?", [text(encode_purpose(purpose))]);
  }

  if let Some(name) = &p.property_type {
    b.push(format!("{FOLD_FUNCTION}(pt.name) = ?"), [text(name.to_lowercase())]);
  }

  b.count("l.bedrooms", p.bedrooms);
  b.count("l.bathrooms", p.bathrooms);
  b.range("l.price", p.price);
  b.range("l.area", p.area);

  if let Some(needle) = &p.text {
    let pattern = like_pattern(needle);
    let cond = ["l.title", "loc.name", "c.name"]
      .map(|column| format!("{FOLD_FUNCTION}({column}) LIKE ? ESCAPE '\\'"))
      .join(" OR ");
    b.push(
      format!("({cond})"),
      [text(pattern.as_str()), text(pattern.as_str()), text(pattern)],
    );
  }

  match p.project {
    ProjectLink::Any => {}
    ProjectLink::Without => b.cond("l.project_id IS NULL"),
    ProjectLink::With => b.cond("l.project_id IS NOT NULL"),
  }

  if let Some(agent_id) = &p.agent_id {
    b.push("l.agent_id = ?", [text(agent_id.as_str())]);
  }

  if p.visibility == Visibility::Public {
    let (cond, param) = visibility_fragment();
    b.push(cond, [param]);
  }

  b.finish()
}
