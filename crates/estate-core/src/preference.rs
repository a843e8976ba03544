//! User preference records consumed by the personalization matcher.

use serde::{Deserialize, Serialize};

use crate::listing::Purpose;

/// What the user intends to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PurposeIntent {
  Buy,
  Rent,
  Both,
}

impl PurposeIntent {
  /// The listing purpose this intent constrains to; `Both` constrains
  /// nothing.
  pub fn purpose(self) -> Option<Purpose> {
    match self {
      Self::Buy => Some(Purpose::Sale),
      Self::Rent => Some(Purpose::Rent),
      Self::Both => None,
    }
  }
}

/// Whether the user wants standalone properties, project units, or either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StyleIntent {
  Normal,
  Project,
  Both,
}

/// One stored preference per user; overwritten wholesale on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreference {
  pub user_id:       String,
  pub purpose:       PurposeIntent,
  pub city_id:       Option<String>,
  /// Property-type name; `None` means any type.
  pub property_type: Option<String>,
  pub style:         StyleIntent,
  pub min_price:     f64,
  pub max_price:     f64,
}
