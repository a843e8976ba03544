//! Error types for `estate-core`.
//!
//! Only upstream faults are errors. Malformed filters, a missing preference
//! record, or an empty near-match are ordinary (possibly empty) results.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("query failed: {0}")]
  QueryFailed(#[source] BoxError),

  #[error("image resolution failed: {0}")]
  ImageResolution(#[source] BoxError),
}

impl Error {
  pub fn query<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::QueryFailed(Box::new(e))
  }

  pub fn image<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::ImageResolution(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
