//! Image reference resolution.
//!
//! Listings store image *references*: object-storage keys or, for older
//! records, absolute URLs. Turning a key into something a browser can load
//! belongs to the storage collaborator; this module only defines the seam and
//! a base-URL implementation for deployments that serve images publicly.

use std::{convert::Infallible, future::Future};

/// Maps a stored image reference to a displayable URL.
///
/// Implementations must be idempotent, pass absolute `http(s)` URLs through
/// unchanged, and map an absent reference to `None`.
pub trait ImageResolver: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn resolve<'a>(
    &'a self,
    reference: Option<&'a str>,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;
}

/// `true` for references that are already fully-qualified URLs.
pub fn is_absolute(reference: &str) -> bool {
  let lower = reference.get(..8).unwrap_or(reference).to_ascii_lowercase();
  lower.starts_with("http://") || lower.starts_with("https://")
}

/// Joins relative references onto a fixed public base URL.
#[derive(Debug, Clone)]
pub struct BaseUrlResolver {
  base_url: String,
}

impl BaseUrlResolver {
  pub fn new(base_url: impl Into<String>) -> Self {
    let mut base_url = base_url.into();
    while base_url.ends_with('/') {
      base_url.pop();
    }
    Self { base_url }
  }

  fn join(&self, reference: &str) -> String {
    if is_absolute(reference) {
      return reference.to_owned();
    }
    format!("{}/{}", self.base_url, reference.trim_start_matches('/'))
  }
}

impl ImageResolver for BaseUrlResolver {
  type Error = Infallible;

  async fn resolve(&self, reference: Option<&str>) -> Result<Option<String>, Infallible> {
    Ok(
      reference
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| self.join(r)),
    )
  }
}
