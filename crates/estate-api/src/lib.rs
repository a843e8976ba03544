//! JSON REST API for the estate marketplace.
//!
//! Exposes an axum [`Router`] backed by any [`ListingStore`] and
//! [`ImageResolver`]. TLS and transport concerns are the caller's
//! responsibility; identity issuance lives elsewhere, this crate only
//! verifies session tokens (see [`auth`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", estate_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod listings;
pub mod personalize;
pub mod preferences;

use std::sync::Arc;

use axum::{Router, routing::get};
use estate_core::{
  image::ImageResolver,
  pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
  store::ListingStore,
};

pub use auth::{Caller, SessionKeys};
pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Paging limits for the listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiConfig {
  pub default_page_size: u32,
  pub max_page_size:     u32,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      default_page_size: DEFAULT_PAGE_SIZE,
      max_page_size:     MAX_PAGE_SIZE,
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, R> {
  pub store:    Arc<S>,
  pub images:   Arc<R>,
  pub sessions: Arc<SessionKeys>,
  pub config:   Arc<ApiConfig>,
}

impl<S, R> Clone for ApiState<S, R> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      images:   Arc::clone(&self.images),
      sessions: Arc::clone(&self.sessions),
      config:   Arc::clone(&self.config),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, R>(state: ApiState<S, R>) -> Router<()>
where
  S: ListingStore + 'static,
  R: ImageResolver + 'static,
{
  Router::new()
    // Listings
    .route("/properties", get(listings::search::<S, R>))
    .route("/properties/for-you", get(personalize::for_you::<S, R>))
    .route("/properties/{id}", get(listings::detail::<S, R>))
    .route("/agents/{id}/properties", get(listings::agent_inventory::<S, R>))
    // Preferences
    .route(
      "/preferences",
      get(preferences::get::<S, R>).put(preferences::put::<S, R>),
    )
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
