//! Core types and the search engine for the estate marketplace.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::ListingStore`]; image hosting implements
//! [`image::ImageResolver`]. Everything else here is computation over what
//! those two return.

pub mod error;
pub mod filter;
pub mod image;
pub mod listing;
pub mod pagination;
pub mod personalize;
pub mod preference;
pub mod project;
pub mod search;
pub mod store;

pub use error::{Error, Result};
