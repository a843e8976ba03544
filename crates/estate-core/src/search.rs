//! The search executor: one count query and one page query per request.

use crate::{
  Error, Result,
  listing::Listing,
  store::{ListingPredicate, ListingStore, Window},
};

/// One page of matches plus the total match count.
#[derive(Debug, Clone)]
pub struct SearchPage {
  pub listings: Vec<Listing>,
  pub total:    u64,
}

/// Run `predicate` against `store`, returning the rows inside `window`.
///
/// `total` counts every match and does not depend on the window. A window
/// past the end yields an empty page. Store errors are not retried.
pub async fn execute<S>(
  store: &S,
  predicate: &ListingPredicate,
  window: Window,
) -> Result<SearchPage>
where
  S: ListingStore,
{
  let total = store.count_listings(predicate).await.map_err(Error::query)?;

  let listings = if window.offset >= total {
    Vec::new()
  } else {
    store
      .find_listings(predicate, window)
      .await
      .map_err(Error::query)?
  };

  Ok(SearchPage { listings, total })
}
