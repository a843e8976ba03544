//! Page arithmetic. Pure functions, no state.

use serde::Serialize;

use crate::store::Window;

/// Page size used by the public listing endpoint unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Upper bound on a requested page size unless configured otherwise.
pub const MAX_PAGE_SIZE: u32 = 50;

/// `ceil(total / page_size)`; zero when either input is zero.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
  if page_size == 0 {
    return 0;
  }
  total.div_ceil(u64::from(page_size))
}

/// A requested page: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page:  u32,
  pub limit: u32,
}

impl PageRequest {
  /// Normalise raw `page` / `limit` query values. Missing or malformed
  /// values fall back to page 1 and `default_limit`; the limit is clamped to
  /// `1..=max_limit`.
  pub fn parse(
    page: Option<&str>,
    limit: Option<&str>,
    default_limit: u32,
    max_limit: u32,
  ) -> Self {
    let page = page
      .and_then(|p| p.trim().parse::<u32>().ok())
      .unwrap_or(1)
      .max(1);
    let limit = limit
      .and_then(|l| l.trim().parse::<u32>().ok())
      .unwrap_or(default_limit)
      .clamp(1, max_limit.max(1));
    Self { page, limit }
  }

  pub fn window(&self) -> Window {
    let limit = u64::from(self.limit);
    Window {
      offset: u64::from(self.page.saturating_sub(1)).saturating_mul(limit),
      limit,
    }
  }

  pub fn envelope(&self, total: u64) -> Pagination {
    Pagination {
      page: self.page,
      limit: self.limit,
      total,
      total_pages: total_pages(total, self.limit),
    }
  }
}

/// The `pagination` object of a listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub page:        u32,
  pub limit:       u32,
  pub total:       u64,
  pub total_pages: u64,
}
