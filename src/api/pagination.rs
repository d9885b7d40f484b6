use serde::Serialize;

use crate::store::RowRange;
use crate::util::QueryParams;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// A validated page request: `page >= 1`, `1 <= limit <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1) as u64,
            limit: limit.clamp(1, MAX_LIMIT as i64) as u64,
        }
    }

    /// Reads `page` and `limit`. Missing, empty or non-numeric values take
    /// the defaults; anything numeric, zero included, is clamped.
    pub fn from_params(params: &QueryParams) -> Self {
        Self::new(
            params.get_int("page").unwrap_or(DEFAULT_PAGE as i64),
            params.get_int("limit").unwrap_or(DEFAULT_LIMIT as i64),
        )
    }

    /// Zero-based inclusive row range for this page.
    pub fn range(&self) -> RowRange {
        let start = (self.page - 1).saturating_mul(self.limit);
        RowRange {
            start,
            end: start.saturating_add(self.limit - 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub total_pages: u64,
    pub first_page: u64,
    pub last_page: u64,
    pub page: u64,
    pub previous_page: Option<u64>,
    pub next_page: Option<u64>,
}

// previous_page is deliberately not clamped to last_page: asking for
// page 99 of 3 reports previous_page 98.
pub fn paginate(page: u64, limit: u64, total: u64) -> PageMeta {
    let total_pages = if total > 0 { total.div_ceil(limit) } else { 0 };

    PageMeta {
        total,
        total_pages,
        first_page: 1,
        last_page: if total_pages > 0 { total_pages } else { 1 },
        page,
        previous_page: (page > 1).then(|| page - 1),
        next_page: (total_pages > 0 && page < total_pages).then(|| page + 1),
    }
}
