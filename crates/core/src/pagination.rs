//! Paginated list envelope returned by list endpoints.

use serde::{Deserialize, Serialize};

use crate::query::ListQuery;
use crate::types::Count;

/// One page of a resource collection plus the totals needed to render a
/// pager.
///
/// Invariants for a result built with [`PaginatedResult::new`]:
/// `has_more == (page * limit < total)` and
/// `total_pages == ceil(total / limit)` when `limit > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: Count,
    pub page: Count,
    pub total_pages: Count,
    pub has_more: bool,
}

impl<T> PaginatedResult<T> {
    /// Build a page, deriving `total_pages` and `has_more`.
    ///
    /// A negative `total` is treated as zero.
    pub fn new(items: Vec<T>, total: Count, page: Count, limit: Count) -> Self {
        let total = total.max(0);
        Self {
            items,
            total,
            page,
            total_pages: total_pages(total, limit),
            has_more: page.saturating_mul(limit) < total,
        }
    }

    /// Build the page answering `query`.
    pub fn for_query(items: Vec<T>, total: Count, query: &ListQuery) -> Self {
        Self::new(items, total, query.page(), query.limit())
    }

    /// An empty page (no rows at all).
    pub fn empty(page: Count) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            total_pages: 0,
            has_more: false,
        }
    }

    /// Convert the rows, keeping the paging metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
            has_more: self.has_more,
        }
    }

    /// Whether the metadata agrees with the invariants for page size `limit`.
    ///
    /// Backends compute these fields themselves; callers use this to detect
    /// a page that was produced with a different `limit` than requested.
    pub fn is_consistent(&self, limit: Count) -> bool {
        self.total >= 0
            && self.total_pages == total_pages(self.total, limit)
            && self.has_more == (self.page.saturating_mul(limit) < self.total)
    }
}

/// `ceil(total / limit)`, or zero when `limit` is not positive.
pub fn total_pages(total: Count, limit: Count) -> Count {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    (total - 1) / limit + 1
}
