//! Paging through collections.

use serde::{Deserialize, Serialize};

/// The largest page a client can ask for.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Pagination parameters.
///
/// Without a page size the whole collection is returned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// The 0-indexed page to fetch.
    page: Option<i64>,
    /// The number of elements per page.
    page_size: Option<i64>,
}

impl PaginationParams {
    /// Constructs new pagination parameters.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self { page, page_size }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0).max(0)
    }

    pub fn page_size(&self) -> Option<i64> {
        self.page_size.map(|n| n.clamp(1, MAX_PAGE_SIZE))
    }

    /// The maximum number of elements to return, `None` for all of them.
    pub fn limit(&self) -> Option<i64> {
        self.page_size()
    }

    pub fn offset(&self) -> i64 {
        self.page_size().map_or(0, |n| self.page().saturating_mul(n))
    }

    /// Selects the current page from an ordered iterator.
    pub fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        let skipped = items.skip(self.offset() as usize);
        match self.limit() {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        }
    }
}
