//! Offset/limit pagination with a look-ahead `has_more` flag.

use serde::Serialize;

/// Page size used when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Hard cap on the number of items returned per request.
pub const MAX_PAGE_SIZE: i64 = 50;

/// Offset/limit window applied to a listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }
}

/// One page of results plus a flag telling the caller whether another page
/// exists, derived from fetching one row past the requested limit instead of
/// issuing a count query.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page from a result set fetched with `limit + 1` rows.
    pub fn from_lookahead(mut items: Vec<T>, limit: i64) -> Self {
        let limit = limit.max(0) as usize;
        let has_more = items.len() > limit;
        items.truncate(limit);
        Self { items, has_more }
    }
}
