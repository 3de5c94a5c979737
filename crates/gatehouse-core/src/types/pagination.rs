//! List query and paginated response types.

use serde::{Deserialize, Serialize};

use super::filter::FilterPayload;
use super::sorting::{SortField, parse_sort_spec};

/// A per-request list query: page, page size, sort and filter.
///
/// Constructed from query parameters and consumed once by a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// Page number (1-based). Values below 1 behave like 1.
    pub page: u64,
    /// Items per page. `0` means unlimited.
    pub per_page: u64,
    /// Ordering, applied left to right.
    pub sort: Vec<SortField>,
    /// Caller-supplied filter.
    pub filter: FilterPayload,
    /// Whether the repository should also count all matching rows.
    pub count: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 0,
            sort: Vec::new(),
            filter: FilterPayload::Empty,
            count: true,
        }
    }
}

impl ListQuery {
    /// Create a query for the given page and page size.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page,
            per_page,
            ..Self::default()
        }
    }

    /// Set the sort order from a comma-separated `+col,-col` list.
    pub fn with_sort(mut self, spec: &str) -> Self {
        self.sort = parse_sort_spec(spec);
        self
    }

    /// Set the filter payload.
    pub fn with_filter(mut self, filter: FilterPayload) -> Self {
        self.filter = filter;
        self
    }

    /// Enable or disable the total count.
    pub fn with_count(mut self, count: bool) -> Self {
        self.count = count;
        self
    }

    /// The row cap, if any.
    pub fn limit(&self) -> Option<u64> {
        (self.per_page > 0).then_some(self.per_page)
    }

    /// Rows to skip. Only meaningful when a limit is set.
    pub fn offset(&self) -> u64 {
        match self.limit() {
            Some(per_page) if self.page > 1 => (self.page - 1).saturating_mul(per_page),
            _ => 0,
        }
    }
}

/// List response body: `{ "data": [...], "total_count": n }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// The rows on this page.
    pub data: Vec<T>,
    /// Number of rows matching the filter, ignoring pagination.
    pub total_count: u64,
}

impl<T> ListResponse<T> {
    /// Create a new list response.
    pub fn new(data: Vec<T>, total_count: u64) -> Self {
        Self { data, total_count }
    }

    /// Map each row into another representation.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListResponse<U> {
        ListResponse {
            data: self.data.into_iter().map(f).collect(),
            total_count: self.total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_when_per_page_zero() {
        let q = ListQuery::new(3, 0);
        assert_eq!(q.limit(), None);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_offset() {
        assert_eq!(ListQuery::new(0, 10).offset(), 0);
        assert_eq!(ListQuery::new(1, 10).offset(), 0);
        assert_eq!(ListQuery::new(3, 10).offset(), 20);
        assert_eq!(ListQuery::new(3, 10).limit(), Some(10));
    }
}
