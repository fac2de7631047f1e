//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_LIMIT: u64 = 10;
/// Maximum page size.
pub const MAX_LIMIT: u64 = 100;
/// Highest page whose offset still fits a signed 64-bit SQL `OFFSET`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;

/// A normalized page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub limit: u64,
}

impl PageRequest {
    /// Create a page request, clamping page into `1..=MAX_PAGE` and limit
    /// into `1..=MAX_LIMIT`.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Build from optional query-string values, applying defaults.
    pub fn from_optional(page: Option<u64>, limit: Option<u64>) -> Self {
        Self::new(page.unwrap_or(1), limit.unwrap_or(DEFAULT_LIMIT))
    }

    /// Number of items skipped before this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Pagination metadata returned next to a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Current page number (1-based).
    pub current_page: u64,
    /// Number of items per page.
    pub limit: u64,
    /// Total number of matching items across all pages.
    pub total_items: u64,
    /// `ceil(total_items / limit)`.
    pub total_pages: u64,
    /// Whether items exist after this page.
    pub has_next_page: bool,
    /// Whether this is not the first page.
    pub has_prev_page: bool,
}

impl PageInfo {
    /// Compute metadata for a window over `total_items` results.
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        Self {
            current_page: request.page,
            limit: request.limit,
            total_items,
            total_pages: total_items.div_ceil(request.limit),
            has_next_page: request.page.saturating_mul(request.limit) < total_items,
            has_prev_page: request.page > 1,
        }
    }
}

/// A page of items plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Pagination metadata.
    pub pagination: PageInfo,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            pagination: PageInfo::new(request, total_items),
        }
    }

    /// Map the items while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(PageRequest::new(0, 0), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(3, 500).limit, MAX_LIMIT);
        assert_eq!(PageRequest::from_optional(None, None).limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let request = PageRequest::from_optional(Some(u64::MAX), Some(10));
        assert_eq!(request.page, MAX_PAGE);
        assert!(i64::try_from(request.offset()).is_ok());

        let info = PageInfo::new(request, 5);
        assert!(!info.has_next_page);
        assert!(info.has_prev_page);

        // Fields built directly skip the clamp.
        let raw = PageRequest { page: u64::MAX, limit: MAX_LIMIT };
        assert_eq!(raw.offset(), u64::MAX);
        assert!(!PageInfo::new(raw, 5).has_next_page);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let info = PageInfo::new(PageRequest::new(1, 10), 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next_page);
        assert!(!info.has_prev_page);
    }

    #[test]
    fn test_last_page_has_no_next() {
        let info = PageInfo::new(PageRequest::new(3, 10), 25);
        assert!(!info.has_next_page);
        assert!(info.has_prev_page);

        let exact = PageInfo::new(PageRequest::new(2, 10), 20);
        assert_eq!(exact.total_pages, 2);
        assert!(!exact.has_next_page);
    }

    #[test]
    fn test_empty_result() {
        let info = PageInfo::new(PageRequest::default(), 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next_page);
    }

    #[test]
    fn test_serializes_camel_case() {
        let info = PageInfo::new(PageRequest::new(2, 5), 11);
        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["hasNextPage"], true);
        assert_eq!(json["hasPrevPage"], true);
    }
}
