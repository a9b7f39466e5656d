//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Largest page size a client may request.
const MAX_PER_PAGE: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page (capped at 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Returns the effective page size after clamping to the allowed range.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.size())
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.size())
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Page size used for this response.
    pub per_page: u32,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl PageMeta {
    /// Builds metadata from a request and the total item count.
    #[must_use]
    pub fn new(request: &PageRequest, total: u64) -> Self {
        let per_page = request.size();
        let total_pages = total.div_ceil(u64::from(per_page));
        Self {
            page: request.page,
            per_page,
            total,
            total_pages,
        }
    }

    /// Returns true if pages exist beyond the current one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request() {
        let req = PageRequest::default();
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 20);
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_offset_for_later_pages() {
        let req = PageRequest {
            page: 3,
            per_page: 25,
        };
        assert_eq!(req.offset(), 50);
    }

    #[test]
    fn test_per_page_is_capped() {
        let req = PageRequest {
            page: 1,
            per_page: 10_000,
        };
        assert_eq!(req.size(), 100);
        assert_eq!(req.limit(), 100);
    }

    #[test]
    fn test_zero_per_page_is_raised_to_one() {
        let req = PageRequest {
            page: 1,
            per_page: 0,
        };
        assert_eq!(req.size(), 1);
    }

    #[test]
    fn test_meta_total_pages() {
        let req = PageRequest {
            page: 1,
            per_page: 20,
        };
        let meta = PageMeta::new(&req, 45);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next());

        let meta = PageMeta::new(&req, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next());
    }
}
