//! Pagination-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for pagination.
#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
pub struct PaginationParams {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    #[param(minimum = 1, example = 1)]
    pub page: u32,

    /// Number of items per page; `size` is accepted too
    #[serde(default = "default_page_size", alias = "size")]
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

/// Generic paged response wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct PagedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Current page number (1-based)
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub page_size: u32,
    #[schema(example = 100)]
    pub total_items: u64,
    #[schema(example = 5)]
    pub total_pages: u32,
    #[schema(example = true)]
    pub has_next: bool,
    #[schema(example = false)]
    pub has_prev: bool,
}

impl<T> PagedResponse<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total_items: u64) -> Self {
        let page_size = u64::from(params.page_size.max(1));
        let total_pages = u32::try_from(total_items.div_ceil(page_size)).unwrap_or(u32::MAX);

        Self {
            data,
            pagination: PaginationMeta {
                page: params.page,
                page_size: params.page_size,
                total_items,
                total_pages,
                has_next: params.page < total_pages,
                has_prev: params.page > 1,
            },
        }
    }

    /// Converts the items while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResponse<U> {
        PagedResponse {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: u32, page_size: u32) -> PaginationParams {
        PaginationParams { page, page_size }
    }

    #[test]
    fn test_offset_and_limit() {
        assert_eq!(params(1, 20).offset(), 0);
        assert_eq!(params(3, 10).offset(), 20);
        assert_eq!(params(3, 10).limit(), 10);
    }

    #[test]
    fn test_meta_for_middle_page() {
        let page = PagedResponse::new(vec![1, 2], &params(2, 2), 5);
        assert_eq!(
            page.pagination,
            PaginationMeta {
                page: 2,
                page_size: 2,
                total_items: 5,
                total_pages: 3,
                has_next: true,
                has_prev: true,
            }
        );
    }

    #[test]
    fn test_empty_result_has_no_pages() {
        let page = PagedResponse::<i32>::new(vec![], &params(1, 20), 0);
        assert_eq!(page.pagination.total_pages, 0);
        assert!(!page.pagination.has_next);
        assert!(!page.pagination.has_prev);
    }

    #[test]
    fn test_size_alias_and_defaults() {
        let parsed: PaginationParams = serde_json::from_str(r#"{"size": 5}"#).unwrap();
        assert_eq!(parsed.page, 1);
        assert_eq!(parsed.page_size, 5);

        let parsed: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.page_size, 20);
        assert!(params(1, MAX_PAGE_SIZE + 1).validate().is_err());
        assert!(params(0, 10).validate().is_err());
    }

    #[test]
    fn test_map_keeps_meta() {
        let page = PagedResponse::new(vec![1, 2, 3], &params(1, 3), 7).map(|n| n * 10);
        assert_eq!(page.data, vec![10, 20, 30]);
        assert_eq!(page.pagination.total_pages, 3);
    }
}
