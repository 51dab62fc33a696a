//! Page requests and pagination metadata.

use serde::{Deserialize, Serialize};

/// Page returned when none (or an invalid one) is requested
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when none (or an invalid one) is requested
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A validated request for one page of a collection
///
/// Both numbers are 1-based and at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Creates a page request, replacing zeros with the defaults
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    /// Builds a page request from raw query text
    ///
    /// Missing, non-numeric, zero, or negative values fall back to the defaults.
    #[must_use]
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        Self::new(
            page.and_then(parse_positive).unwrap_or(DEFAULT_PAGE),
            page_size.and_then(parse_positive).unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    /// 1-based page number
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items that come before this page
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// The window of `items` that falls on this page; empty when out of range
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(self.page_size as usize).min(items.len());
        &items[start..end]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|value| *value > 0)
}

/// Pagination metadata returned alongside a page of data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Items in the whole collection
    pub total: u64,
    /// 1-based page number that was served
    pub page: u32,
    /// Requested page size
    pub page_size: u32,
    /// `ceil(total / page_size)`
    pub total_pages: u64,
}

impl Pagination {
    /// Computes metadata for `request` against a collection of `total` items
    #[must_use]
    pub const fn new(request: PageRequest, total: u64) -> Self {
        Self {
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages: total.div_ceil(request.page_size as u64),
        }
    }
}

/// One page of a collection plus its metadata
///
/// Serializes as `{ "data": [...], "pagination": {...} }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in collection order
    pub data: Vec<T>,
    /// Metadata for the whole collection
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn missing_values_use_defaults() {
        let request = PageRequest::from_query(None, None);
        assert_eq!(request.page(), 1);
        assert_eq!(request.page_size(), 10);
    }

    #[test]
    fn garbage_values_use_defaults() {
        let request = PageRequest::from_query(Some("abc"), Some("-4"));
        assert_eq!(request, PageRequest::default());

        let request = PageRequest::from_query(Some("0"), Some(""));
        assert_eq!(request, PageRequest::default());
    }

    #[test]
    fn numeric_values_are_parsed() {
        let request = PageRequest::from_query(Some("3"), Some(" 25 "));
        assert_eq!(request.page(), 3);
        assert_eq!(request.page_size(), 25);
        assert_eq!(request.offset(), 50);
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let items = [1, 2, 3];
        let request = PageRequest::new(5, 2);
        assert!(request.slice(&items).is_empty());

        let pagination = Pagination::new(request, 3);
        assert_eq!(pagination.total_pages, 2);
        assert_eq!(pagination.page, 5);
    }

    #[test]
    fn last_page_is_partial() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(PageRequest::new(3, 2).slice(&items), &[5]);
    }

    #[test]
    fn empty_collection_has_zero_pages() {
        assert_eq!(Pagination::new(PageRequest::default(), 0).total_pages, 0);
    }

    #[test]
    fn pagination_serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(PageRequest::new(2, 10), 11)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "total": 11, "page": 2, "pageSize": 10, "totalPages": 2 })
        );
    }

    proptest! {
        #[test]
        fn page_never_exceeds_page_size(
            total in 0usize..300,
            page in 1u32..40,
            page_size in 1u32..50,
        ) {
            let items: Vec<usize> = (0..total).collect();
            let request = PageRequest::new(page, page_size);
            let slice = request.slice(&items);
            let pagination = Pagination::new(request, total as u64);

            prop_assert!(slice.len() <= page_size as usize);
            prop_assert_eq!(
                pagination.total_pages,
                (total as u64 + u64::from(page_size) - 1) / u64::from(page_size)
            );
            if let Some(first) = slice.first() {
                prop_assert_eq!(*first as u64, request.offset());
            }
        }
    }
}
