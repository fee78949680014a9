//! Page-number pagination for the feed and profile lists.
//!
//! Pages are fixed windows of a configured size, newest first: page `N` starts at offset
//! `N * page_size`. Tweets posted between two requests shift the windows; clients may see
//! an item twice across pages.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// `?page=N` query parameter.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    /// Zero-based page number (default: 0, negative values are treated as 0)
    #[param(default = 0, minimum = 0)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page: Option<i64>,
}

impl PageQuery {
    /// Get the page number, defaulting to 0 and never negative.
    #[inline]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0).max(0)
    }

    /// Offset of the first row of this page.
    #[inline]
    pub fn skip(&self, page_size: i64) -> i64 {
        self.page().saturating_mul(page_size)
    }
}

/// One page of a newest-first list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageResponse<T: ToSchema> {
    /// The items for the current page
    pub data: Vec<T>,
    /// Zero-based page number
    pub page: i64,
    /// Maximum items per page
    pub page_size: i64,
    /// Whether a further page exists
    pub has_more: bool,
}

impl<T: ToSchema> PageResponse<T> {
    /// Build a page from a window fetched with one row more than `page_size`.
    ///
    /// The extra row only signals that another page exists and is dropped.
    pub fn from_lookahead(mut rows: Vec<T>, page: i64, page_size: i64) -> Self {
        let size = usize::try_from(page_size).unwrap_or(0);
        let has_more = rows.len() > size;
        rows.truncate(size);

        Self {
            data: rows,
            page,
            page_size,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 0);
        assert_eq!(q.skip(10), 0);
    }

    #[test]
    fn test_negative_page_clamps_to_zero() {
        let q = PageQuery { page: Some(-3) };
        assert_eq!(q.page(), 0);
        assert_eq!(q.skip(10), 0);
    }

    #[test]
    fn test_skip() {
        let q = PageQuery { page: Some(3) };
        assert_eq!(q.skip(10), 30);
        assert_eq!(q.skip(5), 15);

        // Absurd page numbers don't overflow
        let q = PageQuery { page: Some(i64::MAX) };
        assert_eq!(q.skip(10), i64::MAX);
    }

    #[test]
    fn test_query_string_parsing() {
        let q: PageQuery = serde_json::from_value(serde_json::json!({ "page": "2" })).unwrap();
        assert_eq!(q.page(), 2);

        assert!(serde_json::from_value::<PageQuery>(serde_json::json!({ "page": "two" })).is_err());
    }

    #[test]
    fn test_from_lookahead() {
        let full: PageResponse<i64> = PageResponse::from_lookahead(vec![1, 2, 3], 0, 2);
        assert_eq!(full.data, vec![1, 2]);
        assert!(full.has_more);

        let last: PageResponse<i64> = PageResponse::from_lookahead(vec![1, 2], 4, 2);
        assert_eq!(last.data, vec![1, 2]);
        assert!(!last.has_more);
        assert_eq!(last.page, 4);

        let empty: PageResponse<i64> = PageResponse::from_lookahead(vec![], 9, 2);
        assert!(empty.data.is_empty());
        assert!(!empty.has_more);
    }
}
