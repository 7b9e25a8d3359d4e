//! Pagination primitives shared across all list endpoints.

use serde::{Deserialize, Serialize};

/// Pagination query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl Pagination {
    /// Maximum items per page.
    const MAX_PER_PAGE: usize = 100;

    /// Default items per page.
    const DEFAULT_PER_PAGE: usize = 25;

    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn limit(&self) -> usize {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn offset(&self) -> usize {
        (self.current_page() - 1).saturating_mul(self.limit())
    }

    pub fn current_page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}

/// Paged result envelope returned by list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T: Serialize> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl<T: Serialize> PagedResult<T> {
    pub fn new(items: Vec<T>, total: usize, pagination: &Pagination) -> Self {
        let per_page = pagination.limit();
        let total_pages = total.div_ceil(per_page);
        Self {
            items,
            total,
            page: pagination.current_page(),
            per_page,
            total_pages,
        }
    }

    /// Slice an already-filtered list into the requested page.
    pub fn from_items(items: Vec<T>, pagination: &Pagination) -> Self {
        let total = items.len();
        let page_items = items
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit())
            .collect();
        Self::new(page_items, total, pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn pagination_clamps_per_page() {
        assert_eq!(Pagination::new(1, 500).limit(), 100);
        assert_eq!(Pagination::new(1, 0).limit(), 1);
    }

    #[test]
    fn pagination_page_zero_is_first_page() {
        let p = Pagination::new(0, 10);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn pagination_offset_calculation() {
        assert_eq!(Pagination::new(3, 10).offset(), 20);
    }

    #[test]
    fn paged_result_total_pages() {
        let result = PagedResult::new(vec![1, 2, 3], 25, &Pagination::new(1, 10));
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.total, 25);
        assert_eq!(result.page, 1);
    }

    #[test]
    fn from_items_slices_requested_page() {
        let result = PagedResult::from_items((1..=12).collect(), &Pagination::new(2, 5));
        assert_eq!(result.items, vec![6, 7, 8, 9, 10]);
        assert_eq!(result.total, 12);
        assert_eq!(result.total_pages, 3);
    }

    #[test]
    fn empty_input_has_zero_pages() {
        let result: PagedResult<i32> = PagedResult::from_items(vec![], &Pagination::default());
        assert!(result.items.is_empty());
        assert_eq!(result.total_pages, 0);
    }

    #[test]
    fn page_past_end_is_empty() {
        let result = PagedResult::from_items(vec![1, 2], &Pagination::new(5, 10));
        assert!(result.items.is_empty());
        assert_eq!(result.total_pages, 1);
    }

    #[test]
    fn huge_page_number_is_empty() {
        let pagination = Pagination::new(usize::MAX, 100);
        assert_eq!(pagination.offset(), usize::MAX);

        let result = PagedResult::from_items(vec![1, 2, 3], &pagination);
        assert!(result.items.is_empty());
        assert_eq!(result.page, usize::MAX);
        assert_eq!(result.total_pages, 1);
    }
}
