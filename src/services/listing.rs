//! In-memory filtering and pagination shared by every list view.
//!
//! Filtering is always recomputed over the full collection; results keep
//! insertion order.

use serde::Serialize;

use crate::models::pagination::{PagedResult, Pagination};

/// A filter set that can decide whether a single record matches.
pub trait RecordFilter<T> {
    fn matches(&self, item: &T) -> bool;
}

/// Case-insensitive substring match. An empty or absent needle matches all.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Equality check that treats an unset filter value as a wildcard.
pub fn matches_opt<V: PartialEq>(filter: &Option<V>, value: &V) -> bool {
    filter.as_ref().is_none_or(|f| f == value)
}

/// Apply `filter` to `items` and slice the result into the requested page.
pub fn filter_page<'a, T, F>(
    items: impl IntoIterator<Item = &'a T>,
    filter: &F,
    pagination: &Pagination,
) -> PagedResult<T>
where
    T: Clone + Serialize + 'a,
    F: RecordFilter<T>,
{
    let matched: Vec<T> = items
        .into_iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect();
    PagedResult::from_items(matched, pagination)
}

/// View state for a filterable, paginated table.
///
/// Any change to the filters sends the view back to page 1.
#[derive(Debug, Clone)]
pub struct ListState<F> {
    filters: F,
    page: usize,
    per_page: usize,
}

impl<F: Default> ListState<F> {
    pub fn new(per_page: usize) -> Self {
        Self {
            filters: F::default(),
            page: 1,
            per_page: per_page.max(1),
        }
    }
}

impl<F> ListState<F> {
    pub fn filters(&self) -> &F {
        &self.filters
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_filters(&mut self, filters: F) {
        self.filters = filters;
        self.page = 1;
    }

    /// Edit filters in place; the page resets even if nothing changed.
    pub fn update_filters(&mut self, edit: impl FnOnce(&mut F)) {
        edit(&mut self.filters);
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    pub fn apply<'a, T>(&self, items: impl IntoIterator<Item = &'a T>) -> PagedResult<T>
    where
        T: Clone + Serialize + 'a,
        F: RecordFilter<T>,
    {
        filter_page(items, &self.filters, &self.pagination())
    }
}
