use std::sync::Arc;

use super::{FilterSpec, Pager, SortKey, ViewField, Viewable};
use crate::store::LoadState;

/// What a table should show besides its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    /// Rows are available on this page.
    Ready,
    /// Nothing fetched yet, or a fetch is in flight with nothing cached.
    Loading,
    /// The source collection is empty.
    Empty,
    /// The source has items but the filters exclude all of them.
    NoMatches,
    /// The last fetch failed and nothing is cached.
    Failed(String),
}

/// One page of a filtered, sorted collection.
#[derive(Debug, Clone)]
pub struct Projection<T> {
    pub rows: Vec<Arc<T>>,
    /// Effective 1-based page number.
    pub page: usize,
    pub page_count: usize,
    /// Items surviving the filters, across all pages.
    pub matched: usize,
    /// Items in the source collection.
    pub total: usize,
    pub status: ViewStatus,
}

/// Filter, sort, and page state for one table.
#[derive(Debug, Clone)]
pub struct ViewState<F: ViewField> {
    filters: FilterSpec<F>,
    sort: Option<SortKey<F>>,
    pager: Pager,
}

impl<F: ViewField> Default for ViewState<F> {
    fn default() -> Self {
        Self::new(super::DEFAULT_PAGE_SIZE)
    }
}

impl<F: ViewField> ViewState<F> {
    pub fn new(page_size: usize) -> Self {
        Self {
            filters: FilterSpec::new(),
            sort: None,
            pager: Pager::new(page_size),
        }
    }

    pub fn with_sort(mut self, key: SortKey<F>) -> Self {
        self.sort = Some(key);
        self
    }

    // ── Filters ──────────────────────────────────────────────────────

    pub fn filters(&self) -> &FilterSpec<F> {
        &self.filters
    }

    /// Set or clear (blank `value`) one filter. Any change returns the
    /// view to page 1.
    pub fn set_filter(&mut self, field: F, value: &str) {
        if self.filters.set(field, value) {
            self.pager.reset();
        }
    }

    pub fn clear_filters(&mut self) {
        if self.filters.clear() {
            self.pager.reset();
        }
    }

    // ── Sorting ──────────────────────────────────────────────────────

    pub fn sort(&self) -> Option<SortKey<F>> {
        self.sort
    }

    /// Sort by `field`, flipping direction if it is already the sort field.
    pub fn toggle_sort(&mut self, field: F) {
        self.sort = Some(SortKey::toggled(self.sort, field));
    }

    pub fn set_sort(&mut self, key: Option<SortKey<F>>) {
        self.sort = key;
    }

    // ── Paging ───────────────────────────────────────────────────────

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn set_page(&mut self, page: usize) {
        self.pager.set_page(page);
    }

    /// `matched` is the filtered row count from the latest projection.
    pub fn next_page(&mut self, matched: usize) -> bool {
        self.pager.next(matched)
    }

    pub fn prev_page(&mut self, matched: usize) -> bool {
        self.pager.prev(matched)
    }

    // ── Projection ───────────────────────────────────────────────────

    /// Every item passing the filters, in sort order. Ties keep source order.
    pub fn filter_sort<T>(&self, items: &[Arc<T>]) -> Vec<Arc<T>>
    where
        T: Viewable<Field = F>,
    {
        let mut out: Vec<Arc<T>> = items
            .iter()
            .filter(|item| self.filters.matches::<T>(item))
            .cloned()
            .collect();

        if let Some(key) = self.sort {
            out.sort_by(|a, b| key.compare::<T>(a, b));
        }
        out
    }

    /// The current page of `items`, plus what to show when it is empty.
    pub fn project<T>(&self, items: &[Arc<T>], load: &LoadState) -> Projection<T>
    where
        T: Viewable<Field = F>,
    {
        let matched_rows = self.filter_sort(items);
        let matched = matched_rows.len();
        let range = self.pager.range(matched);

        let status = if matched > 0 {
            ViewStatus::Ready
        } else if !items.is_empty() {
            ViewStatus::NoMatches
        } else {
            match load {
                LoadState::Idle | LoadState::Loading => ViewStatus::Loading,
                LoadState::Failed(msg) => ViewStatus::Failed(msg.clone()),
                LoadState::Loaded => ViewStatus::Empty,
            }
        };

        Projection {
            rows: matched_rows[range].to_vec(),
            page: self.pager.effective_page(matched),
            page_count: self.pager.page_count(matched),
            matched,
            total: items.len(),
            status,
        }
    }
}
