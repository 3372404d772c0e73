use std::ops::Range;

/// Rows per page on every table screen.
pub const DEFAULT_PAGE_SIZE: usize = 7;

/// 1-based page cursor over a list of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    /// A page size of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(total / page_size)`; zero for an empty list.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// The requested page, clamped to what exists for `total` rows.
    pub fn effective_page(&self, total: usize) -> usize {
        self.page.clamp(1, self.page_count(total).max(1))
    }

    /// Index range of the rows on the effective page.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.effective_page(total) - 1) * self.page_size;
        let end = (start + self.page_size).min(total);
        start.min(total)..end
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Advance one page if there is one. Returns `true` if it moved.
    pub fn next(&mut self, total: usize) -> bool {
        let current = self.effective_page(total);
        if current < self.page_count(total) {
            self.page = current + 1;
            true
        } else {
            self.page = current;
            false
        }
    }

    pub fn prev(&mut self, total: usize) -> bool {
        let current = self.effective_page(total);
        if current > 1 {
            self.page = current - 1;
            true
        } else {
            self.page = 1;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_is_ceiling() {
        let pager = Pager::default();
        for total in 0..=50 {
            assert_eq!(pager.page_count(total), total.div_ceil(7), "total={total}");
        }
    }

    #[test]
    fn last_page_holds_remainder_or_full_page() {
        for total in 1..=50 {
            let mut pager = Pager::default();
            pager.set_page(usize::MAX);
            let last = pager.range(total).len();
            let expected = if total % 7 == 0 { 7 } else { total % 7 };
            assert_eq!(last, expected, "total={total}");
        }
    }

    #[test]
    fn empty_list_has_empty_first_page() {
        let pager = Pager::default();
        assert_eq!(pager.effective_page(0), 1);
        assert!(pager.range(0).is_empty());
    }

    #[test]
    fn next_and_prev_stop_at_edges() {
        let mut pager = Pager::new(7);
        assert!(pager.next(15));
        assert!(pager.next(15));
        assert!(!pager.next(15));
        assert_eq!(pager.page(), 3);
        assert!(pager.prev(15));
        assert_eq!(pager.page(), 2);
        pager.reset();
        assert!(!pager.prev(15));
    }
}
