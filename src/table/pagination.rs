use std::fmt;
use std::sync::Arc;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

pub type PageChange = Arc<dyn Fn(usize) + Send + Sync>;

/// Internal pagination slices the loaded rows. Controlled pagination hands
/// page changes to the caller, who already passes one page of rows.
#[derive(Clone, Default)]
pub enum PageMode {
    #[default]
    Internal,
    Controlled(PageChange),
}

impl fmt::Debug for PageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageMode::Internal => f.write_str("Internal"),
            PageMode::Controlled(_) => f.write_str("Controlled"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pagination {
    pub items_per_page: usize,
    /// Overrides the row count, for server-side paging
    pub total_items: Option<usize>,
    pub current_page: usize,
    pub mode: PageMode,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            total_items: None,
            current_page: 1,
            mode: PageMode::Internal,
        }
    }
}

impl Pagination {
    pub fn per_page(items_per_page: usize) -> Self {
        Self {
            items_per_page: items_per_page.max(1),
            ..Self::default()
        }
    }

    pub fn controlled(items_per_page: usize, total_items: usize, on_change: PageChange) -> Self {
        Self {
            items_per_page: items_per_page.max(1),
            total_items: Some(total_items),
            current_page: 1,
            mode: PageMode::Controlled(on_change),
        }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.mode, PageMode::Controlled(_))
    }

    /// A zero override falls back to the row count
    pub fn total(&self, row_count: usize) -> usize {
        match self.total_items {
            Some(n) if n > 0 => n,
            _ => row_count,
        }
    }

    pub fn total_pages(&self, row_count: usize) -> usize {
        self.total(row_count).div_ceil(self.items_per_page.max(1))
    }

    /// Range of the sorted rows to show; everything when controlled
    pub fn window(&self, row_count: usize) -> std::ops::Range<usize> {
        if self.is_controlled() {
            return 0..row_count;
        }
        let start = (self.current_page.saturating_sub(1) * self.items_per_page).min(row_count);
        let end = (start + self.items_per_page).min(row_count);
        start..end
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self, row_count: usize) -> bool {
        self.current_page < self.total_pages(row_count)
    }

    pub fn shows_controls(&self, row_count: usize) -> bool {
        self.total_pages(row_count) > 1
    }

    /// Move to `page` (1-indexed). Pages past either end are refused.
    pub fn go_to(&mut self, page: usize, row_count: usize) -> bool {
        if page == 0 || page > self.total_pages(row_count) || page == self.current_page {
            return false;
        }
        self.current_page = page;
        if let PageMode::Controlled(on_change) = &self.mode {
            on_change(page);
        }
        true
    }

    pub fn next(&mut self, row_count: usize) -> bool {
        self.go_to(self.current_page + 1, row_count)
    }

    pub fn previous(&mut self, row_count: usize) -> bool {
        match self.current_page.checked_sub(1) {
            Some(page) => self.go_to(page, row_count),
            None => false,
        }
    }

    pub fn summary(&self, shown: usize, row_count: usize) -> String {
        format!("Showing {} of {} records", shown, self.total(row_count))
    }

    pub fn page_label(&self, row_count: usize) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages(row_count))
    }
}
