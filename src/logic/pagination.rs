//! Pagination logic
//!
//! Pages are 1-based. An empty collection still has one (empty) page so the
//! current page is always a valid number to show.

use std::ops::Range;

/// Number of pages for `len` items; never less than 1
///
/// # Examples
/// ```
/// use servicefinder::logic::pagination::total_pages;
///
/// assert_eq!(total_pages(20, 9), 3);
/// assert_eq!(total_pages(18, 9), 2);
/// assert_eq!(total_pages(0, 9), 1);
/// ```
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Clamp a requested page into `[1, total_pages]`
///
/// # Examples
/// ```
/// use servicefinder::logic::pagination::clamp_page;
///
/// assert_eq!(clamp_page(5, 20, 9), 3);
/// assert_eq!(clamp_page(0, 20, 9), 1);
/// assert_eq!(clamp_page(4, 0, 9), 1);
/// ```
pub fn clamp_page(page: usize, len: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(len, page_size))
}

/// Index range of the items on `page`
pub fn page_range(page: usize, len: usize, page_size: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let page = clamp_page(page, len, page_size);
    let start = ((page - 1) * page_size).min(len);
    let end = (start + page_size).min(len);
    start..end
}

/// Current page plus navigation over a collection of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub len: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            len: 0,
        }
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.len, self.page_size)
    }

    /// New collection length; the page goes back to 1
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.page = 1;
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = clamp_page(page, self.len, self.page_size);
    }

    pub fn next(&mut self) {
        self.go_to(self.page + 1);
    }

    pub fn previous(&mut self) {
        self.go_to(self.page.saturating_sub(1));
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn range(&self) -> Range<usize> {
        page_range(self.page, self.len, self.page_size)
    }
}
