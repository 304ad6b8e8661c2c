//! Paged reads of the submission list

use serde::Serialize;

/// Rows per page of `GET /api/submissions`
pub const PAGE_SIZE: i64 = 15;

/// The LIMIT/OFFSET pair for one page, after clamping the requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub total_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    /// Clamp `requested` into `1..=total_pages` (page 1 when there are no rows)
    ///
    /// ```
    /// use nysf_server::pagination::PageWindow;
    ///
    /// let window = PageWindow::clamp(17, 9);
    /// assert_eq!((window.page, window.total_pages, window.offset), (2, 2, 15));
    /// ```
    pub fn clamp(total_rows: i64, requested: i64) -> Self {
        let total_pages = (total_rows.max(0) + PAGE_SIZE - 1) / PAGE_SIZE;
        let page = requested.clamp(1, total_pages.max(1));
        PageWindow {
            page,
            total_pages,
            limit: PAGE_SIZE,
            offset: (page - 1) * PAGE_SIZE,
        }
    }
}

/// A page of rows with the counts a client needs to page through the rest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total: i64, window: PageWindow, data: Vec<T>) -> Self {
        Page {
            total,
            page: window.page,
            page_size: window.limit,
            total_pages: window.total_pages,
            data,
        }
    }
}
