//! Page arithmetic for the bookmarks list. Pure and recomputed per request;
//! nothing here touches the database.

/// Fixed page size for the bookmarks page.
pub const POSTS_PER_PAGE: usize = 10;

/// The slice of items to show for one page, plus enough context to draw the
/// pagination strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    /// 1-based page actually shown.
    pub page: usize,
    pub total_pages: usize,
    /// Start of the item range, inclusive.
    pub start: usize,
    /// End of the item range, exclusive. Clamped so `start..end` is always in
    /// bounds for the item list.
    pub end: usize,
}

impl PageSlice {
    pub fn compute(total_items: usize, requested_page: usize, per_page: usize) -> Self {
        let page = requested_page.max(1);
        let total_pages = total_items.div_ceil(per_page);
        let start = ((page - 1) * per_page).min(total_items);
        let end = (start + per_page).min(total_items);
        PageSlice {
            page,
            total_pages,
            start,
            end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Parses the `page` query parameter. Missing, non-numeric, or non-positive
/// values all fall back to page 1.
pub fn page_from_query(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1)
}
