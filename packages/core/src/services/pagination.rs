//! Page Presentation
//!
//! Slices a flattened list into fixed-size pages. Out-of-range offsets are
//! clamped rather than reported, so every request yields a page.

use serde::Serialize;

/// One page of a longer list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Length of the whole list
    pub total_count: usize,
    /// Offset of the first item after this page
    pub next_offset: usize,
    /// Whether items remain after this page
    pub has_more: bool,
    /// Clamped offset this page starts at
    pub offset: usize,
}

/// Clamp `offset` into `[0, max(0, total_count - 1)]`
pub fn clamp_offset(offset: i64, total_count: usize) -> usize {
    if offset <= 0 || total_count == 0 {
        return 0;
    }
    let last = total_count - 1;
    usize::try_from(offset).map_or(last, |offset| offset.min(last))
}

/// Cut the page starting at the clamped `offset`
///
/// # Examples
///
/// ```rust
/// # use deftree_core::services::pagination::present_page;
/// let items: Vec<u32> = (0..5).collect();
///
/// let page = present_page(&items, 3, 10);
/// assert_eq!(page.items, vec![3, 4]);
/// assert_eq!(page.next_offset, 5);
/// assert!(!page.has_more);
///
/// let clamped = present_page(&items, -4, 2);
/// assert_eq!(clamped.offset, 0);
/// assert!(clamped.has_more);
/// ```
pub fn present_page<T: Clone>(items: &[T], offset: i64, page_size: usize) -> Page<T> {
    let total_count = items.len();
    let offset = clamp_offset(offset, total_count);
    let end = offset.saturating_add(page_size).min(total_count);
    let page = items.get(offset..end).map(<[T]>::to_vec).unwrap_or_default();
    let next_offset = offset + page.len();

    Page {
        items: page,
        total_count,
        next_offset,
        has_more: next_offset < total_count,
        offset,
    }
}
