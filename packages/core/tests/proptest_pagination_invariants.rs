//! Property-based tests for page presentation.
//!
//! For any list length, offset (negative and past-the-end included) and
//! page size:
//!
//! 1. **Bounds**: a page never exceeds the page size and starts at a
//!    clamped offset inside the list
//! 2. **Continuation**: `next_offset` follows the page and `has_more`
//!    holds exactly when it is still inside the list
//! 3. **Coverage**: following `next_offset` from 0 visits every item once,
//!    in order

use deftree_core::services::present_page;
use proptest::prelude::*;

proptest! {
    #[test]
    fn page_bounds_hold(
        total in 0usize..200,
        offset in -500i64..500,
        page_size in 0usize..300,
    ) {
        let items: Vec<usize> = (0..total).collect();
        let page = present_page(&items, offset, page_size);

        prop_assert!(page.items.len() <= page_size);
        prop_assert_eq!(page.total_count, total);
        prop_assert!(page.offset <= total.saturating_sub(1));
        prop_assert_eq!(page.next_offset, page.offset + page.items.len());
        prop_assert_eq!(page.has_more, page.next_offset < total);
        prop_assert_eq!(&page.items[..], &items[page.offset..page.next_offset]);
    }

    #[test]
    fn following_next_offset_visits_every_item_once(
        total in 1usize..150,
        page_size in 1usize..40,
    ) {
        let items: Vec<usize> = (0..total).collect();
        let mut seen = Vec::with_capacity(total);
        let mut offset = 0i64;

        loop {
            let page = present_page(&items, offset, page_size);
            seen.extend(page.items.iter().copied());
            if !page.has_more {
                break;
            }
            offset = i64::try_from(page.next_offset).unwrap_or(i64::MAX);
        }

        prop_assert_eq!(seen, items);
    }
}
