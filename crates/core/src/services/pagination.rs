//! Offset-based pagination shared by all listings.

use serde::{Deserialize, Serialize};

/// A zero-based page number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page index, starting at 0.
    #[serde(default)]
    pub page: u64,
}

impl PageRequest {
    /// Request a specific page.
    #[must_use]
    pub const fn new(page: u64) -> Self {
        Self { page }
    }

    /// Row offset for a given page size.
    #[must_use]
    pub const fn offset(self, page_size: u64) -> u64 {
        self.page.saturating_mul(page_size)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// The next page to request, present only when this page was full.
    pub next_page: Option<u64>,
}

impl<T> Page<T> {
    /// Build a page from the fetched rows, deciding from their count whether more may follow.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, page_size: u64) -> Self {
        let full = page_size > 0 && items.len() as u64 >= page_size;
        Self {
            items,
            next_page: full.then(|| request.page + 1),
        }
    }

    /// Swap in the items rendered from the fetched rows, keeping the cursor.
    ///
    /// Rows that vanish while rendering (a post deleted in between) do not end the listing.
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            next_page: self.next_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(0).offset(4), 0);
        assert_eq!(PageRequest::new(2).offset(6), 12);
    }

    #[test]
    fn test_full_page_has_next() {
        let page = Page::new(vec![1, 2, 3, 4], PageRequest::new(1), 4);
        assert_eq!(page.next_page, Some(2));
    }

    #[test]
    fn test_short_page_is_last() {
        let page = Page::new(vec![1, 2], PageRequest::new(0), 4);
        assert_eq!(page.next_page, None);

        let empty: Page<u8> = Page::new(vec![], PageRequest::new(3), 6);
        assert_eq!(empty.next_page, None);
    }

    #[test]
    fn test_with_items_keeps_cursor_of_fetched_rows() {
        let rows = Page::new(vec!["p1", "p2", "p3"], PageRequest::new(0), 3);
        let page = rows.with_items(vec![1, 3]);
        assert_eq!(page.items, vec![1, 3]);
        assert_eq!(page.next_page, Some(1));
    }

    #[test]
    fn test_serializes_camel_case() {
        let page = Page::new(vec!["a"], PageRequest::new(0), 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["nextPage"], 1);
        assert_eq!(json["items"][0], "a");
    }
}
