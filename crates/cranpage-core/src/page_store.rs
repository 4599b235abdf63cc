//! Ordered storage for loaded pages plus placeholder bookkeeping.
//!
//! One `PageStore` lives for the lifetime of one fetch generation. It is
//! mutated only by insert and drop operations driven by the load
//! coordinator; it has no failure modes of its own. Malformed input is a
//! caller contract violation and fails fast rather than being clamped,
//! since clamping would mask real bookkeeping bugs upstream.
//!
//! Pages carry generation-relative offsets: the refresh page is offset 0,
//! prepended pages count down, appended pages count up. Offsets let a
//! [`ViewportHint`](crate::ViewportHint) computed against one copy of the
//! store be resolved against another copy that has since gained or lost
//! pages at either end.

use std::collections::VecDeque;

use crate::count::Count;
use crate::event::LoadDirection;
use crate::page::Page;

pub struct PageStore<K, V> {
    pages: VecDeque<Page<K, V>>,
    placeholders_before: Count,
    placeholders_after: Count,
    first_page_offset: i32,
    items_len: usize,
}

impl<K, V> PageStore<K, V> {
    pub fn new() -> Self {
        Self {
            pages: VecDeque::new(),
            placeholders_before: Count::Unknown,
            placeholders_after: Count::Unknown,
            first_page_offset: 0,
            items_len: 0,
        }
    }

    /// Total presented size: leading placeholders + loaded items + trailing
    /// placeholders.
    #[inline]
    pub fn size(&self) -> usize {
        self.placeholders_before.presented() + self.items_len + self.placeholders_after.presented()
    }

    /// Number of loaded items across all pages.
    #[inline]
    pub fn items_len(&self) -> usize {
        self.items_len
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    pub fn placeholders_before(&self) -> Count {
        self.placeholders_before
    }

    #[inline]
    pub fn placeholders_after(&self) -> Count {
        self.placeholders_after
    }

    /// Offset of the earliest resident page. Meaningless while empty.
    #[inline]
    pub fn first_page_offset(&self) -> i32 {
        self.first_page_offset
    }

    /// Offset of the latest resident page. Meaningless while empty.
    #[inline]
    pub fn last_page_offset(&self) -> i32 {
        self.first_page_offset + self.pages.len().saturating_sub(1) as i32
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page<K, V>> {
        self.pages.iter()
    }

    pub fn first_page(&self) -> Option<&Page<K, V>> {
        self.pages.front()
    }

    pub fn last_page(&self) -> Option<&Page<K, V>> {
        self.pages.back()
    }

    /// Resolves a loaded-item index (0-based, placeholders excluded) to its
    /// item. O(pages) walk.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of the loaded range.
    pub fn item(&self, index: usize) -> &V {
        assert!(index < self.items_len, "item index {index} out of {}", self.items_len);
        let mut remaining = index;
        for page in &self.pages {
            if remaining < page.len() {
                return &page.items[remaining];
            }
            remaining -= page.len();
        }
        unreachable!("items_len out of sync with pages");
    }

    /// Total item count of `page_count` pages at the given end, without
    /// mutating the store.
    ///
    /// # Panics
    ///
    /// Panics if `page_count` exceeds the resident page count or the
    /// direction is `Refresh`.
    pub fn end_items(&self, direction: LoadDirection, page_count: usize) -> usize {
        assert!(
            page_count <= self.pages.len(),
            "cannot measure {page_count} pages of {}",
            self.pages.len()
        );
        match direction {
            LoadDirection::Prepend => self.pages.iter().take(page_count).map(Page::len).sum(),
            LoadDirection::Append => {
                self.pages.iter().rev().take(page_count).map(Page::len).sum()
            }
            LoadDirection::Refresh => panic!("refresh is not an end"),
        }
    }

    /// Inserts pages, deriving the new placeholder counts from the pages
    /// themselves.
    ///
    /// `Refresh` replaces the whole store: the pages become the content and
    /// their reported outer counts become the placeholder counts. `Prepend`
    /// and `Append` attach at the respective end; if the outermost new page
    /// reports a real count the placeholder count on that end is set to it,
    /// otherwise the existing count is decremented by the inserted item
    /// total, floored at zero (see [`Count::consumed_by`]).
    pub fn insert(&mut self, direction: LoadDirection, pages: Vec<Page<K, V>>) {
        assert!(!pages.is_empty(), "insert requires at least one page");
        let added: usize = pages.iter().map(Page::len).sum();
        match direction {
            LoadDirection::Refresh => {
                let before = pages.first().map(|p| p.items_before).unwrap_or(Count::Unknown);
                let after = pages.last().map(|p| p.items_after).unwrap_or(Count::Unknown);
                self.replace(pages, before, after);
            }
            LoadDirection::Prepend => {
                let reported = pages.first().map(|p| p.items_before).unwrap_or(Count::Unknown);
                let before = match reported {
                    Count::Known(n) => Count::Known(n),
                    Count::Unknown => self.placeholders_before.consumed_by(added),
                };
                self.attach_front(pages);
                self.placeholders_before = before;
            }
            LoadDirection::Append => {
                let reported = pages.last().map(|p| p.items_after).unwrap_or(Count::Unknown);
                let after = match reported {
                    Count::Known(n) => Count::Known(n),
                    Count::Unknown => self.placeholders_after.consumed_by(added),
                };
                self.attach_back(pages);
                self.placeholders_after = after;
            }
        }
        log::trace!(
            "insert {:?}: {} pages, {} items, window now {}+{}+{}",
            direction,
            self.pages.len(),
            self.items_len,
            self.placeholders_before.presented(),
            self.items_len,
            self.placeholders_after.presented(),
        );
    }

    /// Inserts pages, adopting externally computed placeholder counts. Used
    /// by the presenter-side store, which mirrors counts the fetcher-side
    /// store already derived and published in the event.
    pub fn apply_insert(
        &mut self,
        direction: LoadDirection,
        pages: Vec<Page<K, V>>,
        placeholders_before: Count,
        placeholders_after: Count,
    ) {
        match direction {
            LoadDirection::Refresh => self.replace(pages, placeholders_before, placeholders_after),
            LoadDirection::Prepend => {
                self.attach_front(pages);
                self.placeholders_before = placeholders_before;
                self.placeholders_after = placeholders_after;
            }
            LoadDirection::Append => {
                self.attach_back(pages);
                self.placeholders_before = placeholders_before;
                self.placeholders_after = placeholders_after;
            }
        }
    }

    /// Removes `page_count` pages from the given end and forces the
    /// placeholder count on that end to `placeholders_remaining`.
    ///
    /// The count is supplied by the caller, who computed it from its own
    /// bookkeeping; after a drop the store may no longer know the true
    /// backing count, so it never recomputes placeholders itself.
    ///
    /// Returns the number of items dropped.
    ///
    /// # Panics
    ///
    /// Panics if `page_count` exceeds the resident page count or the
    /// direction is `Refresh`.
    pub fn drop_pages(
        &mut self,
        direction: LoadDirection,
        page_count: usize,
        placeholders_remaining: Count,
    ) -> usize {
        assert!(
            page_count <= self.pages.len(),
            "cannot drop {page_count} pages of {}",
            self.pages.len()
        );
        let mut dropped = 0;
        match direction {
            LoadDirection::Prepend => {
                for _ in 0..page_count {
                    let page = self.pages.pop_front().expect("page_count checked");
                    dropped += page.len();
                }
                self.first_page_offset += page_count as i32;
                self.placeholders_before = placeholders_remaining;
            }
            LoadDirection::Append => {
                for _ in 0..page_count {
                    let page = self.pages.pop_back().expect("page_count checked");
                    dropped += page.len();
                }
                self.placeholders_after = placeholders_remaining;
            }
            LoadDirection::Refresh => panic!("cannot drop from refresh"),
        }
        self.items_len -= dropped;
        log::debug!(
            "dropped {page_count} pages ({dropped} items) from {:?} end",
            direction
        );
        dropped
    }

    fn replace(&mut self, pages: Vec<Page<K, V>>, before: Count, after: Count) {
        self.items_len = pages.iter().map(Page::len).sum();
        self.pages = pages.into();
        self.placeholders_before = before;
        self.placeholders_after = after;
        self.first_page_offset = 0;
    }

    fn attach_front(&mut self, pages: Vec<Page<K, V>>) {
        self.first_page_offset -= pages.len() as i32;
        for page in pages.into_iter().rev() {
            self.items_len += page.len();
            self.pages.push_front(page);
        }
    }

    fn attach_back(&mut self, pages: Vec<Page<K, V>>) {
        for page in pages {
            self.items_len += page.len();
            self.pages.push_back(page);
        }
    }
}

impl<K, V> Default for PageStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> PageStore<K, V> {
    /// Clones the resident pages in order.
    pub fn pages_vec(&self) -> Vec<Page<K, V>> {
        self.pages.iter().cloned().collect()
    }
}
