//! Fetcher-side page bookkeeping for one generation.
//!
//! `FetchState` owns the authoritative [`PageStore`] for the current fetch
//! generation and publishes every mutation as a [`PageEvent`] for the
//! presenter. It is guarded by the generation id: results from a superseded
//! generation are ignored rather than merged.
//!
//! The hardest piece is [`FetchState::current_paging_state`]: a
//! [`ViewportHint`] computed against a presenter snapshot that has since
//! diverged (extra or missing pages at either end) must still resolve to a
//! consistent anchor position in this store's coordinate space.

use crate::count::Count;
use crate::event::{LoadDirection, PageEvent, ViewportHint};
use crate::page::Page;
use crate::page_store::PageStore;

/// Consistent snapshot of the fetch side for an arbitrary viewport hint.
#[derive(Clone, Debug)]
pub struct PagingState<K, V> {
    /// The resident pages, in order.
    pub pages: Vec<Page<K, V>>,
    /// Anchor position in presented coordinates, or `None` when nothing is
    /// presented.
    pub anchor_position: Option<usize>,
    /// Presented leading placeholder count the anchor is relative to.
    pub leading_placeholder_count: usize,
}

pub struct FetchState<K, V> {
    store: PageStore<K, V>,
    load_id: u64,
    placeholders_enabled: bool,
}

impl<K: Clone, V: Clone> FetchState<K, V> {
    pub fn new(load_id: u64, placeholders_enabled: bool) -> Self {
        Self {
            store: PageStore::new(),
            load_id,
            placeholders_enabled,
        }
    }

    /// Generation this state belongs to.
    #[inline]
    pub fn load_id(&self) -> u64 {
        self.load_id
    }

    #[inline]
    pub fn placeholders_before(&self) -> Count {
        self.store.placeholders_before()
    }

    #[inline]
    pub fn placeholders_after(&self) -> Count {
        self.store.placeholders_after()
    }

    #[inline]
    pub fn store(&self) -> &PageStore<K, V> {
        &self.store
    }

    /// Records a loaded page and returns the event to feed the presenter.
    ///
    /// Returns `None` when `load_id` belongs to a superseded generation: a
    /// single generation is active at a time, but a cancelled load's result
    /// can still arrive late and must be discarded here.
    pub fn insert(
        &mut self,
        load_id: u64,
        direction: LoadDirection,
        page: Page<K, V>,
    ) -> Option<PageEvent<K, V>> {
        if load_id != self.load_id {
            log::debug!(
                "discarding {:?} result from generation {} (current {})",
                direction,
                load_id,
                self.load_id
            );
            return None;
        }
        let page = self.sanitize(page);
        let pages = vec![page];
        self.store.insert(direction, pages.clone());
        Some(PageEvent::Insert {
            direction,
            pages,
            placeholders_before: self.store.placeholders_before(),
            placeholders_after: self.store.placeholders_after(),
        })
    }

    /// Drops pages from one end and returns the event to feed the
    /// presenter. `placeholders_remaining` is the caller's bookkeeping, not
    /// recomputed here.
    pub fn drop_pages(
        &mut self,
        direction: LoadDirection,
        page_count: usize,
        placeholders_remaining: Count,
    ) -> PageEvent<K, V> {
        self.store
            .drop_pages(direction, page_count, placeholders_remaining);
        PageEvent::Drop {
            direction,
            page_count,
            placeholders_remaining,
        }
    }

    /// Reconstructs a consistent paging state for `hint`.
    ///
    /// The hint's page offset is walked over this store's actual page list,
    /// summing sizes, converting the (page offset, index in page) pair into
    /// an absolute presented index. A hint referencing a page that was
    /// already dropped falls back to the nearest still-present boundary
    /// page; the final anchor is clamped to the presented bounds. Correct
    /// even when this store has pages the presenter has not seen yet, or
    /// vice versa.
    pub fn current_paging_state(&self, hint: Option<ViewportHint>) -> PagingState<K, V> {
        let leading = self.store.placeholders_before().presented();
        PagingState {
            pages: self.store.pages_vec(),
            anchor_position: hint.and_then(|h| self.anchor_for(h)),
            leading_placeholder_count: leading,
        }
    }

    fn anchor_for(&self, hint: ViewportHint) -> Option<usize> {
        let size = self.store.size();
        if size == 0 {
            return None;
        }
        let leading = self.store.placeholders_before().presented() as isize;
        let anchor = if self.store.page_count() == 0 {
            leading + hint.index_in_page
        } else {
            let first = self.store.first_page_offset();
            let last = self.store.last_page_offset();
            if hint.page_offset < first {
                // Referenced page already dropped from the front: fall back
                // to the start of the earliest resident page.
                leading
            } else if hint.page_offset > last {
                // Dropped from the back: end of the latest resident page.
                leading + self.store.items_len() as isize - 1
            } else {
                let mut position = leading;
                let mut offset = first;
                for page in self.store.pages() {
                    if offset == hint.page_offset {
                        break;
                    }
                    position += page.len() as isize;
                    offset += 1;
                }
                position + hint.index_in_page
            }
        };
        Some(anchor.clamp(0, size as isize - 1) as usize)
    }

    // With placeholders disabled, counts reported by the source are ignored
    // for the whole generation so the store can never flip to Known.
    fn sanitize(&self, page: Page<K, V>) -> Page<K, V> {
        if self.placeholders_enabled {
            page
        } else {
            Page {
                items_before: Count::Unknown,
                items_after: Count::Unknown,
                ..page
            }
        }
    }
}
