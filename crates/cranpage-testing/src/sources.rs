//! Fake page sources.

use std::cell::RefCell;
use std::collections::VecDeque;

use cranpage_core::{
    LoadDirection, LoadError, LoadParams, Page, PageReceiver, PageSource,
};

/// A synchronous source over an in-memory item vector, keyed by item index.
///
/// Keys follow the natural slice convention: a page covering `start..end`
/// reports `prev_key = Some(start)` while `start > 0` and
/// `next_key = Some(end)` while `end < len`. Prepend loads the page ending
/// at the key (exclusive); append loads the page starting at it.
pub struct ImmediateSource<V> {
    items: Vec<V>,
    counted: bool,
    fail_next: RefCell<Option<LoadError>>,
}

impl<V: Clone + 'static> ImmediateSource<V> {
    /// A source that reports exact counts on every page.
    pub fn counted(items: Vec<V>) -> Self {
        Self {
            items,
            counted: true,
            fail_next: RefCell::new(None),
        }
    }

    /// A source that never reports counts (no placeholders possible).
    pub fn uncounted(items: Vec<V>) -> Self {
        Self {
            items,
            counted: false,
            fail_next: RefCell::new(None),
        }
    }

    /// Makes the next load (whatever its direction) fail with `error`.
    pub fn fail_next_load(&self, error: LoadError) {
        *self.fail_next.borrow_mut() = Some(error);
    }

    fn page(&self, start: usize, end: usize) -> Page<usize, V> {
        let len = self.items.len();
        let mut page = Page::uncounted(
            self.items[start..end].to_vec(),
            (start > 0).then_some(start),
            (end < len).then_some(end),
        );
        if self.counted {
            page.items_before = cranpage_core::Count::Known(start);
            page.items_after = cranpage_core::Count::Known(len - end);
        }
        page
    }
}

impl<V: Clone + 'static> PageSource<usize, V> for ImmediateSource<V> {
    fn load_page(&self, params: LoadParams<usize>, receiver: PageReceiver<usize, V>) {
        if let Some(error) = self.fail_next.borrow_mut().take() {
            receiver.complete(Err(error));
            return;
        }
        let len = self.items.len();
        let (start, end) = match params.direction {
            LoadDirection::Refresh => {
                let start = params.key.unwrap_or(0).min(len);
                (start, (start + params.requested_size).min(len))
            }
            LoadDirection::Append => {
                let start = params.key.expect("append load requires a key").min(len);
                (start, (start + params.requested_size).min(len))
            }
            LoadDirection::Prepend => {
                let end = params.key.expect("prepend load requires a key").min(len);
                (end.saturating_sub(params.requested_size), end)
            }
        };
        receiver.complete(Ok(self.page(start, end)));
    }
}

/// A source that parks every request until the test completes it.
pub struct DeferredSource<K, V> {
    pending: RefCell<VecDeque<(LoadParams<K>, PageReceiver<K, V>)>>,
}

impl<K: Clone + 'static, V: Clone + 'static> DeferredSource<K, V> {
    pub fn new() -> Self {
        Self {
            pending: RefCell::new(VecDeque::new()),
        }
    }

    /// Number of requests currently parked.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Takes the oldest parked request, if any.
    pub fn pop(&self) -> Option<(LoadParams<K>, PageReceiver<K, V>)> {
        self.pending.borrow_mut().pop_front()
    }

    /// Completes the oldest parked request with `outcome`.
    ///
    /// # Panics
    ///
    /// Panics if nothing is parked.
    pub fn complete_next(&self, outcome: Result<Page<K, V>, LoadError>) -> LoadParams<K> {
        let (params, receiver) = self.pop().expect("no parked load to complete");
        receiver.complete(outcome);
        params
    }
}

impl<K: Clone + 'static, V: Clone + 'static> Default for DeferredSource<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + 'static, V: Clone + 'static> PageSource<K, V> for DeferredSource<K, V> {
    fn load_page(&self, params: LoadParams<K>, receiver: PageReceiver<K, V>) {
        self.pending.borrow_mut().push_back((params, receiver));
    }
}
