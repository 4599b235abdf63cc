//! A single loaded page of items.

use crate::count::Count;

/// One page of items returned by a [`PageSource`](crate::PageSource) load.
///
/// A page is owned by the load operation that produced it and is immutable
/// once returned. The optional keys identify the adjacent pages in the
/// backing data set; a missing key means pagination ends on that side.
#[derive(Clone, Debug)]
pub struct Page<K, V> {
    /// The loaded items, in presentation order.
    pub items: Vec<V>,
    /// Key for loading the page before this one, if any.
    pub prev_key: Option<K>,
    /// Key for loading the page after this one, if any.
    pub next_key: Option<K>,
    /// Number of items before this page in the backing data set.
    pub items_before: Count,
    /// Number of items after this page in the backing data set.
    pub items_after: Count,
}

impl<K, V> Page<K, V> {
    /// A page with exact counts on both sides.
    pub fn counted(
        items: Vec<V>,
        prev_key: Option<K>,
        next_key: Option<K>,
        items_before: usize,
        items_after: usize,
    ) -> Self {
        Self {
            items,
            prev_key,
            next_key,
            items_before: Count::Known(items_before),
            items_after: Count::Known(items_after),
        }
    }

    /// A page whose source cannot report counts cheaply.
    pub fn uncounted(items: Vec<V>, prev_key: Option<K>, next_key: Option<K>) -> Self {
        Self {
            items,
            prev_key,
            next_key,
            items_before: Count::Unknown,
            items_after: Count::Unknown,
        }
    }

    /// An empty terminal page: nothing more to load in either direction
    /// adjacent to it.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            prev_key: None,
            next_key: None,
            items_before: Count::Unknown,
            items_after: Count::Unknown,
        }
    }

    /// Number of items in this page.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if this page holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
