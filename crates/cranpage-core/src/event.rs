//! Events flowing between the fetcher and the presenter.
//!
//! The fetch side records loaded pages and emits [`PageEvent`]s; the
//! presenter consumes them and answers with an ordered batch of [`DiffOp`]s
//! that a UI list adapter can apply sequentially. Returning ops as data
//! instead of invoking callbacks mid-computation keeps the diff logic
//! side-effect free and directly testable.

use smallvec::SmallVec;

use crate::count::Count;
use crate::page::Page;

/// The direction a load operation extends the list in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadDirection {
    /// Replace the whole list with fresh content.
    Refresh,
    /// Extend the list at its start.
    Prepend,
    /// Extend the list at its end.
    Append,
}

/// A mutation applied to the windowed list.
#[derive(Clone, Debug)]
pub enum PageEvent<K, V> {
    /// Pages were loaded and attached; placeholder counts are the resulting
    /// counts on both ends after the insert.
    Insert {
        direction: LoadDirection,
        pages: Vec<Page<K, V>>,
        placeholders_before: Count,
        placeholders_after: Count,
    },
    /// `page_count` pages were dropped from one end to bound memory. The
    /// placeholder count on that end is forced to `placeholders_remaining`,
    /// computed by the caller from its own bookkeeping.
    Drop {
        direction: LoadDirection,
        page_count: usize,
        placeholders_remaining: Count,
    },
}

/// One operation of a minimal list diff, in UI-adapter coordinates.
///
/// Ops are emitted in an order that a consumer applying them sequentially
/// can follow without ever needing a negative index: `Change` before
/// `Remove`, and `Insert` positioned after the region it affects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffOp {
    /// `count` positions starting at `position` changed contents in place
    /// (typically placeholders becoming items or vice versa).
    Change { position: usize, count: usize },
    /// `count` positions were inserted at `position`.
    Insert { position: usize, count: usize },
    /// `count` positions starting at `position` were removed.
    Remove { position: usize, count: usize },
}

/// Ordered diff batch for one event. A single insert or drop produces at
/// most three ops, so the batch stays on the stack.
pub type DiffOps = SmallVec<[DiffOp; 3]>;

/// Identifies where in the page list a UI-visible position resolves to.
///
/// `page_offset` is the generation-relative offset of the referenced page
/// (the refresh page is 0, prepended pages count down, appended pages count
/// up). `index_in_page` may be negative or exceed the page length to express
/// positions inside the leading or trailing placeholder regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportHint {
    pub page_offset: i32,
    pub index_in_page: isize,
}

impl ViewportHint {
    pub fn new(page_offset: i32, index_in_page: isize) -> Self {
        Self {
            page_offset,
            index_in_page,
        }
    }
}

/// Pushes `op` unless its count is zero. Zero-count ops are never emitted.
pub(crate) fn push_op(ops: &mut DiffOps, op: DiffOp) {
    let count = match op {
        DiffOp::Change { count, .. } | DiffOp::Insert { count, .. } | DiffOp::Remove { count, .. } => {
            count
        }
    };
    if count > 0 {
        ops.push(op);
    }
}
