//! The windowed, placeholder-aware view over loaded pages.
//!
//! `WindowPresenter` composes a [`PageStore`] into a single logically
//! indexed list and diffs consecutive versions of itself into a minimal
//! batch of [`DiffOp`]s. It holds its own copy of the store, fed exclusively
//! by [`PageEvent`]s from the fetch side; the two copies may transiently
//! diverge while loads are in flight, which is why positions travel between
//! them as [`ViewportHint`]s rather than absolute indices.
//!
//! Diff emission rules (the order a UI list adapter can apply sequentially
//! without leaving its own index space):
//! - `Change` is emitted before `Remove`, and `Insert` after the region it
//!   affects.
//! - Zero-count ops are suppressed entirely.
//! - A drop that replaces removed items with placeholders 1:1 emits only a
//!   `Change`.

use crate::count::Count;
use crate::event::{push_op, DiffOp, DiffOps, LoadDirection, PageEvent, ViewportHint};
use crate::page_store::PageStore;

pub struct WindowPresenter<K, V> {
    store: PageStore<K, V>,
}

impl<K, V> WindowPresenter<K, V> {
    pub fn new() -> Self {
        Self {
            store: PageStore::new(),
        }
    }

    /// Total presented size, placeholders included.
    #[inline]
    pub fn size(&self) -> usize {
        self.store.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Presented leading placeholder count.
    #[inline]
    pub fn placeholders_before(&self) -> usize {
        self.store.placeholders_before().presented()
    }

    /// Presented trailing placeholder count.
    #[inline]
    pub fn placeholders_after(&self) -> usize {
        self.store.placeholders_after().presented()
    }

    /// Number of loaded (non-placeholder) items.
    #[inline]
    pub fn items_len(&self) -> usize {
        self.store.items_len()
    }

    /// Resolves an absolute index to an item, or `None` for a placeholder.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds. Out-of-range access is a
    /// programmer error, not a recoverable condition.
    pub fn get(&self, index: usize) -> Option<&V> {
        let size = self.size();
        assert!(index < size, "Index: {index}, Size: {size}");
        let before = self.placeholders_before();
        if index < before {
            return None;
        }
        let item_index = index - before;
        if item_index < self.store.items_len() {
            Some(self.store.item(item_index))
        } else {
            None
        }
    }

    /// Maps an absolute presented index into page-offset coordinates.
    ///
    /// Positions inside the leading placeholder region map to the first
    /// resident page with a negative `index_in_page`; positions in the
    /// trailing region map to the last resident page with an
    /// `index_in_page` beyond its length.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn hint_for(&self, index: usize) -> ViewportHint {
        let size = self.size();
        assert!(index < size, "Index: {index}, Size: {size}");
        let before = self.placeholders_before() as isize;
        let mut remaining = index as isize - before;
        if self.store.page_count() == 0 || remaining < 0 {
            return ViewportHint::new(self.store.first_page_offset(), remaining);
        }
        let mut offset = self.store.first_page_offset();
        let last = self.store.page_count() - 1;
        for (i, page) in self.store.pages().enumerate() {
            if (remaining as usize) < page.len() || i == last {
                return ViewportHint::new(offset, remaining);
            }
            remaining -= page.len() as isize;
            offset += 1;
        }
        unreachable!("loop covers the last page");
    }

    /// Applies an event and returns the diff transforming the previous
    /// presented list into the new one.
    pub fn process_event(&mut self, event: PageEvent<K, V>) -> DiffOps {
        match event {
            PageEvent::Insert {
                direction,
                pages,
                placeholders_before,
                placeholders_after,
            } => match direction {
                LoadDirection::Refresh => {
                    self.process_refresh(pages, placeholders_before, placeholders_after)
                }
                LoadDirection::Prepend => {
                    self.process_prepend(pages, placeholders_before, placeholders_after)
                }
                LoadDirection::Append => {
                    self.process_append(pages, placeholders_before, placeholders_after)
                }
            },
            PageEvent::Drop {
                direction,
                page_count,
                placeholders_remaining,
            } => self.process_drop(direction, page_count, placeholders_remaining),
        }
    }

    fn process_refresh(
        &mut self,
        pages: Vec<crate::page::Page<K, V>>,
        before: Count,
        after: Count,
    ) -> DiffOps {
        let old_size = self.size();
        self.store
            .apply_insert(LoadDirection::Refresh, pages, before, after);
        let new_size = self.size();
        let mut ops = DiffOps::new();
        push_op(
            &mut ops,
            DiffOp::Remove {
                position: 0,
                count: old_size,
            },
        );
        push_op(
            &mut ops,
            DiffOp::Insert {
                position: 0,
                count: new_size,
            },
        );
        ops
    }

    fn process_prepend(
        &mut self,
        pages: Vec<crate::page::Page<K, V>>,
        before: Count,
        after: Count,
    ) -> DiffOps {
        let added: usize = pages.iter().map(|p| p.len()).sum();
        let old_before = self.placeholders_before();
        self.store
            .apply_insert(LoadDirection::Prepend, pages, before, after);
        let new_before = self.placeholders_before();

        // The old leading placeholders keep their identity as the tail of
        // the new prefix; positions are in pre-insert coordinates.
        let mut ops = DiffOps::new();
        let growth = (new_before + added) as isize - old_before as isize;
        if growth >= 0 {
            let changed = old_before.min(added);
            push_op(
                &mut ops,
                DiffOp::Change {
                    position: old_before - changed,
                    count: changed,
                },
            );
            push_op(
                &mut ops,
                DiffOp::Insert {
                    position: 0,
                    count: growth as usize,
                },
            );
        } else {
            // Placeholders shrank by more than the items added: change over
            // the overlap, then remove the excess head. Never a bare insert
            // that would double count.
            push_op(
                &mut ops,
                DiffOp::Change {
                    position: old_before - added,
                    count: added,
                },
            );
            push_op(
                &mut ops,
                DiffOp::Remove {
                    position: 0,
                    count: (-growth) as usize,
                },
            );
        }
        ops
    }

    fn process_append(
        &mut self,
        pages: Vec<crate::page::Page<K, V>>,
        before: Count,
        after: Count,
    ) -> DiffOps {
        let added: usize = pages.iter().map(|p| p.len()).sum();
        let old_after = self.placeholders_after();
        // Position of the first trailing placeholder before the insert.
        let boundary = self.placeholders_before() + self.store.items_len();
        self.store
            .apply_insert(LoadDirection::Append, pages, before, after);
        let new_after = self.placeholders_after();

        let mut ops = DiffOps::new();
        let growth = (added + new_after) as isize - old_after as isize;
        if growth >= 0 {
            let changed = old_after.min(added);
            push_op(
                &mut ops,
                DiffOp::Change {
                    position: boundary,
                    count: changed,
                },
            );
            push_op(
                &mut ops,
                DiffOp::Insert {
                    position: boundary + changed,
                    count: growth as usize,
                },
            );
        } else {
            push_op(
                &mut ops,
                DiffOp::Change {
                    position: boundary,
                    count: added,
                },
            );
            push_op(
                &mut ops,
                DiffOp::Remove {
                    position: boundary + added + new_after,
                    count: (-growth) as usize,
                },
            );
        }
        ops
    }

    fn process_drop(
        &mut self,
        direction: LoadDirection,
        page_count: usize,
        placeholders_remaining: Count,
    ) -> DiffOps {
        assert!(
            direction != LoadDirection::Refresh,
            "cannot drop from refresh"
        );
        let dropped = self.store.end_items(direction, page_count);
        let old_size = self.size();
        let (old_ph, boundary) = match direction {
            LoadDirection::Prepend => (self.placeholders_before(), 0),
            LoadDirection::Append => {
                let after = self.placeholders_after();
                (after, old_size - after - dropped)
            }
            LoadDirection::Refresh => unreachable!(),
        };
        self.store
            .drop_pages(direction, page_count, placeholders_remaining);
        let new_ph = placeholders_remaining.presented();

        let old_end = old_ph + dropped;
        let mut ops = DiffOps::new();
        match direction {
            LoadDirection::Prepend => {
                if new_ph <= old_end {
                    let changed = new_ph.min(dropped);
                    push_op(
                        &mut ops,
                        DiffOp::Change {
                            position: old_end - changed,
                            count: changed,
                        },
                    );
                    push_op(
                        &mut ops,
                        DiffOp::Remove {
                            position: 0,
                            count: old_end - new_ph,
                        },
                    );
                } else {
                    push_op(
                        &mut ops,
                        DiffOp::Change {
                            position: old_ph,
                            count: dropped,
                        },
                    );
                    push_op(
                        &mut ops,
                        DiffOp::Insert {
                            position: 0,
                            count: new_ph - old_end,
                        },
                    );
                }
            }
            LoadDirection::Append => {
                if new_ph <= old_end {
                    let changed = new_ph.min(dropped);
                    push_op(
                        &mut ops,
                        DiffOp::Change {
                            position: boundary,
                            count: changed,
                        },
                    );
                    push_op(
                        &mut ops,
                        DiffOp::Remove {
                            position: boundary + new_ph,
                            count: old_end - new_ph,
                        },
                    );
                } else {
                    push_op(
                        &mut ops,
                        DiffOp::Change {
                            position: boundary,
                            count: dropped,
                        },
                    );
                    push_op(
                        &mut ops,
                        DiffOp::Insert {
                            position: old_size,
                            count: new_ph - old_end,
                        },
                    );
                }
            }
            LoadDirection::Refresh => unreachable!(),
        }
        ops
    }
}

impl<K, V> Default for WindowPresenter<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V: Clone> WindowPresenter<K, V> {
    /// Snapshot of the presented list; `None` marks a placeholder slot.
    pub fn as_list(&self) -> Vec<Option<V>> {
        let mut list = Vec::with_capacity(self.size());
        for _ in 0..self.placeholders_before() {
            list.push(None);
        }
        for page in self.store.pages() {
            for item in &page.items {
                list.push(Some(item.clone()));
            }
        }
        for _ in 0..self.placeholders_after() {
            list.push(None);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;

    fn insert(
        direction: LoadDirection,
        items: Vec<&str>,
        before: Count,
        after: Count,
    ) -> PageEvent<u32, String> {
        PageEvent::Insert {
            direction,
            pages: vec![Page {
                items: items.into_iter().map(String::from).collect(),
                prev_key: None,
                next_key: None,
                items_before: Count::Unknown,
                items_after: Count::Unknown,
            }],
            placeholders_before: before,
            placeholders_after: after,
        }
    }

    fn presenter_2_abc_2() -> WindowPresenter<u32, String> {
        let mut presenter = WindowPresenter::new();
        presenter.process_event(insert(
            LoadDirection::Refresh,
            vec!["a", "b", "c"],
            Count::Known(2),
            Count::Known(2),
        ));
        presenter
    }

    #[test]
    fn test_initial_refresh_emits_single_insert() {
        let mut presenter = WindowPresenter::new();
        let ops = presenter.process_event(insert(
            LoadDirection::Refresh,
            vec!["a", "b"],
            Count::Known(1),
            Count::Known(3),
        ));
        assert_eq!(
            ops.as_slice(),
            &[DiffOp::Insert {
                position: 0,
                count: 6
            }]
        );
    }

    #[test]
    fn test_empty_until_first_event() {
        let presenter: WindowPresenter<u32, String> = WindowPresenter::new();
        assert!(presenter.is_empty());
        assert!(!presenter_2_abc_2().is_empty());
    }

    #[test]
    fn test_get_resolves_placeholders_and_items() {
        let presenter = presenter_2_abc_2();
        assert_eq!(presenter.size(), 7);
        assert_eq!(presenter.get(0), None);
        assert_eq!(presenter.get(2).map(String::as_str), Some("a"));
        assert_eq!(presenter.get(4).map(String::as_str), Some("c"));
        assert_eq!(presenter.get(6), None);
        // Idempotent without mutation.
        assert_eq!(presenter.get(2), presenter.get(2));
    }

    #[test]
    #[should_panic(expected = "Index")]
    fn test_get_past_end_is_a_bounds_violation() {
        let presenter = presenter_2_abc_2();
        let _ = presenter.get(7);
    }

    #[test]
    fn test_prepend_into_matching_placeholders_is_pure_change() {
        let mut presenter = presenter_2_abc_2();
        let ops = presenter.process_event(insert(
            LoadDirection::Prepend,
            vec!["y", "z"],
            Count::Known(0),
            Count::Known(2),
        ));
        assert_eq!(
            ops.as_slice(),
            &[DiffOp::Change {
                position: 0,
                count: 2
            }]
        );
        assert_eq!(presenter.size(), 7);
        assert_eq!(presenter.get(0).map(String::as_str), Some("y"));
    }

    #[test]
    fn test_prepend_without_placeholders_is_pure_insert() {
        let mut presenter = WindowPresenter::new();
        presenter.process_event(insert(
            LoadDirection::Refresh,
            vec!["a"],
            Count::Known(0),
            Count::Known(0),
        ));
        let ops = presenter.process_event(insert(
            LoadDirection::Prepend,
            vec!["y", "z"],
            Count::Known(0),
            Count::Known(0),
        ));
        assert_eq!(
            ops.as_slice(),
            &[DiffOp::Insert {
                position: 0,
                count: 2
            }]
        );
    }

    #[test]
    fn test_prepend_overflowing_placeholders_changes_then_inserts() {
        let mut presenter = presenter_2_abc_2();
        let ops = presenter.process_event(insert(
            LoadDirection::Prepend,
            vec!["v", "w", "x", "y", "z"],
            Count::Known(0),
            Count::Known(2),
        ));
        // Old placeholder slots become the last two prepended items, then
        // the remaining three are inserted at the front.
        assert_eq!(
            ops.as_slice(),
            &[
                DiffOp::Change {
                    position: 0,
                    count: 2
                },
                DiffOp::Insert {
                    position: 0,
                    count: 3
                }
            ]
        );
        assert_eq!(presenter.size(), 10);
    }

    #[test]
    fn test_append_into_matching_placeholders_is_pure_change() {
        let mut presenter = presenter_2_abc_2();
        let ops = presenter.process_event(insert(
            LoadDirection::Append,
            vec!["d", "e"],
            Count::Known(2),
            Count::Known(0),
        ));
        assert_eq!(
            ops.as_slice(),
            &[DiffOp::Change {
                position: 5,
                count: 2
            }]
        );
    }

    #[test]
    fn test_append_overflowing_placeholders_changes_then_inserts() {
        let mut presenter = presenter_2_abc_2();
        let ops = presenter.process_event(insert(
            LoadDirection::Append,
            vec!["d", "e", "f"],
            Count::Known(2),
            Count::Known(0),
        ));
        assert_eq!(
            ops.as_slice(),
            &[
                DiffOp::Change {
                    position: 5,
                    count: 2
                },
                DiffOp::Insert {
                    position: 7,
                    count: 1
                }
            ]
        );
    }

    #[test]
    fn test_prepend_shrinking_placeholders_changes_then_removes() {
        // 4 leading placeholders, one item. The prepend adds one item but a
        // corrected count collapses the prefix to one placeholder.
        let mut presenter = WindowPresenter::new();
        presenter.process_event(insert(
            LoadDirection::Refresh,
            vec!["m"],
            Count::Known(4),
            Count::Known(0),
        ));
        let ops = presenter.process_event(insert(
            LoadDirection::Prepend,
            vec!["l"],
            Count::Known(1),
            Count::Known(0),
        ));
        assert_eq!(
            ops.as_slice(),
            &[
                DiffOp::Change {
                    position: 3,
                    count: 1
                },
                DiffOp::Remove {
                    position: 0,
                    count: 2
                }
            ]
        );
        assert_eq!(presenter.size(), 3);
    }

    fn presenter_three_pages() -> WindowPresenter<u32, String> {
        // Contents [[a,b],[c,d],[e]], no placeholders on either end.
        let mut presenter = WindowPresenter::new();
        presenter.process_event(insert(
            LoadDirection::Refresh,
            vec!["a", "b"],
            Count::Known(0),
            Count::Known(0),
        ));
        presenter.process_event(insert(
            LoadDirection::Append,
            vec!["c", "d"],
            Count::Known(0),
            Count::Known(0),
        ));
        presenter.process_event(insert(
            LoadDirection::Append,
            vec!["e"],
            Count::Known(0),
            Count::Known(0),
        ));
        presenter
    }

    #[test]
    fn test_one_to_one_drop_is_pure_change() {
        let mut presenter = presenter_three_pages();
        let ops = presenter.process_event(PageEvent::Drop {
            direction: LoadDirection::Prepend,
            page_count: 2,
            placeholders_remaining: Count::Known(4),
        });
        assert_eq!(
            ops.as_slice(),
            &[DiffOp::Change {
                position: 0,
                count: 4
            }]
        );
        assert_eq!(presenter.size(), 5);
        assert_eq!(presenter.get(0), None);
        assert_eq!(presenter.get(4).map(String::as_str), Some("e"));
    }

    #[test]
    fn test_front_drop_with_fewer_placeholders_changes_then_removes() {
        let mut presenter = presenter_three_pages();
        // Four items dropped, only three placeholders remain: change over
        // the overlap, then remove the leftover slot at the head.
        let ops = presenter.process_event(PageEvent::Drop {
            direction: LoadDirection::Prepend,
            page_count: 2,
            placeholders_remaining: Count::Known(3),
        });
        assert_eq!(
            ops.as_slice(),
            &[
                DiffOp::Change {
                    position: 1,
                    count: 3
                },
                DiffOp::Remove {
                    position: 0,
                    count: 1
                }
            ]
        );
        assert_eq!(presenter.size(), 4);
    }

    #[test]
    fn test_tail_drop_with_fewer_placeholders_changes_then_removes() {
        let mut presenter = presenter_three_pages();
        // Last two pages hold [c,d] and [e]; one placeholder remains.
        let ops = presenter.process_event(PageEvent::Drop {
            direction: LoadDirection::Append,
            page_count: 2,
            placeholders_remaining: Count::Known(1),
        });
        assert_eq!(
            ops.as_slice(),
            &[
                DiffOp::Change {
                    position: 2,
                    count: 1
                },
                DiffOp::Remove {
                    position: 3,
                    count: 2
                }
            ]
        );
        assert_eq!(presenter.as_list().len(), 3);
    }

    #[test]
    fn test_drop_without_placeholders_is_pure_remove() {
        let mut presenter = presenter_three_pages();
        let ops = presenter.process_event(PageEvent::Drop {
            direction: LoadDirection::Append,
            page_count: 1,
            placeholders_remaining: Count::Known(0),
        });
        assert_eq!(
            ops.as_slice(),
            &[DiffOp::Remove {
                position: 4,
                count: 1
            }]
        );
    }

    #[test]
    fn test_drop_then_reinsert_round_trips() {
        let mut presenter = presenter_three_pages();
        let reference = presenter.as_list();
        presenter.process_event(PageEvent::Drop {
            direction: LoadDirection::Append,
            page_count: 2,
            placeholders_remaining: Count::Known(3),
        });
        presenter.process_event(insert(
            LoadDirection::Append,
            vec!["c", "d"],
            Count::Known(0),
            Count::Known(1),
        ));
        presenter.process_event(insert(
            LoadDirection::Append,
            vec!["e"],
            Count::Known(0),
            Count::Known(0),
        ));
        assert_eq!(presenter.as_list(), reference);
    }

    #[test]
    fn test_hint_round_trips_through_regions() {
        let presenter = presenter_2_abc_2();
        // Leading placeholder, loaded item, trailing placeholder.
        assert_eq!(presenter.hint_for(0), ViewportHint::new(0, -2));
        assert_eq!(presenter.hint_for(3), ViewportHint::new(0, 1));
        assert_eq!(presenter.hint_for(6), ViewportHint::new(0, 4));
    }

    #[test]
    fn test_hint_targets_boundary_pages_after_prepend() {
        let mut presenter = presenter_2_abc_2();
        presenter.process_event(insert(
            LoadDirection::Prepend,
            vec!["y", "z"],
            Count::Known(0),
            Count::Known(2),
        ));
        // Prepended page sits at offset -1.
        assert_eq!(presenter.hint_for(0), ViewportHint::new(-1, 0));
        assert_eq!(presenter.hint_for(2).page_offset, 0);
    }
}
