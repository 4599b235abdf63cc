//! Item counts that may be unknown.
//!
//! The original Paging library models "the data source could not report a
//! count" with a `COUNT_UNDEFINED` sentinel integer. Here it is an explicit
//! tagged variant so sentinel arithmetic cannot leak into placeholder math.

/// A count of backing items that a data source may or may not know.
///
/// The transition rule is sticky in one direction only: a count may go from
/// [`Count::Unknown`] to [`Count::Known`] when a page reports a real number,
/// but a known count never reverts to unknown. Subsequent inserts and drops
/// adjust the known number arithmetically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Count {
    /// An exact, non-negative item count.
    Known(usize),
    /// The data source has not (yet) reported a count.
    Unknown,
}

impl Count {
    /// Number of placeholder slots this count contributes to the presented
    /// list. An unknown count presents no placeholders.
    #[inline]
    pub fn presented(self) -> usize {
        match self {
            Count::Known(n) => n,
            Count::Unknown => 0,
        }
    }

    /// Returns `true` if the count is exact.
    #[inline]
    pub fn is_known(self) -> bool {
        matches!(self, Count::Known(_))
    }

    /// Adjusts a placeholder count after `loaded` items were inserted on its
    /// end without the page reporting a fresh count.
    ///
    /// Models the assumption that every loaded item was previously
    /// represented by one placeholder. The floor at zero protects against
    /// count mismatches from a racing data source; the result is therefore
    /// approximate, not provably exact. This heuristic is deliberate and
    /// must not be "fixed": presented-list behavior depends on it.
    #[inline]
    pub fn consumed_by(self, loaded: usize) -> Count {
        match self {
            Count::Known(n) => Count::Known(n.saturating_sub(loaded)),
            Count::Unknown => Count::Unknown,
        }
    }

    /// Grows a known count by `restored` items (used when loaded items are
    /// dropped back into placeholders). Unknown stays unknown.
    #[inline]
    pub fn restored_by(self, restored: usize) -> Count {
        match self {
            Count::Known(n) => Count::Known(n + restored),
            Count::Unknown => Count::Unknown,
        }
    }
}
