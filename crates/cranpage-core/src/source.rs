//! The inbound data-loading capability.

use crate::coordinator::PageReceiver;
use crate::event::LoadDirection;

/// Parameters of one page load.
#[derive(Clone, Debug)]
pub struct LoadParams<K> {
    pub direction: LoadDirection,
    /// Key identifying what to load: `None` for an initial refresh without
    /// a resume position, otherwise the boundary key of the window.
    pub key: Option<K>,
    /// Requested number of items. Sources may return fewer (or more).
    pub requested_size: usize,
    /// Whether the caller will present placeholders; sources can skip
    /// computing counts when this is `false`.
    pub placeholders_enabled: bool,
}

/// A capability that loads one page of items given a key and direction.
///
/// `load_page` may complete the receiver synchronously before returning, or
/// hold on to it and complete it later from the same thread; the receiver is
/// the only channel back into the coordinator. Dropping the receiver without
/// completing it leaves that direction `Loading` until a new generation
/// supersedes it; the core imposes no timeout.
pub trait PageSource<K, V> {
    fn load_page(&self, params: LoadParams<K>, receiver: PageReceiver<K, V>);
}
