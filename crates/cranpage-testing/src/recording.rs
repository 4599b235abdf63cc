//! Observer that records everything it sees.

use std::cell::RefCell;

use cranpage_core::{ListUpdateObserver, LoadDirection, LoadState, LoadStateObserver};

/// One recorded list update, in UI-adapter coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListUpdate {
    Inserted { position: usize, count: usize },
    Removed { position: usize, count: usize },
    Changed { position: usize, count: usize },
}

/// Records list updates and load-state transitions in arrival order.
#[derive(Default)]
pub struct RecordingObserver {
    updates: RefCell<Vec<ListUpdate>>,
    states: RefCell<Vec<(LoadDirection, LoadState)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains and returns the recorded list updates.
    pub fn take_updates(&self) -> Vec<ListUpdate> {
        std::mem::take(&mut self.updates.borrow_mut())
    }

    /// Drains and returns the recorded load-state transitions.
    pub fn take_states(&self) -> Vec<(LoadDirection, LoadState)> {
        std::mem::take(&mut self.states.borrow_mut())
    }

    /// The most recently observed state for `direction`, if any.
    pub fn last_state(&self, direction: LoadDirection) -> Option<LoadState> {
        self.states
            .borrow()
            .iter()
            .rev()
            .find(|(d, _)| *d == direction)
            .map(|(_, s)| s.clone())
    }
}

impl ListUpdateObserver for RecordingObserver {
    fn on_inserted(&self, position: usize, count: usize) {
        self.updates
            .borrow_mut()
            .push(ListUpdate::Inserted { position, count });
    }

    fn on_removed(&self, position: usize, count: usize) {
        self.updates
            .borrow_mut()
            .push(ListUpdate::Removed { position, count });
    }

    fn on_changed(&self, position: usize, count: usize) {
        self.updates
            .borrow_mut()
            .push(ListUpdate::Changed { position, count });
    }
}

impl LoadStateObserver for RecordingObserver {
    fn on_load_state_changed(&self, direction: LoadDirection, state: &LoadState) {
        self.states.borrow_mut().push((direction, state.clone()));
    }
}
