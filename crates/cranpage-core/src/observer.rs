//! Outbound callback seams.
//!
//! The coordinator invokes these synchronously on its sequencing thread,
//! after each mutation and after its internal borrow has been released, so
//! an observer may re-enter the coordinator (e.g. call
//! [`load_around`](crate::LoadCoordinator::load_around) from a callback).

use crate::event::LoadDirection;
use crate::load_state::LoadState;

/// Receives the minimal diff for each window mutation, in an order that can
/// be applied sequentially to a position-indexed list.
pub trait ListUpdateObserver {
    fn on_inserted(&self, position: usize, count: usize);
    fn on_removed(&self, position: usize, count: usize);
    fn on_changed(&self, position: usize, count: usize);
}

/// Receives per-direction load state transitions. Each distinct transition
/// is delivered exactly once; errors are always delivered.
pub trait LoadStateObserver {
    fn on_load_state_changed(&self, direction: LoadDirection, state: &LoadState);
}
