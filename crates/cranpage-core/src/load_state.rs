//! Per-direction load state tracking.

use crate::error::LoadError;
use crate::event::LoadDirection;

/// State of loading for one direction.
///
/// Lifecycle: `Idle -> Loading` on schedule, `Loading -> NotLoading | Error`
/// on completion, `Error -> Loading` on retry or a new scroll-triggered
/// schedule, `Error -> Idle` when the end is dropped or superseded. There is
/// no `Loading -> Loading` transition; scheduling an already-loading
/// direction is a no-op.
#[derive(Clone, Debug)]
pub enum LoadState {
    /// Not loading and nothing has completed yet for this direction.
    Idle,
    /// A load is in flight.
    Loading,
    /// A load completed. When `end_of_pagination_reached` the direction is
    /// exhausted and will never be scheduled again for this generation.
    NotLoading { end_of_pagination_reached: bool },
    /// The most recent load failed. Serving of already-loaded pages
    /// continues; an explicit retry re-issues the failed load.
    Error(LoadError),
}

impl LoadState {
    /// Returns `true` if a new load may be scheduled from this state.
    pub(crate) fn can_schedule(&self) -> bool {
        match self {
            LoadState::Idle | LoadState::Error(_) => true,
            LoadState::Loading => false,
            LoadState::NotLoading {
                end_of_pagination_reached,
            } => !end_of_pagination_reached,
        }
    }

    /// Returns `true` if this direction is exhausted.
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self,
            LoadState::NotLoading {
                end_of_pagination_reached: true
            }
        )
    }

    // Errors never compare equal: two consecutive failures are two distinct
    // transitions and both must reach the observer.
    fn same_as(&self, other: &LoadState) -> bool {
        match (self, other) {
            (LoadState::Idle, LoadState::Idle) => true,
            (LoadState::Loading, LoadState::Loading) => true,
            (
                LoadState::NotLoading {
                    end_of_pagination_reached: a,
                },
                LoadState::NotLoading {
                    end_of_pagination_reached: b,
                },
            ) => a == b,
            _ => false,
        }
    }
}

/// The three per-direction load states of one generation.
#[derive(Clone, Debug)]
pub struct LoadStates {
    pub refresh: LoadState,
    pub prepend: LoadState,
    pub append: LoadState,
}

impl Default for LoadStates {
    fn default() -> Self {
        Self {
            refresh: LoadState::Idle,
            prepend: LoadState::Idle,
            append: LoadState::Idle,
        }
    }
}

impl LoadStates {
    /// The state for `direction`.
    pub fn get(&self, direction: LoadDirection) -> &LoadState {
        match direction {
            LoadDirection::Refresh => &self.refresh,
            LoadDirection::Prepend => &self.prepend,
            LoadDirection::Append => &self.append,
        }
    }

    /// Replaces the state for `direction`. Returns `true` when the value
    /// actually changed, so each transition is observable exactly once.
    pub(crate) fn set(&mut self, direction: LoadDirection, state: LoadState) -> bool {
        let slot = match direction {
            LoadDirection::Refresh => &mut self.refresh,
            LoadDirection::Prepend => &mut self.prepend,
            LoadDirection::Append => &mut self.append,
        };
        if slot.same_as(&state) {
            return false;
        }
        *slot = state;
        true
    }
}
