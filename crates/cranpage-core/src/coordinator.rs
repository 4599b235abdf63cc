//! Scroll-driven load scheduling, one small state machine per direction.
//!
//! All state mutation happens on the caller's thread behind a single
//! `RefCell`; the coordinator collects its side effects (observer
//! notifications and load requests) while the borrow is held and dispatches
//! them after releasing it, so observers may re-enter and sources may
//! complete synchronously. Asynchrony lives entirely behind the
//! [`PageSource`] seam: a source that holds its [`PageReceiver`] and
//! completes it later models a background load.
//!
//! Staleness is decided by explicit tokens, never object identity: every
//! request carries its generation id and a flight id, both compared at
//! resolution time. A result whose tokens no longer match is discarded with
//! no transition observable to the UI, so a stale load can never win a race
//! against a newer access and cause visual flicker.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::PagingConfig;
use crate::count::Count;
use crate::error::LoadError;
use crate::event::{DiffOp, LoadDirection, ViewportHint};
use crate::fetch::{FetchState, PagingState};
use crate::load_state::{LoadState, LoadStates};
use crate::observer::{ListUpdateObserver, LoadStateObserver};
use crate::page::Page;
use crate::presenter::WindowPresenter;
use crate::source::{LoadParams, PageSource};

/// Completion handle for one load request.
///
/// Carries the (generation, flight) tokens of the request; completing a
/// receiver whose tokens are stale, or whose coordinator is gone, is a
/// silent no-op.
pub struct PageReceiver<K, V> {
    inner: Weak<RefCell<Inner<K, V>>>,
    generation: u64,
    flight_id: u64,
    direction: LoadDirection,
}

impl<K: Clone + 'static, V: Clone + 'static> PageReceiver<K, V> {
    /// The direction this load extends the list in.
    pub fn direction(&self) -> LoadDirection {
        self.direction
    }

    /// Delivers the load outcome back into the coordinator.
    pub fn complete(self, outcome: Result<Page<K, V>, LoadError>) {
        let Some(inner) = self.inner.upgrade() else {
            log::debug!("dropping {:?} result: coordinator gone", self.direction);
            return;
        };
        let mut effects = Effects::new();
        inner.borrow_mut().on_load_complete(
            self.generation,
            self.flight_id,
            self.direction,
            outcome,
            &mut effects,
        );
        run_effects(&inner, effects);
    }
}

/// Drives loads against a [`PageSource`] as the consumer scrolls, applies
/// results to the fetch state and presenter, and reports every window
/// mutation and load-state transition to the observers.
pub struct LoadCoordinator<K, V> {
    inner: Rc<RefCell<Inner<K, V>>>,
}

impl<K: Clone + 'static, V: Clone + 'static> LoadCoordinator<K, V> {
    /// Creates the coordinator and immediately issues the initial refresh
    /// load for `initial_key`.
    pub fn new(
        source: Rc<dyn PageSource<K, V>>,
        config: PagingConfig,
        initial_key: Option<K>,
        update_observer: Rc<dyn ListUpdateObserver>,
        load_observer: Rc<dyn LoadStateObserver>,
    ) -> Self {
        let placeholders_enabled = config.placeholders_enabled;
        let initial_load_size = config.initial_load_size;
        let inner = Rc::new(RefCell::new(Inner {
            config,
            source,
            update_observer,
            load_observer,
            fetch: FetchState::new(1, placeholders_enabled),
            presenter: WindowPresenter::new(),
            states: LoadStates::default(),
            load_id: 1,
            next_flight_id: 0,
            refresh_flight: None,
            prepend_flight: None,
            append_flight: None,
            prepend_requested: 0,
            append_requested: 0,
            failed_refresh: None,
            failed_prepend: None,
            failed_append: None,
            last_hint: None,
        }));
        let mut effects = Effects::new();
        inner.borrow_mut().start_flight(
            LoadDirection::Refresh,
            LoadParams {
                direction: LoadDirection::Refresh,
                key: initial_key,
                requested_size: initial_load_size,
                placeholders_enabled,
            },
            &mut effects,
        );
        run_effects(&inner, effects);
        Self { inner }
    }

    /// Total presented size, placeholders included.
    pub fn size(&self) -> usize {
        self.inner.borrow().presenter.size()
    }

    /// Resolves an absolute index; `None` is a placeholder.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn get(&self, index: usize) -> Option<V> {
        self.inner.borrow().presenter.get(index).cloned()
    }

    /// Snapshot of the presented window; `None` marks placeholder slots.
    pub fn as_list(&self) -> Vec<Option<V>> {
        self.inner.borrow().presenter.as_list()
    }

    /// Current per-direction load states.
    pub fn load_states(&self) -> LoadStates {
        self.inner.borrow().states.clone()
    }

    /// Reports a viewport access and schedules whatever loads it implies.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds of the presented window.
    pub fn load_around(&self, position: usize) {
        let mut effects = Effects::new();
        self.inner.borrow_mut().load_around(position, &mut effects);
        run_effects(&self.inner, effects);
    }

    /// Re-issues the failed load for every direction currently in `Error`.
    /// No-op for directions in any other state.
    pub fn retry(&self) {
        let mut effects = Effects::new();
        self.inner.borrow_mut().retry(&mut effects);
        run_effects(&self.inner, effects);
    }

    /// Starts a new generation from `key`, superseding the current one
    /// wholesale. In-flight loads of the old generation are cancelled;
    /// their late results are discarded. The presented window keeps serving
    /// the old content until the new refresh completes.
    pub fn refresh(&self, key: Option<K>) {
        let mut effects = Effects::new();
        self.inner.borrow_mut().refresh(key, &mut effects);
        run_effects(&self.inner, effects);
    }

    /// Consistent fetch-side snapshot for the most recent viewport access,
    /// e.g. to derive a refresh key for a new generation.
    pub fn current_state(&self) -> PagingState<K, V> {
        let inner = self.inner.borrow();
        inner.fetch.current_paging_state(inner.last_hint)
    }
}

struct Flight<K> {
    id: u64,
    params: LoadParams<K>,
}

struct Inner<K, V> {
    config: PagingConfig,
    source: Rc<dyn PageSource<K, V>>,
    update_observer: Rc<dyn ListUpdateObserver>,
    load_observer: Rc<dyn LoadStateObserver>,
    fetch: FetchState<K, V>,
    presenter: WindowPresenter<K, V>,
    states: LoadStates,
    load_id: u64,
    next_flight_id: u64,
    refresh_flight: Option<Flight<K>>,
    prepend_flight: Option<Flight<K>>,
    append_flight: Option<Flight<K>>,
    /// Outstanding demand in items, per end. A completed page re-schedules
    /// while demand remains.
    prepend_requested: usize,
    append_requested: usize,
    failed_refresh: Option<LoadParams<K>>,
    failed_prepend: Option<LoadParams<K>>,
    failed_append: Option<LoadParams<K>>,
    last_hint: Option<ViewportHint>,
}

enum Notification {
    Diff(DiffOp),
    State(LoadDirection, LoadState),
}

struct Effects<K> {
    notifications: Vec<Notification>,
    requests: Vec<(u64, u64, LoadParams<K>)>,
}

impl<K> Effects<K> {
    fn new() -> Self {
        Self {
            notifications: Vec::new(),
            requests: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.notifications.is_empty() && self.requests.is_empty()
    }
}

impl<K: Clone + 'static, V: Clone + 'static> Inner<K, V> {
    fn flight_mut(&mut self, direction: LoadDirection) -> &mut Option<Flight<K>> {
        match direction {
            LoadDirection::Refresh => &mut self.refresh_flight,
            LoadDirection::Prepend => &mut self.prepend_flight,
            LoadDirection::Append => &mut self.append_flight,
        }
    }

    fn failed_mut(&mut self, direction: LoadDirection) -> &mut Option<LoadParams<K>> {
        match direction {
            LoadDirection::Refresh => &mut self.failed_refresh,
            LoadDirection::Prepend => &mut self.failed_prepend,
            LoadDirection::Append => &mut self.failed_append,
        }
    }

    fn set_state(&mut self, direction: LoadDirection, state: LoadState, effects: &mut Effects<K>) {
        let notify = self.states.set(direction, state.clone());
        if notify {
            log::debug!("{:?} -> {:?}", direction, state);
            effects.notifications.push(Notification::State(direction, state));
        }
    }

    fn start_flight(
        &mut self,
        direction: LoadDirection,
        params: LoadParams<K>,
        effects: &mut Effects<K>,
    ) {
        let id = self.next_flight_id;
        self.next_flight_id += 1;
        *self.failed_mut(direction) = None;
        *self.flight_mut(direction) = Some(Flight {
            id,
            params: params.clone(),
        });
        self.set_state(direction, LoadState::Loading, effects);
        effects.requests.push((self.load_id, id, params));
    }

    fn load_around(&mut self, position: usize, effects: &mut Effects<K>) {
        let size = self.presenter.size();
        assert!(position < size, "Index: {position}, Size: {size}");
        self.last_hint = Some(self.presenter.hint_for(position));

        let leading = self.presenter.placeholders_before() as isize;
        let storage = self.presenter.items_len() as isize;
        let prefetch = self.config.prefetch_distance as isize;
        let prepend_items = prefetch - (position as isize - leading);
        let append_items = position as isize + prefetch - (leading + storage);

        if prepend_items > 0 {
            self.prepend_requested = self.prepend_requested.max(prepend_items as usize);
            self.schedule(LoadDirection::Prepend, effects);
        }
        if append_items > 0 {
            self.append_requested = self.append_requested.max(append_items as usize);
            self.schedule(LoadDirection::Append, effects);
        }
    }

    /// Issues a prepend/append load if the state machine allows one.
    ///
    /// The only zero-latency completion path lives here: an edge with
    /// nothing left to load transitions straight to `NotLoading(true)`
    /// without a request, so an exhausted direction never shows a spinner.
    fn schedule(&mut self, direction: LoadDirection, effects: &mut Effects<K>) {
        if !self.states.get(direction).can_schedule() {
            return;
        }
        let boundary = match direction {
            LoadDirection::Prepend => self
                .fetch
                .store()
                .first_page()
                .map(|p| (p.prev_key.clone(), self.fetch.placeholders_before())),
            LoadDirection::Append => self
                .fetch
                .store()
                .last_page()
                .map(|p| (p.next_key.clone(), self.fetch.placeholders_after())),
            LoadDirection::Refresh => unreachable!("refresh is not scroll-scheduled"),
        };
        // Nothing loaded yet: the initial refresh is still outstanding.
        let Some((key, remaining)) = boundary else {
            return;
        };
        if key.is_none() || remaining == Count::Known(0) {
            match direction {
                LoadDirection::Prepend => self.prepend_requested = 0,
                LoadDirection::Append => self.append_requested = 0,
                LoadDirection::Refresh => {}
            }
            self.set_state(
                direction,
                LoadState::NotLoading {
                    end_of_pagination_reached: true,
                },
                effects,
            );
            return;
        }
        let params = LoadParams {
            direction,
            key,
            requested_size: self.config.page_size,
            placeholders_enabled: self.config.placeholders_enabled,
        };
        self.start_flight(direction, params, effects);
    }

    fn on_load_complete(
        &mut self,
        generation: u64,
        flight_id: u64,
        direction: LoadDirection,
        outcome: Result<Page<K, V>, LoadError>,
        effects: &mut Effects<K>,
    ) {
        if generation != self.load_id {
            log::debug!(
                "discarding {:?} result from superseded generation {}",
                direction,
                generation
            );
            return;
        }
        let current = matches!(self.flight_mut(direction), Some(flight) if flight.id == flight_id);
        if !current {
            // A newer access already invalidated this flight (for example
            // its end was dropped). No observable transition: a stale
            // result must not flicker the UI, and a stale error must not
            // move an Idle direction to Error.
            log::debug!("discarding stale {:?} flight {}", direction, flight_id);
            return;
        }
        let params = self
            .flight_mut(direction)
            .take()
            .expect("flight checked above")
            .params;
        match outcome {
            Err(error) => {
                log::warn!("{:?} load failed: {}", direction, error);
                *self.failed_mut(direction) = Some(params);
                self.set_state(direction, LoadState::Error(error), effects);
            }
            Ok(page) => {
                let applied = page.len();
                let end = end_of_pagination(direction, &page);
                let Some(event) = self.fetch.insert(generation, direction, page) else {
                    return;
                };
                let ops = self.presenter.process_event(event);
                effects
                    .notifications
                    .extend(ops.into_iter().map(Notification::Diff));
                self.set_state(
                    direction,
                    LoadState::NotLoading {
                        end_of_pagination_reached: end,
                    },
                    effects,
                );
                match direction {
                    LoadDirection::Refresh => {
                        self.prepend_requested = 0;
                        self.append_requested = 0;
                    }
                    LoadDirection::Prepend => {
                        self.prepend_requested = self.prepend_requested.saturating_sub(applied);
                        if self.prepend_requested > 0 && !end {
                            self.schedule(LoadDirection::Prepend, effects);
                        }
                    }
                    LoadDirection::Append => {
                        self.append_requested = self.append_requested.saturating_sub(applied);
                        if self.append_requested > 0 && !end {
                            self.schedule(LoadDirection::Append, effects);
                        }
                    }
                }
                self.enforce_max_size(direction, effects);
            }
        }
    }

    /// Drops whole pages from the end opposite the inserted direction until
    /// the loaded item count fits `max_size` again. At least one page
    /// always stays resident.
    fn enforce_max_size(&mut self, inserted: LoadDirection, effects: &mut Effects<K>) {
        let Some(max_size) = self.config.max_size else {
            return;
        };
        let drop_end = match inserted {
            LoadDirection::Prepend => LoadDirection::Append,
            LoadDirection::Append => LoadDirection::Prepend,
            LoadDirection::Refresh => return,
        };
        let (page_count, dropped_items) = {
            let store = self.fetch.store();
            let mut lens: Vec<usize> = store.pages().map(Page::len).collect();
            if drop_end == LoadDirection::Append {
                lens.reverse();
            }
            let mut items = store.items_len();
            let mut count = 0;
            let mut dropped = 0;
            for len in lens {
                if items <= max_size || count + 1 >= store.page_count() {
                    break;
                }
                items -= len;
                dropped += len;
                count += 1;
            }
            (count, dropped)
        };
        if page_count == 0 {
            return;
        }
        let prior = match drop_end {
            LoadDirection::Prepend => self.fetch.placeholders_before(),
            LoadDirection::Append => self.fetch.placeholders_after(),
            LoadDirection::Refresh => unreachable!(),
        };
        // Every dropped item becomes one placeholder on top of the prior
        // count; an Unknown count stays Unknown rather than inventing one.
        let remaining = prior.restored_by(dropped_items);
        let event = self.fetch.drop_pages(drop_end, page_count, remaining);
        let ops = self.presenter.process_event(event);
        effects
            .notifications
            .extend(ops.into_iter().map(Notification::Diff));
        // The dropped end can be loaded again; whatever was in flight or
        // failed there is no longer relevant.
        *self.flight_mut(drop_end) = None;
        *self.failed_mut(drop_end) = None;
        match drop_end {
            LoadDirection::Prepend => self.prepend_requested = 0,
            LoadDirection::Append => self.append_requested = 0,
            LoadDirection::Refresh => {}
        }
        self.set_state(drop_end, LoadState::Idle, effects);
    }

    fn retry(&mut self, effects: &mut Effects<K>) {
        for direction in [
            LoadDirection::Refresh,
            LoadDirection::Prepend,
            LoadDirection::Append,
        ] {
            if !matches!(self.states.get(direction), LoadState::Error(_)) {
                continue;
            }
            let Some(params) = self.failed_mut(direction).take() else {
                continue;
            };
            log::debug!("retrying {:?}", direction);
            self.start_flight(direction, params, effects);
        }
    }

    fn refresh(&mut self, key: Option<K>, effects: &mut Effects<K>) {
        self.load_id += 1;
        log::debug!("starting generation {}", self.load_id);
        self.fetch = FetchState::new(self.load_id, self.config.placeholders_enabled);
        self.refresh_flight = None;
        self.prepend_flight = None;
        self.append_flight = None;
        self.prepend_requested = 0;
        self.append_requested = 0;
        self.failed_refresh = None;
        self.failed_prepend = None;
        self.failed_append = None;
        self.set_state(LoadDirection::Prepend, LoadState::Idle, effects);
        self.set_state(LoadDirection::Append, LoadState::Idle, effects);
        let placeholders_enabled = self.config.placeholders_enabled;
        self.start_flight(
            LoadDirection::Refresh,
            LoadParams {
                direction: LoadDirection::Refresh,
                key,
                requested_size: self.config.initial_load_size,
                placeholders_enabled,
            },
            effects,
        );
    }
}

fn end_of_pagination<K, V>(direction: LoadDirection, page: &Page<K, V>) -> bool {
    match direction {
        LoadDirection::Refresh => page.prev_key.is_none() && page.next_key.is_none(),
        LoadDirection::Prepend => {
            page.is_empty() || page.prev_key.is_none() || page.items_before == Count::Known(0)
        }
        LoadDirection::Append => {
            page.is_empty() || page.next_key.is_none() || page.items_after == Count::Known(0)
        }
    }
}

/// Dispatches collected effects with the coordinator borrow released.
/// Notifications go out first so a synchronously completing source cannot
/// reorder diffs under the observers; requests follow.
fn run_effects<K: Clone + 'static, V: Clone + 'static>(
    inner: &Rc<RefCell<Inner<K, V>>>,
    effects: Effects<K>,
) {
    if effects.is_empty() {
        return;
    }
    let (source, update_observer, load_observer) = {
        let borrowed = inner.borrow();
        (
            borrowed.source.clone(),
            borrowed.update_observer.clone(),
            borrowed.load_observer.clone(),
        )
    };
    for notification in effects.notifications {
        match notification {
            Notification::Diff(DiffOp::Change { position, count }) => {
                update_observer.on_changed(position, count)
            }
            Notification::Diff(DiffOp::Insert { position, count }) => {
                update_observer.on_inserted(position, count)
            }
            Notification::Diff(DiffOp::Remove { position, count }) => {
                update_observer.on_removed(position, count)
            }
            Notification::State(direction, state) => {
                load_observer.on_load_state_changed(direction, &state)
            }
        }
    }
    for (generation, flight_id, params) in effects.requests {
        let direction = params.direction;
        let receiver = PageReceiver {
            inner: Rc::downgrade(inner),
            generation,
            flight_id,
            direction,
        };
        source.load_page(params, receiver);
    }
}
