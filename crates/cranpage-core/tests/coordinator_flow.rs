//! End-to-end flows through the coordinator, driven by deterministic fake
//! sources and a recording observer.

use std::rc::Rc;

use cranpage_testing::{DeferredSource, ImmediateSource, ListUpdate, RecordingObserver};

use cranpage_core::{LoadCoordinator, LoadDirection, LoadError, LoadState, Page, PagingConfig};

fn items(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Item {i}")).collect()
}

fn counted_harness(
    total: usize,
    config: PagingConfig,
    initial_key: Option<usize>,
) -> (
    Rc<ImmediateSource<String>>,
    Rc<RecordingObserver>,
    LoadCoordinator<usize, String>,
) {
    let source = Rc::new(ImmediateSource::counted(items(total)));
    let observer = Rc::new(RecordingObserver::new());
    let coordinator: LoadCoordinator<usize, String> = LoadCoordinator::new(
        source.clone(),
        config,
        initial_key,
        observer.clone(),
        observer.clone(),
    );
    (source, observer, coordinator)
}

/// A counted page covering `start..end` of a data set of `total` items.
fn counted_page(total: usize, start: usize, end: usize) -> Page<usize, String> {
    Page::counted(
        (start..end).map(|i| format!("Item {i}")).collect(),
        (start > 0).then_some(start),
        (end < total).then_some(end),
        start,
        total - end,
    )
}

#[test]
fn test_initial_refresh_presents_full_window() {
    let (_, observer, coordinator) = counted_harness(100, PagingConfig::new(10), None);
    assert_eq!(coordinator.size(), 100);
    assert_eq!(coordinator.get(0).as_deref(), Some("Item 0"));
    assert_eq!(coordinator.get(29).as_deref(), Some("Item 29"));
    assert_eq!(coordinator.get(30), None);
    assert_eq!(
        observer.take_updates(),
        vec![ListUpdate::Inserted {
            position: 0,
            count: 100
        }]
    );
    let states = observer.take_states();
    assert!(matches!(
        states.as_slice(),
        [
            (LoadDirection::Refresh, LoadState::Loading),
            (
                LoadDirection::Refresh,
                LoadState::NotLoading {
                    end_of_pagination_reached: false
                }
            )
        ]
    ));
}

#[test]
fn test_empty_data_set_exhausts_refresh_immediately() {
    let (_, observer, coordinator) = counted_harness(0, PagingConfig::new(10), None);
    assert_eq!(coordinator.size(), 0);
    assert_eq!(observer.take_updates(), vec![]);
    assert!(matches!(
        observer.last_state(LoadDirection::Refresh),
        Some(LoadState::NotLoading {
            end_of_pagination_reached: true
        })
    ));
}

#[test]
fn test_scroll_near_edge_appends_into_placeholders() {
    let (_, observer, coordinator) = counted_harness(100, PagingConfig::new(10), None);
    observer.take_updates();
    coordinator.load_around(25);
    // Ten items land in known placeholder slots: pure change, size stable.
    assert_eq!(
        observer.take_updates(),
        vec![ListUpdate::Changed {
            position: 30,
            count: 10
        }]
    );
    assert_eq!(coordinator.size(), 100);
    assert_eq!(coordinator.get(35).as_deref(), Some("Item 35"));
}

#[test]
fn test_access_far_from_edges_loads_nothing() {
    let (_, observer, coordinator) = counted_harness(100, PagingConfig::new(10), None);
    observer.take_updates();
    observer.take_states();
    coordinator.load_around(15);
    assert_eq!(observer.take_updates(), vec![]);
    assert_eq!(observer.take_states().len(), 0);
}

#[test]
#[should_panic(expected = "Index")]
fn test_load_around_out_of_bounds_is_a_bounds_violation() {
    let (_, _, coordinator) = counted_harness(100, PagingConfig::new(10), None);
    coordinator.load_around(100);
}

#[test]
fn test_prepend_keeps_loading_while_demand_remains() {
    let (_, observer, coordinator) = counted_harness(
        100,
        PagingConfig::new(10).with_prefetch_distance(25),
        Some(50),
    );
    observer.take_updates();
    // Access 2 items into the loaded window: 23 items of prepend demand,
    // satisfied by three successive page loads.
    coordinator.load_around(52);
    assert_eq!(
        observer.take_updates(),
        vec![
            ListUpdate::Changed {
                position: 40,
                count: 10
            },
            ListUpdate::Changed {
                position: 30,
                count: 10
            },
            ListUpdate::Changed {
                position: 20,
                count: 10
            }
        ]
    );
    assert_eq!(coordinator.size(), 100);
    assert_eq!(coordinator.get(20).as_deref(), Some("Item 20"));
    assert_eq!(coordinator.get(19), None);
}

#[test]
fn test_exhausted_edge_completes_without_a_request() {
    let (_, observer, coordinator) = counted_harness(100, PagingConfig::new(10), None);
    observer.take_states();
    // The first page is loaded: prepending has nothing left. The direction
    // must go straight to NotLoading(true), never through Loading.
    coordinator.load_around(0);
    let states = observer.take_states();
    let prepend_states: Vec<_> = states
        .iter()
        .filter(|(d, _)| *d == LoadDirection::Prepend)
        .collect();
    assert!(matches!(
        prepend_states.as_slice(),
        [(
            LoadDirection::Prepend,
            LoadState::NotLoading {
                end_of_pagination_reached: true
            }
        )]
    ));
    // And it stays exhausted: a second access is a no-op.
    coordinator.load_around(0);
    assert!(observer
        .take_states()
        .iter()
        .all(|(d, _)| *d != LoadDirection::Prepend));
}

#[test]
fn test_failed_load_surfaces_error_and_retry_reissues_it() {
    let (source, observer, coordinator) = counted_harness(100, PagingConfig::new(10), None);
    observer.take_updates();
    source.fail_next_load(LoadError::message(true, "connection reset"));
    coordinator.load_around(25);
    assert!(matches!(
        observer.last_state(LoadDirection::Append),
        Some(LoadState::Error(err)) if err.retryable
    ));
    // The window keeps serving loaded pages while in error.
    assert_eq!(coordinator.get(10).as_deref(), Some("Item 10"));
    assert_eq!(observer.take_updates(), vec![]);

    coordinator.retry();
    assert!(matches!(
        observer.last_state(LoadDirection::Append),
        Some(LoadState::NotLoading { .. })
    ));
    assert_eq!(
        observer.take_updates(),
        vec![ListUpdate::Changed {
            position: 30,
            count: 10
        }]
    );
}

#[test]
fn test_retry_is_a_no_op_outside_error() {
    let (_, observer, coordinator) = counted_harness(100, PagingConfig::new(10), None);
    observer.take_states();
    coordinator.retry();
    assert_eq!(observer.take_states().len(), 0);
}

#[test]
fn test_max_size_drops_pages_opposite_the_access_direction() {
    let (_, observer, coordinator) =
        counted_harness(100, PagingConfig::new(10).with_max_size(30), None);
    observer.take_updates();
    observer.take_states();
    coordinator.load_around(25);
    // The append pushes the window to 40 loaded items; the initial page is
    // dropped from the front, 1:1 into placeholders.
    assert_eq!(
        observer.take_updates(),
        vec![
            ListUpdate::Changed {
                position: 30,
                count: 10
            },
            ListUpdate::Changed {
                position: 0,
                count: 30
            }
        ]
    );
    assert_eq!(coordinator.size(), 100);
    assert_eq!(coordinator.get(0), None);
    assert_eq!(coordinator.get(35).as_deref(), Some("Item 35"));
    // The dropped end can be loaded again.
    assert!(matches!(
        coordinator.load_states().prepend,
        LoadState::Idle
    ));
}

#[test]
fn test_uncounted_source_grows_without_placeholders() {
    let source = Rc::new(ImmediateSource::uncounted(items(100)));
    let observer = Rc::new(RecordingObserver::new());
    let coordinator: LoadCoordinator<usize, String> = LoadCoordinator::new(
        source,
        PagingConfig::new(10),
        None,
        observer.clone(),
        observer.clone(),
    );
    assert_eq!(coordinator.size(), 30);
    observer.take_updates();
    coordinator.load_around(29);
    assert_eq!(
        observer.take_updates(),
        vec![ListUpdate::Inserted {
            position: 30,
            count: 10
        }]
    );
    assert_eq!(coordinator.size(), 40);
}

#[test]
fn test_anchor_stays_stable_while_fetcher_runs_ahead() {
    let (_, _, coordinator) = counted_harness(100, PagingConfig::new(10), Some(50));
    // Access position 52; the triggered prepend lands pages the access's
    // hint knows nothing about. The anchor must still resolve to 52.
    coordinator.load_around(52);
    let state = coordinator.current_state();
    assert_eq!(state.anchor_position, Some(52));
    assert_eq!(state.leading_placeholder_count, 40);
}

#[test]
fn test_stale_generation_result_is_discarded() {
    let source: Rc<DeferredSource<usize, String>> = Rc::new(DeferredSource::new());
    let observer = Rc::new(RecordingObserver::new());
    let coordinator: LoadCoordinator<usize, String> = LoadCoordinator::new(
        source.clone(),
        PagingConfig::new(10),
        None,
        observer.clone(),
        observer.clone(),
    );
    source.complete_next(Ok(counted_page(100, 0, 30)));
    assert_eq!(coordinator.size(), 100);
    coordinator.load_around(25);
    assert_eq!(source.pending(), 1);

    // A new generation supersedes the in-flight append.
    coordinator.refresh(Some(60));
    observer.take_updates();
    observer.take_states();
    let stale = source.pop().expect("superseded append still parked");
    assert_eq!(stale.0.direction, LoadDirection::Append);
    stale.1.complete(Ok(counted_page(100, 30, 40)));
    // Discarded wholesale: no diff, no state transition.
    assert_eq!(observer.take_updates(), vec![]);
    assert_eq!(observer.take_states().len(), 0);

    // The replacement refresh lands normally.
    source.complete_next(Ok(counted_page(100, 60, 90)));
    assert_eq!(
        observer.take_updates(),
        vec![
            ListUpdate::Removed {
                position: 0,
                count: 100
            },
            ListUpdate::Inserted {
                position: 0,
                count: 100
            }
        ]
    );
    assert_eq!(coordinator.get(60).as_deref(), Some("Item 60"));
    assert_eq!(coordinator.get(59), None);
}

#[test]
fn test_stale_error_does_not_move_an_idle_direction_to_error() {
    let source: Rc<DeferredSource<usize, String>> = Rc::new(DeferredSource::new());
    let observer = Rc::new(RecordingObserver::new());
    let coordinator: LoadCoordinator<usize, String> = LoadCoordinator::new(
        source.clone(),
        PagingConfig::new(10),
        None,
        observer.clone(),
        observer.clone(),
    );
    source.complete_next(Ok(counted_page(100, 0, 30)));
    coordinator.load_around(25);
    coordinator.refresh(None);
    // After the generation bump the append direction reads Idle again.
    assert!(matches!(
        observer.last_state(LoadDirection::Append),
        Some(LoadState::Idle)
    ));
    observer.take_states();

    let (params, receiver) = source.pop().expect("superseded append still parked");
    assert_eq!(params.direction, LoadDirection::Append);
    receiver.complete(Err(LoadError::message(true, "late failure")));
    assert_eq!(observer.take_states().len(), 0);
    assert!(matches!(
        coordinator.load_states().append,
        LoadState::Idle
    ));
}

#[test]
fn test_no_second_load_while_one_is_in_flight() {
    let source: Rc<DeferredSource<usize, String>> = Rc::new(DeferredSource::new());
    let observer = Rc::new(RecordingObserver::new());
    let coordinator: LoadCoordinator<usize, String> = LoadCoordinator::new(
        source.clone(),
        PagingConfig::new(10),
        None,
        observer.clone(),
        observer.clone(),
    );
    source.complete_next(Ok(counted_page(100, 0, 30)));
    coordinator.load_around(25);
    coordinator.load_around(27);
    coordinator.load_around(29);
    // One append in flight, no matter how many accesses demanded it.
    assert_eq!(source.pending(), 1);
}

#[test]
fn test_current_state_without_access_has_no_anchor() {
    let (_, _, coordinator) = counted_harness(100, PagingConfig::new(10), None);
    let state = coordinator.current_state();
    assert_eq!(state.anchor_position, None);
    assert_eq!(state.pages.len(), 1);
    assert_eq!(state.leading_placeholder_count, 0);
}

#[test]
fn test_failed_refresh_surfaces_error_and_retry_recovers() {
    let source = Rc::new(ImmediateSource::counted(items(100)));
    source.fail_next_load(LoadError::retryable("connection reset"));
    let observer = Rc::new(RecordingObserver::new());
    let coordinator: LoadCoordinator<usize, String> = LoadCoordinator::new(
        source,
        PagingConfig::new(10),
        None,
        observer.clone(),
        observer.clone(),
    );
    // Nothing presented while the initial refresh is in error.
    assert_eq!(coordinator.size(), 0);
    assert_eq!(observer.take_updates(), vec![]);
    assert!(matches!(
        observer.last_state(LoadDirection::Refresh),
        Some(LoadState::Error(err)) if err.retryable
    ));

    coordinator.retry();
    assert_eq!(coordinator.size(), 100);
    assert_eq!(
        observer.take_updates(),
        vec![ListUpdate::Inserted {
            position: 0,
            count: 100
        }]
    );
    assert!(matches!(
        observer.last_state(LoadDirection::Refresh),
        Some(LoadState::NotLoading {
            end_of_pagination_reached: false
        })
    ));
}

#[test]
fn test_terminal_empty_refresh_page_exhausts_pagination() {
    let source: Rc<DeferredSource<usize, String>> = Rc::new(DeferredSource::new());
    let observer = Rc::new(RecordingObserver::new());
    let coordinator: LoadCoordinator<usize, String> = LoadCoordinator::new(
        source.clone(),
        PagingConfig::new(10),
        None,
        observer.clone(),
        observer.clone(),
    );
    source.complete_next(Ok(Page::empty()));
    assert_eq!(coordinator.size(), 0);
    assert_eq!(observer.take_updates(), vec![]);
    assert!(matches!(
        observer.last_state(LoadDirection::Refresh),
        Some(LoadState::NotLoading {
            end_of_pagination_reached: true
        })
    ));
    assert_eq!(coordinator.current_state().anchor_position, None);
}
