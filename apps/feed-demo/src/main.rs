use std::rc::Rc;

use cranpage_core::{
    ListUpdateObserver, LoadCoordinator, LoadDirection, LoadState, LoadStateObserver, PagingConfig,
};
use cranpage_testing::ImmediateSource;

const FEED_SIZE: usize = 500;
const VIEWPORT: usize = 8;

/// Prints every window mutation and load-state transition as it happens.
struct ConsoleObserver;

impl ListUpdateObserver for ConsoleObserver {
    fn on_inserted(&self, position: usize, count: usize) {
        println!("  [list] inserted {count} at {position}");
    }

    fn on_removed(&self, position: usize, count: usize) {
        println!("  [list] removed {count} at {position}");
    }

    fn on_changed(&self, position: usize, count: usize) {
        println!("  [list] changed {count} at {position}");
    }
}

impl LoadStateObserver for ConsoleObserver {
    fn on_load_state_changed(&self, direction: LoadDirection, state: &LoadState) {
        println!("  [load] {direction:?} -> {state:?}");
    }
}

fn render_viewport<K: Clone + 'static>(
    coordinator: &LoadCoordinator<K, String>,
    first_visible: usize,
) {
    let size = coordinator.size();
    let end = (first_visible + VIEWPORT).min(size);
    print!("  window {first_visible}..{end} of {size}: ");
    for index in first_visible..end {
        match coordinator.get(index) {
            Some(item) => print!("[{item}] "),
            None => print!("[...] "),
        }
    }
    println!();
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== Cranpage Feed Demo ===");
    println!("A fake feed of {FEED_SIZE} posts, paged on demand while a");
    println!("simulated viewport of {VIEWPORT} rows scrolls through it.");
    println!();

    let source = Rc::new(ImmediateSource::counted(
        (0..FEED_SIZE).map(|i| format!("post #{i}")).collect(),
    ));
    let observer = Rc::new(ConsoleObserver);
    let coordinator: LoadCoordinator<usize, String> = LoadCoordinator::new(
        source,
        PagingConfig::new(20).with_max_size(100),
        None,
        observer.clone(),
        observer,
    );

    log::info!("initial window ready: {} presented rows", coordinator.size());
    render_viewport(&coordinator, 0);

    // Scroll forward through the whole feed. Every access reports the
    // viewport to the coordinator; page loads and drops print as they fire.
    println!();
    println!("--- scrolling to the end ---");
    let mut first_visible = 0;
    while first_visible + VIEWPORT < coordinator.size() {
        first_visible += VIEWPORT;
        let last_visible = (first_visible + VIEWPORT - 1).min(coordinator.size() - 1);
        coordinator.load_around(last_visible);
        if first_visible % 80 == 0 {
            render_viewport(&coordinator, first_visible);
        }
    }
    render_viewport(&coordinator, first_visible);

    // And back up: the bounded window re-loads what it dropped on the way.
    println!();
    println!("--- scrolling back to the top ---");
    while first_visible > 0 {
        first_visible = first_visible.saturating_sub(VIEWPORT);
        coordinator.load_around(first_visible);
        if first_visible % 80 == 0 {
            render_viewport(&coordinator, first_visible);
        }
    }

    println!();
    println!("--- refreshing from an anchor ---");
    let anchor = coordinator.current_state().anchor_position;
    log::info!("anchor position: {anchor:?}");
    coordinator.refresh(anchor);
    render_viewport(&coordinator, anchor.unwrap_or(0));
}
