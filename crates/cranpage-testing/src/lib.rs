//! Deterministic fakes for testing paging behavior.
//!
//! - [`ImmediateSource`] completes every load synchronously from an
//!   in-memory item vector, keyed by item index.
//! - [`DeferredSource`] parks every request until the test completes it
//!   explicitly, in any order - the tool for race and cancellation tests.
//! - [`RecordingObserver`] implements both observer seams and records what
//!   it saw, in order.

mod recording;
mod sources;

pub use recording::{ListUpdate, RecordingObserver};
pub use sources::{DeferredSource, ImmediateSource};
