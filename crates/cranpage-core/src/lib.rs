//! Incremental list materialization and fetch coordination for Cranpage.
//!
//! A headless paging engine: it turns a key-addressed data source into a
//! single logically indexed, placeholder-aware window over lazily loaded
//! pages, and keeps that window fed as the consumer scrolls.
//!
//! # Architecture
//!
//! Based on Android Jetpack's Paging library:
//! - [`PageStore`] - ordered loaded pages plus placeholder counts (JP:
//!   `PagedStorage`)
//! - [`WindowPresenter`] - flattened indexable view and minimal diff
//!   emission (JP: `PagePresenter`)
//! - [`FetchState`] - per-generation fetch bookkeeping and viewport-hint
//!   reconciliation (JP: `PageFetcherSnapshotState`)
//! - [`LoadCoordinator`] - per-direction load state machine, page dropping,
//!   retry (JP: `LegacyPager`/`ContiguousPagedList`)
//!
//! Data flows one way: a UI access ([`LoadCoordinator::load_around`])
//! schedules a fetch, the external [`PageSource`] loads a page,
//! [`FetchState`] records it, [`WindowPresenter`] recomputes the window and
//! emits [`DiffOp`]s, and the observers apply them.
//!
//! The engine is single-threaded by design: one sequencing thread owns all
//! mutation and diff emission, and sources model asynchrony by completing
//! their [`PageReceiver`] later. Nothing here is durable across process
//! death; resuming is the consumer's job via an externally supplied refresh
//! key.

mod config;
mod coordinator;
mod count;
mod error;
mod event;
mod fetch;
mod load_state;
mod observer;
mod page;
mod page_store;
mod presenter;
mod source;

pub use config::PagingConfig;
pub use coordinator::{LoadCoordinator, PageReceiver};
pub use count::Count;
pub use error::LoadError;
pub use event::{DiffOp, DiffOps, LoadDirection, PageEvent, ViewportHint};
pub use fetch::{FetchState, PagingState};
pub use load_state::{LoadState, LoadStates};
pub use observer::{ListUpdateObserver, LoadStateObserver};
pub use page::Page;
pub use page_store::PageStore;
pub use presenter::WindowPresenter;
pub use source::{LoadParams, PageSource};
