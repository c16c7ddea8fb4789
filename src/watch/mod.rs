// src/watch/mod.rs

//! File watching.
//!
//! - [`watcher`] wires up a cross-platform filesystem watcher (`notify`) and
//!   forwards changed paths into an async channel.
//! - [`debounce`] groups bursts of changes into batches and keeps only the
//!   paths a category cares about.
//!
//! Neither knows about pipelines; the category tasks decide what a batch
//! of changes means.

pub mod debounce;
pub mod watcher;

pub use debounce::next_batch;
pub use watcher::{spawn_watcher, WatcherHandle};
