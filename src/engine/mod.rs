// src/engine/mod.rs

//! Orchestration engine for assetpipe.
//!
//! This module ties together:
//! - the task registry (every name a user can ask for, and its plan)
//! - the executor that drives the DAG scheduler on a `JoinSet`
//! - the runner that maps units onto the category task bundles
//!
//! The pure scheduling state machine lives in [`crate::dag::scheduler`];
//! the async shell is implemented in [`executor`].

/// Outcome of a unit for the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Success,
    Failed,
}

pub mod executor;
pub mod registry;
pub mod runner;

pub use executor::{execute, UnitFuture, UnitRunner};
pub use registry::TaskRegistry;
pub use runner::CategoryRunner;
