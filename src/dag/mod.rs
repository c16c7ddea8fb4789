// src/dag/mod.rs

//! Task composition and scheduling.
//!
//! - [`plan`] describes tasks as series/parallel trees of units.
//! - [`graph`] lowers a plan into a petgraph DAG.
//! - [`scheduler`] contains the per-execution state machine that decides
//!   which units are ready to run.

pub mod graph;
pub mod plan;
pub mod scheduler;

pub use graph::{ExecutionGraph, NodeId};
pub use plan::{Plan, TaskBundle, Unit};
pub use scheduler::{ScheduledUnit, Scheduler, UnitState};
