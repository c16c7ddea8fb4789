// src/dag/scheduler.rs

use tracing::{debug, warn};

use crate::dag::graph::{ExecutionGraph, NodeId};
use crate::dag::plan::Unit;
use crate::engine::UnitOutcome;

/// Per-node state within one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    Running,
    Succeeded,
    Failed,
    /// Never started because an upstream unit failed.
    Skipped,
}

impl UnitState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UnitState::Succeeded | UnitState::Failed | UnitState::Skipped
        )
    }
}

/// A unit handed to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledUnit {
    pub node: NodeId,
    pub unit: Unit,
}

/// Pure state machine deciding which nodes of an [`ExecutionGraph`] may run.
///
/// A node becomes ready once every predecessor succeeded. After the first
/// failure nothing new is scheduled and every pending node is skipped.
#[derive(Debug)]
pub struct Scheduler {
    graph: ExecutionGraph,
    states: Vec<UnitState>,
    failed: bool,
}

impl Scheduler {
    pub fn new(graph: ExecutionGraph) -> Self {
        let states = vec![UnitState::Pending; graph.len()];
        Self {
            graph,
            states,
            failed: false,
        }
    }

    pub fn graph(&self) -> &ExecutionGraph {
        &self.graph
    }

    pub fn state_of(&self, node: NodeId) -> UnitState {
        self.states[node.index()]
    }

    /// Whether a unit failed during this execution.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Every node reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.states.iter().all(|s| s.is_terminal())
    }

    /// Schedule the roots.
    pub fn start(&mut self) -> Vec<ScheduledUnit> {
        self.collect_ready()
    }

    /// Record the outcome of a running node and return what became ready.
    pub fn handle_completion(&mut self, node: NodeId, outcome: UnitOutcome) -> Vec<ScheduledUnit> {
        let unit = self.graph.unit(node);
        if self.state_of(node) != UnitState::Running {
            warn!(%unit, state = ?self.state_of(node), "completion for a unit that is not running; ignoring");
            return Vec::new();
        }

        match outcome {
            UnitOutcome::Success => {
                debug!(%unit, "unit succeeded");
                self.states[node.index()] = UnitState::Succeeded;
                self.collect_ready()
            }
            UnitOutcome::Failed => {
                debug!(%unit, "unit failed; skipping everything still pending");
                self.states[node.index()] = UnitState::Failed;
                self.failed = true;
                for state in self.states.iter_mut() {
                    if *state == UnitState::Pending {
                        *state = UnitState::Skipped;
                    }
                }
                Vec::new()
            }
        }
    }

    fn collect_ready(&mut self) -> Vec<ScheduledUnit> {
        if self.failed {
            return Vec::new();
        }

        let ready: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|n| self.state_of(*n) == UnitState::Pending)
            .filter(|n| {
                self.graph
                    .dependencies_of(*n)
                    .iter()
                    .all(|d| self.state_of(*d) == UnitState::Succeeded)
            })
            .collect();

        ready
            .into_iter()
            .map(|node| {
                self.states[node.index()] = UnitState::Running;
                ScheduledUnit {
                    node,
                    unit: self.graph.unit(node),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::plan::Plan;
    use crate::types::{Action, Category};

    fn units(scheduled: &[ScheduledUnit]) -> Vec<String> {
        scheduled.iter().map(|s| s.unit.to_string()).collect()
    }

    #[test]
    fn series_releases_one_unit_at_a_time() {
        let plan = Plan::series([
            Plan::unit(Category::Data, Action::Clean),
            Plan::unit(Category::Data, Action::Compile),
        ]);
        let mut s = Scheduler::new(ExecutionGraph::from_plan(&plan));

        let first = s.start();
        assert_eq!(units(&first), vec!["data:clean"]);

        let second = s.handle_completion(first[0].node, UnitOutcome::Success);
        assert_eq!(units(&second), vec!["data:compile"]);
        assert!(!s.is_finished());

        assert!(s.handle_completion(second[0].node, UnitOutcome::Success).is_empty());
        assert!(s.is_finished());
        assert!(!s.has_failed());
    }

    #[test]
    fn failure_skips_pending_and_stops_scheduling() {
        let plan = Plan::series([
            Plan::parallel([
                Plan::unit(Category::Style, Action::Clean),
                Plan::unit(Category::Font, Action::Clean),
            ]),
            Plan::unit(Category::Style, Action::Compile),
        ]);
        let mut s = Scheduler::new(ExecutionGraph::from_plan(&plan));

        let roots = s.start();
        assert_eq!(roots.len(), 2);

        assert!(s.handle_completion(roots[0].node, UnitOutcome::Failed).is_empty());
        assert!(s.has_failed());
        // The sibling is still running; the compile never starts.
        assert_eq!(s.state_of(roots[1].node), UnitState::Running);
        assert!(s.handle_completion(roots[1].node, UnitOutcome::Success).is_empty());

        let compile = s.graph().find(Unit::new(Category::Style, Action::Compile))[0];
        assert_eq!(s.state_of(compile), UnitState::Skipped);
        assert!(s.is_finished());
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let plan = Plan::unit(Category::Image, Action::Clean);
        let mut s = Scheduler::new(ExecutionGraph::from_plan(&plan));
        let node = s.start()[0].node;
        s.handle_completion(node, UnitOutcome::Success);
        assert!(s.handle_completion(node, UnitOutcome::Failed).is_empty());
        assert_eq!(s.state_of(node), UnitState::Succeeded);
    }
}
