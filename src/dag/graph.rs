// src/dag/graph.rs

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::dag::plan::{Plan, Unit};
use crate::errors::{AssetpipeError, Result};

/// Node identifier within an [`ExecutionGraph`].
pub type NodeId = NodeIndex;

/// A [`Plan`] lowered into a DAG of unit occurrences.
///
/// Every occurrence of a unit in the plan becomes its own node, so the same
/// unit may appear more than once (e.g. `image-responsive:clean` in
/// `default:watch`). An edge `a -> b` means `b` may only start after `a`
/// completed successfully.
#[derive(Debug, Clone, Default)]
pub struct ExecutionGraph {
    graph: DiGraph<Unit, ()>,
}

impl ExecutionGraph {
    pub fn from_plan(plan: &Plan) -> Self {
        let mut this = Self::default();
        this.lower(plan, &[]);
        this
    }

    /// Add `plan` so that all of its entry nodes depend on `deps`; returns
    /// the plan's exit nodes.
    fn lower(&mut self, plan: &Plan, deps: &[NodeId]) -> Vec<NodeId> {
        match plan {
            Plan::Unit(unit) => {
                let node = self.graph.add_node(*unit);
                for dep in deps {
                    self.graph.add_edge(*dep, node, ());
                }
                vec![node]
            }
            Plan::Series(children) => {
                let mut exits = deps.to_vec();
                for child in children {
                    exits = self.lower(child, &exits);
                }
                exits
            }
            Plan::Parallel(children) => {
                if children.is_empty() {
                    return deps.to_vec();
                }
                let mut exits = Vec::new();
                for child in children {
                    exits.extend(self.lower(child, deps));
                }
                exits
            }
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    pub fn unit(&self, node: NodeId) -> Unit {
        self.graph[node]
    }

    /// Direct predecessors of `node`.
    pub fn dependencies_of(&self, node: NodeId) -> Vec<NodeId> {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .collect()
    }

    /// Direct successors of `node`.
    pub fn dependents_of(&self, node: NodeId) -> Vec<NodeId> {
        self.graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect()
    }

    /// Nodes without predecessors.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| self.dependencies_of(*n).is_empty())
            .collect()
    }

    /// Whether `to` can only start after `from` completed.
    pub fn must_precede(&self, from: NodeId, to: NodeId) -> bool {
        from != to && has_path_connecting(&self.graph, from, to, None)
    }

    /// Nodes holding `unit`, in insertion order.
    pub fn find(&self, unit: Unit) -> Vec<NodeId> {
        self.nodes().filter(|n| self.graph[*n] == unit).collect()
    }

    /// A topological order of all nodes.
    pub fn execution_order(&self) -> Result<Vec<NodeId>> {
        toposort(&self.graph, None).map_err(|cycle| {
            AssetpipeError::ConfigError(format!(
                "cycle detected in execution graph at '{}'",
                self.graph[cycle.node_id()]
            ))
        })
    }
}
