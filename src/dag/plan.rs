// src/dag/plan.rs

//! Declarative task composition.
//!
//! A [`Plan`] is a tree of [`Unit`]s combined in series or in parallel. It
//! says nothing about how units are executed; see [`crate::dag::graph`] for
//! the lowered form and [`crate::engine`] for execution.

use std::fmt;

use crate::types::{Action, Category};

/// The smallest schedulable piece of work: one action of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Unit {
    pub category: Category,
    pub action: Action,
}

impl Unit {
    pub fn new(category: Category, action: Action) -> Self {
        Self { category, action }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.action)
    }
}

/// Composition of units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Unit(Unit),
    /// Each child starts only after the previous one fully completed.
    Series(Vec<Plan>),
    /// Children run concurrently with no ordering among them.
    Parallel(Vec<Plan>),
}

impl Plan {
    pub fn unit(category: Category, action: Action) -> Self {
        Plan::Unit(Unit::new(category, action))
    }

    pub fn series(children: impl IntoIterator<Item = Plan>) -> Self {
        Plan::Series(children.into_iter().collect())
    }

    pub fn parallel(children: impl IntoIterator<Item = Plan>) -> Self {
        Plan::Parallel(children.into_iter().collect())
    }

    /// Every unit occurrence, depth first.
    pub fn units(&self) -> Vec<Unit> {
        let mut out = Vec::new();
        self.collect_units(&mut out);
        out
    }

    fn collect_units(&self, out: &mut Vec<Unit>) {
        match self {
            Plan::Unit(u) => out.push(*u),
            Plan::Series(children) | Plan::Parallel(children) => {
                for child in children {
                    child.collect_units(out);
                }
            }
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, children) = match self {
            Plan::Unit(u) => return write!(f, "{u}"),
            Plan::Series(children) => ("series", children),
            Plan::Parallel(children) => ("parallel", children),
        };
        write!(f, "{name}(")?;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}

/// The four composite operations every category exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBundle {
    pub clean: Plan,
    pub compile: Plan,
    /// `clean`, then `compile`.
    pub clean_compile: Plan,
    /// `clean_compile`, then continuous monitoring.
    pub watch: Plan,
}

impl TaskBundle {
    pub fn for_category(category: Category) -> Self {
        let clean = Plan::unit(category, Action::Clean);
        let compile = Plan::unit(category, Action::Compile);
        let clean_compile = Plan::series([clean.clone(), compile.clone()]);
        let watch = Plan::series([
            clean_compile.clone(),
            Plan::unit(category, Action::Monitor),
        ]);
        Self {
            clean,
            compile,
            clean_compile,
            watch,
        }
    }
}
