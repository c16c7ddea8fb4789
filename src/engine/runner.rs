// src/engine/runner.rs

use std::sync::Arc;

use crate::dag::Unit;
use crate::engine::executor::{UnitFuture, UnitRunner};
use crate::tasks::CategorySet;
use crate::types::Action;

/// Runs units against the category bundles built from the configuration.
#[derive(Debug, Clone)]
pub struct CategoryRunner {
    set: Arc<CategorySet>,
}

impl CategoryRunner {
    pub fn new(set: Arc<CategorySet>) -> Self {
        Self { set }
    }
}

impl UnitRunner for CategoryRunner {
    fn run(&self, unit: Unit) -> UnitFuture {
        let tasks = Arc::clone(self.set.get(unit.category));
        Box::pin(async move {
            match unit.action {
                Action::Clean => tasks.clean().await,
                Action::Compile => tasks.compile().await,
                Action::Monitor => tasks.monitor().await,
            }
        })
    }
}
