// src/tasks/copy.rs

//! Pass-through categories (`font`, `data`): files are copied verbatim,
//! keeping their path relative to the source glob base.

use crate::config::model::PathConfig;
use crate::errors::Result;
use crate::pipeline::Pipeline;
use crate::tasks::{CategoryPaths, CategoryTasks, TaskContext};
use crate::types::Category;

pub fn create(category: Category, cfg: &PathConfig, ctx: &TaskContext) -> Result<CategoryTasks> {
    let paths = CategoryPaths {
        src: cfg.src.clone(),
        dest: cfg.dest.clone(),
        del: cfg.del.clone(),
        watch: cfg.src.clone(),
    };
    CategoryTasks::new(category, ctx, paths, Pipeline::new())
}
