// src/tasks/image_responsive.rs

//! Responsive image derivation: one resized variant per matching rule.

use crate::config::model::ResponsiveConfig;
use crate::errors::Result;
use crate::pipeline::command::RESIZE_PLACEHOLDERS;
use crate::pipeline::{CommandTemplate, Pipeline, ResponsiveVariants};
use crate::tasks::{CategoryPaths, CategoryTasks, TaskContext};
use crate::types::Category;

pub fn create(cfg: &ResponsiveConfig, ctx: &TaskContext) -> Result<CategoryTasks> {
    let resizer = CommandTemplate::parse(&ctx.tools.image_resizer, RESIZE_PLACEHOLDERS)?;
    let pipeline = Pipeline::new().stage(ResponsiveVariants::new(&cfg.configuration, resizer)?);

    let paths = CategoryPaths {
        src: cfg.src.clone(),
        dest: cfg.dest.clone(),
        del: cfg.del.clone(),
        watch: cfg.src.clone(),
    };
    CategoryTasks::new(Category::ImageResponsive, ctx, paths, pipeline)
}
