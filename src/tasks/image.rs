// src/tasks/image.rs

//! Image recompression. Dimensions are left alone; the configured
//! optimiser rewrites each file's bytes.

use crate::config::model::PathConfig;
use crate::errors::Result;
use crate::pipeline::command::FILE_PLACEHOLDERS;
use crate::pipeline::{CommandStage, CommandTemplate, ErrorPolicy, Pipeline};
use crate::tasks::{CategoryPaths, CategoryTasks, TaskContext};
use crate::types::Category;

pub fn create(cfg: &PathConfig, ctx: &TaskContext) -> Result<CategoryTasks> {
    let optimizer = CommandTemplate::parse(&ctx.tools.image_optimizer, FILE_PLACEHOLDERS)?;
    let pipeline =
        Pipeline::new().stage(CommandStage::new("image-optimizer", optimizer, ErrorPolicy::Fail));

    let paths = CategoryPaths {
        src: cfg.src.clone(),
        dest: cfg.dest.clone(),
        del: cfg.del.clone(),
        watch: cfg.src.clone(),
    };
    CategoryTasks::new(Category::Image, ctx, paths, pipeline)
}
