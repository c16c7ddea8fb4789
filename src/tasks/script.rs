// src/tasks/script.rs

//! Scripts: prerequisites + module sources concatenated into one bundle,
//! emitted unminified and minified, each with a source map.

use crate::config::model::ScriptConfig;
use crate::errors::Result;
use crate::pipeline::command::FILE_PLACEHOLDERS;
use crate::pipeline::{
    CommandStage, CommandTemplate, Concat, ErrorPolicy, MinifiedVariants, Pipeline, SourceMaps,
};
use crate::tasks::{CategoryPaths, CategoryTasks, TaskContext};
use crate::types::Category;

pub fn create(cfg: &ScriptConfig, ctx: &TaskContext) -> Result<CategoryTasks> {
    let minifier = CommandTemplate::parse(&ctx.tools.js_minifier, FILE_PLACEHOLDERS)?;

    let pipeline = Pipeline::new()
        .stage(Concat::new(&cfg.rename.concat))
        .stage(MinifiedVariants::new(
            &cfg.rename.ext.src,
            &cfg.rename.ext.min,
            CommandStage::new("js-minifier", minifier, ErrorPolicy::Fail),
        ))
        .stage(SourceMaps::new(&cfg.dest_map));

    // `add` entries are read first, in order; only `src` is watched.
    let paths = CategoryPaths {
        src: cfg.src.prepended(&cfg.add),
        dest: cfg.dest.clone(),
        del: cfg.del.clone(),
        watch: cfg.src.clone(),
    };
    CategoryTasks::new(Category::Script, ctx, paths, pipeline)
}
