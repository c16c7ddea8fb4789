// src/tasks/style.rs

//! Stylesheets: compile, prefix, (prod) minify, source maps.
//!
//! Partials (`_name.scss`) matched by `src` are dropped before compiling.
//! The compiler stage is tolerant: a file the compiler rejects is logged and
//! left out while the rest of the run continues. Every later stage fails the
//! compile on error.

use crate::config::model::StyleConfig;
use crate::errors::Result;
use crate::patterns::GlobList;
use crate::pipeline::command::FILE_PLACEHOLDERS;
use crate::pipeline::{
    CommandStage, CommandTemplate, ErrorPolicy, Pipeline, SetExtension, SkipPartials, SourceMaps,
};
use crate::tasks::{CategoryPaths, CategoryTasks, TaskContext};
use crate::types::Category;

/// Entry file whose directory tree is watched instead of the file alone.
pub const MAIN_ENTRY: &str = "main.scss";

pub fn create(cfg: &StyleConfig, ctx: &TaskContext) -> Result<CategoryTasks> {
    let tools = &ctx.tools;
    let compiler = CommandTemplate::parse(&tools.style_compiler, FILE_PLACEHOLDERS)?;
    let prefixer = CommandTemplate::parse(&tools.autoprefixer, FILE_PLACEHOLDERS)?;
    let minifier = CommandTemplate::parse(&tools.css_minifier, FILE_PLACEHOLDERS)?;

    let pipeline = Pipeline::new()
        .stage(SkipPartials::new())
        .stage(CommandStage::new("style-compiler", compiler, ErrorPolicy::LogAndSkip))
        .stage(SetExtension::new("css"))
        .stage(CommandStage::new("autoprefixer", prefixer, ErrorPolicy::Fail))
        .stage_if(ctx.options.env.is_prod(), || {
            CommandStage::new("css-minifier", minifier, ErrorPolicy::Fail)
        })
        .stage(SourceMaps::new(&cfg.dest_map));

    let paths = CategoryPaths {
        src: cfg.src.clone(),
        dest: cfg.dest.clone(),
        del: cfg.del.clone(),
        watch: watch_glob(&cfg.src),
    };
    CategoryTasks::new(Category::Style, ctx, paths, pipeline)
}

/// Widen `dir/main.scss` to `dir/**/*.scss` so edits to imported partials
/// also trigger a recompile. Any other pattern is kept as is.
pub fn watch_glob(src: &GlobList) -> GlobList {
    src.patterns()
        .iter()
        .map(|pattern| {
            let mut segments: Vec<&str> = pattern.split('/').collect();
            if segments.last() == Some(&MAIN_ENTRY) {
                segments.pop();
                segments.extend(["**", "*.scss"]);
                segments.join("/")
            } else {
                pattern.clone()
            }
        })
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::ToolsSection;
    use crate::types::{BuildOptions, Env};
    use std::path::PathBuf;

    fn config() -> StyleConfig {
        StyleConfig {
            src: "resource/style/main.scss".into(),
            dest: PathBuf::from("public/style"),
            dest_map: PathBuf::from("map"),
            del: "public/style/**".into(),
        }
    }

    #[test]
    fn main_entry_is_widened_to_its_tree() {
        let glob = watch_glob(&"resource/style/main.scss".into());
        assert_eq!(glob.patterns(), ["resource/style/**/*.scss".to_string()]);

        let matcher = glob.matcher().unwrap();
        assert!(matcher.matches("resource/style/_partial.scss"));
        assert!(matcher.matches("resource/style/components/_button.scss"));
        assert!(!matcher.matches("resource/script/app.js"));
    }

    #[test]
    fn other_sources_are_watched_unchanged() {
        let src: GlobList = "resource/style/app.scss".into();
        assert_eq!(watch_glob(&src), src);

        let src: GlobList = "resource/style/**/*.scss".into();
        assert_eq!(watch_glob(&src), src);

        assert_eq!(
            watch_glob(&"main.scss".into()).patterns(),
            ["**/*.scss".to_string()]
        );
    }

    #[test]
    fn minifier_only_in_prod() {
        let dev = create(&config(), &TaskContext::new(BuildOptions::new(Env::Dev, "/p"))).unwrap();
        let prod = create(&config(), &TaskContext::new(BuildOptions::new(Env::Prod, "/p"))).unwrap();

        assert!(!dev.pipeline().stage_names().contains(&"css-minifier"));
        assert!(prod.pipeline().stage_names().contains(&"css-minifier"));
        assert_eq!(
            prod.pipeline().stage_names(),
            vec![
                "skip-partials",
                "style-compiler",
                "extension:css",
                "autoprefixer",
                "css-minifier",
                "sourcemaps",
            ]
        );
    }

    #[test]
    fn invalid_tool_template_fails_construction() {
        let tools = ToolsSection {
            css_minifier: "cssnano {nope}".to_string(),
            ..ToolsSection::default()
        };
        let ctx = TaskContext::new(BuildOptions::new(Env::Prod, "/p")).with_tools(tools);
        assert!(create(&config(), &ctx).is_err());
    }
}
