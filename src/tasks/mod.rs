// src/tasks/mod.rs

//! Category task factories.
//!
//! Every category is built by a `create` function in its own module and
//! returns the same [`CategoryTasks`] shape: `clean`, `compile`,
//! `clean_compile` and `watch`. The categories only differ in the
//! [`Pipeline`] they assemble and, for styles, in the watch glob.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::model::{ConfigFile, ToolsSection};
use crate::errors::{AssetpipeError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::patterns::path_utils::to_slash;
use crate::patterns::{GlobList, PathMatcher};
use crate::pipeline::{Asset, Pipeline};
use crate::types::{BuildOptions, Category};
use crate::watch::{next_batch, spawn_watcher};

pub mod copy;
pub mod image;
pub mod image_responsive;
pub mod script;
pub mod style;

/// Everything a factory needs besides its own configuration section.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub options: BuildOptions,
    pub tools: ToolsSection,
    /// Quiet period used to group change events while watching.
    pub debounce: Duration,
    pub fs: Arc<dyn FileSystem>,
}

impl TaskContext {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            tools: ToolsSection::default(),
            debounce: Duration::from_millis(200),
            fs: Arc::new(RealFileSystem),
        }
    }

    /// Context using the `[tools]` and `[watch]` sections of `cfg`.
    pub fn from_config(options: BuildOptions, cfg: &ConfigFile) -> Self {
        Self {
            tools: cfg.tools().clone(),
            debounce: Duration::from_millis(cfg.watch().debounce_ms),
            ..Self::new(options)
        }
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_tools(mut self, tools: ToolsSection) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Paths a category reads, writes, removes and watches.
#[derive(Debug, Clone)]
pub struct CategoryPaths {
    pub src: GlobList,
    pub dest: PathBuf,
    pub del: GlobList,
    pub watch: GlobList,
}

/// The task bundle of one category.
///
/// Immutable after construction; every operation can be invoked any number
/// of times and performs its side effects afresh.
#[derive(Debug)]
pub struct CategoryTasks {
    category: Category,
    ctx: TaskContext,
    paths: CategoryPaths,
    src: PathMatcher,
    del: PathMatcher,
    watch: PathMatcher,
    pipeline: Pipeline,
}

impl CategoryTasks {
    pub fn new(
        category: Category,
        ctx: &TaskContext,
        paths: CategoryPaths,
        pipeline: Pipeline,
    ) -> Result<Self> {
        Ok(Self {
            category,
            src: paths.src.matcher()?,
            del: paths.del.matcher()?,
            watch: paths.watch.matcher()?,
            ctx: ctx.clone(),
            paths,
            pipeline,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn paths(&self) -> &CategoryPaths {
        &self.paths
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Delete everything matching `del`. Matched directories go with
    /// their contents unless they hold an excluded path; the pattern base
    /// directory of a glob is kept.
    pub async fn clean(&self) -> Result<()> {
        let fs = Arc::clone(&self.ctx.fs);
        let cwd = self.ctx.options.cwd.clone();
        let del = self.del.clone();

        let removal = blocking(move || {
            let removal = del.collect_for_removal(fs.as_ref(), &cwd)?;
            for file in &removal.files {
                fs.remove_file(file)?;
            }
            for dir in &removal.dirs {
                fs.remove_dir_all(dir)?;
            }
            Ok(removal)
        })
        .await?;

        info!(
            category = %self.category,
            files = removal.files.len(),
            dirs = removal.dirs.len(),
            del = %self.paths.del,
            "cleaned"
        );
        Ok(())
    }

    /// Read the sources, run the pipeline and write the results to `dest`.
    ///
    /// Nothing is written if any stage fails.
    pub async fn compile(&self) -> Result<()> {
        let fs = Arc::clone(&self.ctx.fs);
        let cwd = self.ctx.options.cwd.clone();
        let src = self.src.clone();

        let assets = blocking(move || {
            let mut assets = Vec::new();
            for file in src.collect_files(fs.as_ref(), &cwd)? {
                let contents = fs.read(&file.path)?;
                let origin = file
                    .path
                    .strip_prefix(&cwd)
                    .map(to_slash)
                    .unwrap_or_else(|_| to_slash(&file.path));
                assets.push(Asset::new(file.path, file.relative, contents).with_origin(origin));
            }
            Ok(assets)
        })
        .await?;
        let inputs = assets.len();

        let outputs = self.pipeline.run(assets).await?;
        let written = outputs.len();

        let fs = Arc::clone(&self.ctx.fs);
        let dest = self.ctx.options.cwd.join(&self.paths.dest);
        blocking(move || {
            for asset in &outputs {
                fs.write(&dest.join(&asset.path), &asset.contents)?;
            }
            Ok(())
        })
        .await?;

        info!(
            category = %self.category,
            inputs,
            outputs = written,
            dest = ?self.paths.dest,
            "compiled"
        );
        Ok(())
    }

    /// `clean` to completion, then `compile`.
    pub async fn clean_compile(&self) -> Result<()> {
        self.clean().await?;
        self.compile().await
    }

    /// One `clean_compile` pass, then recompile on every change. Runs until
    /// the process stops.
    pub async fn watch(&self) -> Result<()> {
        self.clean_compile().await?;
        self.monitor().await
    }

    /// Attach a filesystem watcher to the watch glob and recompile on change.
    pub async fn monitor(&self) -> Result<()> {
        let cwd = &self.ctx.options.cwd;
        let dirs: Vec<PathBuf> = self.watch.bases().map(|b| cwd.join(b)).collect();
        let (_handle, rx) = spawn_watcher(&dirs, cwd)?;
        self.monitor_with(rx).await
    }

    /// Recompile for every batch of relevant paths arriving on `changes`.
    ///
    /// Compile failures are logged and monitoring continues. Returns once
    /// the channel is closed.
    pub async fn monitor_with(&self, mut changes: mpsc::UnboundedReceiver<PathBuf>) -> Result<()> {
        let cwd = &self.ctx.options.cwd;
        info!(category = %self.category, watch = %self.paths.watch, "watching for changes");

        while let Some(batch) = next_batch(&mut changes, cwd, &self.watch, self.ctx.debounce).await {
            info!(category = %self.category, changed = batch.len(), "change detected; recompiling");
            if let Err(err) = self.compile().await {
                error!(category = %self.category, error = %err, "compile failed while watching");
            }
        }

        info!(category = %self.category, "change feed closed; watch finished");
        Ok(())
    }
}

/// Run filesystem work on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(err) => Err(AssetpipeError::Other(
            anyhow::Error::new(err).context("filesystem task did not complete"),
        )),
    }
}

/// The six category bundles built from one configuration.
#[derive(Debug)]
pub struct CategorySet {
    pub style: Arc<CategoryTasks>,
    pub script: Arc<CategoryTasks>,
    pub font: Arc<CategoryTasks>,
    pub image_responsive: Arc<CategoryTasks>,
    pub image: Arc<CategoryTasks>,
    pub data: Arc<CategoryTasks>,
}

impl CategorySet {
    /// Invoke every category factory once.
    pub fn create(cfg: &ConfigFile, ctx: &TaskContext) -> Result<Self> {
        Ok(Self {
            style: Arc::new(style::create(cfg.style(), ctx)?),
            script: Arc::new(script::create(cfg.script(), ctx)?),
            font: Arc::new(copy::create(Category::Font, cfg.font(), ctx)?),
            image_responsive: Arc::new(image_responsive::create(cfg.image_responsive(), ctx)?),
            image: Arc::new(image::create(cfg.image(), ctx)?),
            data: Arc::new(copy::create(Category::Data, cfg.data(), ctx)?),
        })
    }

    pub fn get(&self, category: Category) -> &Arc<CategoryTasks> {
        match category {
            Category::Style => &self.style,
            Category::Script => &self.script,
            Category::Font => &self.font,
            Category::ImageResponsive => &self.image_responsive,
            Category::Image => &self.image,
            Category::Data => &self.data,
        }
    }
}
