// src/pipeline/mod.rs

//! In-memory asset pipelines.
//!
//! A category's `compile` reads its sources into [`Asset`]s, pushes them
//! through an ordered list of [`Stage`]s and writes whatever comes out the
//! other end. Stages are chosen once, when the category is constructed;
//! nothing inside a stage branches on the environment.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::debug;

use crate::errors::Result;

pub mod command;
pub mod concat;
pub mod partials;
pub mod rename;
pub mod responsive;
pub mod sourcemap;
pub mod variants;

pub use command::{CommandStage, CommandTemplate, ErrorPolicy};
pub use concat::Concat;
pub use partials::SkipPartials;
pub use rename::SetExtension;
pub use responsive::ResponsiveVariants;
pub use sourcemap::SourceMaps;
pub use variants::MinifiedVariants;

/// An original input file that contributed to an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Path of the input file, relative to the working directory.
    pub path: String,
    pub contents: Vec<u8>,
}

/// A file travelling through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Absolute path of the file this asset was read from.
    pub source: PathBuf,
    /// Output path, relative to the destination directory.
    pub path: PathBuf,
    pub contents: Vec<u8>,
    /// Inputs this asset was built from (one, or several after concatenation).
    pub origins: Vec<Origin>,
}

impl Asset {
    pub fn new(source: impl Into<PathBuf>, path: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            path: path.into(),
            contents,
            origins: Vec::new(),
        }
    }

    pub fn with_origin(mut self, path: impl Into<String>) -> Self {
        self.origins.push(Origin {
            path: path.into(),
            contents: self.contents.clone(),
        });
        self
    }

    /// Output path with its extension replaced; `ext` has no leading dot.
    pub fn path_with_extension(&self, ext: &str) -> PathBuf {
        self.path.with_extension(ext)
    }
}

/// Boxed future returned by [`Stage::apply`].
pub type StageFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Asset>>> + Send + 'a>>;

/// One transform step. A stage may drop, rewrite, merge or multiply assets.
pub trait Stage: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn apply<'a>(&'a self, assets: Vec<Asset>) -> StageFuture<'a>;
}

/// Ordered list of stages.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append a stage only when `include` holds.
    pub fn stage_if<S, F>(self, include: bool, make: F) -> Self
    where
        S: Stage + 'static,
        F: FnOnce() -> S,
    {
        if include { self.stage(make()) } else { self }
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub async fn run(&self, mut assets: Vec<Asset>) -> Result<Vec<Asset>> {
        for stage in &self.stages {
            let before = assets.len();
            assets = stage.apply(assets).await?;
            debug!(stage = stage.name(), before, after = assets.len(), "stage finished");
        }
        Ok(assets)
    }
}

/// `name.ext` -> `name` + `suffix`; `suffix` includes its own dot.
pub(crate) fn replace_extension(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}"))
}
