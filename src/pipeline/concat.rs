// src/pipeline/concat.rs

use std::path::PathBuf;

use crate::pipeline::{Asset, Stage, StageFuture};

/// Join all assets, in order, into a single file separated by newlines.
///
/// An empty input produces no output file.
#[derive(Debug, Clone)]
pub struct Concat {
    file_name: PathBuf,
}

impl Concat {
    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Stage for Concat {
    fn name(&self) -> &str {
        "concat"
    }

    fn apply<'a>(&'a self, assets: Vec<Asset>) -> StageFuture<'a> {
        Box::pin(async move {
            let Some(first) = assets.first() else {
                return Ok(Vec::new());
            };

            let mut merged = Asset::new(first.source.clone(), self.file_name.clone(), Vec::new());
            for (i, asset) in assets.into_iter().enumerate() {
                if i > 0 {
                    merged.contents.push(b'\n');
                }
                merged.contents.extend_from_slice(&asset.contents);
                merged.origins.extend(asset.origins);
            }

            Ok(vec![merged])
        })
    }
}
