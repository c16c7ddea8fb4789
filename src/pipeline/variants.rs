// src/pipeline/variants.rs

use crate::pipeline::{replace_extension, Asset, CommandStage, Stage, StageFuture};

/// Emit an unminified and a minified copy of every asset.
///
/// `script.js` with extensions `.js` / `.min.js` becomes `script.js`
/// (original contents) and `script.min.js` (minifier output).
#[derive(Debug, Clone)]
pub struct MinifiedVariants {
    ext_src: String,
    ext_min: String,
    minifier: CommandStage,
}

impl MinifiedVariants {
    pub fn new(ext_src: impl Into<String>, ext_min: impl Into<String>, minifier: CommandStage) -> Self {
        Self {
            ext_src: ext_src.into(),
            ext_min: ext_min.into(),
            minifier,
        }
    }
}

impl Stage for MinifiedVariants {
    fn name(&self) -> &str {
        "minify"
    }

    fn apply<'a>(&'a self, assets: Vec<Asset>) -> StageFuture<'a> {
        Box::pin(async move {
            let mut out = Vec::with_capacity(assets.len() * 2);
            for asset in assets {
                let mut min = asset.clone();
                min.path = replace_extension(&asset.path, &self.ext_min);
                min.contents = self.minifier.transform(&min).await?;

                let mut src = asset;
                src.path = replace_extension(&src.path, &self.ext_src);

                out.push(src);
                out.push(min);
            }
            Ok(out)
        })
    }
}
