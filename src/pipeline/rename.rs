// src/pipeline/rename.rs

use crate::pipeline::{Asset, Stage, StageFuture};

/// Replace the extension of every asset's output path (e.g. `.scss` -> `.css`).
#[derive(Debug, Clone)]
pub struct SetExtension {
    ext: String,
    label: String,
}

impl SetExtension {
    /// `ext` without the leading dot.
    pub fn new(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_string();
        Self {
            label: format!("extension:{ext}"),
            ext,
        }
    }
}

impl Stage for SetExtension {
    fn name(&self) -> &str {
        &self.label
    }

    fn apply<'a>(&'a self, assets: Vec<Asset>) -> StageFuture<'a> {
        Box::pin(async move {
            Ok(assets
                .into_iter()
                .map(|mut a| {
                    a.path = a.path_with_extension(&self.ext);
                    a
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn rewrites_extension_only() {
        let out = SetExtension::new(".css")
            .apply(vec![Asset::new("/p/s/main.scss", "deep/main.scss", vec![])])
            .await
            .unwrap();
        assert_eq!(out[0].path, PathBuf::from("deep/main.css"));
        assert_eq!(out[0].source, PathBuf::from("/p/s/main.scss"));
    }
}
