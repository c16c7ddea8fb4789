// src/pipeline/partials.rs

use tracing::debug;

use crate::pipeline::{Asset, Stage, StageFuture};

/// Drop stylesheet partials (`_name.scss`). They are only compiled through
/// the files that import them and never produce output of their own.
#[derive(Debug, Clone, Default)]
pub struct SkipPartials;

impl SkipPartials {
    pub fn new() -> Self {
        Self
    }
}

fn is_partial(asset: &Asset) -> bool {
    asset
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

impl Stage for SkipPartials {
    fn name(&self) -> &str {
        "skip-partials"
    }

    fn apply<'a>(&'a self, assets: Vec<Asset>) -> StageFuture<'a> {
        Box::pin(async move {
            Ok(assets
                .into_iter()
                .filter(|a| {
                    let partial = is_partial(a);
                    if partial {
                        debug!(path = ?a.path, "skipping partial");
                    }
                    !partial
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
    async fn keeps_entries_and_drops_underscored_files() {
        let out = SkipPartials::new()
            .apply(vec![
                Asset::new("/p/s/main.scss", "main.scss", vec![]),
                Asset::new("/p/s/_vars.scss", "_vars.scss", vec![]),
                Asset::new("/p/s/components/_button.scss", "components/_button.scss", vec![]),
                Asset::new("/p/s/my_theme/app.scss", "my_theme/app.scss", vec![]),
            ])
            .await
            .unwrap();
        let paths: Vec<_> = out.into_iter().map(|a| a.path).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("main.scss"), PathBuf::from("my_theme/app.scss")]
        );
    }
}
