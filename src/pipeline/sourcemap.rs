// src/pipeline/sourcemap.rs

use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use serde_json::json;

use crate::patterns::path_utils::to_slash;
use crate::pipeline::{Asset, Stage, StageFuture};

/// Write a version 3 source map next to every asset.
///
/// Maps land in `dir` (relative to the destination) mirroring the asset's
/// own relative path, e.g. `main.css` -> `map/main.css.map`. The map lists
/// every origin with its original contents; a `sourceMappingURL` comment is
/// appended to CSS and JS outputs.
#[derive(Debug, Clone)]
pub struct SourceMaps {
    dir: PathBuf,
}

impl SourceMaps {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir
            .as_ref()
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        Self { dir }
    }

    fn map_path(&self, asset: &Asset) -> PathBuf {
        let mut name = asset.path.clone().into_os_string();
        name.push(".map");
        self.dir.join(name)
    }
}

impl Stage for SourceMaps {
    fn name(&self) -> &str {
        "sourcemaps"
    }

    fn apply<'a>(&'a self, assets: Vec<Asset>) -> StageFuture<'a> {
        Box::pin(async move {
            let mut out = Vec::with_capacity(assets.len() * 2);
            for mut asset in assets {
                let map_path = self.map_path(&asset);
                let file = asset
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();

                let map = json!({
                    "version": 3,
                    "file": file,
                    "sources": asset.origins.iter().map(|o| o.path.as_str()).collect::<Vec<_>>(),
                    "sourcesContent": asset
                        .origins
                        .iter()
                        .map(|o| String::from_utf8_lossy(&o.contents).into_owned())
                        .collect::<Vec<_>>(),
                    "names": [],
                    "mappings": "",
                });
                let map_bytes = serde_json::to_vec(&map)
                    .with_context(|| format!("serializing source map for {:?}", asset.path))?;

                if let Some(comment) = mapping_comment(&asset.path, &map_path) {
                    if !asset.contents.ends_with(b"\n") && !asset.contents.is_empty() {
                        asset.contents.push(b'\n');
                    }
                    asset.contents.extend_from_slice(comment.as_bytes());
                }

                let map_asset = Asset {
                    source: asset.source.clone(),
                    path: map_path,
                    contents: map_bytes,
                    origins: Vec::new(),
                };
                out.push(asset);
                out.push(map_asset);
            }
            Ok(out)
        })
    }
}

/// `sourceMappingURL` comment, relative from the asset's directory.
fn mapping_comment(asset_path: &Path, map_path: &Path) -> Option<String> {
    let depth = asset_path
        .parent()
        .map(|p| p.components().count())
        .unwrap_or(0);
    let url = format!("{}{}", "../".repeat(depth), to_slash(map_path));

    match asset_path.extension().and_then(|e| e.to_str()) {
        Some("css") => Some(format!("/*# sourceMappingURL={url} */\n")),
        Some("js") => Some(format!("//# sourceMappingURL={url}\n")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_map_under_dir_and_links_it() {
        let asset = Asset::new("/p/style/main.scss", "main.css", b"a{}".to_vec())
            .with_origin("style/main.scss");

        let out = SourceMaps::new("./map").apply(vec![asset]).await.unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(
            String::from_utf8(out[0].contents.clone()).unwrap(),
            "a{}\n/*# sourceMappingURL=map/main.css.map */\n"
        );
        assert_eq!(out[1].path, PathBuf::from("map/main.css.map"));

        let map: serde_json::Value = serde_json::from_slice(&out[1].contents).unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["file"], "main.css");
        assert_eq!(map["sources"][0], "style/main.scss");
    }

    #[test]
    fn nested_assets_link_upwards() {
        let comment =
            mapping_comment(Path::new("js/app.js"), Path::new("map/js/app.js.map")).unwrap();
        assert_eq!(comment, "//# sourceMappingURL=../map/js/app.js.map\n");
        assert!(mapping_comment(Path::new("a.txt"), Path::new("map/a.txt.map")).is_none());
    }
}
