// src/pipeline/responsive.rs

use anyhow::Context;
use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::config::model::ResponsiveRule;
use crate::errors::{AssetpipeError, Result};
use crate::patterns::path_utils::to_slash;
use crate::pipeline::command::{failure_message, file_vars, run_command};
use crate::pipeline::{Asset, CommandTemplate, Stage, StageFuture};

/// Encoder quality used for every derived variant.
pub const QUALITY: u8 = 70;

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: ResponsiveRule,
    matcher: GlobMatcher,
}

impl CompiledRule {
    /// A rule matches on the full relative path or on the file name alone.
    fn matches(&self, asset: &Asset) -> bool {
        let rel = to_slash(&asset.path);
        let base = asset
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.matcher.is_match(&rel) || self.matcher.is_match(&base)
    }
}

/// Derive resized variants from each source image, one per matching rule.
///
/// Images no rule matches are dropped, rules no image matches are ignored,
/// and rules may request sizes above the source resolution. None of these
/// is an error.
#[derive(Debug, Clone)]
pub struct ResponsiveVariants {
    rules: Vec<CompiledRule>,
    resizer: CommandTemplate,
}

impl ResponsiveVariants {
    pub fn new(rules: &[ResponsiveRule], resizer: CommandTemplate) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| -> Result<CompiledRule> {
                let matcher = GlobBuilder::new(&rule.name)
                    .literal_separator(true)
                    .build()
                    .with_context(|| format!("invalid responsive rule name: {}", rule.name))?
                    .compile_matcher();
                Ok(CompiledRule {
                    rule: rule.clone(),
                    matcher,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules, resizer })
    }

    async fn derive(&self, asset: &Asset, rule: &ResponsiveRule) -> Result<Asset> {
        let source_ext = asset
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let format = rule.format.clone().unwrap_or_else(|| source_ext.clone());
        let extname = match (&rule.rename.extname, &rule.format) {
            (Some(ext), _) => ext.clone(),
            (None, Some(fmt)) => format!(".{fmt}"),
            (None, None) if source_ext.is_empty() => String::new(),
            (None, None) => format!(".{source_ext}"),
        };
        let stem = asset
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut variant = asset.clone();
        variant.path = asset.path.with_file_name(format!(
            "{}{stem}{}{extname}",
            rule.rename.prefix, rule.rename.suffix
        ));

        let mut vars = file_vars(&variant);
        vars.extend([
            ("geometry", geometry(rule.width, rule.height)),
            ("width", rule.width.map(|w| w.to_string()).unwrap_or_default()),
            ("height", rule.height.map(|h| h.to_string()).unwrap_or_default()),
            ("quality", QUALITY.to_string()),
            ("format", format),
        ]);

        let cmdline = self.resizer.render(&vars);
        let output = run_command(&cmdline, &asset.contents)
            .await
            .with_context(|| format!("resizing {:?}", asset.source))?;
        if !output.status.success() {
            return Err(AssetpipeError::transform(
                "image-resizer",
                &asset.source,
                failure_message(&output),
            ));
        }

        variant.contents = output.stdout;
        Ok(variant)
    }
}

impl Stage for ResponsiveVariants {
    fn name(&self) -> &str {
        "responsive"
    }

    fn apply<'a>(&'a self, assets: Vec<Asset>) -> StageFuture<'a> {
        Box::pin(async move {
            let mut used = vec![false; self.rules.len()];
            let mut out = Vec::new();

            for asset in &assets {
                let mut matched = false;
                for (i, compiled) in self.rules.iter().enumerate() {
                    if !compiled.matches(asset) {
                        continue;
                    }
                    matched = true;
                    used[i] = true;
                    out.push(self.derive(asset, &compiled.rule).await?);
                }
                if !matched {
                    debug!(path = ?asset.path, "image matched no responsive rule; skipping");
                }
            }

            for (compiled, used) in self.rules.iter().zip(used) {
                if !used {
                    debug!(rule = %compiled.rule.name, "responsive rule matched no image");
                }
            }

            Ok(out)
        })
    }
}

/// ImageMagick-style geometry: `640x480`, `640x` or `x480`.
fn geometry(width: Option<u32>, height: Option<u32>) -> String {
    let w = width.map(|w| w.to_string()).unwrap_or_default();
    let h = height.map(|h| h.to_string()).unwrap_or_default();
    format!("{w}x{h}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::RuleRename;
    use crate::pipeline::command::RESIZE_PLACEHOLDERS;
    use std::path::PathBuf;

    fn rule(name: &str, width: Option<u32>, suffix: &str, format: Option<&str>) -> ResponsiveRule {
        ResponsiveRule {
            name: name.to_string(),
            width,
            height: None,
            format: format.map(str::to_string),
            rename: RuleRename {
                suffix: suffix.to_string(),
                ..RuleRename::default()
            },
        }
    }

    #[test]
    fn geometry_formats() {
        assert_eq!(geometry(Some(640), None), "640x");
        assert_eq!(geometry(None, Some(480)), "x480");
        assert_eq!(geometry(Some(640), Some(480)), "640x480");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn derives_one_variant_per_matching_rule() {
        let resizer = CommandTemplate::parse(
            "printf '%s %s %s' {geometry} {quality} {format}",
            RESIZE_PLACEHOLDERS,
        )
        .unwrap();
        let stage = ResponsiveVariants::new(
            &[
                rule("*.jpg", Some(320), "-320w", None),
                rule("*.jpg", Some(1920), "-1920w", Some("webp")),
                rule("*.gif", Some(100), "-100w", None),
            ],
            resizer,
        )
        .unwrap();

        let out = stage
            .apply(vec![
                Asset::new("/p/img/photos/cat.jpg", "photos/cat.jpg", b"jpg".to_vec()),
                Asset::new("/p/img/logo.svg", "logo.svg", b"svg".to_vec()),
            ])
            .await
            .unwrap();

        let paths: Vec<_> = out.iter().map(|a| a.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("photos/cat-320w.jpg"),
                PathBuf::from("photos/cat-1920w.webp"),
            ]
        );
        assert_eq!(out[0].contents, b"320x 70 jpg");
        assert_eq!(out[1].contents, b"1920x 70 webp");
    }
}
