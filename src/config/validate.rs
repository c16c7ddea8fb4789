// src/config/validate.rs

use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile, ResponsiveConfig, ScriptConfig, ToolsSection};
use crate::errors::{AssetpipeError, Result};
use crate::patterns::path_utils::escapes_root;
use crate::patterns::GlobList;
use crate::pipeline::command::{FILE_PLACEHOLDERS, RESIZE_PLACEHOLDERS};
use crate::pipeline::CommandTemplate;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = AssetpipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_paths("style", &cfg.style.src, &cfg.style.dest, &cfg.style.del)?;
    validate_paths("script", &cfg.script.src, &cfg.script.dest, &cfg.script.del)?;
    validate_paths("font", &cfg.font.src, &cfg.font.dest, &cfg.font.del)?;
    validate_paths("image", &cfg.image.src, &cfg.image.dest, &cfg.image.del)?;
    validate_paths(
        "image_responsive",
        &cfg.image_responsive.src,
        &cfg.image_responsive.dest,
        &cfg.image_responsive.del,
    )?;
    validate_paths("data", &cfg.data.src, &cfg.data.dest, &cfg.data.del)?;
    validate_script(&cfg.script)?;
    validate_responsive(&cfg.image_responsive)?;
    validate_tools(&cfg.tools)?;
    Ok(())
}

fn validate_paths(section: &str, src: &GlobList, dest: &Path, del: &GlobList) -> Result<()> {
    if src.is_empty() {
        return Err(AssetpipeError::ConfigError(format!(
            "[{section}].src must contain at least one pattern"
        )));
    }
    if dest.as_os_str().is_empty() {
        return Err(AssetpipeError::ConfigError(format!(
            "[{section}].dest must not be empty"
        )));
    }
    if del.is_empty() {
        return Err(AssetpipeError::ConfigError(format!(
            "[{section}].del must contain at least one pattern"
        )));
    }

    // Deleting outside the working directory is never allowed.
    for pattern in del.patterns() {
        let pattern = pattern.trim_start().trim_start_matches('!');
        if escapes_root(pattern) {
            return Err(AssetpipeError::ConfigError(format!(
                "[{section}].del pattern '{pattern}' points outside the working directory"
            )));
        }
    }

    src.matcher()?;
    del.matcher()?;
    Ok(())
}

fn validate_script(cfg: &ScriptConfig) -> Result<()> {
    let concat = cfg.rename.concat.trim();
    if concat.is_empty() {
        return Err(AssetpipeError::ConfigError(
            "[script].rename.concat must name the bundle file".to_string(),
        ));
    }
    if cfg.rename.ext.src == cfg.rename.ext.min {
        return Err(AssetpipeError::ConfigError(format!(
            "[script].rename.ext.src and .min must differ (both are '{}')",
            cfg.rename.ext.src
        )));
    }
    for add in &cfg.add {
        if add.trim().is_empty() {
            return Err(AssetpipeError::ConfigError(
                "[script].add must not contain empty entries".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_responsive(cfg: &ResponsiveConfig) -> Result<()> {
    for (i, rule) in cfg.configuration.iter().enumerate() {
        if rule.name.trim().is_empty() {
            return Err(AssetpipeError::ConfigError(format!(
                "[image_responsive].configuration[{i}] has an empty name"
            )));
        }
        if rule.width.is_none() && rule.height.is_none() {
            return Err(AssetpipeError::ConfigError(format!(
                "[image_responsive].configuration[{i}] ('{}') needs a width or a height",
                rule.name
            )));
        }
        if rule.width == Some(0) || rule.height == Some(0) {
            return Err(AssetpipeError::ConfigError(format!(
                "[image_responsive].configuration[{i}] ('{}') has a zero size",
                rule.name
            )));
        }
    }
    Ok(())
}

fn validate_tools(tools: &ToolsSection) -> Result<()> {
    for cmd in [
        &tools.style_compiler,
        &tools.autoprefixer,
        &tools.css_minifier,
        &tools.js_minifier,
        &tools.image_optimizer,
    ] {
        CommandTemplate::parse(cmd, FILE_PLACEHOLDERS)?;
    }
    CommandTemplate::parse(&tools.image_resizer, RESIZE_PLACEHOLDERS)?;
    Ok(())
}
