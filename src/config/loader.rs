// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Candidate file names tried by [`default_config_path`], in order.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["Assetpipe.toml", "assetpipe.json"];

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// Files ending in `.json` are parsed as JSON, everything else as TOML.
/// This only deserializes; use [`load_and_validate`] for semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_str(&contents, is_json(path))
}

/// Parse configuration text in the given format.
pub fn parse_str(contents: &str, json: bool) -> Result<RawConfigFile> {
    let config = if json {
        serde_json::from_str(contents)?
    } else {
        toml::from_str(contents)?
    };
    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// This is the entry point for the rest of the application:
///
/// - Reads TOML or JSON.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks paths, globs, cleanup safety and tool templates.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the config path used when `--config` is not given: the first
/// existing file of [`DEFAULT_CONFIG_FILES`] in `cwd`, or the first
/// candidate if none exists (so the error names a sensible file).
pub fn default_config_path(cwd: &Path) -> PathBuf {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| cwd.join(name))
        .find(|p| p.is_file())
        .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_FILES[0]))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
