// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - `model.rs`: the serde-backed data model.
//! - `loader.rs`: reading TOML/JSON from disk.
//! - `validate.rs`: path, glob and template checks.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, parse_str};
pub use model::{
    ConfigFile, PathConfig, RawConfigFile, ResponsiveConfig, ResponsiveRule, RuleRename,
    ScriptConfig, ScriptExt, ScriptRename, StyleConfig, ToolsSection, WatchSection,
};
