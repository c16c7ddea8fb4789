// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `assetpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetpipe",
    version,
    about = "Clean, compile and watch web assets (styles, scripts, fonts, images, data).",
    long_about = None
)]
pub struct CliArgs {
    /// Tasks to run, e.g. `default`, `style:watch`, `image-responsive`.
    #[arg(value_name = "TASK", default_value = "default")]
    pub tasks: Vec<String>,

    /// Path to the config file (`.toml` or `.json`).
    ///
    /// Default: `Assetpipe.toml`, then `assetpipe.json`, in the working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Build environment (`dev` or `prod`). Invalid values fall back to `dev`.
    ///
    /// If omitted, `ASSETPIPE_ENV` or `dev` is used.
    #[arg(long, value_name = "ENV")]
    pub env: Option<String>,

    /// Working directory all configured paths are resolved against.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Run multiple tasks one after another instead of in parallel.
    #[arg(long)]
    pub series: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print every registered task and its composition, then exit.
    #[arg(long)]
    pub list: bool,

    /// Resolve the requested tasks and print the execution order without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
