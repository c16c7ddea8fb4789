// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod patterns;
pub mod pipeline;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_and_validate};
use crate::dag::{ExecutionGraph, Plan};
use crate::engine::{execute, CategoryRunner, TaskRegistry};
use crate::tasks::{CategorySet, TaskContext};
use crate::types::{BuildOptions, Env};

/// Environment variable consulted when `--env` is not given.
pub const ENV_VAR: &str = "ASSETPIPE_ENV";

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - option resolution (working directory, environment)
/// - the task registry and the requested plan
/// - config loading and the category bundles
/// - the executor, raced against Ctrl-C
pub async fn run(args: CliArgs) -> Result<()> {
    let registry = TaskRegistry::standard();

    if args.list {
        print!("{registry}");
        return Ok(());
    }

    let plan = registry.resolve(&args.tasks, args.series)?;
    let graph = ExecutionGraph::from_plan(&plan);

    if args.dry_run {
        print_dry_run(&plan, &graph)?;
        return Ok(());
    }

    let cwd = resolve_cwd(args.cwd.as_deref())?;
    let env = resolve_env(args.env.as_deref(), std::env::var(ENV_VAR).ok().as_deref());
    let options = BuildOptions::new(env, &cwd);

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&cwd));
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    info!(config = %config_path.display(), %env, cwd = %cwd.display(), "configuration loaded");

    let ctx = TaskContext::from_config(options, &cfg);
    let set = Arc::new(CategorySet::create(&cfg, &ctx)?);
    let runner = Arc::new(CategoryRunner::new(set));

    info!(tasks = ?args.tasks, "running");
    tokio::select! {
        result = execute(graph, runner) => {
            result?;
            info!("all tasks finished");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl-C")?;
            info!("interrupted; stopping");
        }
    }
    Ok(())
}

/// `--cwd`, made absolute against the process directory.
fn resolve_cwd(flag: Option<&Path>) -> Result<PathBuf> {
    let process_dir = std::env::current_dir().context("reading the current directory")?;
    Ok(match flag {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => process_dir.join(dir),
        None => process_dir,
    })
}

/// `--env`, then the environment variable, then `dev`. Unknown names fall
/// back to `dev`.
pub fn resolve_env(flag: Option<&str>, var: Option<&str>) -> Env {
    let Some(raw) = flag.or(var) else {
        return Env::default();
    };
    match raw.parse() {
        Ok(env) => env,
        Err(err) => {
            warn!(error = %err, "falling back to the dev environment");
            Env::default()
        }
    }
}

/// Print the plan and the order its units would start in.
fn print_dry_run(plan: &Plan, graph: &ExecutionGraph) -> Result<()> {
    println!("assetpipe dry-run");
    println!("  plan: {plan}");
    println!();

    let order = graph.execution_order()?;
    println!("units ({}):", order.len());
    for node in order {
        let deps: Vec<String> = graph
            .dependencies_of(node)
            .into_iter()
            .map(|d| format!("#{}", d.index()))
            .collect();
        if deps.is_empty() {
            println!("  #{:<3} {}", node.index(), graph.unit(node));
        } else {
            println!(
                "  #{:<3} {}  after {}",
                node.index(),
                graph.unit(node),
                deps.join(", ")
            );
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_resolution_prefers_the_flag() {
        assert_eq!(resolve_env(Some("prod"), Some("dev")), Env::Prod);
        assert_eq!(resolve_env(None, Some("prod")), Env::Prod);
        assert_eq!(resolve_env(None, None), Env::Dev);
        assert_eq!(resolve_env(Some("staging"), Some("prod")), Env::Dev);
    }

    #[test]
    fn relative_cwd_is_made_absolute() {
        let dir = resolve_cwd(Some(Path::new("site"))).unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("site"));
    }
}
