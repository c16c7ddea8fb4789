// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching and closes the change channel.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch each of `dirs` recursively and forward every changed path.
///
/// Directories that do not exist are replaced by `fallback` (typically the
/// working directory), so a source folder created later is still seen.
/// Access-only events are dropped.
pub fn spawn_watcher(
    dirs: &[PathBuf],
    fallback: &Path,
) -> Result<(WatcherHandle, mpsc::UnboundedReceiver<PathBuf>)> {
    let (tx, rx) = mpsc::unbounded_channel::<PathBuf>();

    // Called synchronously by notify on its own thread.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event.kind.is_access() {
                    return;
                }
                for path in event.paths {
                    // The receiver is gone once monitoring stopped; nothing to do.
                    let _ = tx.send(path);
                }
            }
            Err(err) => warn!("file watch error: {err}"),
        },
        Config::default(),
    )?;

    let mut watched: Vec<PathBuf> = Vec::new();
    for dir in dirs {
        let dir = if dir.is_dir() {
            dir.clone()
        } else {
            fallback.to_path_buf()
        };
        if watched.iter().any(|w| dir.starts_with(w)) {
            continue;
        }
        watched.retain(|w| !w.starts_with(&dir));
        watched.push(dir);
    }

    for dir in &watched {
        watcher.watch(dir, RecursiveMode::Recursive)?;
        debug!(dir = ?dir, "watching directory");
    }

    info!(dirs = ?watched, "file watcher started");

    Ok((WatcherHandle { _inner: watcher }, rx))
}
