// src/watch/debounce.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::trace;

use crate::patterns::{relative_str, PathMatcher};

/// Wait for the next batch of relevant changes.
///
/// Blocks until a path under `root` that `matcher` accepts arrives, then
/// keeps collecting until no further event shows up for `quiet`. Returns
/// the distinct matching paths of the batch, or `None` once the channel is
/// closed and nothing relevant is pending.
pub async fn next_batch(
    rx: &mut mpsc::UnboundedReceiver<PathBuf>,
    root: &Path,
    matcher: &PathMatcher,
    quiet: Duration,
) -> Option<Vec<PathBuf>> {
    let mut batch: Vec<PathBuf> = Vec::new();

    // Wait for the first relevant change.
    loop {
        let path = rx.recv().await?;
        if is_relevant(root, matcher, &path) {
            batch.push(path);
            break;
        }
    }

    // Absorb the rest of the burst.
    loop {
        match timeout(quiet, rx.recv()).await {
            Ok(Some(path)) => {
                if is_relevant(root, matcher, &path) && !batch.contains(&path) {
                    batch.push(path);
                }
            }
            Ok(None) | Err(_) => break,
        }
    }

    Some(batch)
}

fn is_relevant(root: &Path, matcher: &PathMatcher, path: &Path) -> bool {
    let relevant = relative_str(root, path).is_some_and(|rel| matcher.matches(&rel));
    trace!(?path, relevant, "change event");
    relevant
}
