// src/engine/executor.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::dag::{ExecutionGraph, NodeId, ScheduledUnit, Scheduler, Unit};
use crate::engine::UnitOutcome;
use crate::errors::{AssetpipeError, Result};

/// Boxed future returned by [`UnitRunner::run`].
pub type UnitFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// Trait abstracting how a unit is carried out.
///
/// Production code uses [`crate::engine::CategoryRunner`]; tests can provide
/// their own implementation that records calls instead of touching files.
pub trait UnitRunner: Send + Sync {
    /// Start `unit`. The returned future resolves when the unit completed.
    fn run(&self, unit: Unit) -> UnitFuture;
}

type Completion = (NodeId, Unit, Result<()>);

/// Run every unit of `graph`, honouring its edges.
///
/// Ready units are dispatched onto a [`JoinSet`] as soon as their
/// predecessors succeeded. On the first failure nothing new is started,
/// every in-flight unit is aborted and that failure is returned.
pub async fn execute(graph: ExecutionGraph, runner: Arc<dyn UnitRunner>) -> Result<()> {
    let total = graph.len();
    let mut scheduler = Scheduler::new(graph);
    let mut running: JoinSet<Completion> = JoinSet::new();

    debug!(units = total, "executor started");
    dispatch(&mut running, &runner, scheduler.start());

    let mut failure = None;
    while let Some(joined) = running.join_next().await {
        let (node, unit, result) = match joined {
            Ok(completion) => completion,
            Err(join_err) => {
                failure = Some(AssetpipeError::Other(anyhow!("unit task panicked: {join_err}")));
                break;
            }
        };

        match result {
            Ok(()) => {
                let ready = scheduler.handle_completion(node, UnitOutcome::Success);
                dispatch(&mut running, &runner, ready);
            }
            Err(err) => {
                error!(%unit, error = %err, "unit failed; aborting remaining units");
                scheduler.handle_completion(node, UnitOutcome::Failed);
                failure = Some(err);
                break;
            }
        }
    }

    if let Some(err) = failure {
        running.abort_all();
        while running.join_next().await.is_some() {}
        return Err(err);
    }

    debug!(units = total, finished = scheduler.is_finished(), "executor finished");
    Ok(())
}

fn dispatch(running: &mut JoinSet<Completion>, runner: &Arc<dyn UnitRunner>, ready: Vec<ScheduledUnit>) {
    for ScheduledUnit { node, unit } in ready {
        info!(%unit, "starting");
        let fut = runner.run(unit);
        running.spawn(async move {
            let started = Instant::now();
            let result = fut.await;
            if result.is_ok() {
                info!(%unit, elapsed_ms = started.elapsed().as_millis() as u64, "finished");
            }
            (node, unit, result)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::Plan;
    use crate::types::{Action, Category};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
        fail: Option<Unit>,
    }

    impl UnitRunner for Recorder {
        fn run(&self, unit: Unit) -> UnitFuture {
            let calls = Arc::clone(&self.calls);
            let fail = self.fail == Some(unit);
            Box::pin(async move {
                calls.lock().unwrap().push(unit.to_string());
                if fail {
                    return Err(AssetpipeError::ConfigError(format!("{unit} broke")));
                }
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn runs_series_in_order() {
        let plan = crate::dag::TaskBundle::for_category(Category::Font).clean_compile;
        let recorder = Arc::new(Recorder::default());
        let calls = Arc::clone(&recorder.calls);

        execute(ExecutionGraph::from_plan(&plan), recorder).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["font:clean", "font:compile"]);
    }

    #[tokio::test]
    async fn failure_stops_the_series() {
        let plan = Plan::series([
            Plan::unit(Category::Data, Action::Clean),
            Plan::unit(Category::Data, Action::Compile),
        ]);
        let recorder = Arc::new(Recorder {
            fail: Some(Unit::new(Category::Data, Action::Clean)),
            ..Recorder::default()
        });
        let calls = Arc::clone(&recorder.calls);

        let err = execute(ExecutionGraph::from_plan(&plan), recorder)
            .await
            .unwrap_err();

        assert!(matches!(err, AssetpipeError::ConfigError(_)));
        assert_eq!(*calls.lock().unwrap(), vec!["data:clean"]);
    }

    #[tokio::test]
    async fn empty_graph_completes_immediately() {
        let recorder = Arc::new(Recorder::default());
        execute(ExecutionGraph::from_plan(&Plan::parallel([])), recorder)
            .await
            .unwrap();
    }
}
