// tests/orchestration_order.rs

mod common;
use crate::common::recording_runner::{Event, RecordingRunner};
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use assetpipe::dag::{ExecutionGraph, Unit};
use assetpipe::engine::{execute, TaskRegistry};
use assetpipe::errors::AssetpipeError;
use assetpipe::types::{Action, Category};

fn unit(category: Category, action: Action) -> Unit {
    Unit::new(category, action)
}

async fn run_task(name: &str, runner: &RecordingRunner) -> Result<(), AssetpipeError> {
    let registry = TaskRegistry::standard();
    let plan = registry.get(name)?;
    execute(ExecutionGraph::from_plan(plan), Arc::new(runner.clone())).await
}

#[tokio::test]
async fn default_cleans_everything_before_compiling_anything() {
    init_tracing();
    let runner = RecordingRunner::new()
        .delay(unit(Category::Script, Action::Clean), Duration::from_millis(30));

    with_timeout(run_task("default", &runner)).await.unwrap();

    let last_clean_end = Category::ALL
        .iter()
        .filter_map(|c| runner.position(Event::End(unit(*c, Action::Clean)), 0))
        .max()
        .unwrap();
    let first_compile_start = Category::ALL
        .iter()
        .filter_map(|c| runner.position(Event::Start(unit(*c, Action::Compile)), 0))
        .min()
        .unwrap();
    assert!(last_clean_end < first_compile_start);

    for category in Category::ALL {
        assert_eq!(runner.count(Event::End(unit(category, Action::Clean))), 1);
        assert_eq!(runner.count(Event::End(unit(category, Action::Compile))), 1);
    }
}

#[tokio::test]
async fn default_compile_runs_image_after_image_responsive() {
    init_tracing();
    let runner = RecordingRunner::new().delay(
        unit(Category::ImageResponsive, Action::Compile),
        Duration::from_millis(40),
    );

    with_timeout(run_task("default:compile", &runner)).await.unwrap();

    let responsive_end = runner
        .position(Event::End(unit(Category::ImageResponsive, Action::Compile)), 0)
        .unwrap();
    let image_start = runner
        .position(Event::Start(unit(Category::Image, Action::Compile)), 0)
        .unwrap();
    assert!(responsive_end < image_start);

    // The other categories do not wait for the slow responsive compile.
    let style_start = runner
        .position(Event::Start(unit(Category::Style, Action::Compile)), 0)
        .unwrap();
    assert!(style_start < responsive_end);
}

#[tokio::test]
async fn default_watch_prebuilds_responsive_images_then_watches_all() {
    init_tracing();
    let runner = RecordingRunner::new();

    with_timeout(run_task("default:watch", &runner)).await.unwrap();

    let prebuilt = runner
        .position(Event::End(unit(Category::ImageResponsive, Action::Compile)), 0)
        .unwrap();
    for category in Category::ALL {
        let nth = usize::from(category == Category::ImageResponsive);
        let clean = runner
            .position(Event::Start(unit(category, Action::Clean)), nth)
            .unwrap();
        let compiled = runner
            .position(Event::End(unit(category, Action::Compile)), nth)
            .unwrap();
        let monitor = runner
            .position(Event::Start(unit(category, Action::Monitor)), 0)
            .unwrap();
        assert!(prebuilt < clean, "{category} watch started early");
        assert!(compiled < monitor, "{category} monitored before compiling");
    }
    assert_eq!(
        runner.count(Event::End(unit(Category::ImageResponsive, Action::Clean))),
        2
    );
}

#[tokio::test]
async fn category_watch_compiles_before_monitoring() {
    init_tracing();
    let runner = RecordingRunner::new();

    with_timeout(run_task("style:watch", &runner)).await.unwrap();

    assert_eq!(
        runner.started(),
        vec![
            unit(Category::Style, Action::Clean),
            unit(Category::Style, Action::Compile),
            unit(Category::Style, Action::Monitor),
        ]
    );
}

#[tokio::test]
async fn failed_clean_prevents_compiles() {
    init_tracing();
    let runner = RecordingRunner::new().fail(unit(Category::Font, Action::Clean));

    let err = with_timeout(run_task("default", &runner)).await.unwrap_err();

    assert!(matches!(err, AssetpipeError::ConfigError(ref m) if m.contains("font:clean")));
    assert!(runner
        .started()
        .iter()
        .all(|u| u.action != Action::Compile));
}

#[tokio::test]
async fn failure_aborts_units_in_flight() {
    init_tracing();
    let slow = unit(Category::Data, Action::Clean);
    let runner = RecordingRunner::new()
        .delay(slow, Duration::from_secs(30))
        .delay(unit(Category::Style, Action::Clean), Duration::from_millis(50))
        .fail(unit(Category::Style, Action::Clean));

    let err = with_timeout(run_task("default:clean", &runner)).await;

    assert!(err.is_err());
    assert_eq!(runner.count(Event::Start(slow)), 1);
    assert_eq!(runner.count(Event::End(slow)), 0);
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let runner = RecordingRunner::new();
    let err = run_task("styles:compile", &runner).await.unwrap_err();
    assert!(matches!(err, AssetpipeError::TaskNotFound(ref n) if n == "styles:compile"));
    assert!(runner.events().is_empty());
}
