// tests/category_builds.rs
//
// Builds against a real temporary directory. External tools are replaced
// by coreutils, so these only run on unix.

#![cfg(unix)]

mod common;
use crate::common::builders::{ConfigBuilder, TempSite};
use crate::common::{init_tracing, with_timeout};

use clap::Parser;

use assetpipe::cli::CliArgs;
use assetpipe::errors::AssetpipeError;
use assetpipe::tasks::{CategorySet, TaskContext};
use assetpipe::types::{BuildOptions, Env};

const RESPONSIVE_320: &str = r#"
src = "resource/image/**/*.jpg"
dest = "public/image/responsive"
del = "public/image/responsive/**"

[[image_responsive.configuration]]
name = "*.jpg"
width = 320
rename = { suffix = "-320w" }
"#;

fn category_set(site: &TempSite, env: Env, builder: &ConfigBuilder) -> CategorySet {
    let cfg = builder.build();
    let ctx = TaskContext::from_config(BuildOptions::new(env, site.path()), &cfg);
    CategorySet::create(&cfg, &ctx).unwrap()
}

#[tokio::test]
async fn data_round_trips_nested_files() {
    init_tracing();
    let site = TempSite::new();
    site.write("resource/data/a.json", "{\"a\":1}")
        .write("resource/data/nested/deep/b.csv", "x,y\n");
    let set = category_set(&site, Env::Dev, &ConfigBuilder::new().passthrough_tools());

    set.data.clean_compile().await.unwrap();

    assert_eq!(site.files_under("public/data"), vec!["a.json", "nested/deep/b.csv"]);
    assert_eq!(site.read("public/data/nested/deep/b.csv").unwrap(), b"x,y\n");
}

#[tokio::test]
async fn clean_removes_outputs_but_keeps_the_destination() {
    init_tracing();
    let site = TempSite::new();
    site.write("public/font/old.woff", "old")
        .write("public/font/sub/older.woff", "older");
    let set = category_set(&site, Env::Dev, &ConfigBuilder::new().passthrough_tools());

    set.font.clean().await.unwrap();

    assert!(site.files_under("public/font").is_empty());
    assert!(site.exists("public/font"));
    assert!(!site.exists("public/font/sub"));
}

fn data_with_del(del: &str) -> ConfigBuilder {
    ConfigBuilder::new().passthrough_tools().section(
        "data",
        &format!(
            r#"
src = "resource/data/**"
dest = "public/data"
del = "{del}"
"#
        ),
    )
}

#[tokio::test]
async fn clean_removes_a_literal_directory_with_its_contents() {
    init_tracing();
    let site = TempSite::new();
    site.write("public/data/a.json", "a")
        .write("public/data/sub/b.json", "b");
    let set = category_set(&site, Env::Dev, &data_with_del("public/data"));

    set.data.clean().await.unwrap();

    assert!(!site.exists("public/data"));
    assert!(site.exists("public"));
}

#[tokio::test]
async fn clean_removes_non_empty_subdirectories_matched_by_star() {
    init_tracing();
    let site = TempSite::new();
    site.write("public/data/a.json", "a")
        .write("public/data/sub/b.json", "b")
        .write("public/data/sub/deeper/c.json", "c");
    let set = category_set(&site, Env::Dev, &data_with_del("public/data/*"));

    set.data.clean().await.unwrap();

    assert!(site.files_under("public/data").is_empty());
    assert!(!site.exists("public/data/sub"));
    assert!(site.exists("public/data"));
}

#[tokio::test]
async fn image_clean_keeps_responsive_output() {
    init_tracing();
    let site = TempSite::new();
    site.write("public/image/logo.png", "png")
        .write("public/image/photos/cat.jpg", "jpg")
        .write("public/image/responsive/photos/cat-320w.jpg", "small");
    let set = category_set(&site, Env::Dev, &ConfigBuilder::new().passthrough_tools());

    set.image.clean().await.unwrap();

    assert_eq!(
        site.files_under("public/image"),
        vec!["responsive/photos/cat-320w.jpg"]
    );
    assert!(!site.exists("public/image/photos"));
}

#[tokio::test]
async fn style_dev_build_writes_css_and_map() {
    init_tracing();
    let site = TempSite::new();
    site.write("resource/style/main.scss", "a { color: red }")
        .write("resource/style/_partial.scss", "b { color: blue }");
    let set = category_set(&site, Env::Dev, &ConfigBuilder::new().passthrough_tools());

    set.style.compile().await.unwrap();

    assert_eq!(site.files_under("public/style"), vec!["main.css", "map/main.css.map"]);
    let css = site.read_string("public/style/main.css").unwrap();
    assert!(css.starts_with("a { color: red }"));
    assert!(css.ends_with("/*# sourceMappingURL=map/main.css.map */\n"));

    let map = site.read_string("public/style/map/main.css.map").unwrap();
    assert!(map.contains("resource/style/main.scss"));
}

#[tokio::test]
async fn style_glob_source_leaves_partials_out() {
    init_tracing();
    let site = TempSite::new();
    site.write("resource/style/main.scss", "a { color: red }")
        .write("resource/style/_vars.scss", "$c: red;")
        .write("resource/style/components/_button.scss", "b {}");
    let builder = ConfigBuilder::new().passthrough_tools().section(
        "style",
        r#"
src = "resource/style/**/*.scss"
dest = "public/style"
dest_map = "map"
del = "public/style/**"
"#,
    );
    let set = category_set(&site, Env::Dev, &builder);

    set.style.compile().await.unwrap();

    assert_eq!(site.files_under("public/style"), vec!["main.css", "map/main.css.map"]);
}

#[tokio::test]
async fn style_prod_build_minifies() {
    init_tracing();
    let site = TempSite::new();
    site.write("resource/style/main.scss", "a { color: red }");
    let builder = ConfigBuilder::new()
        .passthrough_tools()
        .tool("css_minifier", "tr a-z A-Z");

    let dev = category_set(&site, Env::Dev, &builder);
    assert!(!dev.style.pipeline().stage_names().contains(&"css-minifier"));

    let prod = category_set(&site, Env::Prod, &builder);
    prod.style.compile().await.unwrap();

    let css = site.read_string("public/style/main.css").unwrap();
    assert!(css.starts_with("A { COLOR: RED }"));
}

#[tokio::test]
async fn style_compiler_errors_are_skipped() {
    init_tracing();
    let site = TempSite::new();
    site.write("resource/style/main.scss", "a { color: ");
    let builder = ConfigBuilder::new()
        .passthrough_tools()
        .tool("style_compiler", "echo 'Error: expected expression' >&2; exit 1");
    let set = category_set(&site, Env::Dev, &builder);

    set.style.compile().await.unwrap();

    assert!(site.files_under("public/style").is_empty());
}

#[tokio::test]
async fn script_bundles_prerequisites_first() {
    init_tracing();
    let site = TempSite::new();
    site.write("vendor/lib.js", "lib")
        .write("resource/script/b.js", "b")
        .write("resource/script/a.js", "a");
    let builder = ConfigBuilder::new()
        .passthrough_tools()
        .tool("js_minifier", "tr a-z A-Z")
        .section(
            "script",
            r#"
add = ["vendor/lib.js"]
src = "resource/script/**/*.js"
dest = "public/script"
del = "public/script/**"
rename = { concat = "script.js" }
"#,
        );
    let set = category_set(&site, Env::Dev, &builder);

    set.script.compile().await.unwrap();

    assert_eq!(
        site.files_under("public/script"),
        vec![
            "map/script.js.map",
            "map/script.min.js.map",
            "script.js",
            "script.min.js",
        ]
    );
    let bundle = site.read_string("public/script/script.js").unwrap();
    assert!(bundle.starts_with("lib\na\nb\n//# sourceMappingURL=map/script.js.map"));
    let min = site.read_string("public/script/script.min.js").unwrap();
    assert!(min.starts_with("LIB\nA\nB"));

    // Prerequisites are bundled but not watched.
    assert_eq!(set.script.paths().watch.to_string(), "resource/script/**/*.js");
}

#[tokio::test]
async fn failing_image_optimizer_fails_the_compile() {
    init_tracing();
    let site = TempSite::new();
    site.write("resource/image/logo.png", "png");
    let builder = ConfigBuilder::new()
        .passthrough_tools()
        .tool("image_optimizer", "exit 3");
    let set = category_set(&site, Env::Dev, &builder);

    let err = set.image.compile().await.unwrap_err();

    assert!(matches!(err, AssetpipeError::TransformError { ref stage, .. } if stage == "image-optimizer"));
    assert!(site.files_under("public/image").is_empty());
}

#[tokio::test]
async fn responsive_variants_follow_rules() {
    init_tracing();
    let site = TempSite::new();
    site.write("resource/image/photos/cat.jpg", "jpg")
        .write("resource/image/logo.png", "png");
    let builder = ConfigBuilder::new()
        .passthrough_tools()
        .tool("image_resizer", "printf %s {geometry}")
        .section("image_responsive", RESPONSIVE_320);
    let set = category_set(&site, Env::Dev, &builder);

    set.image_responsive.compile().await.unwrap();

    assert_eq!(
        site.files_under("public/image/responsive"),
        vec!["photos/cat-320w.jpg"]
    );
    assert_eq!(
        site.read_string("public/image/responsive/photos/cat-320w.jpg").unwrap(),
        "320x"
    );
}

#[tokio::test]
async fn default_task_builds_the_whole_site() {
    init_tracing();
    let site = TempSite::new();
    site.write("resource/style/main.scss", "a{}")
        .write("resource/script/app.js", "app")
        .write("resource/font/f.woff2", "font")
        .write("resource/image/photos/cat.jpg", "jpg")
        .write("resource/data/a.json", "{}")
        .write("public/data/stale.json", "stale");
    let builder = ConfigBuilder::new()
        .passthrough_tools()
        .section("image_responsive", RESPONSIVE_320);
    site.write("Assetpipe.toml", builder.to_toml());

    let cwd = site.path().to_string_lossy().into_owned();
    let args = CliArgs::try_parse_from(["assetpipe", "--cwd", cwd.as_str(), "default"]).unwrap();
    with_timeout(assetpipe::run(args)).await.unwrap();

    assert!(site.exists("public/style/main.css"));
    assert!(site.exists("public/script/script.min.js"));
    assert!(site.exists("public/font/f.woff2"));
    assert!(site.exists("public/image/photos/cat.jpg"));
    assert!(site.exists("public/image/responsive/photos/cat-320w.jpg"));
    assert_eq!(site.files_under("public/data"), vec!["a.json"]);
}

#[tokio::test]
async fn missing_config_fails_before_running() {
    init_tracing();
    let site = TempSite::new();
    let cwd = site.path().to_string_lossy().into_owned();
    let args = CliArgs::try_parse_from(["assetpipe", "--cwd", cwd.as_str()]).unwrap();

    let err = assetpipe::run(args).await.unwrap_err();

    assert!(format!("{err:#}").contains("Assetpipe.toml"));
}
