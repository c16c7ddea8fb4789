// src/pipeline/command.rs

//! External transform commands.
//!
//! A tool is configured as a shell command line. The asset bytes are written
//! to the command's stdin and its stdout becomes the new asset contents.
//! Command lines may reference placeholders in braces:
//!
//! - `{path}`: absolute path of the source file
//! - `{dir}`: directory of the source file
//! - `{name}`: output file name
//!
//! The image resizer additionally understands `{geometry}`, `{width}`,
//! `{height}`, `{quality}` and `{format}`.
//!
//! Literal braces are written doubled: `awk '{{print}}'` runs `awk '{print}'`.

use std::process::{Output, Stdio};
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::{AssetpipeError, Result};
use crate::pipeline::{Asset, Stage, StageFuture};

pub const FILE_PLACEHOLDERS: &[&str] = &["path", "dir", "name"];
pub const RESIZE_PLACEHOLDERS: &[&str] = &[
    "path", "dir", "name", "geometry", "width", "height", "quality", "format",
];

// Escaped braces are matched first so `{{name}}` never reads as a placeholder.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_]+)\}").expect("placeholder regex is valid")
});

/// A parsed command line with validated placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    raw: String,
}

impl CommandTemplate {
    /// Parse `raw`, rejecting placeholders not listed in `allowed`.
    pub fn parse(raw: &str, allowed: &[&str]) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(AssetpipeError::ConfigError(
                "tool command must not be empty".to_string(),
            ));
        }
        for cap in PLACEHOLDER.captures_iter(raw) {
            let Some(name) = cap.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if !allowed.contains(&name) {
                return Err(AssetpipeError::ConfigError(format!(
                    "unknown placeholder {{{name}}} in command `{raw}` (allowed: {}; \
                     write {{{{ and }}}} for literal braces)",
                    allowed.join(", ")
                )));
            }
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// Substitute placeholders and unescape doubled braces. Values are
    /// shell-quoted; placeholders without a value render as an empty string.
    pub fn render(&self, vars: &[(&str, String)]) -> String {
        PLACEHOLDER
            .replace_all(&self.raw, |cap: &regex::Captures<'_>| match cap.get(1) {
                Some(name) => vars
                    .iter()
                    .find(|(k, _)| *k == name.as_str())
                    .map(|(_, v)| shell_quote(v))
                    .unwrap_or_default(),
                None => cap[0][..1].to_string(),
            })
            .into_owned()
    }
}

/// What to do when a command fails for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Fail the whole stage (and therefore the compile).
    Fail,
    /// Log the tool's error output and drop the asset.
    LogAndSkip,
}

/// Pipeline stage running one external command per asset.
#[derive(Debug, Clone)]
pub struct CommandStage {
    label: String,
    template: CommandTemplate,
    policy: ErrorPolicy,
}

impl CommandStage {
    pub fn new(label: impl Into<String>, template: CommandTemplate, policy: ErrorPolicy) -> Self {
        Self {
            label: label.into(),
            template,
            policy,
        }
    }

    /// Run the command for a single asset and return its stdout.
    pub async fn transform(&self, asset: &Asset) -> Result<Vec<u8>> {
        let cmdline = self.template.render(&file_vars(asset));
        let output = run_command(&cmdline, &asset.contents)
            .await
            .with_context(|| format!("running {} for {:?}", self.label, asset.source))?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(AssetpipeError::transform(
                &self.label,
                &asset.source,
                failure_message(&output),
            ))
        }
    }
}

impl Stage for CommandStage {
    fn name(&self) -> &str {
        &self.label
    }

    fn apply<'a>(&'a self, assets: Vec<Asset>) -> StageFuture<'a> {
        Box::pin(async move {
            let mut out = Vec::with_capacity(assets.len());
            for mut asset in assets {
                match self.transform(&asset).await {
                    Ok(contents) => {
                        asset.contents = contents;
                        out.push(asset);
                    }
                    Err(AssetpipeError::TransformError { message, path, .. })
                        if self.policy == ErrorPolicy::LogAndSkip =>
                    {
                        warn!(stage = %self.label, path = ?path, "{}", message);
                    }
                    Err(err) => return Err(err),
                }
            }
            Ok(out)
        })
    }
}

pub(crate) fn file_vars(asset: &Asset) -> Vec<(&'static str, String)> {
    let dir = asset
        .source
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = asset
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    vec![
        ("path", asset.source.to_string_lossy().into_owned()),
        ("dir", dir),
        ("name", name),
    ]
}

pub(crate) fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    match output.status.code() {
        Some(code) if stderr.is_empty() => format!("exited with status {code}"),
        Some(code) => format!("exited with status {code}: {stderr}"),
        None => format!("terminated by signal: {stderr}"),
    }
}

/// Run a shell command line, feeding `input` on stdin, and collect its output.
pub async fn run_command(cmdline: &str, input: &[u8]) -> anyhow::Result<Output> {
    debug!(cmd = %cmdline, bytes = input.len(), "running tool");

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmdline);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmdline);
        c
    };

    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning `{cmdline}`"))?;

    // Feed stdin concurrently so a tool that streams output cannot deadlock
    // on a full stdout pipe.
    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        tokio::spawn(async move {
            match stdin.write_all(&input).await {
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        })
    });

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for `{cmdline}`"))?;

    if let Some(writer) = writer {
        writer
            .await
            .context("stdin writer task panicked")?
            .with_context(|| format!("writing stdin of `{cmdline}`"))?;
    }

    Ok(output)
}

fn shell_quote(value: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "/._-:+=,@".contains(c);
    if !value.is_empty() && value.chars().all(safe) {
        return value.to_string();
    }
    if cfg!(windows) {
        format!("\"{value}\"")
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
