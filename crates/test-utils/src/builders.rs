#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assetpipe::config::{parse_str, ConfigFile};
use assetpipe::errors::Result;
use tempfile::TempDir;

/// Builder for a TOML configuration document.
///
/// Starts from a complete site layout (`resource/<category>` sources,
/// `public/<category>` outputs); individual sections can be replaced.
pub struct ConfigBuilder {
    style: String,
    script: String,
    font: String,
    image: String,
    image_responsive: String,
    data: String,
    tools: Vec<(String, String)>,
    debounce_ms: Option<u64>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            style: r#"
src = "resource/style/main.scss"
dest = "public/style"
del = "public/style/**"
"#
            .into(),
            script: r#"
src = "resource/script/**/*.js"
dest = "public/script"
del = "public/script/**"
rename = { concat = "script.js" }
"#
            .into(),
            font: r#"
src = "resource/font/**"
dest = "public/font"
del = "public/font/**"
"#
            .into(),
            image: r#"
src = "resource/image/**"
dest = "public/image"
del = ["public/image/**", "!public/image/responsive/**"]
"#
            .into(),
            image_responsive: r#"
src = "resource/image/**/*.jpg"
dest = "public/image/responsive"
del = "public/image/responsive/**"
"#
            .into(),
            data: r#"
src = "resource/data/**"
dest = "public/data"
del = "public/data/**"
"#
            .into(),
            tools: Vec::new(),
            debounce_ms: None,
        }
    }

    /// Replace the body of a section (`style`, `script`, `font`, `image`,
    /// `image_responsive` or `data`).
    pub fn section(mut self, name: &str, body: &str) -> Self {
        let slot = match name {
            "style" => &mut self.style,
            "script" => &mut self.script,
            "font" => &mut self.font,
            "image" => &mut self.image,
            "image_responsive" => &mut self.image_responsive,
            "data" => &mut self.data,
            other => panic!("unknown section {other}"),
        };
        *slot = body.to_string();
        self
    }

    pub fn tool(mut self, key: &str, cmd: &str) -> Self {
        self.tools.retain(|(k, _)| k != key);
        self.tools.push((key.to_string(), cmd.to_string()));
        self
    }

    /// Every external tool becomes `cat`, so assets pass through unchanged.
    pub fn passthrough_tools(self) -> Self {
        [
            "style_compiler",
            "autoprefixer",
            "css_minifier",
            "js_minifier",
            "image_optimizer",
            "image_resizer",
        ]
        .into_iter()
        .fold(self, |b, key| b.tool(key, "cat"))
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = Some(ms);
        self
    }

    pub fn to_toml(&self) -> String {
        let mut out = String::new();
        for (name, body) in [
            ("style", &self.style),
            ("script", &self.script),
            ("font", &self.font),
            ("image", &self.image),
            ("image_responsive", &self.image_responsive),
            ("data", &self.data),
        ] {
            out.push_str(&format!("[{name}]\n{}\n", body.trim()));
            // Array tables belonging to the section must follow its keys.
            out.push('\n');
        }
        if !self.tools.is_empty() {
            out.push_str("[tools]\n");
            for (key, cmd) in &self.tools {
                out.push_str(&format!("{key} = {cmd:?}\n"));
            }
            out.push('\n');
        }
        if let Some(ms) = self.debounce_ms {
            out.push_str(&format!("[watch]\ndebounce_ms = {ms}\n"));
        }
        out
    }

    pub fn try_build(&self) -> Result<ConfigFile> {
        ConfigFile::try_from(parse_str(&self.to_toml(), false)?)
    }

    pub fn build(&self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A throwaway project directory on the real filesystem.
pub struct TempSite {
    dir: TempDir,
}

impl TempSite {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> &Self {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(path, contents).expect("write file");
        self
    }

    pub fn read(&self, rel: &str) -> Option<Vec<u8>> {
        std::fs::read(self.join(rel)).ok()
    }

    pub fn read_string(&self, rel: &str) -> Option<String> {
        self.read(rel).map(|b| String::from_utf8_lossy(&b).into_owned())
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.join(rel).exists()
    }

    /// Files below `rel`, as sorted slash-separated paths relative to `rel`.
    pub fn files_under(&self, rel: &str) -> Vec<String> {
        let root = self.join(rel);
        let mut out = Vec::new();
        collect(&root, &root, &mut out);
        out.sort();
        out
    }
}

impl Default for TempSite {
    fn default() -> Self {
        Self::new()
    }
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, out);
        } else if let Ok(rel) = path.strip_prefix(root) {
            let parts: Vec<_> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            out.push(parts.join("/"));
        }
    }
}
