// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::patterns::GlobList;

/// Configuration document as read from TOML or JSON.
///
/// ```toml
/// [style]
/// src = "resource/style/main.scss"
/// dest = "public/style"
/// dest_map = "map"
/// del = "public/style/**"
///
/// [data]
/// src = "resource/data/**"
/// dest = "public/data"
/// del = "public/data/**"
/// ```
///
/// All six category sections are required; `[tools]` and `[watch]` are
/// optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    pub style: StyleConfig,
    pub script: ScriptConfig,
    pub font: PathConfig,
    pub image: PathConfig,
    #[serde(alias = "image-responsive", alias = "imageResponsive")]
    pub image_responsive: ResponsiveConfig,
    pub data: PathConfig,

    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    raw: RawConfigFile,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self { raw }
    }

    pub fn style(&self) -> &StyleConfig {
        &self.raw.style
    }

    pub fn script(&self) -> &ScriptConfig {
        &self.raw.script
    }

    pub fn font(&self) -> &PathConfig {
        &self.raw.font
    }

    pub fn image(&self) -> &PathConfig {
        &self.raw.image
    }

    pub fn image_responsive(&self) -> &ResponsiveConfig {
        &self.raw.image_responsive
    }

    pub fn data(&self) -> &PathConfig {
        &self.raw.data
    }

    pub fn tools(&self) -> &ToolsSection {
        &self.raw.tools
    }

    pub fn watch(&self) -> &WatchSection {
        &self.raw.watch
    }
}

/// `[style]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleConfig {
    /// Typically the path to `main.scss`.
    pub src: GlobList,
    pub dest: PathBuf,
    /// Source map directory, relative to `dest`.
    #[serde(default = "default_dest_map", alias = "destMap")]
    pub dest_map: PathBuf,
    pub del: GlobList,
}

/// `[script]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    /// Prerequisite files prepended, in order, ahead of the `src` matches.
    #[serde(default)]
    pub add: Vec<String>,
    pub src: GlobList,
    pub dest: PathBuf,
    #[serde(default = "default_dest_map", alias = "destMap")]
    pub dest_map: PathBuf,
    pub rename: ScriptRename,
    pub del: GlobList,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptRename {
    /// File name of the concatenated bundle, e.g. `script.js`.
    pub concat: String,
    #[serde(default)]
    pub ext: ScriptExt,
}

/// Extensions that distinguish the unminified and minified bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptExt {
    #[serde(default = "default_ext_src")]
    pub src: String,
    #[serde(default = "default_ext_min")]
    pub min: String,
}

impl Default for ScriptExt {
    fn default() -> Self {
        Self {
            src: default_ext_src(),
            min: default_ext_min(),
        }
    }
}

/// Source/destination/cleanup triple used by `font`, `image` and `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct PathConfig {
    pub src: GlobList,
    pub dest: PathBuf,
    pub del: GlobList,
}

/// `[image_responsive]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsiveConfig {
    /// Source images; usually excludes the responsive output directory.
    pub src: GlobList,
    pub dest: PathBuf,
    pub del: GlobList,
    /// Resize rules.
    #[serde(default, alias = "rules")]
    pub configuration: Vec<ResponsiveRule>,
}

/// One responsive variant rule.
///
/// ```toml
/// [[image_responsive.configuration]]
/// name = "**/*.jpg"
/// width = 640
/// rename = { suffix = "-640w" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsiveRule {
    /// Glob matched against the image path relative to its source base.
    pub name: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Output format (`jpeg`, `png`, `webp`, ...). Defaults to the source extension.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub rename: RuleRename,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleRename {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    /// Replacement extension including the dot, e.g. `.webp`.
    #[serde(default)]
    pub extname: Option<String>,
}

/// `[tools]` section: shell command templates for external transforms.
///
/// Each command receives the asset on stdin and must write the result to
/// stdout. See `pipeline::command` for placeholders; literal braces are
/// written `{{` and `}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_style_compiler")]
    pub style_compiler: String,
    #[serde(default = "default_autoprefixer")]
    pub autoprefixer: String,
    #[serde(default = "default_css_minifier")]
    pub css_minifier: String,
    #[serde(default = "default_js_minifier")]
    pub js_minifier: String,
    #[serde(default = "default_image_optimizer")]
    pub image_optimizer: String,
    #[serde(default = "default_image_resizer")]
    pub image_resizer: String,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            style_compiler: default_style_compiler(),
            autoprefixer: default_autoprefixer(),
            css_minifier: default_css_minifier(),
            js_minifier: default_js_minifier(),
            image_optimizer: default_image_optimizer(),
            image_resizer: default_image_resizer(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Quiet period after a change before compiling, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_dest_map() -> PathBuf {
    PathBuf::from("map")
}

fn default_ext_src() -> String {
    ".js".to_string()
}

fn default_ext_min() -> String {
    ".min.js".to_string()
}

fn default_style_compiler() -> String {
    "sass --stdin --no-source-map --load-path={dir}".to_string()
}

fn default_autoprefixer() -> String {
    "npx --no-install postcss --use autoprefixer --no-map".to_string()
}

fn default_css_minifier() -> String {
    "npx --no-install postcss --use cssnano --no-map".to_string()
}

fn default_js_minifier() -> String {
    "npx --no-install terser --compress --mangle".to_string()
}

fn default_image_optimizer() -> String {
    "npx --no-install imagemin".to_string()
}

fn default_image_resizer() -> String {
    "magick - -strip -resize {geometry} -quality {quality} -interlace Plane {format}:-".to_string()
}

fn default_debounce_ms() -> u64 {
    200
}
