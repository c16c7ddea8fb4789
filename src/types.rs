use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Build environment. Decides the shape of environment-conditional
/// pipelines (e.g. whether stylesheets are minified).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Env {
    Dev,
    Prod,
}

impl Default for Env {
    fn default() -> Self {
        Env::Dev
    }
}

impl Env {
    pub fn is_prod(self) -> bool {
        self == Env::Prod
    }
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" => Ok(Env::Dev),
            "prod" => Ok(Env::Prod),
            other => Err(format!("invalid env: {other} (expected \"dev\" or \"prod\")")),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Env::Dev => f.write_str("dev"),
            Env::Prod => f.write_str("prod"),
        }
    }
}

/// Runtime options shared by every category factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub env: Env,
    /// Root against which every configured glob and path is resolved.
    pub cwd: PathBuf,
}

impl BuildOptions {
    pub fn new(env: Env, cwd: impl Into<PathBuf>) -> Self {
        Self {
            env,
            cwd: cwd.into(),
        }
    }
}

/// One asset category. Each owns a disjoint source/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Style,
    Script,
    Font,
    ImageResponsive,
    Image,
    Data,
}

impl Category {
    /// All categories in registration order.
    pub const ALL: [Category; 6] = [
        Category::Style,
        Category::Script,
        Category::Font,
        Category::ImageResponsive,
        Category::Image,
        Category::Data,
    ];

    /// External name used for task registration (`style`, `image-responsive`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Category::Style => "style",
            Category::Script => "script",
            Category::Font => "font",
            Category::ImageResponsive => "image-responsive",
            Category::Image => "image",
            Category::Data => "data",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The primitive operations a category can perform.
///
/// `cleanCompile` and `watch` are compositions of these and never appear as
/// an action themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Clean,
    Compile,
    /// Continuous change monitoring; never completes on its own.
    Monitor,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Clean => "clean",
            Action::Compile => "compile",
            Action::Monitor => "monitor",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
