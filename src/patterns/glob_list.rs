// src/patterns/glob_list.rs

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use serde::Deserialize;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::patterns::path_utils::{glob_base, has_glob_meta, normalize_pattern, to_slash};

/// One or more glob patterns as written in the config.
///
/// Accepts either a single string or a list of strings. Patterns starting
/// with `!` are exclusions and apply to every inclusion pattern.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct GlobList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for GlobList {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(p) => GlobList(vec![p]),
            OneOrMany::Many(ps) => GlobList(ps),
        }
    }
}

impl From<&str> for GlobList {
    fn from(p: &str) -> Self {
        GlobList(vec![p.to_string()])
    }
}

impl From<Vec<String>> for GlobList {
    fn from(ps: Vec<String>) -> Self {
        GlobList(ps)
    }
}

impl fmt::Display for GlobList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl GlobList {
    pub fn patterns(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.includes().next().is_none()
    }

    /// Inclusion patterns, normalized.
    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|p| !p.trim_start().starts_with('!'))
            .map(|p| normalize_pattern(p))
            .filter(|p| !p.is_empty())
    }

    /// Exclusion patterns with the leading `!` removed, normalized.
    pub fn excludes(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter_map(|p| p.trim_start().strip_prefix('!'))
            .map(normalize_pattern)
    }

    /// Prepend literal entries ahead of the existing patterns.
    pub fn prepended(&self, head: &[String]) -> GlobList {
        let mut all = head.to_vec();
        all.extend(self.0.iter().cloned());
        GlobList(all)
    }

    /// Compile into a matcher over root-relative, forward-slash paths.
    pub fn matcher(&self) -> Result<PathMatcher> {
        let mut sources = Vec::new();
        for pat in self.includes() {
            sources.push(SourcePattern {
                pattern: pat.to_string(),
                base: glob_base(pat),
                literal: !has_glob_meta(pat),
                glob: compile_glob(pat)?.compile_matcher(),
            });
        }

        let excludes: Vec<&str> = self.excludes().collect();
        let exclude_set = if excludes.is_empty() {
            None
        } else {
            Some(build_globset(&excludes)?)
        };

        Ok(PathMatcher {
            sources,
            exclude_set,
        })
    }
}

#[derive(Debug, Clone)]
struct SourcePattern {
    pattern: String,
    base: String,
    literal: bool,
    glob: GlobMatcher,
}

/// Compiled form of a [`GlobList`].
#[derive(Debug, Clone)]
pub struct PathMatcher {
    sources: Vec<SourcePattern>,
    exclude_set: Option<GlobSet>,
}

/// A file selected by a [`PathMatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    /// Absolute (root-joined) path.
    pub path: PathBuf,
    /// Path relative to the matching pattern's base directory. Output
    /// files keep this relative layout under their destination.
    pub relative: PathBuf,
}

impl PathMatcher {
    /// Returns true if the root-relative path matches any inclusion pattern
    /// and no exclusion pattern.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.sources.iter().any(|s| s.glob.is_match(rel_path)) && !self.is_excluded(rel_path)
    }

    fn is_excluded(&self, rel_path: &str) -> bool {
        self.exclude_set
            .as_ref()
            .is_some_and(|set| set.is_match(rel_path))
    }

    /// Base directories of every inclusion pattern, relative to the root.
    pub fn bases(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.base.as_str())
    }

    /// Collect every file under `root` selected by this matcher.
    ///
    /// Inclusion patterns are evaluated in order; within one pattern files
    /// are sorted by path. A file matched by more than one pattern is only
    /// returned for the first.
    pub fn collect_files(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<MatchedFile>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for source in &self.sources {
            let base_dir = root.join(&source.base);

            if source.literal {
                let path = root.join(&source.pattern);
                if fs.is_file(&path) && !self.is_excluded(&source.pattern) && seen.insert(path.clone()) {
                    let relative = path
                        .strip_prefix(&base_dir)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| path.clone());
                    out.push(MatchedFile { path, relative });
                }
                continue;
            }

            if !fs.is_dir(&base_dir) {
                continue;
            }

            let (files, _dirs) = walk(fs, &base_dir)?;
            for path in files {
                let Ok(rel) = path.strip_prefix(root) else {
                    continue;
                };
                let rel = to_slash(rel);
                if !source.glob.is_match(&rel) || self.is_excluded(&rel) {
                    continue;
                }
                if seen.insert(path.clone()) {
                    let relative = path
                        .strip_prefix(&base_dir)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| path.clone());
                    out.push(MatchedFile { path, relative });
                }
            }
        }

        Ok(out)
    }

    /// Everything `clean` should delete under `root`.
    ///
    /// Matched files are listed on their own. A matched directory is
    /// removed as a whole unless an exclusion matches something below it;
    /// then only its non-excluded entries go. Pattern base directories of
    /// glob patterns are never matched themselves.
    pub fn collect_for_removal(&self, fs: &dyn FileSystem, root: &Path) -> Result<Removal> {
        let mut candidates = Vec::new();
        for source in &self.sources {
            if source.literal {
                let path = root.join(&source.pattern);
                if fs.exists(&path) {
                    candidates.push(path);
                }
                continue;
            }

            let base_dir = root.join(&source.base);
            if !fs.is_dir(&base_dir) {
                continue;
            }
            let (files, dirs) = walk(fs, &base_dir)?;
            for path in dirs.into_iter().chain(files) {
                let Ok(rel) = path.strip_prefix(root) else {
                    continue;
                };
                if source.glob.is_match(&to_slash(rel)) {
                    candidates.push(path);
                }
            }
        }

        // Parents first, so anything below a whole-tree removal is skipped.
        candidates.sort_by(|a, b| {
            a.components()
                .count()
                .cmp(&b.components().count())
                .then_with(|| a.cmp(b))
        });
        candidates.dedup();

        let mut removal = Removal::default();
        for path in candidates {
            if !removal.covers(&path) {
                self.plan_removal(fs, root, &path, &mut removal)?;
            }
        }
        Ok(removal)
    }

    fn plan_removal(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
        path: &Path,
        removal: &mut Removal,
    ) -> Result<()> {
        if self.is_excluded(&root_relative(root, path)) {
            return Ok(());
        }
        if fs.is_file(path) {
            removal.files.push(path.to_path_buf());
            return Ok(());
        }
        if !fs.is_dir(path) {
            return Ok(());
        }

        let (files, dirs) = walk(fs, path)?;
        let keeps_something = files
            .iter()
            .chain(dirs.iter())
            .any(|p| self.is_excluded(&root_relative(root, p)));
        if !keeps_something {
            removal.dirs.push(path.to_path_buf());
            return Ok(());
        }

        for child in fs.read_dir(path)? {
            self.plan_removal(fs, root, &child, removal)?;
        }
        Ok(())
    }
}

/// Paths selected by [`PathMatcher::collect_for_removal`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removal {
    /// Files to remove one by one.
    pub files: Vec<PathBuf>,
    /// Directories to remove together with their contents.
    pub dirs: Vec<PathBuf>,
}

impl Removal {
    fn covers(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path) || self.dirs.iter().any(|d| path.starts_with(d))
    }
}

fn root_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(to_slash)
        .unwrap_or_else(|_| to_slash(path))
}

/// Recursively list files and directories below `dir` (excluding `dir`
/// itself), both sorted.
pub fn walk(fs: &dyn FileSystem, dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        for path in fs.read_dir(&current)? {
            if fs.is_dir(&path) {
                dirs.push(path.clone());
                stack.push(path);
            } else if fs.is_file(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    dirs.sort();
    Ok((files, dirs))
}

/// `*` and `?` never cross a `/`, only `**` does.
fn compile_glob(pattern: &str) -> Result<Glob> {
    Ok(GlobBuilder::new(pattern).literal_separator(true).build()?)
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(compile_glob(pat)?);
    }
    Ok(builder.build()?)
}
