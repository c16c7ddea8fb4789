// src/patterns/path_utils.rs

//! Path helpers shared by source resolution, cleanup and the watcher.

use std::path::{Component, Path};

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
///
/// Returns `None` if the path cannot be related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    // macOS reports events under /private/var/... for /var/... roots.
    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(to_slash(rel));
        }
    }

    None
}

pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Strip a leading `./` (possibly repeated) and any trailing `/`.
pub fn normalize_pattern(pattern: &str) -> &str {
    let mut p = pattern.trim();
    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    p.trim_end_matches('/')
}

pub fn has_glob_meta(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

/// The non-glob directory prefix of a pattern.
///
/// `data/**` -> `data`, `img/**/*.png` -> `img`, `style/main.scss` -> `style`
/// (a literal file's base is its parent directory), `*.js` -> ``.
pub fn glob_base(pattern: &str) -> String {
    let pattern = normalize_pattern(pattern);
    let segments: Vec<&str> = pattern.split('/').collect();

    let literal_len = segments
        .iter()
        .take_while(|s| !has_glob_meta(s))
        .count();

    let base_len = if literal_len == segments.len() {
        literal_len.saturating_sub(1)
    } else {
        literal_len
    };

    segments[..base_len].join("/")
}

/// Whether a relative pattern could reach outside of its root.
pub fn escapes_root(pattern: &str) -> bool {
    let p = Path::new(normalize_pattern(pattern));
    p.is_absolute()
        || p.components().any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_of_globbed_and_literal_patterns() {
        assert_eq!(glob_base("data/**"), "data");
        assert_eq!(glob_base("./resource/image/**/*.{png,jpg}"), "resource/image");
        assert_eq!(glob_base("resource/style/main.scss"), "resource/style");
        assert_eq!(glob_base("main.scss"), "");
        assert_eq!(glob_base("*.js"), "");
    }

    #[test]
    fn detects_patterns_escaping_root() {
        assert!(escapes_root("../public/**"));
        assert!(escapes_root("public/../../x"));
        assert!(escapes_root("/etc/**"));
        assert!(!escapes_root("public/data/**"));
        assert!(!escapes_root("./public/data/**"));
    }

    #[test]
    fn relative_str_uses_forward_slashes() {
        let rel = relative_str(Path::new("/p"), Path::new("/p/a/b.css"));
        assert_eq!(rel.as_deref(), Some("a/b.css"));
        assert_eq!(relative_str(Path::new("/p"), Path::new("/q/a")), None);
    }
}
