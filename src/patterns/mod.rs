// src/patterns/mod.rs

//! Glob handling for `src`, `del` and watch patterns.
//!
//! Patterns are always evaluated relative to the working directory and
//! matched against forward-slash relative paths.

pub mod glob_list;
pub mod path_utils;

pub use glob_list::{walk, GlobList, MatchedFile, PathMatcher, Removal};
pub use path_utils::{glob_base, relative_str};
