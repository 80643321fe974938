//! Ordered glob instruction sets
//!
//! A pattern set is a list of inclusion globs followed by exclusion globs.
//! Exclusions carry a leading `!` and only ever remove files that some
//! inclusion already selected.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fmt;
use std::path::{Component, Path};

use crate::error::CopyError;

/// Marker that turns a glob into an exclusion.
pub const NEGATION_MARKER: char = '!';

/// Ordered glob instruction set consumed by [`crate::copy_tree`].
///
/// Inclusions always precede exclusions in [`PatternSet::patterns`],
/// whatever order they were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    includes: Vec<String>,
    excludes: Vec<String>,
}

impl PatternSet {
    /// Create an empty pattern set (matches nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an inclusion pattern
    pub fn include(mut self, pattern: &str) -> Self {
        self.push_include(pattern);
        self
    }

    /// Add an exclusion pattern. A leading `!` is accepted and not doubled.
    pub fn exclude(mut self, pattern: &str) -> Self {
        self.push_exclude(pattern);
        self
    }

    pub fn push_include(&mut self, pattern: &str) {
        if let Some(pattern) = normalize(pattern) {
            self.includes.push(pattern);
        }
    }

    pub fn push_exclude(&mut self, pattern: &str) {
        let pattern = pattern.strip_prefix(NEGATION_MARKER).unwrap_or(pattern);
        if let Some(pattern) = normalize(pattern) {
            self.excludes.push(pattern);
        }
    }

    /// Inclusion globs in insertion order
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Exclusion globs in insertion order, without the negation marker
    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    /// Rendered instruction list: inclusions, then `!`-prefixed exclusions.
    pub fn patterns(&self) -> Vec<String> {
        self.includes
            .iter()
            .cloned()
            .chain(
                self.excludes
                    .iter()
                    .map(|p| format!("{}{}", NEGATION_MARKER, p)),
            )
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
    }

    /// Compile the globs into a matcher
    pub fn compile(&self) -> Result<PatternMatcher, CopyError> {
        Ok(PatternMatcher {
            include: build_glob_set(&self.includes)?,
            exclude: build_glob_set(&self.excludes)?,
        })
    }
}

impl fmt::Display for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.patterns().join(", "))
    }
}

/// Compiled form of a [`PatternSet`]
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl PatternMatcher {
    /// Check whether a path relative to the source root is selected
    pub fn is_match(&self, relative: &Path) -> bool {
        let key = slash_path(relative);
        self.include.is_match(&key) && !self.exclude.is_match(&key)
    }
}

/// Strip a leading `./`, dropping patterns that end up empty.
fn normalize(pattern: &str) -> Option<String> {
    let mut pattern = pattern.trim();
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    if pattern.is_empty() || pattern == "." {
        None
    } else {
        Some(pattern.to_string())
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, CopyError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| CopyError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| CopyError::Pattern {
        pattern: patterns.join(", "),
        source,
    })
}

/// Render a relative path with `/` separators regardless of platform
pub(crate) fn slash_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusions_precede_exclusions() {
        let set = PatternSet::new()
            .exclude("secret.txt")
            .include("**")
            .exclude("!dev/**");

        assert_eq!(set.patterns(), vec!["**", "!secret.txt", "!dev/**"]);
    }

    #[test]
    fn test_dot_slash_and_marker_stripped() {
        let set = PatternSet::new()
            .include("./**")
            .exclude("!./secret.txt")
            .include("js/**");

        assert_eq!(set.includes(), ["**", "js/**"]);
        assert_eq!(set.excludes(), ["secret.txt"]);
    }

    #[test]
    fn test_empty_patterns_dropped() {
        let set = PatternSet::new().include("./").include("").exclude("!");
        assert!(set.is_empty());
        assert!(set.patterns().is_empty());
    }

    #[test]
    fn test_double_star_matches_nested() {
        let matcher = PatternSet::new().include("**").compile().unwrap();

        assert!(matcher.is_match(Path::new("a.js")));
        assert!(matcher.is_match(Path::new("js/lib/a.js")));
    }

    #[test]
    fn test_single_star_does_not_cross_directories() {
        let matcher = PatternSet::new().include("*.js").compile().unwrap();

        assert!(matcher.is_match(Path::new("app.js")));
        assert!(!matcher.is_match(Path::new("js/app.js")));
    }

    #[test]
    fn test_exclusion_only_narrows() {
        let matcher = PatternSet::new()
            .include("js/**")
            .exclude("js/vendor/**")
            .exclude("nothing-here.txt")
            .compile()
            .unwrap();

        assert!(matcher.is_match(Path::new("js/app.js")));
        assert!(!matcher.is_match(Path::new("js/vendor/lib.js")));
        assert!(!matcher.is_match(Path::new("css/site.css")));
    }

    #[test]
    fn test_no_inclusions_matches_nothing() {
        let matcher = PatternSet::new().exclude("x").compile().unwrap();
        assert!(!matcher.is_match(Path::new("a.js")));
    }

    #[test]
    fn test_invalid_pattern_is_named() {
        let err = PatternSet::new().include("js/[").compile().unwrap_err();
        match err {
            CopyError::Pattern { pattern, .. } => assert_eq!(pattern, "js/["),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_slash_path_ignores_cur_dir() {
        assert_eq!(slash_path(Path::new("./js/app.js")), "js/app.js");
    }
}
