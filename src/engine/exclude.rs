//! Exclude-pattern matching for walk and diffbase sources.
//!
//! A pattern excludes a path when
//! 1. it glob-matches the path, or any leading directory of it, with `*` and `?` never
//!    crossing a `/`; or
//! 2. it has no glob characters, ends in `/`, and the path starts with it literally.
//!
//! Partial segments never match: `exclud` does not exclude `exclude/file`.

use anyhow::{Context, Result, bail};
use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;

/// Characters that make a pattern a glob rather than a literal.
const GLOB_CHARS: [char; 3] = ['*', '?', '['];

/// One compiled exclude pattern.
#[derive(Clone, Debug)]
struct ExcludePattern {
    raw: String,
    /// `None` when the pattern could not be compiled as a glob; only the prefix rule applies then.
    glob: Option<GlobMatcher>,
}

impl ExcludePattern {
    fn compile(raw: &str) -> Result<Self> {
        let glob = GlobBuilder::new(raw)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .with_context(|| format!("invalid exclude pattern '{}'", raw))?
            .compile_matcher();
        Ok(Self {
            raw: raw.to_string(),
            glob: Some(glob),
        })
    }

    fn compile_lenient(raw: &str) -> Self {
        Self::compile(raw).unwrap_or_else(|_| Self {
            raw: raw.to_string(),
            glob: None,
        })
    }

    fn matches(&self, path: &str) -> bool {
        if let Some(glob) = &self.glob
            && leading_dirs_and_self(path).any(|candidate| glob.is_match(candidate))
        {
            return true;
        }
        if self.raw.contains(GLOB_CHARS) {
            return false;
        }
        self.raw.ends_with('/') && path.starts_with(&self.raw)
    }
}

/// `a/b/c` -> `a`, `a/b`, `a/b/c`.
fn leading_dirs_and_self(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/')
        .map(move |(i, _)| &path[..i])
        .filter(|prefix| !prefix.is_empty())
        .chain(std::iter::once(path))
}

/// Compiled set of exclude patterns, built once per run.
#[derive(Clone, Debug, Default)]
pub struct ExcludeSet {
    patterns: Vec<ExcludePattern>,
}

impl ExcludeSet {
    /// Compile `patterns`. Empty patterns are ignored. Absolute or malformed patterns are
    /// configuration errors.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for raw in patterns.iter().map(AsRef::as_ref) {
            if raw.is_empty() {
                continue;
            }
            if Path::new(raw).is_absolute() {
                bail!(
                    "exclude patterns must be relative to the root directory: '{}'",
                    raw
                );
            }
            compiled.push(ExcludePattern::compile(raw)?);
        }
        Ok(Self { patterns: compiled })
    }

    /// True if any pattern matches `path` (relative to the root, `/`-separated).
    pub fn is_excluded(&self, path: &str) -> bool {
        !path.is_empty() && self.patterns.iter().any(|p| p.matches(path))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}

/// One-shot form of [`ExcludeSet::is_excluded`] that never fails: patterns that do not
/// compile as globs can still exclude through the directory-prefix rule.
pub fn file_is_excluded<S: AsRef<str>>(path: &str, patterns: &[S]) -> bool {
    !path.is_empty()
        && patterns
            .iter()
            .map(AsRef::as_ref)
            .filter(|raw| !raw.is_empty())
            .any(|raw| ExcludePattern::compile_lenient(raw).matches(path))
}
