//! Module specifier classification and path canonicalization.
//!
//! A specifier is either *bare* (`lodash`, `lodash/fp`), resolved by some
//! external module system, or a *filesystem* specifier (`./foo`, `../foo`,
//! `/abs/foo`), resolved against the directory of the referencing file.
//! Classification is purely syntactic: zero or more leading dots followed by
//! a `/` make a filesystem specifier.
//!
//! # Canonical Paths
//!
//! Two filesystem specifiers name the same module iff their canonical paths are
//! equal. Canonicalization applies, in order and once each:
//!
//! 1. Resolve against `dirname(referencing_file)` with POSIX semantics
//! 2. Strip one trailing source extension (`.js`)
//! 3. Strip one trailing `/index`
//!
//! So `./foo/index.js`, `./foo/index`, `./foo.js` and `./foo` all canonicalize
//! to the same `/dir/foo`.
//!
//! All functions here are pure string arithmetic on `/`-separated paths.
//! Nothing touches the filesystem.
//!
//! ```
//! use modshift_core::config::RewriteOptions;
//! use modshift_core::specifier::{canonicalize, relativize};
//!
//! let options = RewriteOptions::default();
//! let canonical = canonicalize(&options, "/a/b/c.js", "../foo/index.js");
//! assert_eq!(canonical, "/a/foo");
//! assert_eq!(relativize("/a/b/c.js", &canonical), "../foo");
//! assert_eq!(relativize("/a/b/c.js", "/a/b/bar"), "./bar");
//! ```

use crate::config::RewriteOptions;

// ============================================================================
// Classification
// ============================================================================

/// True if `specifier` is resolved by an external module system rather than
/// by path arithmetic.
pub fn is_bare(specifier: &str) -> bool {
    !specifier.trim_start_matches('.').starts_with('/')
}

// ============================================================================
// POSIX Path Arithmetic
// ============================================================================

/// Directory portion of a `/`-separated path.
///
/// Trailing slashes are ignored. A path without a slash yields `"."`, a path
/// directly under the root yields `"/"`.
pub fn dirname(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') { "/" } else { "." };
    }
    match trimmed.rfind('/') {
        None => ".",
        Some(idx) => {
            let dir = trimmed[..idx].trim_end_matches('/');
            if dir.is_empty() {
                "/"
            } else {
                dir
            }
        }
    }
}

/// Normalize a path: collapse `.` and `..` segments, duplicate slashes and
/// trailing slashes.
///
/// `..` above the root of an absolute path is dropped; in a relative path it
/// is kept. An empty result is `"/"` for absolute paths and `"."` otherwise.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if !absolute => segments.push(".."),
                _ => {}
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Resolve `path` against `base_dir`. Absolute paths ignore the base.
pub fn resolve(base_dir: &str, path: &str) -> String {
    if path.starts_with('/') {
        normalize(path)
    } else {
        normalize(&format!("{}/{}", base_dir, path))
    }
}

/// Path from directory `from` to `to`, both normalized first.
///
/// Returns an empty string when both name the same location.
pub fn relative(from: &str, to: &str) -> String {
    let from = normalize(from);
    let to = normalize(to);
    let from_segments: Vec<&str> = from.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    let to_segments: Vec<&str> = to.split('/').filter(|s| !s.is_empty() && *s != ".").collect();

    let common = from_segments
        .iter()
        .zip(&to_segments)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat_n("..", from_segments.len() - common));
    parts.extend(&to_segments[common..]);
    parts.join("/")
}

// ============================================================================
// Canonicalization
// ============================================================================

/// Canonical form of `specifier` as written in `referencing_file`.
///
/// Bare specifiers are returned unchanged. When `referencing_file` is itself
/// relative, the canonical path is relative too and always starts with `./`
/// or `../`, so it never reads as a bare specifier.
pub fn canonicalize(options: &RewriteOptions, referencing_file: &str, specifier: &str) -> String {
    if is_bare(specifier) {
        return specifier.to_string();
    }

    let mut canonical = resolve(dirname(referencing_file), specifier);

    if let Some(ext) = options
        .source_extensions
        .iter()
        .find(|ext| !ext.is_empty() && canonical.ends_with(ext.as_str()))
    {
        canonical.truncate(canonical.len() - ext.len());
    }

    let index_suffix = format!("/{}", options.index_name);
    if canonical == options.index_name {
        canonical = ".".to_string();
    } else if canonical.ends_with(&index_suffix) {
        canonical.truncate(canonical.len() - index_suffix.len());
        if canonical.is_empty() {
            canonical.push('/');
        }
    }

    as_filesystem(canonical)
}

/// Specifier that names `canonical_target` from `referencing_file`.
///
/// Bare targets are returned unchanged. Filesystem targets become a path
/// relative to the referencing file's directory, prefixed with `./` when it
/// would otherwise read as a bare specifier.
pub fn relativize(referencing_file: &str, canonical_target: &str) -> String {
    if is_bare(canonical_target) {
        return canonical_target.to_string();
    }

    let path = relative(dirname(referencing_file), canonical_target);
    if path.is_empty() {
        "./".to_string()
    } else {
        as_filesystem(path)
    }
}

/// Prefix a resolved relative path so it classifies as a filesystem path.
fn as_filesystem(path: String) -> String {
    if !is_bare(&path) {
        return path;
    }
    match path.as_str() {
        "." => "./".to_string(),
        ".." => "../".to_string(),
        _ => format!("./{}", path),
    }
}
