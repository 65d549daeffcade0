//! Path handling for the virtual directory tree.
//!
//! Store keys are flat strings; the `/` delimiter is the only thing that
//! makes them look like directories. Canonical form keeps every operation
//! honest: the root is the empty string, and every other directory path
//! ends in exactly one `/` with no leading delimiter. Inputs that cannot be
//! canonicalized are rejected, never silently rewritten.

use super::{BrowseError, BrowseResult};

const MAX_KEY_LEN: usize = 1024;

/// Normalize a directory path to canonical form.
///
/// The empty string is the root and passes through unchanged. Anything else
/// gets exactly one trailing `/` appended when missing. Rejected inputs:
/// a leading `/`, empty segments (`a//b`), `.` or `..` segments, control or
/// backslash characters, and over-long paths.
pub fn normalize_dir_path(input: &str) -> BrowseResult<String> {
    if input.is_empty() {
        return Ok(String::new());
    }

    let trimmed = input.strip_suffix('/').unwrap_or(input);
    let canonical = format!("{trimmed}/");
    check_key_shape(input, &canonical)?;
    for segment in trimmed.split('/') {
        check_segment(input, segment)?;
    }

    Ok(canonical)
}

/// Validate a full object key naming a file, passing it through unchanged.
///
/// Keys never end in `/` (that shape is reserved for directory markers) and
/// follow the same segment rules as directory paths.
pub fn validate_object_key(key: &str) -> BrowseResult<&str> {
    if key.is_empty() {
        return Err(invalid(key, "must not be empty"));
    }
    if key.ends_with('/') {
        return Err(invalid(key, "file keys must not end with the delimiter"));
    }
    check_key_shape(key, key)?;
    for segment in key.split('/') {
        check_segment(key, segment)?;
    }
    Ok(key)
}

/// Join a canonical parent path and a child directory name into the child's
/// canonical path.
///
/// ```
/// use bucket_browser::services::paths::child_prefix;
///
/// assert_eq!(child_prefix("reports/", "2024"), "reports/2024/");
/// assert_eq!(child_prefix("", "reports"), "reports/");
/// ```
pub fn child_prefix(parent: &str, name: &str) -> String {
    format!("{}{}/", parent, name.trim_end_matches('/'))
}

/// True when `key` names a file directly inside `parent`, with no deeper
/// nesting and no marker shape.
pub fn is_direct_child(key: &str, parent: &str) -> bool {
    key.strip_prefix(parent)
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

/// Strip `parent` from `key`, erroring when the key lies outside it.
pub fn relative_name<'a>(key: &'a str, parent: &str) -> BrowseResult<&'a str> {
    key.strip_prefix(parent)
        .ok_or_else(|| invalid(key, "does not reside under the requested path"))
}

/// Derive the bare directory name from a grouped prefix the store returned.
pub fn directory_name_from_prefix<'a>(prefix: &'a str, parent: &str) -> BrowseResult<&'a str> {
    let rest = relative_name(prefix, parent)?;
    Ok(rest.strip_suffix('/').unwrap_or(rest))
}

/// Directory markers are zero-byte objects whose key ends in `/`. They make
/// empty directories visible but must never surface as files.
pub fn is_directory_marker(key: &str) -> bool {
    key.ends_with('/')
}

/// Final path component of a key, used as its display name.
pub fn final_component(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

fn invalid(path: &str, reason: &'static str) -> BrowseError {
    BrowseError::InvalidPath {
        path: path.to_string(),
        reason,
    }
}

fn check_key_shape(input: &str, key: &str) -> BrowseResult<()> {
    if key.len() > MAX_KEY_LEN {
        return Err(invalid(input, "exceeds the 1024-byte key limit"));
    }
    if key.starts_with('/') {
        return Err(invalid(input, "must not start with the delimiter"));
    }
    if key.bytes().any(|b| b.is_ascii_control() || b == b'\\') {
        return Err(invalid(input, "contains control or backslash characters"));
    }
    Ok(())
}

fn check_segment(input: &str, segment: &str) -> BrowseResult<()> {
    if segment.is_empty() {
        return Err(invalid(input, "contains an empty path segment"));
    }
    if segment == "." || segment == ".." {
        return Err(invalid(input, "relative segments are not allowed"));
    }
    Ok(())
}
