//! Lexical path resolution for archive entries.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Destination for an entry named `name`, or `None` if it would escape `dest`.
///
/// The resolved path must lie strictly below `dest`; an entry resolving to
/// `dest` itself is rejected too.
pub fn resolve_entry(dest: &Path, name: &str) -> Option<PathBuf> {
    let base = normalize_path(dest);
    let relative = name.trim_start_matches(['/', '\\']);
    if relative.len() != name.len() || has_drive_prefix(name) {
        return None;
    }
    let resolved = normalize_path(&base.join(relative));
    (resolved.starts_with(&base) && resolved != base).then_some(resolved)
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
