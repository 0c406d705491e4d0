//! Path normalization utilities
//!
//! Lexical cleanup of joined mention paths, version-control root discovery and
//! the identity key used to collapse different spellings of the same file.

use std::path::{Component, Path, PathBuf};

/// Marker whose presence identifies a repository root (directory, or file for worktrees)
pub const REPO_MARKER: &str = ".git";

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// Returns `None` when a `..` would climb above the platform root.
pub fn lexical_normalize(path: &Path) -> Option<PathBuf> {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => return None,
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return Some(PathBuf::from("."));
    }

    Some(parts.iter().collect())
}

/// Walk upward from `start` looking for a repository marker
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| candidate.join(REPO_MARKER).exists())
        .map(PathBuf::from)
}

/// Identity used to detect that two resolved paths are the same entry.
///
/// Symlinks are followed; falls back to the path itself when it cannot be
/// canonicalized.
pub fn identity_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// True when the token names a directory explicitly (`docs/`)
pub fn ends_with_separator(token: &str) -> bool {
    token.ends_with('/') || token.ends_with(std::path::MAIN_SEPARATOR)
}

/// True when the final component of `token` carries an extension
pub fn has_extension(token: &str) -> bool {
    Path::new(token).extension().is_some()
}
