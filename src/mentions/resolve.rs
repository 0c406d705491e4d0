//! Path resolution
//!
//! Turns a normalized mention into a `ResolvedTarget`:
//! 1. pick the anchor directory (working directory, or the repository root)
//! 2. try `anchor/token` as written
//! 3. if absent and the token has no extension, try each configured extension in order

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{AnchorMode, LoaderConfig};
use crate::core::model::ResolvedTarget;
use crate::core::paths::{
    ends_with_separator, find_git_root, has_extension, identity_key, lexical_normalize,
    normalize_path,
};
use crate::core::render::Record;

/// Pick the directory mentions are resolved against.
///
/// `GitRoot` walks upward from `base` for a repository marker and quietly
/// falls back to `base` when there is none.
pub fn select_anchor(mode: AnchorMode, base: &Path) -> PathBuf {
    match mode {
        AnchorMode::Cwd => base.to_path_buf(),
        AnchorMode::GitRoot => match find_git_root(base) {
            Some(root) => root,
            None => {
                debug!(base = %base.display(), "No repository root found, using base directory");
                base.to_path_buf()
            }
        },
    }
}

/// Absolute base directory for a config: `base_dir` if set, else the working directory
pub fn base_directory(config: &LoaderConfig) -> io::Result<PathBuf> {
    match &config.base_dir {
        Some(dir) if dir.is_absolute() => Ok(dir.clone()),
        Some(dir) => Ok(std::env::current_dir()?.join(dir)),
        None => std::env::current_dir(),
    }
}

/// Resolver bound to one anchor and extension list for the length of a pass
#[derive(Debug, Clone)]
pub struct Resolver {
    anchor: PathBuf,
    extensions: Vec<String>,
}

impl Resolver {
    pub fn new(anchor: PathBuf, extensions: Vec<String>) -> Self {
        Self { anchor, extensions }
    }

    /// Compute the anchor for `config`; fails only when no working directory is available
    pub fn from_config(config: &LoaderConfig) -> io::Result<Self> {
        let base = base_directory(config)?;
        let anchor = select_anchor(config.resolve_relative_to, &base);
        debug!(anchor = %anchor.display(), mode = %config.resolve_relative_to, "Resolution anchor selected");
        Ok(Self::new(anchor, config.try_extensions.clone()))
    }

    pub fn anchor(&self) -> &Path {
        &self.anchor
    }

    /// Resolve a normalized mention; `Missing` is an ordinary outcome
    pub fn resolve(&self, token: &str) -> ResolvedTarget {
        let Some(direct) = self.join(token) else {
            debug!(token, "Mention escapes the filesystem root");
            return ResolvedTarget::Missing;
        };

        if let Some(target) = classify(direct) {
            return target;
        }

        if has_extension(token) || ends_with_separator(token) {
            return ResolvedTarget::Missing;
        }

        for ext in &self.extensions {
            let candidate = format!("{}{}", token, ext);
            let Some(path) = self.join(&candidate) else {
                continue;
            };
            if let Some(target) = classify(path) {
                debug!(token, ext = %ext, "Resolved through extension fallback");
                return target;
            }
        }

        ResolvedTarget::Missing
    }

    /// `anchor/token` with `..` left for the OS; `None` when it climbs above the root
    fn join(&self, token: &str) -> Option<PathBuf> {
        let joined: PathBuf = self.anchor.join(token).components().collect();
        lexical_normalize(&joined)?;
        Some(joined)
    }
}

/// Classify an existing entry, following symlinks; `None` when nothing is there.
///
/// Existence is decided on `joined` as the OS sees it. The lexically folded
/// spelling is reported only when it names the same entry.
fn classify(joined: PathBuf) -> Option<ResolvedTarget> {
    let metadata = fs::metadata(&joined).ok()?;
    let path = match lexical_normalize(&joined) {
        Some(folded) if folded == joined => folded,
        Some(folded) if identity_key(&folded) == identity_key(&joined) => folded,
        _ => joined,
    };

    if metadata.is_dir() {
        Some(ResolvedTarget::Directory(path))
    } else {
        Some(ResolvedTarget::File(path))
    }
}

/// Resolve one token against `config` (builds a fresh resolver)
pub fn resolve(token: &str, config: &LoaderConfig) -> ResolvedTarget {
    match Resolver::from_config(config) {
        Ok(resolver) => resolver.resolve(token),
        Err(e) => {
            debug!(error = %e, "Working directory unavailable");
            ResolvedTarget::Missing
        }
    }
}

/// Resolution outcome as reported by the `resolve` command
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub mention: String,
    pub anchor: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<String>,
}

impl Resolution {
    pub fn new(mention: &str, resolver: &Resolver, target: &ResolvedTarget) -> Self {
        let kind = match target {
            ResolvedTarget::File(_) => "file",
            ResolvedTarget::Directory(_) => "directory",
            ResolvedTarget::Missing => "missing",
        };
        Self {
            mention: mention.to_string(),
            anchor: normalize_path(resolver.anchor()),
            kind,
            resolved_path: target.path().map(normalize_path),
        }
    }
}

impl Record for Resolution {
    fn summary_line(&self) -> String {
        match &self.resolved_path {
            Some(path) => format!("{} -> {} ({})", self.mention, path, self.kind),
            None => format!("{} -> (missing)", self.mention),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn resolver(dir: &Path, exts: &[&str]) -> Resolver {
        Resolver::new(
            dir.to_path_buf(),
            exts.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_direct_file_match() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "# hi").unwrap();

        let target = resolver(dir.path(), &[".md"]).resolve("README.md");
        assert_eq!(target, ResolvedTarget::File(dir.path().join("README.md")));
    }

    #[test]
    fn test_direct_directory_match_with_and_without_slash() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        let r = resolver(dir.path(), &[".md"]);

        assert_eq!(
            r.resolve("docs/"),
            ResolvedTarget::Directory(dir.path().join("docs"))
        );
        assert_eq!(
            r.resolve("docs"),
            ResolvedTarget::Directory(dir.path().join("docs"))
        );
    }

    #[test]
    fn test_extension_fallback() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "# hi").unwrap();

        let target = resolver(dir.path(), &[".txt", ".md"]).resolve("README");
        assert_eq!(target, ResolvedTarget::File(dir.path().join("README.md")));
    }

    #[test]
    fn test_extension_fallback_declaration_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("name.md"), "markdown version").unwrap();
        fs::write(dir.path().join("name.txt"), "text version").unwrap();

        let md_first = resolver(dir.path(), &[".md", ".txt"]).resolve("name");
        assert_eq!(md_first, ResolvedTarget::File(dir.path().join("name.md")));

        let txt_first = resolver(dir.path(), &[".txt", ".md"]).resolve("name");
        assert_eq!(txt_first, ResolvedTarget::File(dir.path().join("name.txt")));
    }

    #[test]
    fn test_no_fallback_when_token_has_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.md"), "x").unwrap();

        let target = resolver(dir.path(), &[".md"]).resolve("readme.mdx");
        assert_eq!(target, ResolvedTarget::Missing);
    }

    #[test]
    fn test_no_fallback_for_trailing_separator() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.md"), "x").unwrap();

        let target = resolver(dir.path(), &[".md"]).resolve("notes/");
        assert_eq!(target, ResolvedTarget::Missing);
    }

    #[test]
    fn test_missing() {
        let dir = TempDir::new().unwrap();
        let target = resolver(dir.path(), &[".md", ".txt"]).resolve("nonexistent");
        assert_eq!(target, ResolvedTarget::Missing);
    }

    #[test]
    fn test_dot_segments_normalized() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("a.md"), "x").unwrap();

        let target = resolver(dir.path(), &[]).resolve("./docs/../a.md");
        assert_eq!(target, ResolvedTarget::File(dir.path().join("a.md")));
    }

    #[test]
    fn test_escape_above_root_is_missing() {
        let dir = TempDir::new().unwrap();
        let depth = dir.path().components().count();
        let token = "../".repeat(depth + 2) + "etc";

        let target = resolver(dir.path(), &[]).resolve(&token);
        assert_eq!(target, ResolvedTarget::Missing);
    }

    #[test]
    fn test_special_characters_in_path() {
        let dir = TempDir::new().unwrap();
        let special = dir.path().join("my-project_v2 (test)");
        fs::create_dir(&special).unwrap();
        fs::write(special.join("config file.txt"), "special config").unwrap();

        let target = resolver(dir.path(), &[]).resolve("my-project_v2 (test)/config file.txt");
        assert_eq!(target, ResolvedTarget::File(special.join("config file.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_followed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real.md"), "real").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.md"), dir.path().join("link.md"))
            .unwrap();

        let target = resolver(dir.path(), &[]).resolve("link.md");
        assert_eq!(target, ResolvedTarget::File(dir.path().join("link.md")));
    }

    #[cfg(unix)]
    #[test]
    fn test_parent_after_symlink_follows_link_target() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("real/inner")).unwrap();
        fs::write(dir.path().join("real/target.md"), "behind the link").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real/inner"), dir.path().join("link"))
            .unwrap();

        // `link/..` is `real`, not the anchor
        let r = resolver(dir.path(), &[".md"]);
        let target = r.resolve("link/../target.md");
        assert_eq!(
            target,
            ResolvedTarget::File(dir.path().join("link/../target.md"))
        );
        assert_eq!(
            identity_key(target.path().unwrap()),
            identity_key(&dir.path().join("real/target.md"))
        );
        assert!(matches!(r.resolve("link/../target"), ResolvedTarget::File(_)));

        // Lexically present, absent for the OS
        fs::write(dir.path().join("decoy.md"), "anchor level").unwrap();
        assert_eq!(r.resolve("link/../decoy.md"), ResolvedTarget::Missing);
    }

    #[test]
    fn test_select_anchor_git_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("pkg/src");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(select_anchor(AnchorMode::GitRoot, &nested), dir.path());
        assert_eq!(select_anchor(AnchorMode::Cwd, &nested), nested);
    }

    #[test]
    fn test_select_anchor_git_root_fallback() {
        let dir = TempDir::new().unwrap();
        // No marker anywhere under the temp dir; walking up may still hit a real repo,
        // so only check the fallback when none is found.
        let anchor = select_anchor(AnchorMode::GitRoot, dir.path());
        if find_git_root(dir.path()).is_none() {
            assert_eq!(anchor, dir.path());
        }
    }

    #[test]
    fn test_from_config_uses_base_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "x").unwrap();
        let config = LoaderConfig {
            base_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let resolver = Resolver::from_config(&config).unwrap();
        assert_eq!(resolver.anchor(), dir.path());
        assert_eq!(
            resolve("a", &config),
            ResolvedTarget::File(dir.path().join("a.md"))
        );
    }

    #[test]
    fn test_resolution_record() {
        let dir = TempDir::new().unwrap();
        let r = resolver(dir.path(), &[]);
        let record = Resolution::new("nope", &r, &ResolvedTarget::Missing);

        assert_eq!(record.kind, "missing");
        assert!(record.resolved_path.is_none());
        assert_eq!(record.summary_line(), "nope -> (missing)");
    }
}
