//! Content loading
//!
//! Missing targets become `not found` skips, directories become sorted
//! listings, files go through the bounded reader.

use tracing::debug;

use crate::core::file_reader::{list_directory, read_text_bounded};
use crate::core::model::{ListingEntry, LoadOutcome, LoadedItem, ResolvedTarget, SkipReason};

/// Load one resolved target. Never fails; problems become skip outcomes.
pub fn load(target: &ResolvedTarget, max_file_size: u64) -> LoadedItem {
    let outcome = match target {
        ResolvedTarget::Missing => LoadOutcome::Skipped(SkipReason::NotFound),
        ResolvedTarget::Directory(path) => list_directory(path),
        ResolvedTarget::File(path) => read_text_bounded(path, max_file_size),
    };

    if let LoadOutcome::Skipped(reason) = &outcome {
        if let Some(path) = target.path() {
            debug!(path = %path.display(), reason = %reason, "Skipped");
        }
    }

    LoadedItem::new(target.clone(), outcome)
}

/// Render a directory listing for the context block
pub fn render_listing(entries: &[ListingEntry]) -> String {
    if entries.is_empty() {
        return "Empty directory".to_string();
    }

    let mut out = String::from("Directory contents:");
    for entry in entries {
        out.push('\n');
        if entry.is_dir {
            out.push_str(&format!("  - {}/", entry.name));
        } else {
            match entry.size {
                Some(size) => out.push_str(&format!("  - {} ({} bytes)", entry.name, size)),
                None => out.push_str(&format!("  - {}", entry.name)),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LoadStatus;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing() {
        let item = load(&ResolvedTarget::Missing, 10);
        assert_eq!(item.status(), LoadStatus::SkippedMissing);
        assert_eq!(item.skip_reason(), Some(&SkipReason::NotFound));
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.md");
        fs::write(&path, "alpha").unwrap();

        let item = load(&ResolvedTarget::File(path), 1024);
        assert_eq!(item.status(), LoadStatus::Loaded);
        assert_eq!(item.content(), Some("alpha"));
    }

    #[test]
    fn test_load_zero_byte_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();

        let item = load(&ResolvedTarget::File(path), 1024);
        assert_eq!(item.status(), LoadStatus::Loaded);
        assert_eq!(item.content(), Some(""));
    }

    #[test]
    fn test_load_too_large() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, "x".repeat(11)).unwrap();

        let item = load(&ResolvedTarget::File(path), 10);
        assert_eq!(item.status(), LoadStatus::SkippedTooLarge);
        assert!(item.content().is_none());
    }

    #[test]
    fn test_load_vanished_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.md");
        fs::write(&path, "x").unwrap();
        let target = ResolvedTarget::File(path.clone());
        fs::remove_file(&path).unwrap();

        let item = load(&target, 1024);
        assert_eq!(item.status(), LoadStatus::SkippedError);
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.md"), "b").unwrap();
        fs::write(dir.path().join("a.md"), "a").unwrap();

        let item = load(&ResolvedTarget::Directory(dir.path().to_path_buf()), 1024);
        assert_eq!(item.status(), LoadStatus::Directory);
        let names: Vec<_> = item
            .listing()
            .unwrap()
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_load_vanished_directory_is_error() {
        let item = load(
            &ResolvedTarget::Directory(PathBuf::from("/nonexistent/mention-loader-dir")),
            1024,
        );
        assert_eq!(item.status(), LoadStatus::SkippedError);
    }

    #[test]
    fn test_render_listing() {
        let entries = vec![
            ListingEntry {
                name: "a.md".into(),
                is_dir: false,
                size: Some(3),
            },
            ListingEntry {
                name: "sub".into(),
                is_dir: true,
                size: None,
            },
            ListingEntry {
                name: "broken".into(),
                is_dir: false,
                size: None,
            },
        ];

        assert_eq!(
            render_listing(&entries),
            "Directory contents:\n  - a.md (3 bytes)\n  - sub/\n  - broken"
        );
        assert_eq!(render_listing(&[]), "Empty directory");
    }
}
