//! Unified Load Model
//!
//! Every mention that survives scanning maps to exactly one `ManifestEntry`
//! before anything is rendered. Per-item failures are values here, never errors.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::paths::normalize_path;

/// A `@`-prefixed token found in prompt text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Token exactly as it appeared, sigil included
    pub raw: String,

    /// Byte offset of the sigil in the source text
    pub offset: usize,

    /// Sigil and surrounding whitespace removed; never empty
    pub normalized: String,
}

impl Mention {
    pub fn new(raw: impl Into<String>, offset: usize, normalized: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            offset,
            normalized: normalized.into(),
        }
    }
}

/// Outcome of path resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    File(PathBuf),
    Directory(PathBuf),
    Missing,
}

impl ResolvedTarget {
    /// The resolved path, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ResolvedTarget::File(p) | ResolvedTarget::Directory(p) => Some(p),
            ResolvedTarget::Missing => None,
        }
    }
}

/// Why an item contributed nothing to the context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("not found")]
    NotFound,

    #[error("too large ({size} bytes > {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("binary")]
    Binary,

    #[error("{0}")]
    Io(String),

    #[error("timeout")]
    Timeout,
}

impl SkipReason {
    pub fn status(&self) -> LoadStatus {
        match self {
            SkipReason::NotFound => LoadStatus::SkippedMissing,
            SkipReason::TooLarge { .. } => LoadStatus::SkippedTooLarge,
            SkipReason::Binary => LoadStatus::SkippedBinary,
            SkipReason::Io(_) => LoadStatus::SkippedError,
            SkipReason::Timeout => LoadStatus::SkippedTimeout,
        }
    }
}

/// Manifest status of a single mention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Loaded,
    Directory,
    SkippedMissing,
    SkippedTooLarge,
    SkippedBinary,
    SkippedError,
    SkippedTimeout,
}

impl LoadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStatus::Loaded => "loaded",
            LoadStatus::Directory => "directory",
            LoadStatus::SkippedMissing => "skipped_missing",
            LoadStatus::SkippedTooLarge => "skipped_too_large",
            LoadStatus::SkippedBinary => "skipped_binary",
            LoadStatus::SkippedError => "skipped_error",
            LoadStatus::SkippedTimeout => "skipped_timeout",
        }
    }

    /// Whether the item contributes to the context block
    pub fn is_included(&self) -> bool {
        matches!(self, LoadStatus::Loaded | LoadStatus::Directory)
    }
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immediate child of a mentioned directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,

    /// File size in bytes (files only, when stat succeeded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// What a load produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// File text; an empty string is a successful load of a zero-byte file
    Text(String),
    Listing(Vec<ListingEntry>),
    Skipped(SkipReason),
}

/// A resolved target together with what was loaded from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedItem {
    pub target: ResolvedTarget,
    pub outcome: LoadOutcome,
}

impl LoadedItem {
    pub fn new(target: ResolvedTarget, outcome: LoadOutcome) -> Self {
        Self { target, outcome }
    }

    pub fn skipped(target: ResolvedTarget, reason: SkipReason) -> Self {
        Self::new(target, LoadOutcome::Skipped(reason))
    }

    pub fn status(&self) -> LoadStatus {
        match &self.outcome {
            LoadOutcome::Text(_) => LoadStatus::Loaded,
            LoadOutcome::Listing(_) => LoadStatus::Directory,
            LoadOutcome::Skipped(reason) => reason.status(),
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.outcome {
            LoadOutcome::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn listing(&self) -> Option<&[ListingEntry]> {
        match &self.outcome {
            LoadOutcome::Listing(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.outcome {
            LoadOutcome::Skipped(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Manifest record for one mention
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Normalized mention text
    pub mention: String,

    /// Token as written in the prompt
    pub raw: String,

    pub offset: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<String>,

    pub status: LoadStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Content size in bytes (loaded files)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// XXH3 of the loaded content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Directory entry names, in listing order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<String>>,

    /// Another mention earlier in the prompt already loaded this path
    #[serde(default)]
    pub duplicate: bool,

    /// Shared with every other entry resolving to the same path
    #[serde(skip)]
    pub item: Option<Arc<LoadedItem>>,
}

impl ManifestEntry {
    /// Build an entry for `mention` backed by a loaded item
    pub fn from_item(mention: &Mention, item: Arc<LoadedItem>, duplicate: bool) -> Self {
        let status = item.status();
        let resolved_path = item.target.path().map(normalize_path);
        let reason = item.skip_reason().map(|r| r.to_string());

        let (size, hash) = match item.content() {
            Some(text) => (
                Some(text.len() as u64),
                Some(crate::core::util::hash_content(text.as_bytes())),
            ),
            None => (None, None),
        };

        let entries = item
            .listing()
            .map(|list| list.iter().map(|e| e.name.clone()).collect());

        Self {
            mention: mention.normalized.clone(),
            raw: mention.raw.clone(),
            offset: mention.offset,
            resolved_path,
            status,
            reason,
            size,
            hash,
            entries,
            duplicate,
            item: Some(item),
        }
    }

    /// Loaded text, if this entry's item is a file that loaded
    pub fn content(&self) -> Option<&str> {
        self.item.as_deref().and_then(LoadedItem::content)
    }
}

/// Ordered record of every mention's outcome
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadManifest {
    pub entries: Vec<ManifestEntry>,
}

impl LoadManifest {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    /// Resolved paths that contributed to the context, first-seen order, no repeats
    pub fn loaded_paths(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.status.is_included() && !e.duplicate)
            .filter_map(|e| e.resolved_path.clone())
            .collect()
    }

    /// Number of entries with the given status
    pub fn count(&self, status: LoadStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}

impl<'a> IntoIterator for &'a LoadManifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<ManifestEntry> for LoadManifest {
    fn from_iter<T: IntoIterator<Item = ManifestEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Result of one resolution pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Aggregation {
    /// Labeled blocks ready to prepend to the prompt; empty when nothing loaded
    pub context_text: String,
    pub manifest: LoadManifest,
}

/// An aggregation dressed for output: what the presentation layer hands to a renderer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub context_text: String,
    pub manifest: LoadManifest,

    /// "Loaded N file(s): ..." when enabled and something loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Context followed by the original prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}
