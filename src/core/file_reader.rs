//! Bounded file and directory reading
//!
//! Provides consistent handling for:
//! - Oversized files (rejected before reading)
//! - Binary and non-UTF-8 files
//! - Zero-byte files (loaded, never treated as absent)
//! - Directory listings (immediate children, sorted)

use std::fs;
use std::io::Read;
use std::path::Path;
use walkdir::WalkDir;

use crate::core::model::{ListingEntry, LoadOutcome, SkipReason};

/// Default maximum file size in bytes (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Read a whole text file, refusing anything larger than `max_file_size`.
pub fn read_text_bounded(path: &Path, max_file_size: u64) -> LoadOutcome {
    // Size check first: an oversized file is never opened
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            return LoadOutcome::Skipped(SkipReason::Io(format!("cannot read metadata: {}", e)))
        }
    };

    // Opening a FIFO or device could block indefinitely
    if !metadata.is_file() {
        return LoadOutcome::Skipped(SkipReason::Io("not a regular file".to_string()));
    }

    let size = metadata.len();
    if size > max_file_size {
        return LoadOutcome::Skipped(SkipReason::TooLarge {
            size,
            limit: max_file_size,
        });
    }

    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) => return LoadOutcome::Skipped(SkipReason::Io(format!("cannot open file: {}", e))),
    };

    // One byte past the limit detects growth between stat and read
    let mut buffer = Vec::with_capacity(size as usize);
    if let Err(e) = file
        .take(max_file_size.saturating_add(1))
        .read_to_end(&mut buffer)
    {
        return LoadOutcome::Skipped(SkipReason::Io(format!("cannot read file: {}", e)));
    }

    if buffer.len() as u64 > max_file_size {
        return LoadOutcome::Skipped(SkipReason::TooLarge {
            size: buffer.len() as u64,
            limit: max_file_size,
        });
    }

    decode_text(buffer)
}

/// Decode bytes as UTF-8 text, classifying NUL-bearing or invalid content as binary
pub fn decode_text(bytes: Vec<u8>) -> LoadOutcome {
    if looks_binary(&bytes) {
        return LoadOutcome::Skipped(SkipReason::Binary);
    }

    match String::from_utf8(bytes) {
        Ok(text) => LoadOutcome::Text(text),
        Err(_) => LoadOutcome::Skipped(SkipReason::Binary),
    }
}

/// Binary heuristic: any NUL byte
pub fn looks_binary(bytes: &[u8]) -> bool {
    bytes.contains(&0)
}

/// List the immediate children of a directory, sorted by name
pub fn list_directory(path: &Path) -> LoadOutcome {
    let walker = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    let mut entries = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            // The directory itself could not be read
            Err(e) if e.depth() == 0 => {
                return LoadOutcome::Skipped(SkipReason::Io(format!(
                    "cannot read directory: {}",
                    e
                )))
            }
            Err(_) => continue,
        };

        let name = entry.file_name().to_string_lossy().into_owned();

        // Follow symlinks so a link to a directory lists as a directory
        let metadata = fs::metadata(entry.path()).ok();
        let is_dir = metadata.as_ref().map(|m| m.is_dir()).unwrap_or(false);
        let size = metadata.filter(|m| m.is_file()).map(|m| m.len());

        entries.push(ListingEntry { name, is_dir, size });
    }

    LoadOutcome::Listing(entries)
}
