//! mention-loader - resolve `@`-mentions in prompt text into a context block
//!
//! Pipeline:
//! - scan: `@`-tokens in order, deduplicated by text
//! - resolve: file / directory / missing, anchored at cwd or the repository root
//! - load: bounded text reads and directory listings, with skip reasons
//! - aggregate: dedup by resolved path, context block plus manifest

pub mod config;
pub mod core;
pub mod engine;
pub mod flows;
pub mod logging;
pub mod mentions;

pub use crate::config::{AnchorMode, ConfigError, LoaderConfig};
pub use crate::core::model::{Aggregation, LoadManifest, LoadStatus, ManifestEntry, Mention};
pub use crate::engine::MentionEngine;
