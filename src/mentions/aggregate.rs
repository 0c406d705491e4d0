//! Aggregation
//!
//! Drives resolve and load over every mention of a pass:
//! 1. resolve each mention on the blocking pool (bounded, timed)
//! 2. load each distinct resolved path exactly once
//! 3. assemble manifest entries in scan order and build the context block
//!
//! Concurrency never affects output: `join_all` keeps input order.

use futures::future::join_all;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::LoaderConfig;
use crate::core::model::{
    Aggregation, LoadManifest, LoadOutcome, LoadedItem, ManifestEntry, Mention, ResolvedTarget,
    SkipReason,
};
use crate::core::paths::{identity_key, normalize_path};
use crate::mentions::load::{load, render_listing};
use crate::mentions::resolve::Resolver;

/// Separator between context blocks
pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// Run `task` on the blocking pool once a permit is free, within `budget`.
///
/// The budget starts after the permit is acquired. On expiry the blocking
/// task is abandoned, not cancelled. It keeps its permit until it returns, so
/// abandoned reads still count against the limit.
pub async fn run_blocking<T, F>(
    semaphore: Arc<Semaphore>,
    budget: Duration,
    task: F,
) -> Result<T, SkipReason>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| SkipReason::Io(format!("scheduler closed: {}", e)))?;

    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        task()
    });

    match timeout(budget, handle).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(SkipReason::Io(format!("task failed: {}", e))),
        Err(_) => Err(SkipReason::Timeout),
    }
}

/// The blocking steps of a pass
#[derive(Clone, Copy)]
struct Steps {
    resolve: fn(&Resolver, &str) -> ResolvedTarget,
    load: fn(&ResolvedTarget, u64) -> LoadedItem,
}

const FILESYSTEM: Steps = Steps {
    resolve: Resolver::resolve,
    load,
};

/// Where a mention's item comes from
enum Slot {
    /// Index into the distinct-path table
    Shared(usize),
    /// Missing, or failed before a path was known
    Own(Arc<LoadedItem>),
}

/// Resolve, load, dedup and assemble. Total: every mention yields one entry.
pub async fn aggregate(mentions: &[Mention], config: &LoaderConfig) -> Aggregation {
    aggregate_with(mentions, config, FILESYSTEM).await
}

async fn aggregate_with(
    mentions: &[Mention],
    config: &LoaderConfig,
    steps: Steps,
) -> Aggregation {
    if mentions.is_empty() {
        return Aggregation::default();
    }

    let resolver = match Resolver::from_config(config) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            debug!(error = %e, "Cannot determine base directory");
            let reason = SkipReason::Io(format!("cannot determine working directory: {}", e));
            let manifest = mentions
                .iter()
                .map(|m| {
                    let item = Arc::new(LoadedItem::skipped(
                        ResolvedTarget::Missing,
                        reason.clone(),
                    ));
                    ManifestEntry::from_item(m, item, false)
                })
                .collect();
            return Aggregation {
                context_text: String::new(),
                manifest,
            };
        }
    };

    let semaphore = Arc::new(Semaphore::new(config.max_concurrency));
    let budget = config.item_timeout();

    // Phase 1: resolution, with the identity key computed off the async threads
    let resolutions = join_all(mentions.iter().map(|mention| {
        let resolver = Arc::clone(&resolver);
        let token = mention.normalized.clone();
        let semaphore = Arc::clone(&semaphore);
        async move {
            run_blocking(semaphore, budget, move || {
                let target = (steps.resolve)(&resolver, &token);
                let key = target.path().map(identity_key);
                (target, key)
            })
            .await
        }
    }))
    .await;

    // Distinct paths in first-seen order
    let mut distinct: Vec<ResolvedTarget> = Vec::new();
    let mut owners: Vec<usize> = Vec::new();
    let mut by_key: HashMap<PathBuf, usize> = HashMap::new();
    let mut slots: Vec<Slot> = Vec::with_capacity(mentions.len());

    for (index, resolution) in resolutions.into_iter().enumerate() {
        let slot = match resolution {
            Ok((target, Some(key))) => {
                let next = distinct.len();
                let slot_index = *by_key.entry(key).or_insert(next);
                if slot_index == next {
                    distinct.push(target);
                    owners.push(index);
                }
                Slot::Shared(slot_index)
            }
            Ok((target, None)) => Slot::Own(Arc::new(load(&target, config.max_file_size))),
            Err(reason) => {
                debug!(mention = %mentions[index].normalized, reason = %reason, "Resolution failed");
                Slot::Own(Arc::new(LoadedItem::skipped(ResolvedTarget::Missing, reason)))
            }
        };
        slots.push(slot);
    }

    // Phase 2: one load per distinct path
    let max_file_size = config.max_file_size;
    let loaded: Vec<Arc<LoadedItem>> = join_all(distinct.iter().map(|target| {
        let owned = target.clone();
        let semaphore = Arc::clone(&semaphore);
        async move {
            let fallback = owned.clone();
            let task = move || (steps.load)(&owned, max_file_size);
            match run_blocking(semaphore, budget, task).await {
                Ok(item) => Arc::new(item),
                Err(reason) => {
                    debug!(reason = %reason, "Load abandoned");
                    Arc::new(LoadedItem::skipped(fallback, reason))
                }
            }
        }
    }))
    .await;

    let manifest: LoadManifest = mentions
        .iter()
        .zip(slots)
        .enumerate()
        .map(|(index, (mention, slot))| match slot {
            Slot::Shared(i) => {
                ManifestEntry::from_item(mention, Arc::clone(&loaded[i]), owners[i] != index)
            }
            Slot::Own(item) => ManifestEntry::from_item(mention, item, false),
        })
        .collect();

    let context_text = build_context(&loaded);

    info!(
        mentions = mentions.len(),
        distinct = distinct.len(),
        included = manifest.loaded_paths().len(),
        "Mentions aggregated"
    );

    Aggregation {
        context_text,
        manifest,
    }
}

/// Join the blocks of every included item, in order
pub fn build_context(items: &[Arc<LoadedItem>]) -> String {
    items
        .iter()
        .filter_map(|item| context_block(item))
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// `# <path>\n\n<content>` for files, `# <path>/\n\n<listing>` for directories
fn context_block(item: &LoadedItem) -> Option<String> {
    let path = normalize_path(item.target.path()?);
    match &item.outcome {
        LoadOutcome::Text(text) => Some(format!("# {}\n\n{}", path, text)),
        LoadOutcome::Listing(entries) => {
            Some(format!("# {}/\n\n{}", path, render_listing(entries)))
        }
        LoadOutcome::Skipped(_) => None,
    }
}
