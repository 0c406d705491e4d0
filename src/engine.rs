//! Mention engine - validated configuration plus async entry points

use tracing::debug;

use crate::config::{ConfigError, LoaderConfig};
use crate::core::model::{Aggregation, Mention};
use crate::mentions::{aggregate, scan};

/// Entry point for hosts: build once, process many prompts
#[derive(Debug, Clone)]
pub struct MentionEngine {
    config: LoaderConfig,
}

impl MentionEngine {
    /// Validate `config`; the only fallible step
    pub fn new(config: LoaderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Scan `text` for mentions and aggregate them
    pub async fn process(&self, text: &str) -> Aggregation {
        let mentions = scan::scan(text);
        debug!(count = mentions.len(), "Mentions scanned");
        self.process_mentions(&mentions).await
    }

    /// Aggregate an already-scanned mention list
    pub async fn process_mentions(&self, mentions: &[Mention]) -> Aggregation {
        aggregate(mentions, &self.config).await
    }
}
