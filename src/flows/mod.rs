//! Flows module - Operations built on the mention engine
//!
//! Provides:
//! - prompt: Loaded-files message, prompt composition and statistics
//! - tool: The engine as a tool capability (descriptor, schema, execute)

pub mod prompt;
pub mod tool;
