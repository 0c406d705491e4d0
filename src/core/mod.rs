//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Unified load model (Mention, LoadedItem, LoadManifest)
//! - Rendering functions for different output formats
//! - Path normalization and repository root discovery
//! - Bounded file reading
//! - Token counting for LLM context budgeting

pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
pub mod tokenizer;
pub mod util;
