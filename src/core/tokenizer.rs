//! Token counting for context budgeting
//!
//! Uses tiktoken encodings (cl100k_base by default) with a fast heuristic
//! fallback when an encoding cannot be loaded.

use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};

/// Supported token models/encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenModel {
    /// cl100k_base encoding (GPT-4, GPT-3.5-turbo, Claude approximation)
    #[default]
    Cl100k,
    /// o200k_base encoding (GPT-4o native)
    O200k,
    /// Fast heuristic estimation (no BPE encoding)
    Heuristic,
}

impl TokenModel {
    fn get_bpe(&self) -> Option<&'static CoreBPE> {
        match self {
            TokenModel::Cl100k => CL100K_BPE.as_ref().ok(),
            TokenModel::O200k => O200K_BPE.as_ref().ok(),
            TokenModel::Heuristic => None,
        }
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenModel::Cl100k => "cl100k",
            TokenModel::O200k => "o200k",
            TokenModel::Heuristic => "heuristic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" | "default" | "gpt4" | "claude" => Ok(TokenModel::Cl100k),
            "o200k" | "o200k_base" | "gpt4o" => Ok(TokenModel::O200k),
            "heuristic" | "fast" | "estimate" => Ok(TokenModel::Heuristic),
            _ => Err(format!(
                "Unknown model: {}. Available: cl100k, o200k, heuristic",
                s
            )),
        }
    }
}

// Loaded once on first use
static CL100K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| cl100k_base().map_err(|e| format!("Failed to load cl100k_base: {}", e)));

static O200K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| o200k_base().map_err(|e| format!("Failed to load o200k_base: {}", e)));

/// Count tokens in text using the specified model
pub fn count_tokens(text: &str, model: TokenModel) -> usize {
    if text.is_empty() {
        return 0;
    }

    match model.get_bpe() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => estimate_tokens_heuristic(text),
    }
}

/// Estimate tokens without BPE: ~4 ASCII chars per token, ~2 chars for other text
pub fn estimate_tokens_heuristic(text: &str) -> usize {
    let (ascii, other) = text.chars().fold((0usize, 0usize), |(a, o), c| {
        if c.is_ascii() {
            (a + 1, o)
        } else {
            (a, o + 1)
        }
    });

    ascii.div_ceil(4) + other.div_ceil(2)
}
