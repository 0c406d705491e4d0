//! Prompt flow - aggregate a prompt's mentions and compose the prompt the model sees
//!
//! Presentation only: the loaded-files message, prompt composition and
//! statistics never change what was loaded.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

use crate::core::model::{Aggregation, LoadManifest, LoadReport};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::tokenizer::{count_tokens, TokenModel};
use crate::engine::MentionEngine;

/// `Loaded N file(s): a, b` over distinct included paths; `None` when nothing loaded
pub fn loaded_message(manifest: &LoadManifest) -> Option<String> {
    let paths = manifest.loaded_paths();
    if paths.is_empty() {
        return None;
    }
    Some(format!(
        "Loaded {} file(s): {}",
        paths.len(),
        paths.join(", ")
    ))
}

/// Prepend the context block; the prompt passes through untouched when there is none
pub fn compose_prompt(context_text: &str, prompt: &str) -> String {
    if context_text.is_empty() {
        prompt.to_string()
    } else {
        format!("{}\n\n{}", context_text, prompt)
    }
}

/// Dress an aggregation for output
pub fn build_report(
    aggregation: Aggregation,
    prompt: Option<&str>,
    show_loaded_files: bool,
) -> LoadReport {
    let message = if show_loaded_files {
        loaded_message(&aggregation.manifest)
    } else {
        None
    };
    let prompt = prompt.map(|p| compose_prompt(&aggregation.context_text, p));

    LoadReport {
        context_text: aggregation.context_text,
        manifest: aggregation.manifest,
        message,
        prompt,
    }
}

/// Statistics for one aggregation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptStats {
    pub mentions: usize,
    pub duplicates: usize,
    /// Entry count per status name
    pub by_status: BTreeMap<String, usize>,
    pub context_bytes: usize,
    pub estimated_tokens: usize,
    pub token_model: String,
}

pub fn compute_stats(report: &LoadReport, model: TokenModel) -> PromptStats {
    let mut by_status = BTreeMap::new();
    for entry in &report.manifest {
        *by_status.entry(entry.status.to_string()).or_insert(0) += 1;
    }

    PromptStats {
        mentions: report.manifest.len(),
        duplicates: report.manifest.iter().filter(|e| e.duplicate).count(),
        by_status,
        context_bytes: report.context_text.len(),
        estimated_tokens: count_tokens(&report.context_text, model),
        token_model: model.to_string(),
    }
}

fn print_stats<W: Write>(stats: &PromptStats, mut out: W) -> std::io::Result<()> {
    writeln!(out, "📎 Mention Statistics:")?;
    writeln!(
        out,
        "   Mentions: {} ({} duplicate)",
        stats.mentions, stats.duplicates
    )?;
    for (status, count) in &stats.by_status {
        writeln!(out, "   {}: {}", status, count)?;
    }
    writeln!(out, "   Context bytes: {}", stats.context_bytes)?;
    writeln!(
        out,
        "   Estimated tokens: {} ({})",
        stats.estimated_tokens, stats.token_model
    )?;
    writeln!(out)
}

/// Options for the `load` command
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub show_stats: bool,
    pub token_model: TokenModel,
    pub quiet: bool,
}

/// Run the `load` command: aggregate `prompt`, report on stderr, render to stdout
pub async fn run_load(
    engine: &MentionEngine,
    prompt: &str,
    opts: LoadOptions,
    config: RenderConfig,
) -> Result<()> {
    let aggregation = engine.process(prompt).await;
    let report = build_report(
        aggregation,
        Some(prompt),
        engine.config().show_loaded_files,
    );

    if !opts.quiet {
        if let Some(message) = &report.message {
            eprintln!("{}", message.green());
        }
    }

    if opts.show_stats {
        let stats = compute_stats(&report, opts.token_model);
        print_stats(&stats, std::io::stderr().lock()).context("Failed to write statistics")?;
    }

    let renderer = Renderer::with_config(config);
    renderer
        .render_to(&report, std::io::stdout().lock())
        .context("Failed to write output")?;

    Ok(())
}
