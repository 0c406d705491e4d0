//! Renderer module
//!
//! Renders load reports and plain record lists to: jsonl, json, md, raw

use serde::Serialize;
use std::io::Write;

use crate::core::model::{LoadReport, Mention};
use crate::core::util::truncate_string;

/// Widest mention shown in a markdown table cell
const MD_CELL_MAX_BYTES: usize = 60;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    /// Create a new render config with default options
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
        }
    }

    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// A serializable row with a one-line human form, for non-report listings
pub trait Record: Serialize {
    fn summary_line(&self) -> String;
}

impl Record for Mention {
    fn summary_line(&self) -> String {
        format!("{} (offset {})", self.normalized, self.offset)
    }
}

/// Renderer for load reports and record lists
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            config: RenderConfig::new(format),
        }
    }

    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a load report to a string
    pub fn render(&self, report: &LoadReport) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(report),
            OutputFormat::Json => self.to_json(report, "{}"),
            OutputFormat::Markdown => self.render_markdown(report),
            OutputFormat::Raw => self.render_raw(report),
        }
    }

    /// Render to a writer, newline-terminated
    pub fn render_to<W: Write>(&self, report: &LoadReport, mut writer: W) -> std::io::Result<()> {
        let output = self.render(report);
        writeln!(writer, "{}", output)
    }

    /// Render a plain list of records (scan/resolve output)
    pub fn render_records<T: Record>(&self, records: &[T]) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.join_lines(records),
            OutputFormat::Json => self.to_json(&records, "[]"),
            OutputFormat::Markdown => records
                .iter()
                .map(|r| format!("- {}\n", r.summary_line()))
                .collect(),
            OutputFormat::Raw => records
                .iter()
                .map(|r| r.summary_line())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        let rendered = if self.config.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|_| fallback.to_string())
    }

    fn join_lines<T: Serialize>(&self, items: &[T]) -> String {
        items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// One manifest entry per line; the context itself is left to json/raw
    fn render_jsonl(&self, report: &LoadReport) -> String {
        self.join_lines(&report.manifest.entries)
    }

    /// Render as Markdown
    fn render_markdown(&self, report: &LoadReport) -> String {
        let mut output = String::new();

        if !report.context_text.is_empty() {
            output.push_str("## Context\n\n");
            output.push_str(&report.context_text);
            if !report.context_text.ends_with('\n') {
                output.push('\n');
            }
            output.push('\n');
        }

        if !report.manifest.is_empty() {
            output.push_str("## Mentions\n\n");
            output.push_str("| Mention | Status | Path |\n");
            output.push_str("|---|---|---|\n");
            for entry in &report.manifest {
                let (mention, cut) = truncate_string(&entry.mention, MD_CELL_MAX_BYTES);
                let mut status = entry.status.to_string();
                if entry.duplicate {
                    status.push_str(" (duplicate)");
                }
                if let Some(reason) = &entry.reason {
                    status.push_str(&format!(": {}", reason));
                }
                let mention = format!("{}{}", mention, if cut { "…" } else { "" });
                output.push_str(&format!(
                    "| {} | {} | {} |\n",
                    md_code_span(&mention),
                    md_cell(&status),
                    md_cell(entry.resolved_path.as_deref().unwrap_or("-")),
                ));
            }
            output.push('\n');
        }

        if let Some(message) = &report.message {
            output.push_str(&format!("> {}\n", message));
        }

        output
    }

    /// Raw mode: the composed prompt, or the bare context when no prompt was composed
    fn render_raw(&self, report: &LoadReport) -> String {
        report
            .prompt
            .clone()
            .unwrap_or_else(|| report.context_text.clone())
    }
}

/// Escape a table cell so `|` cannot split the row
fn md_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Inline code for a table cell, fenced with more backticks than the text holds
fn md_code_span(text: &str) -> String {
    let longest_run = text
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run + 1);
    let pad = if text.starts_with('`') || text.ends_with('`') {
        " "
    } else {
        ""
    };
    format!("{fence}{pad}{}{pad}{fence}", md_cell(text))
}
