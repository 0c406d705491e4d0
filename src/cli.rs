//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

use mention_loader::config::{AnchorMode, LoaderConfig};
use mention_loader::core::render::{OutputFormat, RenderConfig, Renderer};
use mention_loader::core::tokenizer::TokenModel;
use mention_loader::engine::MentionEngine;
use mention_loader::flows::prompt::{run_load, LoadOptions};
use mention_loader::flows::tool::{run_schema, run_tool};
use mention_loader::mentions::resolve::{Resolution, Resolver};
use mention_loader::mentions::scan::{normalize_mention, scan};

/// mention-loader - resolve @mentions in prompt text into a context block.
#[derive(Parser, Debug)]
#[command(name = "mention-loader")]
#[command(
    author,
    version,
    about,
    long_about = r#"mention-loader finds @-prefixed tokens in prompt text, resolves each one to a
file or directory, loads bounded content and prints a context block plus a
manifest describing what happened to every mention.

Missing, oversized, binary or unreadable targets never fail a run: they are
reported in the manifest with a skip status.

Output formats:
- jsonl: one manifest entry per line (default)
- json: the whole report (context, manifest, message, prompt)
- md: human-friendly Markdown
- raw: the composed prompt (context followed by the original text)

Examples:
    mention-loader load "@README explain this project"
    echo "review @src/ and @Cargo.toml" | mention-loader --format raw load
    mention-loader scan "@a.md and @docs/"
    mention-loader resolve README docs/
    echo '{"mentions": ["@README"]}' | mention-loader tool
"#
)]
pub struct Cli {
    /// Directory mentions are resolved from.
    #[arg(
        long,
        global = true,
        value_name = "ROOT",
        env = "MENTION_LOADER_ROOT",
        long_help = "Directory mentions are resolved from (defaults to the current directory).\n\n\
With --resolve-relative-to git_root, the repository root is searched upward from here."
    )]
    pub root: Option<PathBuf>,

    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw\n\n\
Tip: use raw with `load` to get the prompt exactly as a model would see it."
    )]
    pub format: String,

    /// JSON config file.
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "MENTION_LOADER_CONFIG",
        long_help = "Read loader settings from a JSON file. Absent keys take their defaults;\n\
command-line flags override values from the file.\n\n\
Example:\n\
  {\"resolve_relative_to\": \"git_root\", \"try_extensions\": [\".md\", \".rs\"]}"
    )]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub loader: LoaderArgs,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output. This is useful when piping to files or when your\n\
terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Suppress the loaded-files message and all diagnostics but errors.\n\
Results are still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Log resolution and load decisions to stderr. RUST_LOG overrides this."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Loader settings; each overrides the config file when given
#[derive(Args, Debug)]
pub struct LoaderArgs {
    /// Resolution anchor (cwd/git_root).
    #[arg(
        long,
        global = true,
        value_name = "MODE",
        env = "MENTION_LOADER_RESOLVE_RELATIVE_TO",
        long_help = "Where relative mentions are anchored.\n\n\
- cwd: the root directory (default)\n\
- git_root: the enclosing repository root, falling back to the root directory"
    )]
    pub resolve_relative_to: Option<String>,

    /// Extensions tried for mentions without one.
    #[arg(
        long,
        global = true,
        value_name = "EXTS",
        value_delimiter = ',',
        env = "MENTION_LOADER_TRY_EXTENSIONS",
        long_help = "Comma-separated extensions tried in order when a mention has no extension\n\
and does not end in a path separator (default: .md,.txt,.py)."
    )]
    pub try_extensions: Option<Vec<String>>,

    /// Largest file loaded, in bytes.
    #[arg(
        long,
        global = true,
        value_name = "BYTES",
        env = "MENTION_LOADER_MAX_FILE_SIZE",
        long_help = "Files larger than this are skipped unread (default: 1048576)."
    )]
    pub max_file_size: Option<u64>,

    /// Mentions resolved/loaded at once.
    #[arg(
        long,
        global = true,
        value_name = "N",
        env = "MENTION_LOADER_MAX_CONCURRENCY"
    )]
    pub max_concurrency: Option<usize>,

    /// Time budget per mention, in milliseconds.
    #[arg(
        long,
        global = true,
        value_name = "MS",
        env = "MENTION_LOADER_ITEM_TIMEOUT_MS",
        long_help = "A mention whose resolution or load exceeds this budget is reported as\n\
skipped_timeout (default: 5000)."
    )]
    pub item_timeout_ms: Option<u64>,

    /// Do not print the loaded-files message.
    #[arg(long, global = true, env = "MENTION_LOADER_HIDE_LOADED_FILES")]
    pub hide_loaded_files: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load every mention in a prompt and print the report.
    #[command(
        long_about = "Scan PROMPT (or stdin) for @mentions, load them and print the report.\n\n\
The loaded-files message goes to stderr; the report goes to stdout.\n\n\
Examples:\n\
  mention-loader load \"@README summarize\"\n\
  mention-loader --format raw load < prompt.txt\n\
  mention-loader load --stats \"@docs/ @notes\"\n"
    )]
    Load {
        /// Prompt text; read from stdin when omitted or `-`.
        prompt: Option<String>,

        /// Show statistics on stderr.
        #[arg(
            long,
            long_help = "Print mention statistics (status counts, context size, token estimate) to stderr."
        )]
        stats: bool,

        /// Token model for --stats.
        #[arg(
            long,
            default_value = "cl100k",
            value_name = "MODEL",
            long_help = "Token model used for the --stats estimate.\n\n\
Supported values:\n\
- cl100k (default)\n\
- o200k\n\
- heuristic"
        )]
        token_model: String,
    },

    /// List the mentions found in text, without touching the filesystem.
    Scan {
        /// Text to scan; read from stdin when omitted or `-`.
        text: Option<String>,
    },

    /// Show how tokens resolve against the current anchor.
    #[command(
        long_about = "Resolve each TOKEN (with or without a leading @) and print the anchor,\n\
the kind (file/directory/missing) and the resolved path. Nothing is read.\n\n\
Examples:\n\
  mention-loader resolve README\n\
  mention-loader --resolve-relative-to git_root resolve @docs/\n"
    )]
    Resolve {
        /// Mention tokens.
        #[arg(required = true)]
        tokens: Vec<String>,
    },

    /// Execute the tool capability on a JSON input document.
    #[command(
        long_about = "Read {\"mentions\": [...]} from INPUT (or stdin) and print\n\
{\"loaded_files\": [...], \"content\": ..., \"message\": ...}.\n"
    )]
    Tool {
        /// Input JSON file; stdin when omitted or `-`.
        input: Option<PathBuf>,
    },

    /// Print the tool descriptor (name, description, input schema).
    Schema,
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}

/// Positional text, or stdin for `None` / `-`
fn text_or_stdin(arg: Option<String>) -> Result<String> {
    match arg {
        Some(text) if text != "-" => Ok(text),
        _ => read_stdin(),
    }
}

fn file_or_stdin(arg: Option<&Path>) -> Result<String> {
    match arg {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => read_stdin(),
    }
}

/// Defaults, then the config file, then flags and environment
pub fn build_config(cli: &Cli) -> Result<LoaderConfig> {
    let mut config = match &cli.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    };

    let args = &cli.loader;
    if let Some(mode) = &args.resolve_relative_to {
        config.resolve_relative_to = mode.parse::<AnchorMode>()?;
    }
    if let Some(exts) = &args.try_extensions {
        config.try_extensions = exts.clone();
    }
    if let Some(size) = args.max_file_size {
        config.max_file_size = size;
    }
    if let Some(n) = args.max_concurrency {
        config.max_concurrency = n;
    }
    if let Some(ms) = args.item_timeout_ms {
        config.item_timeout_ms = ms;
    }
    if args.hide_loaded_files {
        config.show_loaded_files = false;
    }
    if let Some(root) = &cli.root {
        config.base_dir = Some(root.clone());
    }

    Ok(config)
}

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let format: OutputFormat = cli.format.parse().map_err(anyhow::Error::msg)?;
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    let config = build_config(&cli)?;
    let engine = MentionEngine::new(config).context("Invalid configuration")?;

    match cli.command {
        Commands::Load {
            prompt,
            stats,
            token_model,
        } => {
            let token_model: TokenModel = token_model.parse().map_err(anyhow::Error::msg)?;
            let prompt = text_or_stdin(prompt)?;
            let opts = LoadOptions {
                show_stats: stats,
                token_model,
                quiet: cli.quiet,
            };
            run_load(&engine, &prompt, opts, render_config).await
        }

        Commands::Scan { text } => {
            let text = text_or_stdin(text)?;
            let mentions = scan(&text);
            let renderer = Renderer::with_config(render_config);
            println!("{}", renderer.render_records(&mentions));
            Ok(())
        }

        Commands::Resolve { tokens } => {
            let resolver = Resolver::from_config(engine.config())
                .context("Cannot determine the base directory")?;
            let records: Vec<Resolution> = tokens
                .iter()
                .filter_map(|token| normalize_mention(token))
                .map(|token| {
                    let target = resolver.resolve(&token);
                    Resolution::new(&token, &resolver, &target)
                })
                .collect();
            let renderer = Renderer::with_config(render_config);
            println!("{}", renderer.render_records(&records));
            Ok(())
        }

        Commands::Tool { input } => {
            let input = file_or_stdin(input.as_deref())?;
            run_tool(&engine, &input, render_config).await
        }

        Commands::Schema => run_schema(render_config),
    }
}
