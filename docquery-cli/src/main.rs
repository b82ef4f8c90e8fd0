//! DocQuery CLI: terminal client for a document question-answering backend.
//!
//! Provides one-shot subcommands and an interactive REPL.

mod commands;
mod render;
mod repl;
mod slash;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// DocQuery: ask questions across your PDFs
#[derive(Parser, Debug)]
#[command(name = "docquery", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (where `.docquery/config.toml` is looked up)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Backend base URL, overriding configuration
    #[arg(short, long)]
    backend: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand (starts the interactive REPL if omitted)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check whether the backend is reachable
    Health,
    /// List documents held by the backend
    List,
    /// Upload a PDF to the backend
    Upload {
        /// Path to a .pdf file
        path: PathBuf,
    },
    /// Ask a question against one, several, or all documents
    Ask {
        /// The question
        question: String,
        /// Document to search (repeat to compare several)
        #[arg(short, long = "doc")]
        docs: Vec<String>,
        /// Search every document
        #[arg(short, long, conflicts_with = "docs")]
        all: bool,
        /// Translate the question before searching
        #[arg(short, long)]
        translate: bool,
        /// Source language (de, en, es)
        #[arg(long)]
        from: Option<String>,
        /// Target language (de, en, es)
        #[arg(long)]
        to: Option<String>,
    },
    /// Translate free text
    Translate {
        /// Text to translate
        text: String,
        /// Source language (de, en, es)
        #[arg(long)]
        from: Option<String>,
        /// Target language (de, en, es)
        #[arg(long)]
        to: Option<String>,
    },
    /// Analyze a document
    Analyze {
        /// Document name
        document: String,
        /// summary, word-frequency, statistics, or all
        #[arg(short, long, default_value = "summary")]
        kind: String,
    },
    /// Print (or open) the viewer link for a document page
    View {
        /// Document name
        document: String,
        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Open the link in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Start the interactive REPL
    Repl,
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create a default configuration file
    Init,
    /// Show current configuration
    Show,
}

/// Flags that apply to every subcommand.
#[derive(Debug, Clone, Default)]
pub(crate) struct GlobalOptions {
    pub backend: Option<String>,
    pub json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "docquery", "docquery")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "docquery.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let options = GlobalOptions {
        backend: cli.backend,
        json: cli.json,
    };

    let command = cli.command.unwrap_or(Commands::Repl);
    commands::handle_command(command, &workspace, &options).await
}
