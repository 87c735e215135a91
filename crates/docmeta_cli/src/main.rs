mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docmeta")]
#[command(version, about = "Documentation metadata and example source validator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate metadata documents against their schemas
    Metadata {
        /// Folder holding schema/ and metadata/
        #[arg(short, long, default_value = ".doc_gen")]
        doc_gen: PathBuf,

        /// Validation overrides file (YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Require titles to start upper case and not end with a period
        #[arg(long)]
        strict_titles: bool,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Scan a source tree for content-policy problems
    Project {
        /// Root of the source tree
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Validation overrides file (YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Fetch the profanity word list from this URL instead of the pinned list
        #[arg(long)]
        profanity_url: Option<String>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Find snippet tags used in more than one file
    Snippets {
        /// Root of the source tree
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Number of concurrent file reads
        #[arg(short, long, default_value_t = docmeta_scanner::DEFAULT_WORKERS)]
        workers: usize,

        /// Fail when duplicates are found
        #[arg(short, long)]
        strict: bool,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Metadata {
            doc_gen,
            config,
            strict_titles,
            format,
        } => commands::metadata::execute(&doc_gen, config.as_deref(), strict_titles, &format),

        Commands::Project {
            root,
            config,
            profanity_url,
            format,
        } => {
            commands::project::execute(&root, config.as_deref(), profanity_url, &format).await
        }

        Commands::Snippets {
            root,
            workers,
            strict,
            format,
        } => commands::snippets::execute(&root, workers, strict, &format).await,
    }
}
