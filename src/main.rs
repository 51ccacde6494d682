//! corpus-acquire: polite, resumable acquisition of encyclopedic articles

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use corpus_acquire::config::{Config, LogFormat};
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "corpus-acquire")]
#[command(about = "Polite, resumable acquisition of encyclopedic articles into a plain-text corpus")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (no progress output)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the site index and write the identifier database
    Traverse {
        /// Identifier database to write
        #[arg(short, long)]
        database: PathBuf,

        /// Bucket keys to traverse (defaults to the configured list)
        #[arg(short, long)]
        bucket: Vec<String>,
    },

    /// Fetch articles that are not in the output directory yet
    Pull {
        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Identifier database to read
        #[arg(short, long)]
        database: PathBuf,

        /// Number of articles to fetch
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Only print the selected paths
        #[arg(long)]
        paths_only: bool,

        /// File receiving the selected paths in paths-only mode
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the normalized sections of one article
    Get {
        /// Article path, e.g. topic/sancocho
        path: String,
    },

    /// Draw random passages with a minimum length
    Random {
        /// Minimum passage length in characters
        #[arg(short, long)]
        min_length: Option<usize>,

        /// Number of passages
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Write passages to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Give up after this many draws per passage
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Give up after this many seconds per passage
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;

    // Setup logging
    let log_level = config.logging.level.with_verbosity(cli.verbose);
    match config.logging.format {
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(log_level)
                .with_target(false)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(log_level)
                .with_target(false)
                .with_writer(std::io::stderr)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, stopping after in-flight work");
            on_signal.cancel();
        }
    });

    match cli.command {
        Commands::Traverse { database, bucket } => {
            commands::traverse::traverse(config, database, bucket, &cancel).await
        }
        Commands::Pull {
            output_dir,
            database,
            count,
            paths_only,
            output,
        } => {
            let options = commands::pull::PullOptions {
                output_dir,
                database,
                count,
                paths_only,
                output,
                quiet: cli.quiet,
            };
            commands::pull::pull(config, options, &cancel).await
        }
        Commands::Get { path } => commands::get::get_article(config, path).await,
        Commands::Random {
            min_length,
            count,
            output,
            max_attempts,
            timeout_secs,
        } => {
            let options = commands::random::RandomOptions {
                min_length,
                count,
                output,
                max_attempts,
                timeout_secs,
            };
            commands::random::random_passages(config, options, &cancel).await
        }
        Commands::Init { path } => commands::init::init_config(path).await,
    }
}
