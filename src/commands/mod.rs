//! Subcommand implementations

pub mod get;
pub mod init;
pub mod pull;
pub mod random;
pub mod traverse;

use anyhow::{Context, Result};
use corpus_acquire::config::Config;
use corpus_acquire::scraping::{FetchConfig, FetchEngine};

/// HTTP engine configured from the `[http]` section
pub fn fetch_engine(config: &Config) -> Result<FetchEngine> {
    FetchEngine::new(FetchConfig::from(&config.http)).context("Failed to build HTTP client")
}
