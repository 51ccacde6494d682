use anyhow::{Context, Result};
use corpus_acquire::config::Config;
use corpus_acquire::scraping::{DirectoryStore, FetchScheduler, SiteClient};
use corpus_acquire::types::ArticleDatabase;
use std::io::Write;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::fetch_engine;

pub struct PullOptions {
    pub output_dir: PathBuf,
    pub database: PathBuf,
    pub count: usize,
    pub paths_only: bool,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

pub async fn pull(config: Config, options: PullOptions, cancel: &CancellationToken) -> Result<()> {
    let database = ArticleDatabase::load(&options.database)?;

    let client = SiteClient::new(fetch_engine(&config)?, &config.site)?;
    let store = DirectoryStore::open(&options.output_dir).await?;
    let scheduler = FetchScheduler::new(client, store)
        .with_concurrency(config.pull.concurrency)
        .with_progress(!options.quiet && !options.paths_only);

    let report = scheduler
        .run(&database, options.count, options.paths_only, cancel)
        .await?;

    if options.paths_only {
        let listing: String = report
            .plan
            .selected
            .iter()
            .map(|path| format!("{}\n", path))
            .collect();
        match &options.output {
            Some(output) => std::fs::write(output, listing)
                .with_context(|| format!("Failed to write {}", output.display()))?,
            None => std::io::stdout().write_all(listing.as_bytes())?,
        }
        return Ok(());
    }

    for (path, error) in &report.failures {
        warn!("Not fetched: {} ({})", path, error);
    }

    println!();
    println!("Pull complete");
    println!("  Already stored:   {}", report.plan.existing);
    println!("  Unfetched:        {}", report.plan.candidates);
    println!("  Selected:         {}", report.plan.selected.len());
    println!("  Written:          {}", report.written);
    println!("  Already present:  {}", report.already_present);
    println!("  Failed:           {}", report.failed());
    if report.cancelled > 0 {
        println!("  Cancelled:        {}", report.cancelled);
    }

    Ok(())
}
