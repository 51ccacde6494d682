use anyhow::{Context, Result};
use corpus_acquire::config::Config;
use corpus_acquire::scraping::{IndexTraversal, SiteClient};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::fetch_engine;

pub async fn traverse(
    config: Config,
    database: PathBuf,
    buckets: Vec<String>,
    cancel: &CancellationToken,
) -> Result<()> {
    let buckets = if buckets.is_empty() {
        config.traversal.buckets.clone()
    } else {
        buckets
    };

    let client = SiteClient::new(fetch_engine(&config)?, &config.site)?;
    let base_url = client.base_url().clone();
    let traversal = IndexTraversal::new(
        client,
        base_url,
        config.site.bucket_url_template.clone(),
        config.traversal.clone(),
    );

    info!("Traversing {} buckets", buckets.len());
    let report = traversal.traverse(&buckets, cancel).await;

    report
        .database
        .save(&database)
        .with_context(|| format!("Failed to save identifier database {}", database.display()))?;

    println!();
    println!("Traversal {}", if report.cancelled { "cancelled" } else { "complete" });
    println!("  Buckets visited:     {}", report.buckets_visited);
    println!("  Sub-indexes visited: {}", report.sub_indexes_visited);
    println!("  Failed buckets:      {}", report.failed_buckets());
    println!("  Failed sub-indexes:  {}", report.failed_sub_indexes());
    println!("  Articles found:      {}", report.database.len());
    println!("  Database:            {}", database.display());

    Ok(())
}
