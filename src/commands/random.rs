use anyhow::{Context, Result};
use corpus_acquire::config::Config;
use corpus_acquire::scraping::{RandomSampler, SampleLimits, WikipediaClient};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::fetch_engine;

pub struct RandomOptions {
    pub min_length: Option<usize>,
    pub count: usize,
    pub output: Option<PathBuf>,
    pub max_attempts: Option<u32>,
    pub timeout_secs: Option<u64>,
}

pub async fn random_passages(
    config: Config,
    options: RandomOptions,
    cancel: &CancellationToken,
) -> Result<()> {
    let client = WikipediaClient::new(fetch_engine(&config)?, &config.sampler)?;

    let limits = SampleLimits {
        max_attempts: options.max_attempts.or(config.sampler.max_attempts),
        deadline: options
            .timeout_secs
            .map(Duration::from_secs)
            .or(config.sampler.timeout()),
    };
    let sampler = RandomSampler::new(client)
        .with_section_index(config.sampler.section_index)
        .reject_disambiguation(config.sampler.reject_disambiguation)
        .with_limits(limits)
        .with_failure_backoff(config.http.retry_backoff());

    let min_length = options.min_length.unwrap_or(config.sampler.min_length);
    let passages = sampler.sample_many(options.count, min_length, cancel).await?;

    let text = passages
        .iter()
        .map(|passage| passage.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    match &options.output {
        Some(output) => std::fs::write(output, format!("{}\n", text))
            .with_context(|| format!("Failed to write {}", output.display()))?,
        None => println!("{}", text),
    }

    Ok(())
}
