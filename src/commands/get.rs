use anyhow::{Context, Result};
use corpus_acquire::config::Config;
use corpus_acquire::content::normalize;
use corpus_acquire::scraping::{ArticleSource, SiteClient};
use corpus_acquire::types::ArticlePath;

use super::fetch_engine;

pub async fn get_article(config: Config, path: String) -> Result<()> {
    let client = SiteClient::new(fetch_engine(&config)?, &config.site)?;
    let path = ArticlePath::new(path);

    let markup = client
        .fetch_article(&path)
        .await
        .with_context(|| format!("Failed to fetch {}", path))?;

    println!("{}", normalize(&markup).to_text());
    Ok(())
}
