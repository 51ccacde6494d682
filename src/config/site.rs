//! Remote site and index traversal configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Placeholder substituted with the bucket key in `bucket_url_template`
pub const BUCKET_PLACEHOLDER: &str = "{bucket}";

/// Placeholder substituted with the topic id in `print_url_template`
pub const ID_PLACEHOLDER: &str = "{id}";

/// Hierarchical content site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL that article paths are relative to
    pub base_url: String,
    /// URL of a bucket index page, with `{bucket}` substituted
    pub bucket_url_template: String,
    /// Printer-friendly article URL, with `{id}` substituted.
    /// Articles without a topic id fall back to the regular page.
    pub print_url_template: Option<String>,
    /// Pattern with one capture group locating the topic id in an article page
    pub topic_id_pattern: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.britannica.com/".to_string(),
            bucket_url_template: "https://www.britannica.com/sitemap/{bucket}".to_string(),
            print_url_template: Some("https://www.britannica.com/print/article/{id}".to_string()),
            topic_id_pattern: r#"data-topic-id="(\d+)""#.to_string(),
        }
    }
}

/// Shape of the site index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexLevels {
    /// bucket -> sub-index -> article
    TwoLevel,
    /// bucket -> article
    SingleLevel,
}

/// Index traversal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Bucket keys, traversed in order
    pub buckets: Vec<String>,
    /// Index shape
    pub levels: IndexLevels,
    /// CSS selector of the element holding sub-index links on a bucket page
    pub sub_index_container: String,
    /// CSS selector of the element holding article links on a sub-index page
    pub article_container: String,
    /// Pause after each sub-index (milliseconds)
    pub sub_index_delay_ms: u64,
    /// Pause after each bucket (milliseconds)
    pub bucket_delay_ms: u64,
}

impl TraversalConfig {
    pub fn sub_index_delay(&self) -> Duration {
        Duration::from_millis(self.sub_index_delay_ms)
    }

    pub fn bucket_delay(&self) -> Duration {
        Duration::from_millis(self.bucket_delay_ms)
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            buckets: ('a'..='z').map(String::from).collect(),
            levels: IndexLevels::TwoLevel,
            sub_index_container: "main ul".to_string(),
            article_container: "main ul".to_string(),
            sub_index_delay_ms: 1000,
            bucket_delay_ms: 5000,
        }
    }
}
