//! Fetch scheduler and random sampler configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Placeholder substituted with the article title in `article_url_template`
pub const TITLE_PLACEHOLDER: &str = "{title}";

/// Resumable pull configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PullConfig {
    /// Maximum article fetches in flight
    pub concurrency: usize,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Random sampler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Endpoint returning one random article title as JSON
    pub random_api_url: String,
    /// Article markup endpoint, with `{title}` substituted
    pub article_url_template: String,
    /// Position of the section measured against the minimum length
    pub section_index: usize,
    /// Default minimum section length (characters)
    pub min_length: usize,
    /// Give up after this many draws
    pub max_attempts: Option<u32>,
    /// Give up after this long (seconds)
    pub timeout_secs: Option<u64>,
    /// Discard disambiguation pages
    pub reject_disambiguation: bool,
}

impl SamplerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            random_api_url: "https://en.wikipedia.org/w/api.php?action=query&list=random&rnnamespace=0&rnlimit=1&format=json".to_string(),
            article_url_template: "https://en.wikipedia.org/api/rest_v1/page/mobile-html/{title}".to_string(),
            section_index: 1,
            min_length: 1000,
            max_attempts: None,
            timeout_secs: None,
            reject_disambiguation: true,
        }
    }
}
