//! Index traversal: bucket -> sub-index -> article links
//!
//! Strictly sequential with a pause after every sub-index and every bucket.
//! A tier that fails (bad status, transport error, timeout, unexpected page
//! shape) is logged and recorded, and traversal moves on to its next
//! sibling.

use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::fetcher::FetchError;
use super::index::{article_paths, extract_links};
use super::politeness::pause;
use super::source::IndexSource;
use crate::config::{IndexLevels, TraversalConfig, BUCKET_PLACEHOLDER};
use crate::types::ArticleDatabase;

/// Level of the index hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Bucket,
    SubIndex,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bucket => f.write_str("bucket"),
            Self::SubIndex => f.write_str("sub-index"),
        }
    }
}

/// A tier that was skipped
#[derive(Debug)]
pub struct TierFailure {
    pub tier: Tier,
    /// Bucket key or sub-index URL
    pub location: String,
    pub error: FetchError,
}

/// Result of a traversal run
#[derive(Debug, Default)]
pub struct TraversalReport {
    /// Discovered article paths in traversal order
    pub database: ArticleDatabase,
    pub failures: Vec<TierFailure>,
    pub buckets_visited: usize,
    pub sub_indexes_visited: usize,
    /// Whether the run stopped early
    pub cancelled: bool,
}

impl TraversalReport {
    pub fn failed_buckets(&self) -> usize {
        self.failures.iter().filter(|f| f.tier == Tier::Bucket).count()
    }

    pub fn failed_sub_indexes(&self) -> usize {
        self.failures.iter().filter(|f| f.tier == Tier::SubIndex).count()
    }

    fn fail(&mut self, tier: Tier, location: impl Into<String>, error: FetchError) {
        let location = location.into();
        warn!("Skipping {} {}: {}", tier, location, error);
        self.failures.push(TierFailure {
            tier,
            location,
            error,
        });
    }
}

/// Sequential traversal of a site index
pub struct IndexTraversal<S> {
    source: S,
    base_url: Url,
    bucket_url_template: String,
    config: TraversalConfig,
}

impl<S: IndexSource> IndexTraversal<S> {
    /// `base_url` decides which links are articles of the site
    pub fn new(
        source: S,
        base_url: Url,
        bucket_url_template: impl Into<String>,
        config: TraversalConfig,
    ) -> Self {
        Self {
            source,
            base_url,
            bucket_url_template: bucket_url_template.into(),
            config,
        }
    }

    /// URL of a bucket index page
    pub fn bucket_url(&self, bucket: &str) -> Result<Url, FetchError> {
        let url = self.bucket_url_template.replace(BUCKET_PLACEHOLDER, bucket);
        Url::parse(&url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))
    }

    /// Traverse `buckets` in order.
    ///
    /// Cancellation stops at the next fetch or pause; paths found so far are
    /// kept in the returned report.
    pub async fn traverse(&self, buckets: &[String], cancel: &CancellationToken) -> TraversalReport {
        let mut report = TraversalReport::default();

        for bucket in buckets {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let before = report.database.len();
            self.traverse_bucket(bucket, &mut report, cancel).await;
            if report.cancelled {
                break;
            }
            report.buckets_visited += 1;
            info!(
                "Bucket {}: {} articles ({} total)",
                bucket,
                report.database.len() - before,
                report.database.len()
            );

            if !pause(self.config.bucket_delay(), cancel).await {
                report.cancelled = true;
                break;
            }
        }

        if report.cancelled {
            info!("Traversal cancelled after {} articles", report.database.len());
        }
        report
    }

    async fn traverse_bucket(
        &self,
        bucket: &str,
        report: &mut TraversalReport,
        cancel: &CancellationToken,
    ) {
        let url = match self.bucket_url(bucket) {
            Ok(url) => url,
            Err(e) => return report.fail(Tier::Bucket, bucket, e),
        };

        let html = match self.fetch(&url, cancel).await {
            None => {
                report.cancelled = true;
                return;
            }
            Some(Ok(html)) => html,
            Some(Err(e)) => return report.fail(Tier::Bucket, bucket, e),
        };

        if self.config.levels == IndexLevels::SingleLevel {
            match extract_links(&html, &url, &self.config.article_container) {
                Ok(links) => report.database.extend(article_paths(&links, &self.base_url)),
                Err(e) => report.fail(Tier::Bucket, bucket, e),
            }
            return;
        }

        let sub_indexes = match extract_links(&html, &url, &self.config.sub_index_container) {
            Ok(links) => links,
            Err(e) => return report.fail(Tier::Bucket, bucket, e),
        };
        debug!("Bucket {} has {} sub-indexes", bucket, sub_indexes.len());

        for sub_index in sub_indexes {
            match self.fetch(&sub_index, cancel).await {
                None => {
                    report.cancelled = true;
                    return;
                }
                Some(Ok(html)) => {
                    report.sub_indexes_visited += 1;
                    match extract_links(&html, &sub_index, &self.config.article_container) {
                        Ok(links) => {
                            let paths = article_paths(&links, &self.base_url);
                            debug!("Sub-index {}: {} articles", sub_index, paths.len());
                            report.database.extend(paths);
                        }
                        Err(e) => report.fail(Tier::SubIndex, sub_index.as_str(), e),
                    }
                }
                Some(Err(e)) => report.fail(Tier::SubIndex, sub_index.as_str(), e),
            }

            if !pause(self.config.sub_index_delay(), cancel).await {
                report.cancelled = true;
                return;
            }
        }
    }

    /// Fetch unless cancelled first; `None` means cancelled
    async fn fetch(
        &self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Option<Result<String, FetchError>> {
        tokio::select! {
            _ = cancel.cancelled() => None,
            result = self.source.fetch_index(url) => Some(result),
        }
    }
}
