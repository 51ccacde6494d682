//! Resumable fetch scheduler
//!
//! A pull run selects database entries that have no file in the output
//! store yet, shuffles them, takes the requested number and fetches them
//! with bounded concurrency:
//!
//! ```text
//! database ──absent from store──▶ candidates ──shuffle──▶ take N ──fetch+normalize──▶ write_new
//! ```
//!
//! The store is snapshotted once per run. Each work unit reports an
//! [`ItemOutcome`] and the run folds them into a [`PullReport`].

use futures::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::fetcher::FetchError;
use super::progress::RunProgress;
use super::source::ArticleSource;
use super::store::{OutputStore, StoreError};
use crate::codec;
use crate::content::TextNormalizer;
use crate::types::{ArticleDatabase, ArticlePath};

/// Failure of a single item
#[derive(Debug, Error)]
pub enum PullError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What happened to one selected article
#[derive(Debug)]
pub enum ItemOutcome {
    /// Fetched, normalized and written
    Written { path: ArticlePath, bytes: usize },
    /// Another writer created the entry after the snapshot
    AlreadyPresent { path: ArticlePath },
    /// Left unwritten for a future run
    Failed { path: ArticlePath, error: PullError },
    /// Not attempted because the run was cancelled
    Cancelled { path: ArticlePath },
}

impl ItemOutcome {
    pub fn path(&self) -> &ArticlePath {
        match self {
            Self::Written { path, .. }
            | Self::AlreadyPresent { path }
            | Self::Failed { path, .. }
            | Self::Cancelled { path } => path,
        }
    }
}

/// Articles chosen for a run
#[derive(Debug, Clone, Default)]
pub struct PullPlan {
    /// Entries in the output store at snapshot time
    pub existing: usize,
    /// Distinct database entries without a stored file
    pub candidates: usize,
    /// Shuffled selection, at most the requested count
    pub selected: Vec<ArticlePath>,
}

/// Summary of a pull run
#[derive(Debug, Default)]
pub struct PullReport {
    pub plan: PullPlan,
    pub written: usize,
    pub already_present: usize,
    pub cancelled: usize,
    pub failures: Vec<(ArticlePath, PullError)>,
}

impl PullReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Written { .. } => self.written += 1,
            ItemOutcome::AlreadyPresent { .. } => self.already_present += 1,
            ItemOutcome::Cancelled { .. } => self.cancelled += 1,
            ItemOutcome::Failed { path, error } => self.failures.push((path, error)),
        }
    }
}

/// Selects, fetches and persists unfetched articles
pub struct FetchScheduler<A, O> {
    source: A,
    store: O,
    normalizer: TextNormalizer,
    concurrency: usize,
    seed: Option<u64>,
    quiet: bool,
}

impl<A: ArticleSource, O: OutputStore> FetchScheduler<A, O> {
    pub fn new(source: A, store: O) -> Self {
        Self {
            source,
            store,
            normalizer: TextNormalizer::new(),
            concurrency: 4,
            seed: None,
            quiet: true,
        }
    }

    /// Maximum fetches in flight (at least one)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Deterministic shuffle
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Show a progress bar while fetching
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.quiet = !enabled;
        self
    }

    pub fn store(&self) -> &O {
        &self.store
    }

    /// Choose up to `requested` articles that have not been stored yet
    pub async fn plan(
        &self,
        database: &ArticleDatabase,
        requested: usize,
    ) -> Result<PullPlan, StoreError> {
        let existing = self.store.list().await?;

        let mut seen = HashSet::new();
        let mut candidates: Vec<ArticlePath> = database
            .iter()
            .filter(|path| {
                let filename = codec::encode(path);
                !existing.contains(&filename) && seen.insert(filename)
            })
            .cloned()
            .collect();

        let candidate_count = candidates.len();
        match self.seed {
            Some(seed) => candidates.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => candidates.shuffle(&mut rand::thread_rng()),
        }
        candidates.truncate(requested);

        debug!(
            "{} stored, {} candidates, {} selected",
            existing.len(),
            candidate_count,
            candidates.len()
        );

        Ok(PullPlan {
            existing: existing.len(),
            candidates: candidate_count,
            selected: candidates,
        })
    }

    /// Run one pull.
    ///
    /// With `paths_only` the selection is returned without any network I/O.
    /// Only a failure to snapshot the store fails the run; per-item failures
    /// are recorded in the report.
    pub async fn run(
        &self,
        database: &ArticleDatabase,
        requested: usize,
        paths_only: bool,
        cancel: &CancellationToken,
    ) -> Result<PullReport, StoreError> {
        let plan = self.plan(database, requested).await?;
        if paths_only || plan.selected.is_empty() {
            return Ok(PullReport {
                plan,
                ..PullReport::default()
            });
        }

        info!(
            "Pulling {} of {} unfetched articles ({} concurrent)",
            plan.selected.len(),
            plan.candidates,
            self.concurrency
        );

        let progress = RunProgress::new(plan.selected.len() as u64, self.quiet);
        let mut report = PullReport::default();

        let mut outcomes = stream::iter(plan.selected.iter().cloned())
            .map(|path| self.pull_one(path, cancel))
            .buffer_unordered(self.concurrency);

        while let Some(outcome) = outcomes.next().await {
            progress.advance(outcome.path().as_str());
            report.record(outcome);
        }
        drop(outcomes);

        progress.finish(format!(
            "{} written, {} failed",
            report.written,
            report.failed()
        ));
        report.plan = plan;
        Ok(report)
    }

    async fn pull_one(&self, path: ArticlePath, cancel: &CancellationToken) -> ItemOutcome {
        if cancel.is_cancelled() {
            return ItemOutcome::Cancelled { path };
        }

        let fetched = tokio::select! {
            _ = cancel.cancelled() => None,
            result = self.source.fetch_article(&path) => Some(result),
        };
        let markup = match fetched {
            None => return ItemOutcome::Cancelled { path },
            Some(Ok(markup)) => markup,
            Some(Err(e)) => {
                warn!("Failed to fetch {}: {}", path, e);
                return ItemOutcome::Failed {
                    path,
                    error: e.into(),
                };
            }
        };

        let content = self.normalizer.normalize(&markup).to_text();
        let filename = codec::encode(&path);

        match self.store.write_new(&filename, &content).await {
            Ok(()) => {
                debug!("Wrote {} ({} bytes)", filename, content.len());
                ItemOutcome::Written {
                    path,
                    bytes: content.len(),
                }
            }
            Err(StoreError::AlreadyExists(_)) => {
                debug!("{} appeared during the run, keeping it", filename);
                ItemOutcome::AlreadyPresent { path }
            }
            Err(e) => {
                warn!("Failed to store {}: {}", path, e);
                ItemOutcome::Failed {
                    path,
                    error: e.into(),
                }
            }
        }
    }
}
