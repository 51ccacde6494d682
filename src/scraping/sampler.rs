//! Constrained random sampling
//!
//! Draws random articles until the section at a fixed position is long
//! enough. Rejected draws are discarded, never persisted. Without limits
//! the loop runs until it succeeds or is cancelled. Consecutive fetch
//! failures back off exponentially before the next draw.

use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::fetcher::FetchError;
use super::politeness::{backoff_delay, pause};
use super::source::RandomArticleSource;
use crate::content::{is_disambiguation_like, TextNormalizer};
use crate::util::char_len;

/// Longest wait between draws after repeated fetch failures
pub const MAX_FAILURE_BACKOFF: Duration = Duration::from_secs(30);

/// Errors from the sampler
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("No passage of at least {min_length} characters after {attempts} attempts")]
    Exhausted { attempts: u32, min_length: usize },
    #[error("Sampling cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

/// Optional bounds on one sampling loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleLimits {
    pub max_attempts: Option<u32>,
    pub deadline: Option<Duration>,
}

impl SampleLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// An accepted passage
#[derive(Debug, Clone)]
pub struct Passage {
    /// Title of the article it came from
    pub title: String,
    pub text: String,
    /// Draws it took, including this one
    pub attempts: u32,
}

/// Why a draw was discarded
#[derive(Debug)]
enum Rejection {
    Fetch(FetchError),
    MissingSection,
    Disambiguation,
    TooShort(usize),
}

/// Draws random passages with a minimum length
pub struct RandomSampler<R> {
    source: R,
    normalizer: TextNormalizer,
    section_index: usize,
    reject_disambiguation: bool,
    limits: SampleLimits,
    failure_backoff: Duration,
}

impl<R: RandomArticleSource> RandomSampler<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            normalizer: TextNormalizer::new(),
            section_index: 1,
            reject_disambiguation: false,
            limits: SampleLimits::unbounded(),
            failure_backoff: Duration::from_millis(500),
        }
    }

    /// Position of the measured section
    pub fn with_section_index(mut self, section_index: usize) -> Self {
        self.section_index = section_index;
        self
    }

    pub fn with_limits(mut self, limits: SampleLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Base wait after a failed fetch, doubled per consecutive failure
    pub fn with_failure_backoff(mut self, base: Duration) -> Self {
        self.failure_backoff = base;
        self
    }

    /// Discard disambiguation pages
    pub fn reject_disambiguation(mut self, reject: bool) -> Self {
        self.reject_disambiguation = reject;
        self
    }

    /// Draw until the measured section has at least `min_length` characters
    pub async fn sample(
        &self,
        min_length: usize,
        cancel: &CancellationToken,
    ) -> Result<Passage, SampleError> {
        let deadline = self.limits.deadline.map(|d| Instant::now() + d);
        let mut attempts = 0u32;
        let mut consecutive_failures = 0u32;

        loop {
            let out_of_time = deadline.is_some_and(|deadline| Instant::now() >= deadline);
            if out_of_time || self.limits.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(SampleError::Exhausted {
                    attempts,
                    min_length,
                });
            }
            if cancel.is_cancelled() {
                return Err(SampleError::Cancelled { attempts });
            }

            attempts += 1;
            let draw = tokio::select! {
                _ = cancel.cancelled() => return Err(SampleError::Cancelled { attempts }),
                _ = sleep_until(deadline) => {
                    return Err(SampleError::Exhausted { attempts, min_length });
                }
                draw = self.source.fetch_random() => draw,
            };

            let article = match draw {
                Ok(article) => {
                    consecutive_failures = 0;
                    article
                }
                Err(e) => {
                    self.discard(attempts, "", Rejection::Fetch(e));
                    consecutive_failures += 1;
                    tokio::select! {
                        _ = sleep_until(deadline) => {
                            return Err(SampleError::Exhausted { attempts, min_length });
                        }
                        resumed = pause(self.failure_delay(consecutive_failures), cancel) => {
                            if !resumed {
                                return Err(SampleError::Cancelled { attempts });
                            }
                        }
                    }
                    continue;
                }
            };

            match self.measure(&article.markup, min_length) {
                Ok(text) => {
                    info!(
                        "Accepted {} after {} attempts ({} characters)",
                        article.title,
                        attempts,
                        char_len(&text)
                    );
                    return Ok(Passage {
                        title: article.title,
                        text,
                        attempts,
                    });
                }
                Err(rejection) => self.discard(attempts, &article.title, rejection),
            }
        }
    }

    /// Draw `count` passages one after another
    pub async fn sample_many(
        &self,
        count: usize,
        min_length: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Passage>, SampleError> {
        let mut passages = Vec::with_capacity(count);
        for _ in 0..count {
            passages.push(self.sample(min_length, cancel).await?);
        }
        Ok(passages)
    }

    fn failure_delay(&self, consecutive_failures: u32) -> Duration {
        backoff_delay(self.failure_backoff, consecutive_failures).min(MAX_FAILURE_BACKOFF)
    }

    fn measure(&self, markup: &str, min_length: usize) -> Result<String, Rejection> {
        let article = self.normalizer.normalize(markup);

        if self.reject_disambiguation && is_disambiguation_like(&article.to_text()) {
            return Err(Rejection::Disambiguation);
        }

        let section = article
            .section(self.section_index)
            .ok_or(Rejection::MissingSection)?;
        let length = char_len(section);
        if length < min_length {
            return Err(Rejection::TooShort(length));
        }
        Ok(section.to_string())
    }

    fn discard(&self, attempt: u32, title: &str, rejection: Rejection) {
        match rejection {
            Rejection::Fetch(e) => warn!("Draw {} failed: {}", attempt, e),
            Rejection::MissingSection => {
                debug!("Draw {} ({}) has no section {}", attempt, title, self.section_index)
            }
            Rejection::Disambiguation => {
                debug!("Draw {} ({}) is a disambiguation page", attempt, title)
            }
            Rejection::TooShort(length) => {
                debug!("Draw {} ({}) too short: {} characters", attempt, title, length)
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
