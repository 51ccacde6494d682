//! Acquisition of articles from remote sites
//!
//! Key components:
//! - `IndexTraversal`: bucket -> sub-index -> article discovery
//! - `FetchScheduler`: resumable, bounded-concurrency article pulls
//! - `RandomSampler`: random passages with a minimum length
//! - `SiteClient` / `WikipediaClient`: remote sources behind the source traits
//! - `FetchEngine`: HTTP with timeouts and retry
//! - `DirectoryStore`: write-once output directory

pub mod fetcher;
pub mod index;
pub mod politeness;
pub mod progress;
pub mod sampler;
pub mod scheduler;
pub mod source;
pub mod store;
pub mod traversal;

pub use fetcher::{FetchConfig, FetchEngine, FetchError};
pub use progress::RunProgress;
pub use sampler::{Passage, RandomSampler, SampleError, SampleLimits};
pub use scheduler::{FetchScheduler, ItemOutcome, PullError, PullPlan, PullReport};
pub use source::{
    ArticleSource, IndexSource, RandomArticle, RandomArticleSource, SiteClient, WikipediaClient,
};
pub use store::{DirectoryStore, OutputStore, StoreError};
pub use traversal::{IndexTraversal, Tier, TierFailure, TraversalReport};
