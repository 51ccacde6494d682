//! corpus-acquire: polite, resumable acquisition of encyclopedic articles
//!
//! Builds a plain-text corpus from hierarchical content sites:
//! - Index traversal discovers article paths into a JSON identifier database
//! - Resumable pulls fetch unfetched articles with bounded concurrency
//! - Normalization strips structural noise into ordered text sections
//! - Random sampling draws passages with a minimum length

pub mod codec;
pub mod config;
pub mod content;
pub mod scraping;
pub mod types;
pub mod util;

pub use config::Config;
pub use types::*;
