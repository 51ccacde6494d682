//! Mapping between article paths and flat storage filenames
//!
//! `topic/sancocho` is stored as `topic.sancocho.txt`. A path is expected to
//! be exactly `namespace/slug`; a leading separator is ignored.

use crate::types::{ArticlePath, PATH_SEPARATOR};

/// Character that replaces the namespace separator in filenames
pub const JOINER: char = '.';

/// Extension appended to every storage filename
pub const EXTENSION: &str = ".txt";

/// Encode an article path as a storage filename.
///
/// Every separator is replaced so the result is always a single path
/// component, but only paths with one separator round-trip through
/// [`decode`].
pub fn encode(path: &ArticlePath) -> String {
    let trimmed = path.as_str().trim_start_matches(PATH_SEPARATOR);
    let mut filename: String = trimmed
        .chars()
        .map(|c| if c == PATH_SEPARATOR { JOINER } else { c })
        .collect();
    filename.push_str(EXTENSION);
    filename
}

/// Decode a storage filename back into an article path.
///
/// Never fails: a filename without a joiner decodes to itself minus the
/// extension, so this is not a well-formedness check.
pub fn decode(filename: &str) -> ArticlePath {
    let stem = filename.strip_suffix(EXTENSION).unwrap_or(filename);
    match stem.split_once(JOINER) {
        Some((namespace, slug)) => {
            ArticlePath::new(format!("{}{}{}", namespace, PATH_SEPARATOR, slug))
        }
        None => ArticlePath::new(stem),
    }
}
