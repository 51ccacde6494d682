//! Core types for the acquisition pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Separator between the namespace and the slug of an article path
pub const PATH_SEPARATOR: char = '/';

// ============================================================================
// Article identifiers
// ============================================================================

/// Hierarchical article identifier such as `topic/sancocho`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticlePath(String);

impl ArticlePath {
    /// Create a path from any string-like value
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Derive an article path from a link on the site.
    ///
    /// The site base path is removed so that `https://site/topic/a?x=1#y`
    /// becomes `topic/a`. Links to other hosts yield `None`.
    pub fn from_url(url: &Url, base: &Url) -> Option<Self> {
        if url.host_str() != base.host_str() {
            return None;
        }

        let base_path = base.path().trim_end_matches('/');
        let path = match url.path().strip_prefix(base_path) {
            Some(rest) if rest.is_empty() || rest.starts_with(PATH_SEPARATOR) => rest,
            _ => url.path(),
        };
        let path = path.trim_matches(PATH_SEPARATOR);

        if path.is_empty() {
            None
        } else {
            Some(Self(path.to_string()))
        }
    }

    /// Namespace segment (`topic` in `topic/sancocho`)
    pub fn namespace(&self) -> Option<&str> {
        self.0
            .trim_start_matches(PATH_SEPARATOR)
            .split_once(PATH_SEPARATOR)
            .map(|(namespace, _)| namespace)
    }

    /// Slug segment (`sancocho` in `topic/sancocho`)
    pub fn slug(&self) -> &str {
        let trimmed = self.0.trim_start_matches(PATH_SEPARATOR);
        trimmed
            .split_once(PATH_SEPARATOR)
            .map(|(_, slug)| slug)
            .unwrap_or(trimmed)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticlePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArticlePath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ArticlePath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ============================================================================
// Identifier database
// ============================================================================

/// Errors reading or writing the identifier database
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Identifier database {path} is not a JSON array of paths: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Ordered, append-only list of article paths persisted as one JSON array.
///
/// Duplicates are kept: the output store, not this list, decides what has
/// already been fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleDatabase {
    paths: Vec<ArticlePath>,
}

impl ArticleDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append paths in order
    pub fn extend(&mut self, paths: impl IntoIterator<Item = ArticlePath>) {
        self.paths.extend(paths);
    }

    pub fn push(&mut self, path: ArticlePath) {
        self.paths.push(path);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArticlePath> {
        self.paths.iter()
    }

    pub fn paths(&self) -> &[ArticlePath] {
        &self.paths
    }

    /// Load a database from a JSON file
    pub fn load(path: &Path) -> Result<Self, DatabaseError> {
        let json = std::fs::read_to_string(path).map_err(|source| DatabaseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| DatabaseError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Write the whole database as a JSON array
    pub fn save(&self, path: &Path) -> Result<(), DatabaseError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| DatabaseError::Json {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| DatabaseError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl FromIterator<ArticlePath> for ArticleDatabase {
    fn from_iter<I: IntoIterator<Item = ArticlePath>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ArticleDatabase {
    type Item = &'a ArticlePath;
    type IntoIter = std::slice::Iter<'a, ArticlePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

// ============================================================================
// Normalized content
// ============================================================================

/// Article text split into ordered, cleaned sections.
///
/// Position matters: section 0 is usually a lead/title artifact and section 1
/// the first substantive passage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedArticle {
    pub sections: Vec<String>,
}

impl NormalizedArticle {
    pub fn new(sections: Vec<String>) -> Self {
        Self { sections }
    }

    pub fn section(&self, index: usize) -> Option<&str> {
        self.sections.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sections joined by newlines, the on-disk representation
    pub fn to_text(&self) -> String {
        self.sections.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segments() {
        let path = ArticlePath::new("topic/sancocho");
        assert_eq!(path.namespace(), Some("topic"));
        assert_eq!(path.slug(), "sancocho");

        let bare = ArticlePath::new("sancocho");
        assert_eq!(bare.namespace(), None);
        assert_eq!(bare.slug(), "sancocho");
    }

    #[test]
    fn test_path_from_url() {
        let base = Url::parse("https://www.example.com/").unwrap();

        let link = Url::parse("https://www.example.com/topic/sancocho?ref=a#history").unwrap();
        assert_eq!(
            ArticlePath::from_url(&link, &base),
            Some(ArticlePath::new("topic/sancocho"))
        );

        let foreign = Url::parse("https://other.com/topic/sancocho").unwrap();
        assert_eq!(ArticlePath::from_url(&foreign, &base), None);

        let root = Url::parse("https://www.example.com/").unwrap();
        assert_eq!(ArticlePath::from_url(&root, &base), None);
    }

    #[test]
    fn test_path_from_url_with_base_path() {
        let base = Url::parse("https://example.com/wiki/").unwrap();
        let link = Url::parse("https://example.com/wiki/topic/a").unwrap();
        assert_eq!(
            ArticlePath::from_url(&link, &base),
            Some(ArticlePath::new("topic/a"))
        );
    }

    #[test]
    fn test_database_json_is_plain_array() {
        let db: ArticleDatabase = ["topic/a", "topic/b", "topic/a"]
            .into_iter()
            .map(ArticlePath::from)
            .collect();

        let json = serde_json::to_string(&db).unwrap();
        assert_eq!(json, r#"["topic/a","topic/b","topic/a"]"#);

        let back: ArticleDatabase = serde_json::from_str(&json).unwrap();
        assert_eq!(back, db);
        assert_eq!(back.len(), 3);
    }

    #[test]
    fn test_database_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("database.json");

        let mut db = ArticleDatabase::new();
        db.push(ArticlePath::new("topic/sancocho"));
        db.extend(vec![ArticlePath::new("biography/ada-lovelace")]);
        db.save(&file).unwrap();

        let loaded = ArticleDatabase::load(&file).unwrap();
        assert_eq!(loaded, db);
    }

    #[test]
    fn test_database_load_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("database.json");
        std::fs::write(&file, r#"{"paths": []}"#).unwrap();

        let err = ArticleDatabase::load(&file).unwrap_err();
        assert!(matches!(err, DatabaseError::Json { .. }));
    }

    #[test]
    fn test_normalized_article_text() {
        let article = NormalizedArticle::new(vec!["Title".into(), "Body text.".into()]);
        assert_eq!(article.to_text(), "Title\nBody text.");
        assert_eq!(article.section(1), Some("Body text."));
        assert_eq!(article.section(2), None);
    }
}
