//! Remote content sources
//!
//! The pipeline talks to the network only through these traits, so tests
//! can substitute in-memory fakes:
//! - [`IndexSource`]: raw markup of index pages
//! - [`ArticleSource`]: raw markup of one article by path
//! - [`RandomArticleSource`]: raw markup of a random article
//!
//! [`SiteClient`] implements the first two against a hierarchical site and
//! [`WikipediaClient`] implements the random source.

use anyhow::Context;
use async_trait::async_trait;
use regex_lite::Regex;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::fetcher::{FetchEngine, FetchError};
use crate::config::{SamplerConfig, SiteConfig, ID_PLACEHOLDER, TITLE_PLACEHOLDER};
use crate::types::ArticlePath;

/// Source of index page markup
#[async_trait]
pub trait IndexSource: Send + Sync {
    /// Fetch the raw markup of an index page
    async fn fetch_index(&self, url: &Url) -> Result<String, FetchError>;
}

/// Source of article markup addressed by path
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch the raw markup of an article
    async fn fetch_article(&self, path: &ArticlePath) -> Result<String, FetchError>;
}

/// A randomly drawn article
#[derive(Debug, Clone)]
pub struct RandomArticle {
    pub title: String,
    pub markup: String,
}

/// Source of random articles
#[async_trait]
pub trait RandomArticleSource: Send + Sync {
    async fn fetch_random(&self) -> Result<RandomArticle, FetchError>;
}

#[async_trait]
impl<T: IndexSource + ?Sized> IndexSource for Arc<T> {
    async fn fetch_index(&self, url: &Url) -> Result<String, FetchError> {
        (**self).fetch_index(url).await
    }
}

#[async_trait]
impl<T: ArticleSource + ?Sized> ArticleSource for Arc<T> {
    async fn fetch_article(&self, path: &ArticlePath) -> Result<String, FetchError> {
        (**self).fetch_article(path).await
    }
}

#[async_trait]
impl<T: RandomArticleSource + ?Sized> RandomArticleSource for Arc<T> {
    async fn fetch_random(&self) -> Result<RandomArticle, FetchError> {
        (**self).fetch_random().await
    }
}

// ============================================================================
// Hierarchical site
// ============================================================================

/// Client for a hierarchical content site.
///
/// Articles are fetched from `base_url + path`. When a print template is
/// configured and the page carries a topic id, the printer-friendly view is
/// fetched instead.
#[derive(Debug, Clone)]
pub struct SiteClient {
    engine: FetchEngine,
    base_url: Url,
    print_url_template: Option<String>,
    topic_id: Regex,
}

impl SiteClient {
    pub fn new(engine: FetchEngine, config: &SiteConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid site base URL: {}", config.base_url))?;
        let topic_id = Regex::new(&config.topic_id_pattern)
            .with_context(|| format!("Invalid topic id pattern: {}", config.topic_id_pattern))?;

        Ok(Self {
            engine,
            base_url,
            print_url_template: config.print_url_template.clone(),
            topic_id,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the regular article page
    pub fn article_url(&self, path: &ArticlePath) -> Result<Url, FetchError> {
        let relative = path.as_str().trim_start_matches('/');
        self.base_url
            .join(relative)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", relative, e)))
    }

    /// First topic id on an article page
    pub fn topic_id<'a>(&self, html: &'a str) -> Option<&'a str> {
        self.topic_id
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|id| !id.is_empty())
    }

    fn print_url(&self, template: &str, id: &str) -> Result<Url, FetchError> {
        let url = template.replace(ID_PLACEHOLDER, id);
        Url::parse(&url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl IndexSource for SiteClient {
    async fn fetch_index(&self, url: &Url) -> Result<String, FetchError> {
        self.engine.fetch_text(url).await
    }
}

#[async_trait]
impl ArticleSource for SiteClient {
    async fn fetch_article(&self, path: &ArticlePath) -> Result<String, FetchError> {
        let page = self.engine.fetch_text(&self.article_url(path)?).await?;

        let Some(template) = &self.print_url_template else {
            return Ok(page);
        };
        match self.topic_id(&page) {
            Some(id) => {
                let print_url = self.print_url(template, id)?;
                debug!("Fetching print view of {} from {}", path, print_url);
                self.engine.fetch_text(&print_url).await
            }
            None => Ok(page),
        }
    }
}

// ============================================================================
// Random articles
// ============================================================================

#[derive(Debug, Deserialize)]
struct RandomResponse {
    query: RandomQuery,
}

#[derive(Debug, Deserialize)]
struct RandomQuery {
    random: Vec<RandomEntry>,
}

#[derive(Debug, Deserialize)]
struct RandomEntry {
    title: String,
}

/// Random articles from a MediaWiki random-title API and page endpoint
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    engine: FetchEngine,
    random_api_url: Url,
    article_url_template: String,
}

impl WikipediaClient {
    pub fn new(engine: FetchEngine, config: &SamplerConfig) -> anyhow::Result<Self> {
        let random_api_url = Url::parse(&config.random_api_url)
            .with_context(|| format!("Invalid random API URL: {}", config.random_api_url))?;

        Ok(Self {
            engine,
            random_api_url,
            article_url_template: config.article_url_template.clone(),
        })
    }

    /// Draw one random article title
    pub async fn random_title(&self) -> Result<String, FetchError> {
        let body = self.engine.fetch_text(&self.random_api_url).await?;
        parse_random_title(&body).map_err(|detail| FetchError::StructuralMismatch {
            url: self.random_api_url.to_string(),
            detail,
        })
    }

    /// Fetch the markup of an article by title
    pub async fn article(&self, title: &str) -> Result<String, FetchError> {
        let url = article_url(&self.article_url_template, title)?;
        self.engine.fetch_text(&url).await
    }
}

#[async_trait]
impl RandomArticleSource for WikipediaClient {
    async fn fetch_random(&self) -> Result<RandomArticle, FetchError> {
        let title = self.random_title().await?;
        debug!("Drew random article {}", title);
        let markup = self.article(&title).await?;
        Ok(RandomArticle { title, markup })
    }
}

fn parse_random_title(body: &str) -> Result<String, String> {
    let response: RandomResponse =
        serde_json::from_str(body).map_err(|e| format!("invalid random response: {}", e))?;
    response
        .query
        .random
        .into_iter()
        .next()
        .map(|entry| entry.title)
        .ok_or_else(|| "random response contained no titles".to_string())
}

/// Substitute a title into a page URL template.
///
/// Spaces become underscores; characters that would end the path segment
/// are percent-encoded.
fn article_url(template: &str, title: &str) -> Result<Url, FetchError> {
    let segment = title
        .replace('%', "%25")
        .replace(' ', "_")
        .replace('/', "%2F")
        .replace('?', "%3F")
        .replace('#', "%23");
    let url = template.replace(TITLE_PLACEHOLDER, &segment);
    Url::parse(&url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::fetcher::FetchConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn site_client(config: &SiteConfig) -> SiteClient {
        SiteClient::new(FetchEngine::new(FetchConfig::default()).unwrap(), config).unwrap()
    }

    #[test]
    fn test_article_url_joins_base() {
        let client = site_client(&SiteConfig::default());
        let url = client.article_url(&"topic/sancocho".into()).unwrap();
        assert_eq!(url.as_str(), "https://www.britannica.com/topic/sancocho");

        let leading = client.article_url(&"/topic/sancocho".into()).unwrap();
        assert_eq!(leading, url);
    }

    #[test]
    fn test_topic_id_extraction() {
        let client = site_client(&SiteConfig::default());
        let html = r#"<div class="md-article" data-topic-id="1234567" data-type="topic">"#;
        assert_eq!(client.topic_id(html), Some("1234567"));
        assert_eq!(client.topic_id(r#"<div data-topic-id="">"#), None);
        assert_eq!(client.topic_id("<div>no id</div>"), None);
    }

    #[test]
    fn test_print_url() {
        let client = site_client(&SiteConfig::default());
        let url = client
            .print_url("https://www.britannica.com/print/article/{id}", "42")
            .unwrap();
        assert_eq!(url.as_str(), "https://www.britannica.com/print/article/42");
    }

    fn mock_site(server: &MockServer, with_print_view: bool) -> SiteClient {
        let config = SiteConfig {
            base_url: format!("{}/", server.uri()),
            print_url_template: with_print_view
                .then(|| format!("{}/print/article/{{id}}", server.uri())),
            ..SiteConfig::default()
        };
        site_client(&config)
    }

    async fn serve(server: &MockServer, route: &str, body: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(times)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_article_with_topic_id_uses_print_view() {
        let server = MockServer::start().await;
        serve(&server, "/topic/sancocho", r#"<div data-topic-id="42">page</div>"#, 1).await;
        serve(&server, "/print/article/42", "<p>print view</p>", 1).await;

        let client = mock_site(&server, true);
        let markup = client.fetch_article(&"topic/sancocho".into()).await.unwrap();
        assert_eq!(markup, "<p>print view</p>");
    }

    #[tokio::test]
    async fn test_article_without_topic_id_keeps_page() {
        let server = MockServer::start().await;
        serve(&server, "/topic/sancocho", "<div>page</div>", 1).await;
        serve(&server, "/print/article/42", "<p>print view</p>", 0).await;

        let client = mock_site(&server, true);
        let markup = client.fetch_article(&"topic/sancocho".into()).await.unwrap();
        assert_eq!(markup, "<div>page</div>");
    }

    #[tokio::test]
    async fn test_article_without_print_template_keeps_page() {
        let server = MockServer::start().await;
        let page = r#"<div data-topic-id="42">page</div>"#;
        serve(&server, "/topic/sancocho", page, 1).await;
        serve(&server, "/print/article/42", "<p>print view</p>", 0).await;

        let client = mock_site(&server, false);
        let markup = client.fetch_article(&"topic/sancocho".into()).await.unwrap();
        assert_eq!(markup, page);
    }

    #[tokio::test]
    async fn test_failed_print_view_fails_article() {
        let server = MockServer::start().await;
        serve(&server, "/topic/sancocho", r#"<div data-topic-id="42">page</div>"#, 1).await;
        Mock::given(method("GET"))
            .and(path("/print/article/42"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = mock_site(&server, true);
        let err = client.fetch_article(&"topic/sancocho".into()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[test]
    fn test_parse_random_title() {
        let body = r#"{"batchcomplete":"","continue":{"rncontinue":"0.1|0.2|0|0"},"query":{"random":[{"id":736,"ns":0,"title":"Albert Einstein"}]}}"#;
        assert_eq!(parse_random_title(body).unwrap(), "Albert Einstein");
        assert!(parse_random_title(r#"{"query":{"random":[]}}"#).is_err());
        assert!(parse_random_title("<html>").is_err());
    }

    #[test]
    fn test_title_substitution() {
        let template = "https://en.wikipedia.org/api/rest_v1/page/mobile-html/{title}";
        let url = article_url(template, "Albert Einstein").unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/mobile-html/Albert_Einstein"
        );

        let slash = article_url(template, "AC/DC").unwrap();
        assert_eq!(slash.path(), "/api/rest_v1/page/mobile-html/AC%2FDC");
    }
}
