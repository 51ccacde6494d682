//! Link extraction from index pages

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

use super::fetcher::FetchError;
use crate::types::ArticlePath;

/// Extract the links inside every element matching `container`.
///
/// Links are resolved against `page_url`, limited to http(s), and returned
/// once each in document order. A page with no matching container does not
/// have the expected shape and yields [`FetchError::StructuralMismatch`].
pub fn extract_links(html: &str, page_url: &Url, container: &str) -> Result<Vec<Url>, FetchError> {
    let container_selector =
        Selector::parse(container).map_err(|_| FetchError::StructuralMismatch {
            url: page_url.to_string(),
            detail: format!("invalid container selector `{}`", container),
        })?;
    let link_selector = Selector::parse("a[href]").map_err(|_| FetchError::StructuralMismatch {
        url: page_url.to_string(),
        detail: "invalid link selector".to_string(),
    })?;

    let document = Html::parse_document(html);
    let mut containers = document.select(&container_selector).peekable();
    if containers.peek().is_none() {
        return Err(FetchError::StructuralMismatch {
            url: page_url.to_string(),
            detail: format!("no element matches `{}`", container),
        });
    }

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for element in containers {
        for link in element.select(&link_selector) {
            if let Some(href) = link.value().attr("href") {
                if let Ok(mut url) = page_url.join(href.trim()) {
                    url.set_fragment(None);
                    if (url.scheme() == "http" || url.scheme() == "https")
                        && seen.insert(url.as_str().to_string())
                    {
                        urls.push(url);
                    }
                }
            }
        }
    }

    Ok(urls)
}

/// Article paths for the links that belong to the site at `base`
pub fn article_paths(links: &[Url], base: &Url) -> Vec<ArticlePath> {
    links
        .iter()
        .filter_map(|url| ArticlePath::from_url(url, base))
        .collect()
}
