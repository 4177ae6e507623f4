//! DuckDuckGo search + page scraping.
//!
//! Searches the DuckDuckGo HTML endpoint (no API key needed), follows the top
//! result links, and keeps only the paragraph-like text of each page.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use super::{SearchProvider, NO_SEARCH_RESULTS};
use crate::error::SearchError;

const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0 Safari/537.36";

/// Only the top results are fetched and scraped.
const DEFAULT_MAX_PAGES: usize = 3;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Tags that typically hold article content.
const CONTENT_SELECTOR: &str = "p, article, b";

/// DuckDuckGo result anchors on the HTML endpoint.
const RESULT_LINK_SELECTOR: &str = "a.result__a";

/// Text blocks at least this long are always kept.
const LONG_BLOCK_CHARS: usize = 100;
/// Shorter blocks are kept only if they look like plain prose.
const SHORT_BLOCK_CHARS: usize = 50;
const SHORT_BLOCK_MIN_SPACES: usize = 4;
/// Lines need more than this many non-whitespace characters to survive.
const MIN_LINE_CHARS: usize = 50;

// =============================================================================
// SCRAPER
// =============================================================================
#[derive(Debug, Clone)]
pub struct DuckDuckGoScraper {
    client: reqwest::Client,
    search_url: String,
    max_pages: usize,
}

impl DuckDuckGoScraper {
    pub fn new() -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    /// Point the scraper at a different search endpoint (used for mocking).
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Query DuckDuckGo and return the result page URLs, best first.
    async fn search_links(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let url = format!("{}?q={}", self.search_url, urlencoding::encode(query));
        debug!(url = %url, "Fetching search results");

        let html = self.fetch(&url).await?;
        parse_result_links(&html, self.max_pages)
    }

    async fn fetch(&self, url: &str) -> Result<String, SearchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(SearchError::RateLimited);
            }
            return Err(SearchError::SearchFailed(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoScraper {
    async fn web_search_text(&self, query: &str) -> Result<String, SearchError> {
        info!(query = %query, "Performing web search");

        let links = self.search_links(query).await?;
        if links.is_empty() {
            warn!(query = %query, "No search results found");
            return Ok(NO_SEARCH_RESULTS.to_string());
        }

        let mut aggregated = String::new();
        for link in &links {
            debug!(url = %link, "Scraping result page");
            match self.fetch(link).await {
                Ok(html) => aggregated.push_str(&extract_relevant_text(&html)?),
                Err(e) => warn!(url = %link, error = %e, "Failed to retrieve page"),
            }
            aggregated.push_str("\n\n");
        }

        info!(query = %query, pages = links.len(), chars = aggregated.len(), "Search completed");
        Ok(aggregated)
    }
}

// =============================================================================
// HTML PARSING
// =============================================================================
fn selector(css: &'static str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("{css}: {e:?}")))
}

/// Pull result URLs out of a DuckDuckGo HTML results page.
fn parse_result_links(html: &str, max_links: usize) -> Result<Vec<String>, SearchError> {
    let document = Html::parse_document(html);
    let anchors = selector(RESULT_LINK_SELECTOR)?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let hrefs = document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(resolve_result_href);

    for url in hrefs {
        if links.len() >= max_links {
            break;
        }
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }

    Ok(links)
}

/// Turn a result href into a direct URL.
///
/// DuckDuckGo wraps results in a redirect (`//duckduckgo.com/l/?uddg=<url>`);
/// the real target is the `uddg` parameter. Ads and internal links are dropped.
fn resolve_result_href(href: &str) -> Option<String> {
    let url = if let Some((_, rest)) = href.split_once("uddg=") {
        let encoded = rest.split('&').next().unwrap_or(rest);
        urlencoding::decode(encoded).ok()?.into_owned()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        href.to_string()
    };

    (url.starts_with("http") && !url.contains("duckduckgo.com")).then_some(url)
}

/// Keep the readable prose of a page.
///
/// A block of `p`/`article`/`b` text is kept if it is long, or if it is
/// medium length, has a few words and only plain punctuation. Duplicate
/// blocks are dropped, short lines filtered, and what remains is joined with
/// blank lines.
pub fn extract_relevant_text(html: &str) -> Result<String, SearchError> {
    let document = Html::parse_document(html);
    let content = selector(CONTENT_SELECTOR)?;

    let mut seen = HashSet::new();
    let mut blocks = Vec::new();

    for element in document.select(&content) {
        let text = element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if is_prose(&text) && seen.insert(text.clone()) {
            blocks.push(text);
        }
    }

    let joined = blocks.join("\n");
    let kept: Vec<&str> = joined
        .lines()
        .filter(|line| line.chars().filter(|c| !c.is_whitespace()).count() > MIN_LINE_CHARS)
        .collect();

    Ok(kept.join("\n\n"))
}

fn is_prose(text: &str) -> bool {
    let chars = text.chars().count();
    if chars >= LONG_BLOCK_CHARS {
        return true;
    }

    chars >= SHORT_BLOCK_CHARS
        && text.matches(' ').count() >= SHORT_BLOCK_MIN_SPACES
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || ".,!?'\":;-".contains(c))
}
