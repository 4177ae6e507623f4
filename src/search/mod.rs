//! # Search Module
//!
//! Web search for the search researcher. A [`SearchProvider`] takes a query
//! and returns one block of newline-delimited evidence text; every non-empty
//! line of that block is treated as a separate snippet downstream.

mod duckduckgo;

use async_trait::async_trait;

pub use duckduckgo::{extract_relevant_text, DuckDuckGoScraper};

use crate::error::SearchError;

/// Returned by providers when a search produced no results at all.
pub const NO_SEARCH_RESULTS: &str = "No search results found.";

/// Search + fetch + text extraction, behind one call.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a web search and return the aggregated evidence text.
    async fn web_search_text(&self, query: &str) -> Result<String, SearchError>;
}
