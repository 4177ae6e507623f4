//! # Error Types
//!
//! Typed errors for the research team. Only [`ConfigError`] ever escapes a
//! research run; model and search failures are caught where they happen and
//! turned into sentinel values so the run keeps going.

use thiserror::Error;

/// Errors raised while loading or resolving the team configuration.
///
/// These are the only errors that propagate out of the library: a team that
/// cannot be assembled has no way to produce a report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("No lead researcher (role=lead) found in configuration")]
    MissingLead,

    #[error("No search or report researcher configured alongside the lead")]
    NoResearchers,

    #[error("OPENAI_API_KEY is missing but researcher {0} uses an OpenAI model")]
    MissingApiKey(u32),

    #[error("Failed to initialize search client: {0}")]
    SearchClient(String),

    #[error("{key} has an invalid value '{value}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, value: impl ToString, reason: &str) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised by a [`ModelInvoker`](crate::llm::ModelInvoker).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("Completion failed: {0}")]
    Completion(String),
}

/// Errors raised by a [`SearchProvider`](crate::search::SearchProvider).
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Failed to perform web search: {0}")]
    SearchFailed(String),

    #[error("Rate limited by search provider, please wait")]
    RateLimited,

    #[error("Failed to parse search page: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
