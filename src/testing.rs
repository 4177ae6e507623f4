//! Scripted fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{LlmError, SearchError};
use crate::llm::{Message, ModelInvoker};
use crate::search::SearchProvider;

/// Replays canned responses in order, then keeps returning a fallback.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Result<String, LlmError>,
    received: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            fallback: Err(LlmError::Completion("script exhausted".to_string())),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `response`.
    pub fn repeating(response: &str) -> Self {
        Self::new(Vec::<String>::new()).with_fallback(Ok(response.to_string()))
    }

    /// Every call fails.
    pub fn failing(reason: &str) -> Self {
        Self::new(Vec::<String>::new())
            .with_fallback(Err(LlmError::Completion(reason.to_string())))
    }

    pub fn with_fallback(mut self, fallback: Result<String, LlmError>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn received(&self) -> Vec<Vec<Message>> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelInvoker for ScriptedModel {
    async fn invoke(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.received.lock().unwrap().push(messages.to_vec());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Returns the same evidence text for every query, or fails every time.
pub struct StaticSearch {
    result: Result<String, String>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn returning(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn web_search_text(&self, query: &str) -> Result<String, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.result.clone().map_err(SearchError::SearchFailed)
    }
}
