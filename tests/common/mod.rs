//! Shared fakes for the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use research_team::{
    ConfigError, LlmError, Message, ModelInvoker, ResearcherConfig, SearchError, SearchProvider,
};

/// A model that replays a script, then repeats its fallback forever.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Result<String, LlmError>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    pub fn new<S: Into<String>>(responses: impl IntoIterator<Item = S>, fallback: &str) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            fallback: Ok(fallback.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(LlmError::Completion(reason.to_string())),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelInvoker for ScriptedModel {
    async fn invoke(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Search results keyed by subquery; unknown subqueries get `default`.
pub struct MapSearch {
    results: HashMap<String, String>,
    default: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl MapSearch {
    pub fn new(results: &[(&str, &str)], default: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            results: results
                .iter()
                .map(|(q, r)| (q.to_string(), r.to_string()))
                .collect(),
            default: default.map(str::to_string),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Fails every search.
    pub fn down() -> Arc<Self> {
        Self::new(&[], None)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MapSearch {
    async fn web_search_text(&self, query: &str) -> Result<String, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.results
            .get(query)
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| SearchError::SearchFailed("service unavailable".to_string()))
    }
}

/// Hands each researcher the model registered for its id.
pub fn models_by_id(
    models: Vec<(u32, Arc<ScriptedModel>)>,
) -> impl FnMut(&ResearcherConfig) -> Result<Arc<dyn ModelInvoker>, ConfigError> {
    let models: HashMap<u32, Arc<ScriptedModel>> = models.into_iter().collect();
    move |researcher: &ResearcherConfig| {
        let model = models
            .get(&researcher.id)
            .cloned()
            .ok_or_else(|| ConfigError::InvalidValue {
                key: format!("RESEARCHER_{}_LLM", researcher.id),
                value: researcher.model.clone(),
                reason: "no scripted model registered".to_string(),
            })?;
        Ok(model as Arc<dyn ModelInvoker>)
    }
}
