//! # Structured Output Protocol
//!
//! Language models are unreliable about formatting. Every model call whose
//! output has to satisfy a syntactic contract ("exactly 4 comma-separated
//! items", "a non-empty answer", "say yes") goes through
//! [`StructuredOutput::request`]:
//!
//! 1. invoke the model;
//! 2. if the contract holds, record the response in the agent's log and return it;
//! 3. otherwise append the contract's correction message and try again;
//! 4. after `max_attempts`, hand back the last response as a best effort.
//!
//! A model error ends the call at once with [`Outcome::Failed`]; the caller
//! decides which sentinel that maps to.

use tracing::{debug, error};

use crate::error::LlmError;
use crate::llm::{ConversationLog, Message, ModelInvoker};

// =============================================================================
// CONTRACTS
// =============================================================================
/// A syntactic requirement on model output, plus how to ask for a fix.
pub trait OutputContract {
    fn is_satisfied(&self, response: &str) -> bool;

    /// User message appended after a response that broke the contract.
    fn correction(&self) -> String;
}

/// Exactly `n` non-empty comma-separated items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvItems(pub usize);

impl OutputContract for CsvItems {
    fn is_satisfied(&self, response: &str) -> bool {
        split_csv(response).len() == self.0
    }

    fn correction(&self) -> String {
        format!(
            "Error correction: Provide exactly {} comma-separated subqueries with no extra text.",
            self.0
        )
    }
}

/// Any response with visible content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmpty {
    correction: String,
}

impl NonEmpty {
    pub fn new(correction: impl Into<String>) -> Self {
        Self {
            correction: correction.into(),
        }
    }
}

impl OutputContract for NonEmpty {
    fn is_satisfied(&self, response: &str) -> bool {
        !response.trim().is_empty()
    }

    fn correction(&self) -> String {
        self.correction.clone()
    }
}

/// The response says "yes" somewhere (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affirmative;

impl OutputContract for Affirmative {
    fn is_satisfied(&self, response: &str) -> bool {
        response.to_lowercase().contains("yes")
    }

    fn correction(&self) -> String {
        "Error correction: For this query, you must answer 'yes' to perform research.".to_string()
    }
}

/// Split a comma-separated list, trimming items and dropping empty ones.
pub fn split_csv(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// PROTOCOL
// =============================================================================
/// How a structured request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The contract held; carries the trimmed response.
    Valid(String),
    /// Every attempt broke the contract; carries the last trimmed response.
    Exhausted(String),
    /// The model call itself failed.
    Failed(LlmError),
}

impl Outcome {
    /// The response text, or `fallback` if the model call failed.
    pub fn text_or(self, fallback: impl Into<String>) -> String {
        match self {
            Outcome::Valid(text) | Outcome::Exhausted(text) => text,
            Outcome::Failed(_) => fallback.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuredOutput {
    max_attempts: usize,
}

impl StructuredOutput {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Ask `model` until `contract` is satisfied or attempts run out.
    ///
    /// Only a response that satisfies the contract is appended to `log`;
    /// correction messages stay local to this request.
    pub async fn request<C>(
        &self,
        model: &dyn ModelInvoker,
        log: &mut ConversationLog,
        mut messages: Vec<Message>,
        contract: &C,
    ) -> Outcome
    where
        C: OutputContract + ?Sized,
    {
        let mut last = String::new();

        for attempt in 1..=self.max_attempts {
            let response = match model.invoke(&messages).await {
                Ok(response) => response,
                Err(e) => {
                    error!(attempt, error = %e, "Model call failed");
                    return Outcome::Failed(e);
                }
            };

            if contract.is_satisfied(&response) {
                debug!(attempt, "Response satisfied output contract");
                log.push(Message::assistant(response.clone()));
                return Outcome::Valid(response.trim().to_string());
            }

            debug!(attempt, response = %response, "Response broke output contract, requesting correction");
            messages.push(Message::user(contract.correction()));
            last = response;
        }

        Outcome::Exhausted(last.trim().to_string())
    }
}
