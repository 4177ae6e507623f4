//! Report researcher operations: snippet relevance and final synthesis.

use tracing::{debug, error, info, warn};

use super::protocol::{NonEmpty, Outcome};
use super::Researcher;
use crate::llm::invoke_prompt;
use crate::prompts;

/// Marker a model answers with when a snippet holds nothing useful.
pub const NOT_RELEVANT_MARKER: &str = "NO";

/// What the report researcher made of one snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelevanceVerdict {
    NotRelevant,
    /// The relevant portion of the snippet, trimmed.
    Excerpt(String),
}

impl RelevanceVerdict {
    /// Interpret a raw model answer.
    ///
    /// "NO" in any case or padding means not relevant. An empty answer is
    /// treated the same way, since there is nothing to keep.
    pub fn from_response(response: &str) -> Self {
        let trimmed = response.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NOT_RELEVANT_MARKER) {
            RelevanceVerdict::NotRelevant
        } else {
            RelevanceVerdict::Excerpt(trimmed.to_string())
        }
    }
}

impl Researcher {
    /// Extract the part of `snippet` that helps answer `query`.
    ///
    /// Single shot, no retries; a model error counts as "not relevant".
    pub async fn assess_snippet_relevance_and_summarize(
        &self,
        query: &str,
        snippet: &str,
    ) -> RelevanceVerdict {
        let prompt = prompts::relevance(&self.instructions, query, snippet);
        debug!(researcher = self.id, prompt = %prompt, "Relevance check prompt");

        match invoke_prompt(self.model.as_ref(), &prompt).await {
            Ok(response) => {
                debug!(researcher = self.id, response = %response, "Relevance check response");
                RelevanceVerdict::from_response(&response)
            }
            Err(e) => {
                error!(researcher = self.id, error = %e, "Error assessing snippet");
                RelevanceVerdict::NotRelevant
            }
        }
    }

    /// Synthesize the final answer from the notebook entries, in order.
    ///
    /// This is the last step of a run, so it never fails: a model error or
    /// three empty answers produce an error message as the report.
    pub async fn generate_final_report(&mut self, query: &str, notebook: &[String]) -> String {
        info!(researcher = self.id, entries = notebook.len(), "Generating final report");

        let evidence = notebook.join("\n");
        let messages = self.with_history(
            prompts::REPORT_SYSTEM.to_string(),
            prompts::report_user(&self.instructions, query, &evidence),
        );

        let contract = NonEmpty::new(prompts::REPORT_CORRECTION);
        let outcome = self
            .protocol
            .request(self.model.as_ref(), &mut self.conversation, messages, &contract)
            .await;

        match outcome {
            Outcome::Valid(report) => {
                info!(researcher = self.id, "Final report generated successfully");
                report
            }
            Outcome::Exhausted(_) => {
                warn!(researcher = self.id, "Model kept returning an empty report");
                format!(
                    "Error generating final report: the model returned an empty answer after {} attempts",
                    self.protocol.max_attempts()
                )
            }
            Outcome::Failed(e) => {
                error!(researcher = self.id, error = %e, "Error generating final report");
                format!("Error generating final report: {}", e)
            }
        }
    }
}
