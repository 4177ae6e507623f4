//! Search researcher operations: subquery generation, refinement, web search.

use tracing::{error, info, warn};

use super::protocol::{split_csv, CsvItems, Outcome};
use super::Researcher;
use crate::prompts;

impl Researcher {
    /// Ask for `MAINQUERY_COUNT` comma-separated subqueries for `query`.
    ///
    /// After the attempts run out the last response is returned as-is, even
    /// if the count is wrong. A model error yields an empty string.
    pub async fn generate_main_subqueries(&mut self, query: &str) -> String {
        let count = self.mainquery_count;
        info!(researcher = self.id, count, query = %query, "Generating main subqueries");

        let messages = self.with_history(
            prompts::main_subqueries_system(&self.instructions),
            prompts::main_subqueries_user(query, count),
        );

        let outcome = self
            .protocol
            .request(self.model.as_ref(), &mut self.conversation, messages, &CsvItems(count))
            .await;
        self.log_outcome("main subqueries", &outcome);
        outcome.text_or("")
    }

    /// Narrow `raw_subqueries` down to the `subquery_count` most relevant ones.
    pub async fn refine_to_subqueries(
        &mut self,
        raw_subqueries: &str,
        query: &str,
        subquery_count: usize,
    ) -> String {
        info!(researcher = self.id, count = subquery_count, "Refining subqueries");

        let messages = self.with_history(
            prompts::refine_system(&self.instructions),
            prompts::refine_user(raw_subqueries, query, subquery_count),
        );

        let outcome = self
            .protocol
            .request(
                self.model.as_ref(),
                &mut self.conversation,
                messages,
                &CsvItems(subquery_count),
            )
            .await;
        self.log_outcome("refined subqueries", &outcome);
        outcome.text_or("")
    }

    /// Run a web search for one subquery.
    ///
    /// Provider failures never propagate: they come back as a placeholder
    /// line naming the subquery and the reason.
    pub async fn perform_search(&self, subquery: &str) -> String {
        let subquery = clean_subquery(subquery);
        info!(researcher = self.id, subquery = %subquery, "Performing web search");

        match self.search.web_search_text(subquery).await {
            Ok(text) => {
                info!(researcher = self.id, subquery = %subquery, "Search completed");
                text
            }
            Err(e) => {
                error!(researcher = self.id, subquery = %subquery, error = %e, "Web search failed");
                format!("[Search failed for {}: {}]", subquery, e)
            }
        }
    }

    fn log_outcome(&self, what: &str, outcome: &Outcome) {
        match outcome {
            Outcome::Valid(_) => info!(researcher = self.id, "{} generated successfully", what),
            Outcome::Exhausted(text) => warn!(
                researcher = self.id,
                response = %text,
                "{} never matched the requested count; using last response",
                what
            ),
            Outcome::Failed(_) => error!(researcher = self.id, "Failed to generate {}", what),
        }
    }
}

/// Parse the subqueries out of a (possibly malformed) CSV response.
pub fn parse_subqueries(csv: &str) -> Vec<String> {
    split_csv(csv)
}

/// Strip surrounding whitespace and quote characters.
pub fn clean_subquery(subquery: &str) -> &str {
    subquery.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'')
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::{ResearchSettings, ResearcherConfig};
    use crate::llm::{Message, Role};
    use crate::testing::{ScriptedModel, StaticSearch};

    fn researcher(model: Arc<ScriptedModel>, search: Arc<StaticSearch>) -> Researcher {
        let config = ResearcherConfig::new(1, "test-model").with_instructions("Search well.");
        let settings = ResearchSettings {
            mainquery_count: 3,
            ..ResearchSettings::default()
        };
        Researcher::new(&config, &settings, model, search)
    }

    #[test]
    fn test_clean_subquery() {
        assert_eq!(clean_subquery("  \"rust async\"  "), "rust async");
        assert_eq!(clean_subquery("'tokio runtime'"), "tokio runtime");
        assert_eq!(clean_subquery(" \" 'nested' \" "), "nested");
        assert_eq!(clean_subquery("don't"), "don't");
    }

    #[test]
    fn test_parse_subqueries_is_permissive() {
        assert_eq!(
            parse_subqueries("rust async,  tokio ,, "),
            vec!["rust async", "tokio"]
        );
        assert!(parse_subqueries("").is_empty());
    }

    #[tokio::test]
    async fn test_generate_main_subqueries_success() {
        let model = Arc::new(ScriptedModel::new(["rust, tokio, async-std"]));
        let mut r = researcher(model.clone(), Arc::new(StaticSearch::returning("")));

        let csv = r.generate_main_subqueries("Rust async runtimes").await;

        assert_eq!(csv, "rust, tokio, async-std");
        assert_eq!(model.calls(), 1);
        assert_eq!(r.conversation().len(), 1);

        let received = model.received();
        let sent = &received[0];
        assert_eq!(sent[0].role, Role::System);
        assert!(sent[0].content.contains("Search well."));
        assert!(sent[1].content.contains("exactly 3"));
    }

    #[tokio::test]
    async fn test_generate_main_subqueries_exhausted_returns_raw_last() {
        let model = Arc::new(ScriptedModel::new(["one", "one, two", "Here you go: one, two, three, four"]));
        let mut r = researcher(model.clone(), Arc::new(StaticSearch::returning("")));

        let csv = r.generate_main_subqueries("query").await;

        assert_eq!(csv, "Here you go: one, two, three, four");
        assert_eq!(model.calls(), 3);
        assert!(r.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_generate_main_subqueries_model_error_is_empty() {
        let model = Arc::new(ScriptedModel::failing("connection refused"));
        let mut r = researcher(model.clone(), Arc::new(StaticSearch::returning("")));

        assert_eq!(r.generate_main_subqueries("query").await, "");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_refine_includes_history() {
        let model = Arc::new(ScriptedModel::new(["a, b, c", "a, c"]));
        let mut r = researcher(model.clone(), Arc::new(StaticSearch::returning("")));

        let main = r.generate_main_subqueries("query").await;
        let refined = r.refine_to_subqueries(&main, "query", 2).await;

        assert_eq!(refined, "a, c");
        let received = model.received();
        let sent = &received[1];
        assert!(sent[1].content.contains("Given these subqueries: a, b, c"));
        assert_eq!(sent[2], Message::assistant("a, b, c"));
        assert_eq!(r.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_perform_search_cleans_query() {
        let search = Arc::new(StaticSearch::returning("line one\nline two"));
        let r = researcher(Arc::new(ScriptedModel::new(Vec::<String>::new())), search.clone());

        let text = r.perform_search(" \"rust ownership\" ").await;

        assert_eq!(text, "line one\nline two");
        assert_eq!(search.queries(), vec!["rust ownership"]);
    }

    #[tokio::test]
    async fn test_perform_search_failure_becomes_placeholder() {
        let search = Arc::new(StaticSearch::failing("HTTP 503"));
        let r = researcher(Arc::new(ScriptedModel::new(Vec::<String>::new())), search);

        let text = r.perform_search("rust").await;

        assert!(text.starts_with("[Search failed for rust:"));
        assert!(text.contains("HTTP 503"));
    }
}
