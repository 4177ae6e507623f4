//! # Lead Researcher
//!
//! The lead owns the run. It decides whether a query needs research, drives
//! up to `max_rounds` rounds of search and relevance filtering, keeps the
//! notebook, and hands the notebook to the report researcher once either the
//! threshold is reached or the rounds run out.
//!
//! ```text
//! Idle -> DecidingResearch -> Researching(1..=max_rounds) -> Synthesizing -> Done
//!   |            |
//!   |            +-- no research needed ------------------------------------> Done
//!   +-- tools disabled ----------------------------------------------------> Done
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use super::protocol::{Affirmative, Outcome};
use super::search::parse_subqueries;
use super::{AgentRole, RelevanceVerdict, Researcher};
use crate::config::ResearchSettings;
use crate::error::ConfigError;
use crate::llm::Message;
use crate::notebook::{Notebook, NotebookLog};
use crate::prompts;

// =============================================================================
// RUN STATE
// =============================================================================
/// Where the lead is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchPhase {
    Idle,
    DecidingResearch,
    Researching { round: usize },
    Synthesizing,
    Done,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The lead is not allowed to use tools
    ToolsDisabled,
    /// The lead decided the query could be answered without research
    DirectAnswer,
    /// The notebook filled up mid-round
    ThresholdReached,
    /// Every round ran; the report covers whatever was collected
    RoundsExhausted,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchReport {
    pub query: String,
    pub report: String,
    /// Accepted excerpts in the order they were found
    pub notebook: Vec<String>,
    /// Rounds started before the run stopped
    pub rounds_completed: usize,
    pub termination: Termination,
}

// =============================================================================
// LEAD RESEARCHER
// =============================================================================
pub struct LeadResearcher {
    lead: Researcher,
    team: Vec<Researcher>,
    search_idx: usize,
    report_idx: usize,
    settings: ResearchSettings,
    phase: ResearchPhase,
}

impl LeadResearcher {
    /// Assemble a lead over its team of non-lead researchers.
    ///
    /// The search role goes to the first researcher tagged `search`, the
    /// report role to the first tagged `report`. Either falls back to the
    /// first researcher in `team`, which may end up holding both roles.
    pub fn new(
        lead: Researcher,
        team: Vec<Researcher>,
        settings: &ResearchSettings,
    ) -> Result<Self, ConfigError> {
        if team.is_empty() {
            return Err(ConfigError::NoResearchers);
        }

        let search_idx = resolve_role(&team, AgentRole::Search);
        let report_idx = resolve_role(&team, AgentRole::Report);
        info!(
            lead = lead.id(),
            search = team[search_idx].id(),
            report = team[report_idx].id(),
            "Resolved research roles"
        );

        Ok(Self {
            lead,
            team,
            search_idx,
            report_idx,
            settings: settings.clone(),
            phase: ResearchPhase::Idle,
        })
    }

    pub fn phase(&self) -> ResearchPhase {
        self.phase
    }

    pub fn lead(&self) -> &Researcher {
        &self.lead
    }

    pub fn search_researcher(&self) -> &Researcher {
        &self.team[self.search_idx]
    }

    pub fn report_researcher(&self) -> &Researcher {
        &self.team[self.report_idx]
    }

    /// Ask the lead model whether `query` needs a web search.
    ///
    /// Always ends up `true`: a "yes" is accepted, anything else is corrected
    /// toward "yes", and both exhaustion and a model error count as "research".
    pub async fn should_research(&mut self, query: &str) -> bool {
        let messages = vec![Message::user(prompts::should_research(
            self.lead.instructions(),
            query,
        ))];

        let outcome = self
            .lead
            .protocol
            .request(
                self.lead.model.as_ref(),
                &mut self.lead.conversation,
                messages,
                &Affirmative,
            )
            .await;

        match outcome {
            Outcome::Valid(_) => true,
            Outcome::Exhausted(last) => {
                warn!(lead = self.lead.id(), response = %last, "Lead never agreed to research; researching anyway");
                true
            }
            Outcome::Failed(e) => {
                warn!(lead = self.lead.id(), error = %e, "Research decision failed; researching anyway");
                true
            }
        }
    }

    /// Answer `query`, returning only the final text.
    pub async fn process_query(&mut self, query: &str) -> String {
        self.run(query).await.report
    }

    /// Answer `query` and report how the run went.
    pub async fn run(&mut self, query: &str) -> ResearchReport {
        info!(lead = self.lead.id(), query = %query, "Processing query");

        if !self.lead.use_tools() {
            info!(lead = self.lead.id(), "Lead has tools disabled; skipping research");
            self.phase = ResearchPhase::Done;
            return ResearchReport {
                query: query.to_string(),
                report: format!("No research performed. Query was: {}", query),
                notebook: Vec::new(),
                rounds_completed: 0,
                termination: Termination::ToolsDisabled,
            };
        }

        self.phase = ResearchPhase::DecidingResearch;
        if !self.should_research(query).await {
            info!(lead = self.lead.id(), "Answering without research");
            self.phase = ResearchPhase::Done;
            return ResearchReport {
                query: query.to_string(),
                // No direct answer is cached from the decision prompt
                report: String::new(),
                notebook: Vec::new(),
                rounds_completed: 0,
                termination: Termination::DirectAnswer,
            };
        }

        let mut notebook = self.open_notebook();

        for round in 1..=self.settings.max_rounds {
            self.phase = ResearchPhase::Researching { round };
            info!(round, max_rounds = self.settings.max_rounds, "Starting research round");

            if self.research_round(query, &mut notebook).await {
                info!(round, entries = notebook.len(), "Notebook threshold reached; writing report early");
                return self
                    .synthesize(query, notebook, round, Termination::ThresholdReached)
                    .await;
            }

            info!(round, entries = notebook.len(), "Research round finished");

            if notebook.is_empty() {
                warn!(round, "Round produced no relevant excerpts; asking for new subqueries");
                self.inject_retry_instruction();
            }
        }

        let rounds = self.settings.max_rounds;
        self.synthesize(query, notebook, rounds, Termination::RoundsExhausted)
            .await
    }

    /// One round of generate, refine, search and assess.
    ///
    /// Returns `true` as soon as the notebook reaches the threshold; the rest
    /// of the round is skipped.
    async fn research_round(&mut self, query: &str, notebook: &mut Notebook) -> bool {
        let subquery_count = self.settings.subquery_count;
        let threshold = self.settings.notebook_line_threshold;

        let searcher = &mut self.team[self.search_idx];
        let main = searcher.generate_main_subqueries(query).await;
        let refined = searcher
            .refine_to_subqueries(&main, query, subquery_count)
            .await;
        let subqueries = parse_subqueries(&refined);
        debug!(subqueries = ?subqueries, "Refined subqueries");

        for subquery in &subqueries {
            let evidence = self.team[self.search_idx].perform_search(subquery).await;
            let reporter = &self.team[self.report_idx];

            for snippet in evidence.lines().filter(|l| !l.trim().is_empty()) {
                let verdict = reporter
                    .assess_snippet_relevance_and_summarize(query, snippet)
                    .await;

                let RelevanceVerdict::Excerpt(excerpt) = verdict else {
                    continue;
                };
                if !notebook.insert(excerpt) {
                    debug!(subquery = %subquery, "Duplicate excerpt discarded");
                    continue;
                }
                if notebook.len() >= threshold {
                    return true;
                }
            }
        }

        false
    }

    /// Push the retry instruction into the search and report logs, once per
    /// distinct researcher.
    fn inject_retry_instruction(&mut self) {
        self.team[self.search_idx].inject_instruction(prompts::RETRY_INSTRUCTION);
        if self.report_idx != self.search_idx {
            self.team[self.report_idx].inject_instruction(prompts::RETRY_INSTRUCTION);
        }
    }

    fn open_notebook(&self) -> Notebook {
        match NotebookLog::create(&self.settings.notebook_path) {
            Ok(log) => Notebook::with_log(log),
            Err(e) => {
                warn!(
                    path = %self.settings.notebook_path.display(),
                    error = %e,
                    "Could not open notebook log; keeping notes in memory only"
                );
                Notebook::new()
            }
        }
    }

    async fn synthesize(
        &mut self,
        query: &str,
        notebook: Notebook,
        rounds_completed: usize,
        termination: Termination,
    ) -> ResearchReport {
        self.phase = ResearchPhase::Synthesizing;
        let entries = notebook.into_entries();
        let report = self.team[self.report_idx]
            .generate_final_report(query, &entries)
            .await;
        self.phase = ResearchPhase::Done;

        ResearchReport {
            query: query.to_string(),
            report,
            notebook: entries,
            rounds_completed,
            termination,
        }
    }
}

/// Index of the first researcher tagged with `role`, else 0.
fn resolve_role(team: &[Researcher], role: AgentRole) -> usize {
    team.iter()
        .position(|r| r.role() == Some(role))
        .unwrap_or(0)
}

impl std::fmt::Debug for LeadResearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadResearcher")
            .field("lead", &self.lead)
            .field("search", &self.team[self.search_idx].id())
            .field("report", &self.team[self.report_idx].id())
            .field("phase", &self.phase)
            .finish()
    }
}
