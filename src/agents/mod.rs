//! # Agents Module
//!
//! The research team is made of [`Researcher`]s. Each one owns a model, a
//! conversation log and its prompt instructions. Roles decide which
//! operations the lead calls on it:
//!
//! - **Search** ([`search`]): generate and refine subqueries, run web searches.
//! - **Report** ([`report`]): judge snippet relevance, write the final report.
//! - **Lead** ([`lead`]): decide whether to research and drive the rounds.

pub mod lead;
pub mod protocol;
pub mod report;
pub mod search;

use std::sync::Arc;

use crate::config::{ResearchSettings, ResearcherConfig};
use crate::llm::{ConversationLog, Message, ModelInvoker};
use crate::search::SearchProvider;

pub use lead::{LeadResearcher, ResearchPhase, ResearchReport, Termination};
pub use protocol::{Affirmative, CsvItems, NonEmpty, OutputContract, Outcome, StructuredOutput};
pub use report::RelevanceVerdict;

// =============================================================================
// ROLES
// =============================================================================
/// The part a researcher plays, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    Lead,
    Search,
    Report,
}

impl AgentRole {
    /// Parse a role tag ("lead", "search", "report"), case-insensitively.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "lead" => Some(AgentRole::Lead),
            "search" => Some(AgentRole::Search),
            "report" => Some(AgentRole::Report),
            _ => None,
        }
    }
}

// =============================================================================
// RESEARCHER
// =============================================================================
/// One language-model-driven member of the research team.
pub struct Researcher {
    id: u32,
    role: Option<AgentRole>,
    instructions: String,
    use_tools: bool,
    mainquery_count: usize,
    protocol: StructuredOutput,
    model: Arc<dyn ModelInvoker>,
    search: Arc<dyn SearchProvider>,
    conversation: ConversationLog,
}

impl Researcher {
    pub fn new(
        config: &ResearcherConfig,
        settings: &ResearchSettings,
        model: Arc<dyn ModelInvoker>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        Self {
            id: config.id,
            role: config.role,
            instructions: config.instructions.clone(),
            use_tools: config.use_tools,
            mainquery_count: settings.mainquery_count,
            protocol: StructuredOutput::new(settings.max_attempts),
            model,
            search,
            conversation: ConversationLog::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn role(&self) -> Option<AgentRole> {
        self.role
    }

    pub fn use_tools(&self) -> bool {
        self.use_tools
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    /// Only the lead calls this, between rounds.
    pub(crate) fn inject_instruction(&mut self, instruction: &str) {
        self.conversation.push(Message::user(instruction));
    }

    /// `[system, user]` followed by everything this researcher has said so far.
    fn with_history(&self, system: String, user: String) -> Vec<Message> {
        let mut messages = vec![Message::system(system), Message::user(user)];
        messages.extend(self.conversation.messages().iter().cloned());
        messages
    }
}

impl std::fmt::Debug for Researcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Researcher")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("use_tools", &self.use_tools)
            .field("conversation", &self.conversation.len())
            .finish()
    }
}
