//! research-team: a lead researcher coordinating search and report
//! researchers over language models and web search.
//!
//! - `LeadResearcher`: decides whether to research, runs bounded rounds,
//!   owns the notebook and stops early once enough evidence is in.
//! - `StructuredOutput`: every formatted model call gets up to three attempts
//!   with a correction message appended after each miss.
//! - `ModelInvoker` / `SearchProvider`: the two seams to the outside world,
//!   backed by Rig (OpenAI, Ollama) and a DuckDuckGo scraper.
//!
//! # Usage
//!
//! ```rust,ignore
//! use research_team::{ResearchTeam, TeamConfig};
//!
//! let config = TeamConfig::from_env()?;
//! let mut team = ResearchTeam::from_config(&config)?;
//! let report = team.answer("What changed in the Rust 2024 edition?").await;
//! ```

pub mod agents;
pub mod config;
pub mod error;
pub mod llm;
pub mod notebook;
pub mod prompts;
pub mod search;
pub mod team;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use agents::{
    AgentRole, LeadResearcher, RelevanceVerdict, ResearchPhase, ResearchReport, Researcher,
    StructuredOutput, Termination,
};
pub use config::{LlmBackend, ResearchSettings, ResearcherConfig, TeamConfig};
pub use error::{ConfigError, LlmError, SearchError};
pub use llm::{ConversationLog, Message, ModelInvoker, Role};
pub use notebook::{Notebook, NotebookLog};
pub use search::{DuckDuckGoScraper, SearchProvider, NO_SEARCH_RESULTS};
pub use team::ResearchTeam;
