//! # Configuration Module
//!
//! Loads the research team from environment variables (optionally via a
//! `.env` file). Each researcher is declared with a numbered family of keys:
//!
//! ```text
//! RESEARCHER_0_LLM=gpt-4o-mini
//! RESEARCHER_0_LLM_TYPE=openai        # or "ollama"
//! RESEARCHER_0_LLM_TEMPERATURE=0
//! RESEARCHER_0_ROLE=lead              # lead | search | report
//! RESEARCHER_0_INSTRUCTIONS=...
//! RESEARCHER_0_USE_TOOLS=true
//! ```
//!
//! The whole thing is resolved once at startup into an immutable
//! [`TeamConfig`] and handed to the team by reference.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::agents::AgentRole;
use crate::error::ConfigError;

// =============================================================================
// DEFAULTS
// =============================================================================
pub const DEFAULT_MAINQUERY_COUNT: usize = 4;
pub const DEFAULT_SUBQUERY_COUNT: usize = 2;
pub const DEFAULT_NOTEBOOK_LINE_THRESHOLD: usize = 25;
/// Hard ceiling on research rounds per query.
pub const DEFAULT_MAX_ROUNDS: usize = 3;
/// Hard ceiling on attempts for every self-correcting model call.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_NOTEBOOK_PATH: &str = "./notebook/notebook.txt";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

// =============================================================================
// RESEARCHER CONFIGURATION
// =============================================================================
/// Which provider serves a researcher's model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    #[default]
    OpenAi,
    Ollama,
}

impl LlmBackend {
    /// Anything other than "ollama" falls back to OpenAI.
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("ollama") {
            LlmBackend::Ollama
        } else {
            LlmBackend::OpenAi
        }
    }
}

/// Settings for a single researcher, as declared by its `RESEARCHER_<id>_*` keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearcherConfig {
    pub id: u32,

    /// Explicit role tag. `None` means untagged: the researcher can still be
    /// picked as the search/report fallback.
    pub role: Option<AgentRole>,

    pub backend: LlmBackend,

    /// Model name, e.g. "gpt-4o-mini" or "llama3.2"
    pub model: String,

    /// Temperature for LLM responses (0.0 = deterministic)
    pub temperature: f64,

    /// Free-form instructions prepended to every prompt this researcher sends
    pub instructions: String,

    pub use_tools: bool,
}

impl ResearcherConfig {
    pub fn new(id: u32, model: impl Into<String>) -> Self {
        Self {
            id,
            role: None,
            backend: LlmBackend::default(),
            model: model.into(),
            temperature: 0.0,
            instructions: String::new(),
            use_tools: false,
        }
    }

    pub fn with_role(mut self, role: AgentRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_backend(mut self, backend: LlmBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_use_tools(mut self, use_tools: bool) -> Self {
        self.use_tools = use_tools;
        self
    }
}

// =============================================================================
// RESEARCH SETTINGS
// =============================================================================
/// Counts and thresholds that drive the research loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchSettings {
    /// Number of subqueries requested in the first generation step
    pub mainquery_count: usize,

    /// Number of subqueries actually searched per round
    pub subquery_count: usize,

    /// Notebook size that triggers immediate synthesis
    pub notebook_line_threshold: usize,

    pub max_rounds: usize,

    pub max_attempts: usize,

    /// Where accepted excerpts are mirrored as an audit trail
    pub notebook_path: PathBuf,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            mainquery_count: DEFAULT_MAINQUERY_COUNT,
            subquery_count: DEFAULT_SUBQUERY_COUNT,
            notebook_line_threshold: DEFAULT_NOTEBOOK_LINE_THRESHOLD,
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            notebook_path: PathBuf::from(DEFAULT_NOTEBOOK_PATH),
        }
    }
}

impl ResearchSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mainquery_count == 0 {
            return Err(ConfigError::invalid(
                "MAINQUERY_COUNT",
                self.mainquery_count,
                "must be at least 1",
            ));
        }
        if self.subquery_count == 0 {
            return Err(ConfigError::invalid(
                "SUBQUERY_COUNT",
                self.subquery_count,
                "must be at least 1",
            ));
        }
        if self.notebook_line_threshold == 0 {
            return Err(ConfigError::invalid(
                "NOTEBOOK_LINE_THRESHOLD",
                self.notebook_line_threshold,
                "must be at least 1",
            ));
        }
        if self.max_rounds == 0 || self.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "max_rounds/max_attempts",
                format!("{}/{}", self.max_rounds, self.max_attempts),
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TEAM CONFIGURATION
// =============================================================================
/// Everything needed to assemble a research team.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamConfig {
    /// Researchers sorted by ascending id
    pub researchers: Vec<ResearcherConfig>,

    pub settings: ResearchSettings,

    pub openai_api_key: Option<String>,

    /// Ollama server URL (default: http://localhost:11434)
    pub ollama_host: String,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            researchers: Vec::new(),
            settings: ResearchSettings::default(),
            openai_api_key: None,
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
        }
    }
}

impl TeamConfig {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Silently ignore a missing .env file
        let _ = dotenvy::dotenv();
        Self::from_vars(env::vars())
    }

    /// Parse configuration from an explicit set of key/value pairs.
    ///
    /// This is what [`TeamConfig::from_env`] uses under the hood; tests feed
    /// it a map instead of mutating the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut config = TeamConfig::default();

        if let Some(val) = vars.get("MAINQUERY_COUNT") {
            config.settings.mainquery_count = parse_count("MAINQUERY_COUNT", val)?;
        }
        if let Some(val) = vars.get("SUBQUERY_COUNT") {
            config.settings.subquery_count = parse_count("SUBQUERY_COUNT", val)?;
        }
        if let Some(val) = vars.get("NOTEBOOK_LINE_THRESHOLD") {
            config.settings.notebook_line_threshold = parse_count("NOTEBOOK_LINE_THRESHOLD", val)?;
        }
        if let Some(val) = vars.get("NOTEBOOK_PATH") {
            config.settings.notebook_path = PathBuf::from(val);
        }
        if let Some(val) = vars.get("OPENAI_API_KEY").filter(|v| !v.trim().is_empty()) {
            config.openai_api_key = Some(val.clone());
        }
        if let Some(val) = vars.get("OLLAMA_API_BASE_URL") {
            config.ollama_host = val.clone();
        }

        let mut ids: Vec<u32> = Vec::new();
        for key in vars.keys() {
            let Some(id) = researcher_id_from_key(key) else {
                continue;
            };
            match id.parse::<u32>() {
                Ok(id) if !ids.contains(&id) => ids.push(id),
                Ok(_) => {}
                Err(_) => warn!(key = %key, "Ignoring researcher with a non-numeric id"),
            }
        }
        ids.sort_unstable();

        for id in ids {
            config.researchers.push(parse_researcher(id, &vars)?);
        }

        Ok(config)
    }

    /// Validate the configuration before building a team.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings.validate()?;

        if !self
            .researchers
            .iter()
            .any(|r| r.role == Some(AgentRole::Lead))
        {
            return Err(ConfigError::MissingLead);
        }
        if !self
            .researchers
            .iter()
            .any(|r| r.role != Some(AgentRole::Lead))
        {
            return Err(ConfigError::NoResearchers);
        }

        for researcher in &self.researchers {
            if researcher.model.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("RESEARCHER_{}_LLM", researcher.id),
                    &researcher.model,
                    "model name cannot be empty",
                ));
            }
            if !(0.0..=2.0).contains(&researcher.temperature) {
                return Err(ConfigError::invalid(
                    format!("RESEARCHER_{}_LLM_TEMPERATURE", researcher.id),
                    researcher.temperature,
                    "must be between 0.0 and 2.0",
                ));
            }
            if researcher.backend == LlmBackend::OpenAi && self.openai_api_key.is_none() {
                return Err(ConfigError::MissingApiKey(researcher.id));
            }
        }

        Ok(())
    }
}

/// `RESEARCHER_<id>_LLM` -> `<id>`
fn researcher_id_from_key(key: &str) -> Option<&str> {
    key.strip_prefix("RESEARCHER_")?
        .strip_suffix("_LLM")
        .filter(|id| !id.is_empty() && !id.contains('_'))
}

fn parse_researcher(id: u32, vars: &HashMap<String, String>) -> Result<ResearcherConfig, ConfigError> {
    let key = |suffix: &str| format!("RESEARCHER_{id}_{suffix}");
    let get = |suffix: &str| lookup(vars, id, suffix);

    let mut researcher = ResearcherConfig::new(id, get("LLM").unwrap_or_default().trim())
        .with_backend(get("LLM_TYPE").map(LlmBackend::from_tag).unwrap_or_default())
        .with_instructions(get("INSTRUCTIONS").unwrap_or_default())
        .with_use_tools(get("USE_TOOLS").map(parse_flag).unwrap_or(false));

    if let Some(val) = get("LLM_TEMPERATURE") {
        researcher.temperature = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(key("LLM_TEMPERATURE"), val, "must be a number"))?;
    }

    if let Some(tag) = get("ROLE").map(str::trim).filter(|t| !t.is_empty()) {
        match AgentRole::from_tag(tag) {
            Some(role) => researcher = researcher.with_role(role),
            None => warn!(researcher = id, role = %tag, "Unknown role tag; treating researcher as untagged"),
        }
    }

    Ok(researcher)
}

fn lookup<'a>(vars: &'a HashMap<String, String>, id: u32, suffix: &str) -> Option<&'a str> {
    vars.get(&format!("RESEARCHER_{id}_{suffix}"))
        .map(String::as_str)
}

fn parse_count(key: &str, val: &str) -> Result<usize, ConfigError> {
    val.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, val, "must be a valid positive integer"))
}

fn parse_flag(val: &str) -> bool {
    matches!(val.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}
