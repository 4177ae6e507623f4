//! # Research Team
//!
//! Turns a [`TeamConfig`] into a ready-to-run [`LeadResearcher`]: one model
//! invoker per researcher, a shared search provider, roles resolved once.

use std::sync::Arc;

use tracing::{info, warn};

use crate::agents::{AgentRole, LeadResearcher, ResearchReport, Researcher};
use crate::config::{ResearcherConfig, TeamConfig};
use crate::error::ConfigError;
use crate::llm::{build_invoker, ModelInvoker};
use crate::search::{DuckDuckGoScraper, SearchProvider};

#[derive(Debug)]
pub struct ResearchTeam {
    lead: LeadResearcher,
}

impl ResearchTeam {
    /// Build the team the configuration describes, backed by real model
    /// providers and the DuckDuckGo scraper.
    pub fn from_config(config: &TeamConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let scraper =
            DuckDuckGoScraper::new().map_err(|e| ConfigError::SearchClient(e.to_string()))?;

        Self::with_components(
            config,
            |researcher| build_invoker(researcher, config),
            Arc::new(scraper),
        )
    }

    /// Build a team with caller-supplied models and search provider.
    ///
    /// `model_for` is called once per researcher, in id order.
    pub fn with_components<F>(
        config: &TeamConfig,
        mut model_for: F,
        search: Arc<dyn SearchProvider>,
    ) -> Result<Self, ConfigError>
    where
        F: FnMut(&ResearcherConfig) -> Result<Arc<dyn ModelInvoker>, ConfigError>,
    {
        config.settings.validate()?;

        let mut lead = None;
        let mut team = Vec::new();

        for researcher_config in &config.researchers {
            let is_lead = researcher_config.role == Some(AgentRole::Lead);
            if is_lead && lead.is_some() {
                warn!(researcher = researcher_config.id, "Ignoring extra lead researcher");
                continue;
            }

            let model = model_for(researcher_config)?;
            let researcher =
                Researcher::new(researcher_config, &config.settings, model, search.clone());

            if is_lead {
                lead = Some(researcher);
            } else {
                team.push(researcher);
            }
        }

        let lead = lead.ok_or(ConfigError::MissingLead)?;
        info!(lead = lead.id(), team = team.len(), "Research team assembled");

        Ok(Self {
            lead: LeadResearcher::new(lead, team, &config.settings)?,
        })
    }

    /// Answer `query`. Never fails; problems along the way end up in the text.
    pub async fn answer(&mut self, query: &str) -> String {
        self.lead.process_query(query).await
    }

    /// Answer `query` and keep the notebook and stopping reason.
    pub async fn research(&mut self, query: &str) -> ResearchReport {
        self.lead.run(query).await
    }

    pub fn lead(&self) -> &LeadResearcher {
        &self.lead
    }
}
