//! # Research Team CLI
//!
//! Runs one query through a lead researcher and its team, then prints the
//! final report.
//!
//! ## Quick Start
//! ```bash
//! RESEARCHER_0_LLM=llama3.2 RESEARCHER_0_LLM_TYPE=ollama \
//! RESEARCHER_0_ROLE=lead RESEARCHER_0_USE_TOOLS=true \
//! RESEARCHER_1_LLM=llama3.2 RESEARCHER_1_LLM_TYPE=ollama \
//! cargo run -- "What are the latest developments in Rust?"
//! ```

// =============================================================================
// IMPORTS
// =============================================================================
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use research_team::{ResearchReport, ResearchTeam, TeamConfig};

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "research-team",
    version,
    about = "A lead researcher that plans web searches, filters evidence and writes a report",
    long_about = r#"
Research Team - a lead, a search researcher and a report researcher.

The lead decides whether the query needs research. The search researcher
writes subqueries and searches DuckDuckGo; the report researcher keeps only
the relevant parts of each result and writes the final answer. At most three
rounds are run, and the report is written early once enough evidence is in.

Researchers are configured through the environment (or a .env file):
  RESEARCHER_<id>_LLM            model name (required)
  RESEARCHER_<id>_LLM_TYPE       openai (default) | ollama
  RESEARCHER_<id>_ROLE           lead | search | report
  RESEARCHER_<id>_USE_TOOLS      true to let the lead research
  RESEARCHER_<id>_INSTRUCTIONS   extra prompt instructions

EXAMPLES:
  research-team "How does Tokio schedule tasks?"
  research-team --json "Rust web frameworks 2025" > run.json
"#
)]
struct Args {
    /// The question to research
    #[arg(value_name = "QUERY")]
    query: String,

    /// Enable verbose/debug logging
    #[arg(short = 'v', long = "verbose", default_value = "false")]
    verbose: bool,

    /// Print the whole run (report, notebook, rounds) as JSON
    #[arg(long = "json", default_value = "false")]
    json: bool,

    /// Where accepted excerpts are logged (overrides NOTEBOOK_PATH)
    #[arg(long = "notebook-path", env = "NOTEBOOK_PATH", value_name = "PATH")]
    notebook_path: Option<PathBuf>,
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    let mut config = TeamConfig::from_env().context("Failed to load team configuration")?;
    if let Some(path) = args.notebook_path {
        config.settings.notebook_path = path;
    }

    info!(
        researchers = config.researchers.len(),
        notebook = %config.settings.notebook_path.display(),
        "Configuration loaded"
    );

    let mut team = ResearchTeam::from_config(&config).context("Failed to assemble research team")?;
    let result = team.research(&args.query).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }

    info!(
        rounds = result.rounds_completed,
        excerpts = result.notebook.len(),
        termination = ?result.termination,
        "Research finished"
    );
    Ok(())
}

fn print_report(result: &ResearchReport) {
    println!("\n{}", "=".repeat(60));
    println!("RESEARCH RESULTS");
    println!("{}\n", "=".repeat(60));
    println!("{}", result.report);
    println!("\n{}", "=".repeat(60));
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Install the global tracing subscriber.
///
/// `RUST_LOG` is honoured unless `--verbose` asks for debug output.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
