//! Prompt templates for every model call the team makes.
//!
//! Each researcher's configured instructions are spliced into its prompts so
//! deployments can steer tone or focus without code changes.

/// Injected into the search and report logs after a round found nothing.
pub const RETRY_INSTRUCTION: &str = "Error correction: Previous searches did not yield relevant results. Please generate alternative subqueries and reattempt.";

/// Correction used when the final report comes back empty.
pub const REPORT_CORRECTION: &str =
    "Error correction: Provide a comprehensive final answer using only the provided texts.";

pub fn main_subqueries_system(instructions: &str) -> String {
    format!(
        "System: You are the 'Search Researcher'. Your job is to produce short, direct subqueries \
         to help find relevant info about the user's topic. Do not add extra commentary.\n{}\n",
        instructions
    )
}

pub fn main_subqueries_user(query: &str, count: usize) -> String {
    format!(
        "User Query: {}\nGenerate exactly {} subqueries, comma-separated.",
        query, count
    )
}

pub fn refine_system(instructions: &str) -> String {
    format!(
        "System: You are 'CSV Output Researcher'. Refine the subqueries to keep them relevant. \
         Do not add commentary; output exactly the requested number of comma-separated subqueries.\n{}\n",
        instructions
    )
}

pub fn refine_user(raw_subqueries: &str, query: &str, count: usize) -> String {
    format!(
        "Given these subqueries: {}\n\
         Refine them to the MOST RELEVANT {} subqueries for a search engine, in CSV format.\n\
         Original Query: {}\n\
         Output only the CSV.",
        raw_subqueries, count, query
    )
}

pub fn relevance(instructions: &str, query: &str, snippet: &str) -> String {
    format!(
        "{}\n\
         We are collecting web-search information to answer the User Query.\n\
         Your job is to analyze the snippet provided and output exactly the text from the snippet \
         that is directly relevant to the User Query. Do not modify or add any commentary.\n\
         If the snippet does not contain any relevant information, respond 'NO'.\n\n\
         User Query: {}\n\n\
         Snippet:\n{}\n\n\
         If relevant, output only the portions of the snippet that are useful. If not relevant, output only 'NO'.\n",
        instructions, query, snippet
    )
}

pub const REPORT_SYSTEM: &str =
    "System: Provide a final comprehensive answer using the provided texts.";

pub fn report_user(instructions: &str, query: &str, evidence: &str) -> String {
    format!(
        "{}\n\
         You are the Report Researcher. Use the following relevant snippet texts to produce a \
         comprehensive final answer to the User Query.\n\n\
         User Query: {}\n\n\
         Relevant Snippet Texts:\n{}\n\n\
         Provide a well-structured final answer using only the provided texts.",
        instructions, query, evidence
    )
}

pub fn should_research(instructions: &str, query: &str) -> String {
    format!(
        "{}\n\
         Answer ONLY 'yes' if a web search is required to answer the query; otherwise, answer directly.\n\
         User Query: {}",
        instructions, query
    )
}
