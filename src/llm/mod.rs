//! Language model access for the researchers.
//!
//! ```text
//! Researcher ──► ModelInvoker (trait) ──► OpenAiInvoker / OllamaInvoker (rig)
//! ```

mod backends;
mod message;
mod provider;

pub use backends::{build_invoker, OllamaInvoker, OpenAiInvoker};
pub use message::{extract_system_preamble, render_transcript, ConversationLog, Message, Role};
pub use provider::{invoke_prompt, ModelInvoker};
