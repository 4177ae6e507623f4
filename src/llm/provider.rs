//! The model invoker abstraction.
//!
//! Every researcher talks to its language model through [`ModelInvoker`].
//! Implementations bridge to a concrete provider (see [`super::OpenAiInvoker`] and [`super::OllamaInvoker`]); tests
//! plug in scripted fakes.

use async_trait::async_trait;

use super::message::Message;
use crate::error::LlmError;

/// Stateless model call: ordered conversation in, text out.
///
/// Implementations may fail on transport or quota problems. Callers are
/// expected to catch those errors and fall back to a sentinel value rather
/// than abort a research run.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use research_team::llm::{Message, ModelInvoker};
/// use research_team::LlmError;
///
/// struct Echo;
///
/// #[async_trait]
/// impl ModelInvoker for Echo {
///     async fn invoke(&self, messages: &[Message]) -> Result<String, LlmError> {
///         Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
///     }
/// }
/// ```
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<String, LlmError>;
}

/// Send a single prompt as a one-message conversation.
pub async fn invoke_prompt(model: &dyn ModelInvoker, prompt: &str) -> Result<String, LlmError> {
    model.invoke(&[Message::user(prompt)]).await
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel;

    #[async_trait]
    impl ModelInvoker for EchoModel {
        async fn invoke(&self, messages: &[Message]) -> Result<String, LlmError> {
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            Ok(format!("echo: {} ({} messages)", last, messages.len()))
        }
    }

    #[tokio::test]
    async fn test_invoke_prompt_wraps_single_user_message() {
        let response = invoke_prompt(&EchoModel, "hello").await.unwrap();
        assert_eq!(response, "echo: hello (1 messages)");
    }

    #[test]
    fn test_model_invoker_is_object_safe() {
        fn assert_dyn(_: &dyn ModelInvoker) {}
        assert_dyn(&EchoModel);
    }
}
