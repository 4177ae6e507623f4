//! Role-tagged messages and per-agent conversation logs.

use serde::{Deserialize, Serialize};

/// Who authored a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered history of one agent's exchanges with its model.
///
/// Each researcher owns exactly one log. It grows with every accepted model
/// response and, between rounds, with correction instructions injected by the
/// lead researcher. Nothing else writes to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

}

/// Join the system messages of a conversation into one preamble.
pub fn extract_system_preamble(messages: &[Message]) -> Option<String> {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    }
}

/// Render the non-system part of a conversation as a single prompt.
///
/// A lone user message is sent verbatim. Longer conversations become a
/// role-tagged transcript so completion-style models still see the history.
pub fn render_transcript(messages: &[Message]) -> String {
    let turns: Vec<&Message> = messages.iter().filter(|m| m.role != Role::System).collect();

    match turns.as_slice() {
        [] => String::new(),
        [only] if only.role == Role::User => only.content.clone(),
        _ => turns
            .iter()
            .map(|m| {
                let label = match m.role {
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                    Role::System => "System",
                };
                format!("{}: {}", label, m.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_log_keeps_order() {
        let mut log = ConversationLog::new();
        assert!(log.is_empty());

        log.push(Message::assistant("a, b, c"));
        log.push(Message::user("Error correction: try again"));

        assert_eq!(log.len(), 2);
        assert_eq!(
            log.messages(),
            &[
                Message::assistant("a, b, c"),
                Message::user("Error correction: try again"),
            ]
        );
    }

    #[test]
    fn test_extract_system_preamble() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::system("Be concise."),
            Message::user("Hello"),
        ];

        let preamble = extract_system_preamble(&messages).unwrap();
        assert!(preamble.contains("You are helpful."));
        assert!(preamble.contains("Be concise."));
        assert!(extract_system_preamble(&[Message::user("Hi")]).is_none());
    }

    #[test]
    fn test_single_user_message_is_sent_verbatim() {
        let messages = vec![Message::system("sys"), Message::user("What is Rust?")];
        assert_eq!(render_transcript(&messages), "What is Rust?");
    }

    #[test]
    fn test_transcript_keeps_order_and_roles() {
        let messages = vec![
            Message::system("sys"),
            Message::user("Generate subqueries"),
            Message::assistant("a, b"),
            Message::user("Error correction: exactly 3"),
        ];

        let transcript = render_transcript(&messages);
        let user_pos = transcript.find("User: Generate subqueries").unwrap();
        let assistant_pos = transcript.find("Assistant: a, b").unwrap();
        let correction_pos = transcript.find("User: Error correction").unwrap();

        assert!(user_pos < assistant_pos);
        assert!(assistant_pos < correction_pos);
        assert!(!transcript.contains("sys"));
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Message::assistant("ok")).unwrap();
        assert!(json.contains("\"assistant\""));
    }
}
