use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Bot,
    User,
}

/// One line of the chatbot conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Bot, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

/// Ordered transcript of a chat session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bot_message(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.push(ChatMessage::bot(content))
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.push(ChatMessage::user(content))
    }

    fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Up to `n` most recent messages, oldest first
    pub fn last_messages(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_keep_their_order_and_role() {
        let mut history = ChatHistory::new();
        history.add_bot_message("What's the model of your car?");
        history.add_user_message("Corolla");
        history.add_bot_message("What body type is your car?");

        assert_eq!(history.len(), 3);
        let roles: Vec<_> = history.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::Bot, MessageRole::User, MessageRole::Bot]);
        assert!(history.messages()[0].timestamp <= history.messages()[2].timestamp);
        assert_ne!(history.messages()[0].id, history.messages()[2].id);
    }

    #[test]
    fn last_messages_is_clamped() {
        let mut history = ChatHistory::new();
        history.add_user_message("Yes");
        history.add_bot_message("Great!");

        let last = history.last_messages(1);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].content, "Great!");
        assert_eq!(history.last_messages(10).len(), 2);

        history.clear();
        assert!(history.last_messages(3).is_empty());
    }

    #[test]
    fn roles_serialize_lowercase() {
        let message = ChatMessage::bot("Hi!");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "bot");
        assert_eq!(value["content"], "Hi!");
    }
}
