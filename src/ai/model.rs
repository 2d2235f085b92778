//! Chat data models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a message in a chat conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user
    User,
    /// Message from the AI assistant
    Assistant,
    /// System prompt/instruction
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One piece of a multimodal message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    /// Base64-encoded image data (screenshots)
    Image { image: String },
}

/// Message content: plain text or a sequence of text/image parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Concatenated text content, ignoring images.
    pub fn as_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(text) => text.is_empty(),
            MessageContent::Parts(parts) => parts.is_empty(),
        }
    }
}

/// A message in the chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier
    pub id: String,

    /// Role of the message sender
    pub role: MessageRole,

    /// Message content
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: MessageContent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
        }
    }

    /// Create a plain-text user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, MessageContent::Text(content.into()))
    }

    /// Create a multimodal user message
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self::new(MessageRole::User, MessageContent::Parts(parts))
    }

    /// Create a plain-text assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageContent::Text(content.into()))
    }

    /// Append a streamed fragment to this message's text.
    pub fn append_chunk(&mut self, chunk: &str) {
        match &mut self.content {
            MessageContent::Text(text) => text.push_str(chunk),
            MessageContent::Parts(parts) => match parts.last_mut() {
                Some(ContentPart::Text { text }) => text.push_str(chunk),
                _ => parts.push(ContentPart::Text {
                    text: chunk.to_string(),
                }),
            },
        }
    }

    /// First ~100 characters of the text content.
    pub fn preview(&self) -> String {
        let text = self.content.as_text();
        let chars: String = text.chars().take(100).collect();
        if chars.len() < text.len() {
            format!("{}...", chars.trim())
        } else {
            chars
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::user("Hello!");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content, MessageContent::Text("Hello!".into()));

        let msg = ChatMessage::assistant("Hi there");
        assert_eq!(msg.role, MessageRole::Assistant);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ChatMessage::user("a").id, ChatMessage::user("a").id);
    }

    #[test]
    fn test_append_chunk_to_text() {
        let mut msg = ChatMessage::assistant("");
        msg.append_chunk("Hel");
        msg.append_chunk("lo");
        assert_eq!(msg.content.as_text(), "Hello");
    }

    #[test]
    fn test_append_chunk_to_parts() {
        let mut msg = ChatMessage::user_parts(vec![ContentPart::Image {
            image: "AAAA".into(),
        }]);
        msg.append_chunk("caption");
        msg.append_chunk("!");
        assert_eq!(msg.content.as_text(), "caption!");
    }

    #[test]
    fn test_multimodal_text_extraction() {
        let msg = ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: "Screenshot attached:".into(),
            },
            ContentPart::Image {
                image: "base64data".into(),
            },
        ]);
        assert_eq!(msg.content.as_text(), "Screenshot attached:");
        assert!(!msg.content.is_empty());
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(150);
        let msg = ChatMessage::user(long);
        let preview = msg.preview();
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= 103);
    }
}
