//! Chat session: transcript state and streamed response assembly.
//!
//! The transcript is entirely transient - nothing here persists, and the
//! note store is never involved. Sending appends the user message plus an
//! empty pending assistant message, then streams fragments into it; a
//! failed request replaces the pending content with a single generic
//! failure notice.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::error::{NotesError, Result};
use crate::host::PanelHost;

use super::model::{ChatMessage, ContentPart};
use super::providers::ProviderRegistry;

/// The one user-visible error message the chat path shows.
pub const FAILURE_NOTICE: &str = "Sorry, I encountered an error processing your request.";

/// A transient AI chat conversation.
pub struct ChatSession {
    registry: ProviderRegistry,
    provider_id: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(registry: ProviderRegistry, provider_id: impl Into<String>) -> Self {
        ChatSession {
            registry,
            provider_id: provider_id.into(),
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Switch providers for subsequent sends.
    pub fn select_provider(&mut self, provider_id: impl Into<String>) {
        self.provider_id = provider_id.into();
    }

    /// Whether the selected provider has a credential.
    pub fn provider_available(&self) -> bool {
        self.registry.get_provider(&self.provider_id).is_some()
    }

    /// Reset the transcript.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Send `input` and stream the response into a pending assistant
    /// message. Blocks until the stream finishes; `on_chunk` observes each
    /// fragment as it lands for progressive rendering.
    ///
    /// Fails fast with [`NotesError::MissingApiKey`] when the selected
    /// provider has no credential (the transcript is untouched). A failure
    /// mid-stream is absorbed: the pending message's content becomes
    /// [`FAILURE_NOTICE`] and `Ok` is returned.
    pub fn send_with(
        &mut self,
        input: &str,
        on_chunk: impl Fn(&str) + Send + Sync + 'static,
    ) -> Result<()> {
        if input.trim().is_empty() {
            return Ok(());
        }
        let provider = self
            .registry
            .get_provider(&self.provider_id)
            .ok_or_else(|| NotesError::MissingApiKey {
                provider: self.provider_id.clone(),
            })?
            .clone();

        self.messages.push(ChatMessage::user(input));

        // History for the request excludes the placeholder about to stream
        let history = self.messages.clone();
        self.messages.push(ChatMessage::assistant(""));

        let assembled = Arc::new(Mutex::new(String::new()));
        let sink = assembled.clone();

        let outcome = provider.stream_message(
            &history,
            provider.default_model(),
            Box::new(move |chunk| {
                sink.lock().push_str(&chunk);
                on_chunk(&chunk);
            }),
        );

        // The placeholder is the message we just pushed
        let pending = self
            .messages
            .last_mut()
            .expect("placeholder assistant message exists");

        match outcome {
            Ok(()) => {
                let text = assembled.lock().clone();
                debug!(chars = text.len(), "Chat response assembled");
                pending.append_chunk(&text);
            }
            Err(e) => {
                error!(error = %e, provider = %self.provider_id, "AI request failed");
                *pending = ChatMessage::assistant(FAILURE_NOTICE);
            }
        }

        Ok(())
    }

    /// Send without observing fragments.
    pub fn send(&mut self, input: &str) -> Result<()> {
        self.send_with(input, |_| {})
    }

    /// Capture a screenshot via the host and attach it to the transcript
    /// as a multimodal user message.
    pub fn attach_screenshot(&mut self, host: &dyn PanelHost) -> Result<()> {
        let image = host
            .capture_screenshot()
            .map_err(|e| NotesError::Host(e.to_string()))?;

        self.messages.push(ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: "Screenshot attached:".to_string(),
            },
            ContentPart::Image { image },
        ]));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::model::{MessageContent, MessageRole};
    use crate::ai::providers::{AiProvider, StreamCallback};
    use crate::host::HeadlessHost;

    /// Provider double: streams canned chunks or fails.
    struct ScriptedProvider {
        chunks: Vec<&'static str>,
        fail: bool,
    }

    impl AiProvider for ScriptedProvider {
        fn provider_id(&self) -> &str {
            "scripted"
        }
        fn display_name(&self) -> &str {
            "Scripted"
        }
        fn default_model(&self) -> &str {
            "scripted-1"
        }
        fn stream_message(
            &self,
            _messages: &[ChatMessage],
            _model_id: &str,
            on_chunk: StreamCallback,
        ) -> anyhow::Result<()> {
            for chunk in &self.chunks {
                on_chunk(chunk.to_string());
            }
            if self.fail {
                anyhow::bail!("stream broke");
            }
            Ok(())
        }
    }

    fn session(chunks: Vec<&'static str>, fail: bool) -> ChatSession {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(ScriptedProvider { chunks, fail }));
        ChatSession::new(registry, "scripted")
    }

    #[test]
    fn test_send_assembles_streamed_chunks() {
        let mut chat = session(vec!["Hel", "lo ", "there"], false);
        chat.send("hi").unwrap();

        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[0].role, MessageRole::User);
        assert_eq!(chat.messages()[1].role, MessageRole::Assistant);
        assert_eq!(chat.messages()[1].content.as_text(), "Hello there");
    }

    #[test]
    fn test_chunks_observed_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut chat = session(vec!["a", "b", "c"], false);
        chat.send_with("hi", move |chunk| {
            seen_clone.lock().push(chunk.to_string());
        })
        .unwrap();

        assert_eq!(*seen.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_failure_replaces_pending_message() {
        let mut chat = session(vec!["partial "], true);
        chat.send("hi").unwrap();

        assert_eq!(chat.messages().len(), 2);
        assert_eq!(
            chat.messages()[1].content,
            MessageContent::Text(FAILURE_NOTICE.to_string())
        );
        // The user message survives untouched
        assert_eq!(chat.messages()[0].content.as_text(), "hi");
    }

    #[test]
    fn test_missing_provider_fails_before_transcript_changes() {
        let mut chat = ChatSession::new(ProviderRegistry::new(), "openai");
        let err = chat.send("hi").unwrap_err();

        assert!(matches!(err, NotesError::MissingApiKey { .. }));
        assert!(chat.messages().is_empty());
        assert!(!chat.provider_available());
    }

    #[test]
    fn test_empty_input_is_noop() {
        let mut chat = session(vec!["x"], false);
        chat.send("   ").unwrap();
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn test_multi_turn_history() {
        let mut chat = session(vec!["reply"], false);
        chat.send("first").unwrap();
        chat.send("second").unwrap();

        assert_eq!(chat.messages().len(), 4);
        assert_eq!(chat.messages()[2].content.as_text(), "second");
        assert_eq!(chat.messages()[3].content.as_text(), "reply");
    }

    #[test]
    fn test_clear_resets_transcript() {
        let mut chat = session(vec!["x"], false);
        chat.send("hi").unwrap();
        chat.clear();
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn test_attach_screenshot_requires_capable_host() {
        let mut chat = session(vec![], false);
        let host = HeadlessHost::new();
        assert!(chat.attach_screenshot(&host).is_err());
        assert!(chat.messages().is_empty());
    }
}
