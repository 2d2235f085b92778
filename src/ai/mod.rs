//! AI chat side-feature
//!
//! A thin, strictly-bounded collaborator: given a role-tagged message
//! sequence and a provider selector, produce an incremental sequence of
//! text fragments. Failures surface as a single replacement chat message;
//! nothing here ever touches the note store.
//!
//! ## Architecture
//! - `model` - `ChatMessage`, roles, and multimodal content parts
//! - `config` - API key detection from `QUICKNOTES_*_API_KEY` env vars
//! - `providers` - `AiProvider` trait + OpenAI and Google implementations
//! - `chat` - the transient chat transcript and streaming assembly

pub mod chat;
pub mod config;
pub mod model;
pub mod providers;

pub use chat::{ChatSession, FAILURE_NOTICE};
pub use config::{DetectedKeys, ProviderConfig};
pub use model::{ChatMessage, ContentPart, MessageContent, MessageRole};
pub use providers::{AiProvider, ProviderRegistry, StreamCallback};
