//! Service layer for content loading and external collaborators.
//!
//! This module contains services that read the content root and the
//! request/response seams (assistant, transcription, chat log) that the kiosk
//! state machine talks to.

pub mod api_keys;
pub mod assistant;
pub mod catalog;
pub mod chat_store;
pub mod transcription;

// Re-export commonly used types and functions
pub use api_keys::{ApiKeys, Provider};
pub use assistant::{Assistant, AssistantRequest, ModelInfo, UnavailableAssistant};
pub use catalog::{Catalog, CatalogService, IdleConfig, ResolvedMedia};
pub use chat_store::{open_chat_store, ChatStore, JsonlChatStore, MemoryChatStore};
pub use transcription::{DisabledTranscriber, Transcriber};
