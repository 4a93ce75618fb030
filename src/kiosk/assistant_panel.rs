//! Assistant side panel: open flag, transcript, model choice, voice errors.
//!
//! Sending is split in two so the slow assistant call never runs while the
//! kiosk state is borrowed: [`AssistantPanel::begin_send`] records the
//! visitor's message and hands back a [`PendingChat`], and
//! [`AssistantPanel::finish_send`] records the reply once it arrives.

use anyhow::Result;
use serde::Serialize;

use crate::models::{ChatMessage, ChatRole, Product};
use crate::services::api_keys::Provider;
use crate::services::assistant::{build_request, find_model, AssistantRequest};

/// Inline reply shown when the assistant fails.
#[must_use]
pub fn error_reply(err: &anyhow::Error) -> String {
    format!("Sorry, something went wrong.\n\n({err})")
}

/// A question on its way to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChat {
    /// Session the question was asked in
    pub epoch: u64,
    /// The visitor's message, already in the transcript
    pub user_message: ChatMessage,
    /// What to hand the assistant
    pub request: AssistantRequest,
}

impl PendingChat {
    /// Turns the assistant's outcome into the reply message.
    ///
    /// The reply carries the same product context as the question.
    #[must_use]
    pub fn reply(&self, outcome: &Result<String>) -> ChatMessage {
        let text = match outcome {
            Ok(text) => text.clone(),
            Err(err) => error_reply(err),
        };
        let mut reply = ChatMessage::new(ChatRole::Assistant, text);
        reply.product_id.clone_from(&self.user_message.product_id);
        reply.product_name.clone_from(&self.user_message.product_name);
        reply.category_path.clone_from(&self.user_message.category_path);
        reply
    }
}

/// Assistant side panel: transcript, loading flag and model choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantPanel {
    is_open: bool,
    messages: Vec<ChatMessage>,
    is_loading: bool,
    model: String,
    provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_error: Option<String>,
}

impl AssistantPanel {
    /// A closed panel using `model`.
    #[must_use]
    pub fn new(model: &str) -> Self {
        Self {
            is_open: false,
            messages: Vec::new(),
            is_loading: false,
            model: model.to_string(),
            provider: find_model(model).map(|m| m.provider),
            voice_error: None,
        }
    }

    /// Shows the panel.
    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Hides the panel. The transcript is kept.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Shows or hides the panel.
    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Switches model. Unknown model ids are ignored and return false.
    pub fn set_model(&mut self, model: &str) -> bool {
        let Some(info) = find_model(model) else {
            return false;
        };
        self.model = info.model.to_string();
        self.provider = Some(info.provider);
        true
    }

    /// Records the visitor's message and prepares the assistant request.
    ///
    /// Returns `None` (and changes nothing) when the trimmed text is empty or
    /// another answer is still loading. The request's history is the
    /// transcript before this message, cut to the last `history_limit`.
    pub fn begin_send(
        &mut self,
        text: &str,
        product: Option<&Product>,
        breadcrumb: &[String],
        history_limit: usize,
        epoch: u64,
    ) -> Option<PendingChat> {
        let text = text.trim();
        if text.is_empty() || self.is_loading {
            return None;
        }

        let request = build_request(&self.model, product, &self.messages, history_limit, text);
        let user_message = ChatMessage::new(ChatRole::User, text).with_context(product, breadcrumb);

        self.messages.push(user_message.clone());
        self.is_loading = true;
        self.voice_error = None;

        Some(PendingChat {
            epoch,
            user_message,
            request,
        })
    }

    /// Records the assistant's reply and clears the loading flag.
    pub fn finish_send(&mut self, reply: ChatMessage) {
        self.messages.push(reply);
        self.is_loading = false;
    }

    /// Shows a transcription failure under the microphone button.
    pub fn set_voice_error(&mut self, message: impl Into<String>) {
        self.voice_error = Some(message.into());
    }

    /// Hides the transcription failure.
    pub fn clear_voice_error(&mut self) {
        self.voice_error = None;
    }

    /// Closes the panel and forgets the on-screen conversation.
    ///
    /// The model choice survives.
    pub fn reset_view(&mut self) {
        self.is_open = false;
        self.messages.clear();
        self.is_loading = false;
        self.voice_error = None;
    }

    /// Whether the panel is showing.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Messages of the current session, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether an answer is still loading.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Selected model id.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Provider of the selected model.
    #[must_use]
    pub fn provider(&self) -> Option<Provider> {
        self.provider
    }

    /// Last transcription failure, if any.
    #[must_use]
    pub fn voice_error(&self) -> Option<&str> {
        self.voice_error.as_deref()
    }
}
