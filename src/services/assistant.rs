//! AI assistant collaborator: model catalog, prompt building, and the
//! [`Assistant`] seam that a hosted chat provider plugs into.

use anyhow::Result;
use serde::Serialize;

use crate::models::{ChatMessage, Product};

use super::api_keys::{ApiKeys, Provider};

/// A selectable chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    /// Provider serving the model
    pub provider: Provider,
    /// Provider model id
    pub model: &'static str,
    /// Human-readable label
    pub label: &'static str,
}

/// Every model the kiosk offers, in menu order.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        provider: Provider::Gemini,
        model: "gemini-2.5-pro",
        label: "Gemini 2.5 Pro",
    },
    ModelInfo {
        provider: Provider::Gemini,
        model: "gemini-2.5-flash",
        label: "Gemini 2.5 Flash",
    },
    ModelInfo {
        provider: Provider::Gemini,
        model: "gemini-2.0-flash",
        label: "Gemini 2.0 Flash",
    },
    ModelInfo {
        provider: Provider::OpenAi,
        model: "gpt-4o",
        label: "GPT-4o",
    },
    ModelInfo {
        provider: Provider::OpenAi,
        model: "gpt-4o-mini",
        label: "GPT-4o Mini",
    },
    ModelInfo {
        provider: Provider::OpenAi,
        model: "gpt-3.5-turbo",
        label: "GPT-3.5 Turbo",
    },
];

/// Looks up a model by id.
#[must_use]
pub fn find_model(model: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.model == model)
}

/// Models whose provider has a key.
#[must_use]
pub fn available_models(keys: &ApiKeys) -> Vec<&'static ModelInfo> {
    MODELS.iter().filter(|m| keys.has(m.provider)).collect()
}

/// Everything a provider needs to answer one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantRequest {
    /// Model id
    pub model: String,
    /// Provider for the model, if known
    pub provider: Option<Provider>,
    /// Instructions plus current product context
    pub system_prompt: String,
    /// Prior conversation, oldest first
    pub history: Vec<ChatMessage>,
    /// The visitor's question
    pub user_text: String,
}

/// A chat completion backend.
///
/// Implementations block until the reply is complete. Callers run them off
/// the kiosk event loop.
pub trait Assistant: Send + Sync {
    /// Answers one question.
    fn send(&self, request: &AssistantRequest) -> Result<String>;
}

impl<F> Assistant for F
where
    F: Fn(&AssistantRequest) -> Result<String> + Send + Sync,
{
    fn send(&self, request: &AssistantRequest) -> Result<String> {
        self(request)
    }
}

/// Backend used when no hosted provider is linked into the build.
///
/// Always fails, which the panel turns into an inline error message.
#[derive(Debug, Clone, Default)]
pub struct UnavailableAssistant {
    keys: ApiKeys,
}

impl UnavailableAssistant {
    /// Creates the fallback with the keys that were found.
    #[must_use]
    pub fn new(keys: ApiKeys) -> Self {
        Self { keys }
    }
}

impl Assistant for UnavailableAssistant {
    fn send(&self, request: &AssistantRequest) -> Result<String> {
        match request.provider {
            Some(provider) if self.keys.has(provider) => anyhow::bail!(
                "No chat provider is linked for model '{}'",
                request.model
            ),
            _ => anyhow::bail!("AI service not initialized. Please check api-keys.txt file."),
        }
    }
}

/// Describes what the visitor is looking at.
///
/// `ai.txt` wins over the docx description. Media counts are always included
/// for a product.
#[must_use]
pub fn build_context(product: Option<&Product>) -> String {
    let Some(product) = product else {
        return "The user is on the home screen. No specific product is selected.".to_string();
    };

    let mut context = format!("Current Product: {}\n", product.name);

    if let Some(ai_context) = &product.ai_context {
        context.push_str(&format!("\nProduct Information:\n{ai_context}\n"));
    } else if let Some(description) = &product.description {
        context.push_str(&format!("Description: {description}\n"));
    }

    context.push_str(&format!(
        "\nMedia files: {} items ({} images, {} videos)",
        product.media.len(),
        product.image_count(),
        product.video_count()
    ));

    context.trim().to_string()
}

/// Wraps the product context in the assistant's standing instructions.
#[must_use]
pub fn build_system_prompt(context: &str) -> String {
    format!(
        "You are an AI assistant for a product showcase touchscreen application. \
Your role is to help users learn about products and answer their questions.

Current Context:
{context}

Guidelines:
- Be helpful, friendly, and professional
- Provide accurate information about the products
- If you don't know something, admit it rather than guessing
- Keep responses concise but informative
- Use the current context to provide relevant answers
- If asked about a product that's not currently displayed, mention that and guide the user"
    )
}

/// Builds a request from the panel's state.
///
/// Only the last `history_limit` messages of `history` are sent.
#[must_use]
pub fn build_request(
    model: &str,
    product: Option<&Product>,
    history: &[ChatMessage],
    history_limit: usize,
    user_text: &str,
) -> AssistantRequest {
    let start = history.len().saturating_sub(history_limit);
    AssistantRequest {
        model: model.to_string(),
        provider: find_model(model).map(|m| m.provider),
        system_prompt: build_system_prompt(&build_context(product)),
        history: history[start..].to_vec(),
        user_text: user_text.to_string(),
    }
}
