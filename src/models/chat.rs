//! Chat transcript entries exchanged with the assistant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Product;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Typed or dictated by the visitor
    User,
    /// Produced by the assistant (or an inline error shown in its place)
    Assistant,
}

/// One message of the kiosk conversation, with the product it was asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Random UUID
    pub id: String,
    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
    /// Who wrote it
    pub role: ChatRole,
    /// Message body
    pub text: String,
    /// Product on screen when the message was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Display name of that product
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Breadcrumb joined with " > "
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_path: Option<String>,
}

impl ChatMessage {
    /// Creates a message stamped with the current time and a fresh id.
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            role,
            text: text.into(),
            product_id: None,
            product_name: None,
            category_path: None,
        }
    }

    /// Attaches the product and breadcrumb the visitor was looking at.
    pub fn with_context(mut self, product: Option<&Product>, breadcrumb: &[String]) -> Self {
        if let Some(product) = product {
            self.product_id = Some(product.id.clone());
            self.product_name = Some(product.name.clone());
        }
        if !breadcrumb.is_empty() {
            self.category_path = Some(breadcrumb.join(" > "));
        }
        self
    }
}
