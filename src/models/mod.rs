//! Data models for the catalog tree and the kiosk conversation.
//!
//! This module contains the core data structures produced by the scanner and
//! consumed by the kiosk state machine and the web API. Models are independent
//! of I/O and UI.

pub mod category;
pub mod chat;
pub mod media;
pub mod product;

// Re-export all model types
pub use category::{find_category, find_product, Category};
pub use chat::{ChatMessage, ChatRole};
pub use media::{MediaFile, MediaKind};
pub use product::Product;
