//! Chat history persistence.
//!
//! The kiosk only needs three operations: append a message, read the most
//! recent messages oldest first, and clear everything. The file store keeps
//! one JSON object per line so an append never rewrites the log.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::models::ChatMessage;

/// Default number of messages returned by a history read.
pub const DEFAULT_HISTORY_READ: usize = 100;

/// Append-only chat log.
pub trait ChatStore: Send {
    /// Records a message.
    fn append(&mut self, message: &ChatMessage) -> Result<()>;

    /// The last `limit` messages, oldest first.
    fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>>;

    /// Deletes every message.
    fn clear(&mut self) -> Result<()>;
}

/// Chat log kept in memory for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryChatStore {
    messages: Vec<ChatMessage>,
}

impl MemoryChatStore {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatStore for MemoryChatStore {
    fn append(&mut self, message: &ChatMessage) -> Result<()> {
        self.messages.push(message.clone());
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        let start = self.messages.len().saturating_sub(limit);
        Ok(self.messages[start..].to_vec())
    }

    fn clear(&mut self) -> Result<()> {
        self.messages.clear();
        Ok(())
    }
}

/// Chat log stored as JSON lines.
#[derive(Debug, Clone)]
pub struct JsonlChatStore {
    path: PathBuf,
}

impl JsonlChatStore {
    /// Opens (creating if needed) the log at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create chat log directory: {}", parent.display())
            })?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open chat log: {}", path.display()))?;
        Ok(Self { path })
    }

    /// Log file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChatStore for JsonlChatStore {
    fn append(&mut self, message: &ChatMessage) -> Result<()> {
        let mut line = serde_json::to_string(message).context("Failed to serialize message")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open chat log: {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed to append to chat log: {}", self.path.display()))
    }

    fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read chat log: {}", self.path.display()))?;

        let messages: Vec<ChatMessage> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(message) => Some(message),
                Err(e) => {
                    debug!(error = %e, "Skipping malformed chat log line");
                    None
                }
            })
            .collect();

        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }

    fn clear(&mut self) -> Result<()> {
        fs::write(&self.path, "")
            .with_context(|| format!("Failed to clear chat log: {}", self.path.display()))
    }
}

/// File-backed log that switches to memory for good after the first failure.
///
/// Messages written before the failure stay in the file; the memory copy
/// starts empty apart from the message that failed.
#[derive(Debug)]
pub struct FallbackChatStore {
    file: Option<JsonlChatStore>,
    memory: MemoryChatStore,
}

impl FallbackChatStore {
    /// Wraps an already opened file store.
    #[must_use]
    pub fn new(file: JsonlChatStore) -> Self {
        Self {
            file: Some(file),
            memory: MemoryChatStore::new(),
        }
    }

    /// True while the file is still in use.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.file.is_some()
    }

    fn degrade(&mut self, error: &anyhow::Error) {
        if let Some(file) = self.file.take() {
            warn!(
                path = %file.path().display(),
                error = %error,
                "Chat log failed, keeping history in memory"
            );
        }
    }
}

impl ChatStore for FallbackChatStore {
    fn append(&mut self, message: &ChatMessage) -> Result<()> {
        if let Some(file) = &mut self.file {
            match file.append(message) {
                Ok(()) => return Ok(()),
                Err(e) => self.degrade(&e),
            }
        }
        self.memory.append(message)
    }

    fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        if let Some(file) = &self.file {
            match file.recent(limit) {
                Ok(messages) => return Ok(messages),
                Err(e) => warn!(error = %e, "Chat log unreadable, serving memory copy"),
            }
        }
        self.memory.recent(limit)
    }

    fn clear(&mut self) -> Result<()> {
        if let Some(file) = &mut self.file {
            if let Err(e) = file.clear() {
                self.degrade(&e);
            }
        }
        self.memory.clear()
    }
}

/// Opens the configured chat log.
///
/// `None`, or a log that cannot be opened, gives an in-memory store.
#[must_use]
pub fn open_chat_store(path: Option<&Path>) -> Box<dyn ChatStore> {
    let Some(path) = path else {
        debug!("No chat log configured, keeping history in memory");
        return Box::new(MemoryChatStore::new());
    };

    match JsonlChatStore::open(path) {
        Ok(file) => Box::new(FallbackChatStore::new(file)),
        Err(e) => {
            warn!(error = %e, "Chat log unavailable, keeping history in memory");
            Box::new(MemoryChatStore::new())
        }
    }
}
