//! Assistant provider keys from `api-keys.txt`.
//!
//! ```text
//! OPENAI_API_KEY=sk-...
//! GEMINI_API_KEY=AIza...
//! ```

use serde::Serialize;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::constants::API_KEYS_FILE;

/// Hosted chat providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// `OPENAI_API_KEY`
    OpenAi,
    /// `GEMINI_API_KEY`
    Gemini,
}

impl Provider {
    /// Key name in `api-keys.txt`.
    #[must_use]
    pub const fn env_key(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

/// Keys that were found. Secrets are never serialized.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    openai: Option<String>,
    gemini: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("openai", &self.openai.as_ref().map(|_| "***"))
            .field("gemini", &self.gemini.as_ref().map(|_| "***"))
            .finish()
    }
}

impl ApiKeys {
    /// Parses `KEY=value` lines. Unknown keys and blank values are ignored.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut keys = Self::default();

        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.trim() {
                k if k == Provider::OpenAi.env_key() => keys.openai = Some(value.to_string()),
                k if k == Provider::Gemini.env_key() => keys.gemini = Some(value.to_string()),
                _ => {}
            }
        }

        keys
    }

    /// Loads `api-keys.txt` from the content root. A missing file has no keys.
    #[must_use]
    pub fn load(app_root: &Path) -> Self {
        let path = app_root.join(API_KEYS_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No API keys file");
                Self::default()
            }
        }
    }

    /// Key for a provider.
    #[must_use]
    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai.as_deref(),
            Provider::Gemini => self.gemini.as_deref(),
        }
    }

    /// True when a key exists for the provider.
    #[must_use]
    pub fn has(&self, provider: Provider) -> bool {
        self.get(provider).is_some()
    }

    /// Providers with a key, in a fixed order.
    #[must_use]
    pub fn providers(&self) -> Vec<Provider> {
        [Provider::Gemini, Provider::OpenAi]
            .into_iter()
            .filter(|p| self.has(*p))
            .collect()
    }
}
