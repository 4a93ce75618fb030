//! Voice transcription collaborator.

use anyhow::Result;

/// Turns recorded audio into text.
///
/// Implementations block; callers run them off the kiosk event loop.
pub trait Transcriber: Send + Sync {
    /// Transcribes raw audio bytes.
    fn transcribe(&self, audio: &[u8]) -> Result<String>;

    /// Whether voice input should be offered at all.
    fn is_available(&self) -> bool {
        true
    }
}

impl<F> Transcriber for F
where
    F: Fn(&[u8]) -> Result<String> + Send + Sync,
{
    fn transcribe(&self, audio: &[u8]) -> Result<String> {
        self(audio)
    }
}

/// Transcriber used when no speech model is bundled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTranscriber;

impl Transcriber for DisabledTranscriber {
    fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        anyhow::bail!("Voice transcription is not available on this kiosk")
    }

    fn is_available(&self) -> bool {
        false
    }
}
