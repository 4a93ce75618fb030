//! Gallery carousel state for the selected product.

use serde::Serialize;

use crate::models::MediaFile;

/// Position and playback flags of the product gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselState {
    media: Vec<MediaFile>,
    current_index: usize,
    is_fullscreen: bool,
    is_playing: bool,
}

impl CarouselState {
    /// An empty gallery.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a gallery and rewinds to the first item.
    pub fn set_media(&mut self, media: Vec<MediaFile>) {
        self.media = media;
        self.current_index = 0;
        self.is_fullscreen = false;
        self.is_playing = false;
    }

    /// Moves forward, stopping at the last item.
    pub fn next(&mut self) {
        if self.current_index + 1 < self.media.len() {
            self.current_index += 1;
        }
    }

    /// Moves back, stopping at the first item.
    pub fn previous(&mut self) {
        self.current_index = self.current_index.saturating_sub(1);
    }

    /// Jumps to `index`. Out-of-range indexes are ignored.
    pub fn go_to(&mut self, index: usize) {
        if index < self.media.len() {
            self.current_index = index;
        }
    }

    /// Enters or leaves fullscreen.
    pub fn toggle_fullscreen(&mut self) {
        self.is_fullscreen = !self.is_fullscreen;
    }

    /// Sets fullscreen explicitly.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.is_fullscreen = fullscreen;
    }

    /// Records whether the current video plays.
    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    /// Empties the gallery.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Media of the selected product, in listing order.
    #[must_use]
    pub fn media(&self) -> &[MediaFile] {
        &self.media
    }

    /// Index of the slide on screen.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The item on screen, if any.
    #[must_use]
    pub fn current(&self) -> Option<&MediaFile> {
        self.media.get(self.current_index)
    }

    /// Whether the gallery is fullscreen.
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    /// Whether the current video plays.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }
}
