//! Kiosk state: navigation, gallery, assistant panel and the two timers.
//!
//! [`KioskState`] is a plain value driven by [`KioskEvent`]s and clock ticks.
//! It never reads the clock itself: every operation takes `now`, so the
//! runtime, the tests and a paused tokio clock all drive it the same way.
//! [`runtime`] wraps it in a tokio task for the web server.

pub mod assistant_panel;
pub mod carousel;
pub mod idle;
pub mod navigation;
pub mod runtime;
pub mod session;

pub use assistant_panel::{AssistantPanel, PendingChat};
pub use carousel::CarouselState;
pub use idle::IdleTimer;
pub use navigation::{MenuView, NavAction, NavigationState, Screen};
pub use runtime::{spawn, ChatExchange, ChatOutcome, KioskHandle, KioskServices};
pub use session::{SessionEvent, SessionPhase, SessionTimer};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::{
    DEFAULT_HISTORY_LIMIT, DEFAULT_SESSION_RESET_MS, DEFAULT_SESSION_WARNING_MS,
};
use crate::models::{ChatMessage, Product};
use crate::services::Catalog;

/// Something the visitor did on the touchscreen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KioskEvent {
    /// A touch with no other effect
    Activity,
    /// Tap on a category tile or menu entry
    SelectCategory {
        /// Folder name of the category
        id: String,
    },
    /// Tap on a product tile
    SelectProduct {
        /// Folder name of the product
        id: String,
    },
    /// Back button
    Back,
    /// Home button
    Home,
    /// Tap on a breadcrumb segment; negative means Home
    Breadcrumb {
        /// Zero-based level in the path
        index: i64,
    },
    /// Menu button
    ToggleMenu,
    /// Tap outside the open menu
    CloseMenu,
    /// Swipe left
    NextSlide,
    /// Swipe right
    PreviousSlide,
    /// Tap on a gallery dot
    GoToSlide {
        /// Position in the gallery
        index: usize,
    },
    /// Fullscreen button
    ToggleFullscreen,
    /// Fullscreen entered or left by the browser
    SetFullscreen {
        /// Whether the gallery is fullscreen
        value: bool,
    },
    /// Video started or paused
    SetPlaying {
        /// Whether the current video plays
        value: bool,
    },
    /// Assistant button
    TogglePanel,
    /// Opens the assistant panel without toggling
    OpenPanel,
    /// Close button on the assistant panel
    ClosePanel,
    /// Model picker in the assistant panel
    SetModel {
        /// Model id, see [`crate::services::assistant::MODELS`]
        model: String,
    },
    /// "I'm still here" on the session warning
    ContinueSession,
    /// "Start over"
    ResetSession,
    /// Touch on the idle takeover
    DismissIdle,
}

/// Timer transitions reported by [`KioskState::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The idle takeover started
    WentIdle,
    /// The "are you still there" warning appeared
    SessionWarning,
    /// The session ended and the kiosk went home
    SessionReset,
}

/// Timing and assistant settings for a kiosk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KioskSettings {
    /// Inactivity before the session warning
    pub session_warning: Duration,
    /// Inactivity before the session resets
    pub session_reset: Duration,
    /// Messages sent to the assistant as context
    pub history_limit: usize,
    /// Initially selected model id
    pub model: String,
}

impl Default for KioskSettings {
    fn default() -> Self {
        Self {
            session_warning: Duration::from_millis(DEFAULT_SESSION_WARNING_MS),
            session_reset: Duration::from_millis(DEFAULT_SESSION_RESET_MS),
            history_limit: DEFAULT_HISTORY_LIMIT,
            model: crate::config::AssistantConfig::default().model,
        }
    }
}

impl KioskSettings {
    /// Reads timings and assistant settings from the saved config.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            session_warning: config.timers.session_warning(),
            session_reset: config.timers.session_reset(),
            history_limit: config.assistant.history_limit,
            model: config.assistant.model.clone(),
        }
    }
}

/// Session part of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Where the countdown stands
    pub phase: SessionPhase,
    /// Whether the warning overlay should show
    pub warning: bool,
    /// Whole seconds until the reset, rounded up
    pub seconds_remaining: u64,
}

/// Everything a front end needs to draw the kiosk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskSnapshot {
    /// Which screen is showing
    pub screen: Screen,
    /// Menu content for that screen
    pub view: MenuView,
    /// Display names along the open path
    pub breadcrumb: Vec<String>,
    /// Folder names along the open path
    pub path: Vec<String>,
    /// Whether the category menu is expanded
    pub is_menu_open: bool,
    /// Product shown in the gallery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_product: Option<Product>,
    /// Gallery position and playback flags
    pub carousel: CarouselState,
    /// Whether the idle takeover is showing
    pub is_idle: bool,
    /// Video for the idle takeover
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_video: Option<PathBuf>,
    /// Session countdown
    pub session: SessionSnapshot,
    /// Assistant panel
    pub panel: AssistantPanel,
}

/// The whole interactive state of one kiosk screen.
#[derive(Debug, Clone)]
pub struct KioskState {
    catalog: Arc<Catalog>,
    navigation: NavigationState,
    carousel: CarouselState,
    panel: AssistantPanel,
    idle: IdleTimer,
    session: SessionTimer,
    history_limit: usize,
    epoch: u64,
}

impl KioskState {
    /// A kiosk at Home with both timers running from `now`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, settings: &KioskSettings, now: Instant) -> Self {
        let mut idle = IdleTimer::new(Duration::from_secs(catalog.idle.timeout_secs));
        idle.start(now);
        let mut session = SessionTimer::new(settings.session_warning, settings.session_reset);
        session.restart(now);

        Self {
            catalog,
            navigation: NavigationState::new(),
            carousel: CarouselState::new(),
            panel: AssistantPanel::new(&settings.model),
            idle,
            session,
            history_limit: settings.history_limit,
            epoch: 0,
        }
    }

    /// Applies one visitor event.
    ///
    /// Every event counts as activity. While the idle takeover is showing,
    /// the first event only dismisses it and is otherwise consumed.
    pub fn apply(&mut self, event: KioskEvent, now: Instant) {
        if self.idle.is_idle() {
            self.wake(now);
            return;
        }

        self.idle.record_activity(now);
        match event {
            KioskEvent::ContinueSession => self.session.continue_session(now),
            KioskEvent::ResetSession => {
                self.reset_session();
                self.session.reset_now();
                return;
            }
            _ => {
                self.session.record_activity(now);
            }
        }

        match event {
            KioskEvent::Activity
            | KioskEvent::DismissIdle
            | KioskEvent::ContinueSession
            | KioskEvent::ResetSession => {}
            KioskEvent::SelectCategory { id } => match self
                .catalog
                .resolve_category(self.navigation.current_category(), &id)
            {
                Some(category) => {
                    let category = category.clone();
                    self.navigate(NavAction::OpenCategory(category));
                }
                None => debug!("Ignoring unknown category '{id}'"),
            },
            KioskEvent::SelectProduct { id } => match self
                .catalog
                .resolve_product(self.navigation.current_category(), &id)
            {
                Some(product) => {
                    let product = product.clone();
                    self.open_product(product);
                }
                None => debug!("Ignoring unknown product '{id}'"),
            },
            KioskEvent::Back => self.navigate(NavAction::Back),
            KioskEvent::Home => self.navigate(NavAction::Home),
            KioskEvent::Breadcrumb { index } => self.navigate(NavAction::Breadcrumb(index)),
            KioskEvent::ToggleMenu => self.navigate(NavAction::ToggleMenu),
            KioskEvent::CloseMenu => self.navigate(NavAction::CloseMenu),
            KioskEvent::NextSlide => self.carousel.next(),
            KioskEvent::PreviousSlide => self.carousel.previous(),
            KioskEvent::GoToSlide { index } => self.carousel.go_to(index),
            KioskEvent::ToggleFullscreen => self.carousel.toggle_fullscreen(),
            KioskEvent::SetFullscreen { value } => self.carousel.set_fullscreen(value),
            KioskEvent::SetPlaying { value } => self.carousel.set_playing(value),
            KioskEvent::TogglePanel => self.panel.toggle(),
            KioskEvent::OpenPanel => self.panel.open(),
            KioskEvent::ClosePanel => self.panel.close(),
            KioskEvent::SetModel { model } => {
                if !self.panel.set_model(&model) {
                    debug!("Ignoring unknown model '{model}'");
                }
            }
        }
    }

    /// Fires every timer stage reached by `now`.
    pub fn tick(&mut self, now: Instant) -> Vec<TimerEvent> {
        let mut fired = Vec::new();

        if self.idle.poll(now) {
            info!("Kiosk went idle");
            fired.push(TimerEvent::WentIdle);
        }

        for event in self.session.poll(now) {
            match event {
                SessionEvent::Warning => {
                    debug!("Session warning shown");
                    fired.push(TimerEvent::SessionWarning);
                }
                SessionEvent::Reset => {
                    info!("Session expired, returning home");
                    self.reset_session();
                    fired.push(TimerEvent::SessionReset);
                }
            }
        }

        fired
    }

    /// Earliest instant at which [`tick`](Self::tick) has something to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.idle.deadline(), self.session.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Cancels both timers. Nothing fires until the next activity.
    pub fn stop_timers(&mut self) {
        self.idle.stop();
        self.session.stop();
    }

    /// Swaps in a freshly scanned catalog and returns home.
    pub fn replace_catalog(&mut self, catalog: Arc<Catalog>, now: Instant) {
        self.idle
            .set_timeout(Duration::from_secs(catalog.idle.timeout_secs), now);
        self.catalog = catalog;
        self.navigation.go_home();
        self.carousel.reset();
    }

    /// Records a typed question and prepares the assistant call.
    ///
    /// Returns `None` when the text is blank or an answer is still loading.
    pub fn begin_chat(&mut self, text: &str, now: Instant) -> Option<PendingChat> {
        self.touch(now);
        let breadcrumb = self.navigation.breadcrumb();
        self.panel.begin_send(
            text,
            self.navigation.selected_product(),
            &breadcrumb,
            self.history_limit,
            self.epoch,
        )
    }

    /// Shows the assistant's reply, unless the session was reset meanwhile.
    ///
    /// Returns whether the reply reached the transcript.
    pub fn finish_chat(&mut self, pending: &PendingChat, reply: ChatMessage) -> bool {
        if pending.epoch != self.epoch {
            debug!("Dropping reply from an earlier session");
            return false;
        }
        self.panel.finish_send(reply);
        true
    }

    /// Marks the start of a voice recording. Returns the session epoch.
    pub fn begin_voice(&mut self, now: Instant) -> u64 {
        self.touch(now);
        self.panel.clear_voice_error();
        self.epoch
    }

    /// Shows a transcription failure, unless the session was reset meanwhile.
    pub fn voice_failed(&mut self, epoch: u64, message: impl Into<String>) {
        if epoch == self.epoch {
            self.panel.set_voice_error(message);
        }
    }

    /// Current state for rendering.
    #[must_use]
    pub fn snapshot(&self, now: Instant) -> KioskSnapshot {
        KioskSnapshot {
            screen: self.navigation.screen(),
            view: self.navigation.view(&self.catalog.categories),
            breadcrumb: self.navigation.breadcrumb(),
            path: self.navigation.path(),
            is_menu_open: self.navigation.is_menu_open(),
            selected_product: self.navigation.selected_product().cloned(),
            carousel: self.carousel.clone(),
            is_idle: self.idle.is_idle(),
            idle_video: self.catalog.idle.video_path.clone(),
            session: SessionSnapshot {
                phase: self.session.phase(),
                warning: self.session.is_warning(),
                seconds_remaining: self.session.seconds_remaining(now),
            },
            panel: self.panel.clone(),
        }
    }

    /// Catalog the kiosk is browsing.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Menu path and selected product.
    #[must_use]
    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    /// Gallery of the selected product.
    #[must_use]
    pub fn carousel(&self) -> &CarouselState {
        &self.carousel
    }

    /// Assistant panel.
    #[must_use]
    pub fn panel(&self) -> &AssistantPanel {
        &self.panel
    }

    /// Whether the idle takeover is showing.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.idle.is_idle()
    }

    /// Session countdown.
    #[must_use]
    pub fn session(&self) -> &SessionTimer {
        &self.session
    }

    /// Incremented by every session reset.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Counts as activity, dismissing the idle takeover if it is showing.
    fn touch(&mut self, now: Instant) {
        if self.idle.is_idle() {
            self.wake(now);
        } else {
            self.idle.record_activity(now);
            self.session.record_activity(now);
        }
    }

    /// Leaves the idle takeover: home, then the company product if there is one.
    fn wake(&mut self, now: Instant) {
        info!("Kiosk woke up");
        self.idle.record_activity(now);
        self.session.record_activity(now);
        self.navigation.go_home();
        self.carousel.reset();

        if let Some(company) = self.catalog.company.clone() {
            self.open_product(company);
        }
    }

    fn open_product(&mut self, product: Product) {
        self.carousel.set_media(product.media.clone());
        self.navigation.navigate_to_product(product);
    }

    fn navigate(&mut self, action: NavAction) {
        self.navigation.apply(action);
        if self.navigation.selected_product().is_none() {
            self.carousel.reset();
        }
    }

    fn reset_session(&mut self) {
        self.navigation.go_home();
        self.carousel.reset();
        self.panel.reset_view();
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, MediaFile, MediaKind};

    fn product(id: &str, media: usize) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_uppercase(),
            path: PathBuf::from(id),
            media: (0..media)
                .map(|i| MediaFile {
                    id: format!("{id}-{i}"),
                    kind: MediaKind::Image,
                    filename: format!("{i}.jpg"),
                    path: PathBuf::from(format!("{id}/{i}.jpg")),
                    caption: None,
                    description: None,
                })
                .collect(),
            description: None,
            ai_context: None,
            thumbnail: None,
        }
    }

    fn category(id: &str, subcategories: Vec<Category>, products: Vec<Product>) -> Category {
        Category {
            id: id.to_string(),
            name: id.to_uppercase(),
            path: PathBuf::from(id),
            subcategories,
            products,
            thumbnail: None,
        }
    }

    fn catalog(company: Option<Product>) -> Arc<Catalog> {
        let mut catalog = Catalog::empty(60);
        catalog.categories = vec![category(
            "shoes",
            vec![category("running", vec![], vec![product("sprinter", 3)])],
            vec![product("loafer", 1)],
        )];
        catalog.company = company;
        Arc::new(catalog)
    }

    fn kiosk(company: Option<Product>) -> (KioskState, Instant) {
        let now = Instant::now();
        (
            KioskState::new(catalog(company), &KioskSettings::default(), now),
            now,
        )
    }

    fn select_category(id: &str) -> KioskEvent {
        KioskEvent::SelectCategory { id: id.to_string() }
    }

    fn select_product(id: &str) -> KioskEvent {
        KioskEvent::SelectProduct { id: id.to_string() }
    }

    #[test]
    fn test_event_deserializes_from_tagged_json() {
        let event: KioskEvent =
            serde_json::from_str(r#"{"type":"select_category","id":"shoes"}"#).unwrap();
        assert_eq!(event, select_category("shoes"));
        let event: KioskEvent = serde_json::from_str(r#"{"type":"next_slide"}"#).unwrap();
        assert_eq!(event, KioskEvent::NextSlide);
    }

    #[test]
    fn test_selecting_product_loads_carousel() {
        let (mut state, t0) = kiosk(None);
        state.apply(select_category("shoes"), t0);
        state.apply(select_category("running"), t0);
        state.apply(select_product("sprinter"), t0);

        assert_eq!(state.navigation().screen(), Screen::ProductOpen);
        assert_eq!(state.carousel().media().len(), 3);
        state.apply(KioskEvent::NextSlide, t0);
        assert_eq!(state.carousel().current_index(), 1);

        state.apply(KioskEvent::Back, t0);
        assert_eq!(state.navigation().path(), vec!["shoes"]);
        assert!(state.carousel().media().is_empty());
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let (mut state, t0) = kiosk(None);
        state.apply(select_category("shoes"), t0);
        state.apply(select_category("hats"), t0);
        state.apply(select_product("nope"), t0);
        assert_eq!(state.navigation().path(), vec!["shoes"]);
        assert!(state.navigation().selected_product().is_none());
    }

    #[test]
    fn test_goes_idle_and_first_touch_wakes_to_company() {
        let (mut state, t0) = kiosk(Some(product("acme", 2)));
        state.apply(select_category("shoes"), t0);

        let fired = state.tick(t0 + Duration::from_secs(60));
        assert!(fired.contains(&TimerEvent::WentIdle));
        assert!(state.is_idle());

        let later = t0 + Duration::from_secs(120);
        state.apply(select_category("shoes"), later);
        assert!(!state.is_idle());
        assert!(state.navigation().path().is_empty());
        assert_eq!(
            state.navigation().selected_product().map(|p| p.id.as_str()),
            Some("acme")
        );
        assert_eq!(state.carousel().media().len(), 2);
    }

    #[test]
    fn test_wake_without_company_goes_home() {
        let (mut state, t0) = kiosk(None);
        state.apply(select_product("loafer"), t0);
        state.tick(t0 + Duration::from_secs(60));
        state.apply(KioskEvent::DismissIdle, t0 + Duration::from_secs(61));
        assert_eq!(state.navigation().screen(), Screen::Home);
    }

    #[test]
    fn test_session_warning_then_reset() {
        let (mut state, t0) = kiosk(None);
        state.apply(select_product("sprinter"), t0);
        state.apply(KioskEvent::OpenPanel, t0);

        let fired = state.tick(t0 + Duration::from_secs(45));
        assert_eq!(fired, vec![TimerEvent::SessionWarning]);
        let snapshot = state.snapshot(t0 + Duration::from_secs(45));
        assert!(snapshot.session.warning);
        assert_eq!(snapshot.session.seconds_remaining, 15);

        // a touch during the warning does not postpone the reset
        state.apply(KioskEvent::NextSlide, t0 + Duration::from_secs(50));

        let fired = state.tick(t0 + Duration::from_secs(60));
        assert!(fired.contains(&TimerEvent::SessionReset));
        assert_eq!(state.navigation().screen(), Screen::Home);
        assert!(!state.panel().is_open());
        assert_eq!(state.epoch(), 1);
    }

    #[test]
    fn test_continue_session_postpones_reset() {
        let (mut state, t0) = kiosk(None);
        state.tick(t0 + Duration::from_secs(45));
        state.apply(KioskEvent::ContinueSession, t0 + Duration::from_secs(50));

        assert!(state.tick(t0 + Duration::from_secs(60)).is_empty());
        assert_eq!(state.session().phase(), SessionPhase::Active);
        assert_eq!(
            state.next_deadline(),
            Some(t0 + Duration::from_secs(95))
        );
    }

    #[test]
    fn test_reset_session_event() {
        let (mut state, t0) = kiosk(None);
        state.apply(select_product("loafer"), t0);
        state.apply(KioskEvent::ResetSession, t0);

        assert_eq!(state.navigation().screen(), Screen::Home);
        assert_eq!(state.session().phase(), SessionPhase::Expired);
        assert_eq!(state.epoch(), 1);

        state.apply(KioskEvent::Activity, t0 + Duration::from_secs(1));
        assert_eq!(state.session().phase(), SessionPhase::Active);
    }

    #[test]
    fn test_chat_reply_dropped_after_reset() {
        let (mut state, t0) = kiosk(None);
        let pending = state.begin_chat("hello", t0).unwrap();
        assert!(state.panel().is_loading());

        state.apply(KioskEvent::ResetSession, t0);
        let reply = pending.reply(&Ok("hi".to_string()));
        assert!(!state.finish_chat(&pending, reply));
        assert!(state.panel().messages().is_empty());
        assert!(!state.panel().is_loading());
    }

    #[test]
    fn test_chat_carries_product_context() {
        let (mut state, t0) = kiosk(None);
        state.apply(select_category("shoes"), t0);
        state.apply(select_product("loafer"), t0);

        let pending = state.begin_chat("Is it leather?", t0).unwrap();
        assert_eq!(pending.user_message.product_id.as_deref(), Some("loafer"));
        assert_eq!(pending.user_message.category_path.as_deref(), Some("SHOES"));

        let reply = pending.reply(&Ok("Yes.".to_string()));
        assert!(state.finish_chat(&pending, reply));
        assert_eq!(state.panel().messages().len(), 2);
    }

    #[test]
    fn test_voice_failure_shows_error() {
        let (mut state, t0) = kiosk(None);
        let epoch = state.begin_voice(t0);
        state.voice_failed(epoch, "no microphone");
        assert_eq!(state.panel().voice_error(), Some("no microphone"));

        let epoch = state.begin_voice(t0);
        assert!(state.panel().voice_error().is_none());
        state.apply(KioskEvent::ResetSession, t0);
        state.voice_failed(epoch, "late");
        assert!(state.panel().voice_error().is_none());
    }

    #[test]
    fn test_replace_catalog_goes_home() {
        let (mut state, t0) = kiosk(None);
        state.apply(select_product("loafer"), t0);

        let mut fresh = Catalog::empty(30);
        fresh.categories = vec![category("bags", vec![], vec![product("tote", 1)])];
        state.replace_catalog(Arc::new(fresh), t0);

        assert_eq!(state.navigation().screen(), Screen::Home);
        match state.snapshot(t0).view {
            MenuView::Home { categories } => assert_eq!(categories[0].id, "bags"),
            other => panic!("expected home view, got {other:?}"),
        }
        assert_eq!(state.next_deadline(), Some(t0 + Duration::from_secs(30)));
    }

    #[test]
    fn test_next_deadline_is_earliest_timer() {
        let (state, t0) = kiosk(None);
        assert_eq!(state.next_deadline(), Some(t0 + Duration::from_secs(45)));
    }

    #[test]
    fn test_stop_timers_clears_deadlines() {
        let (mut state, t0) = kiosk(None);
        state.stop_timers();

        assert_eq!(state.next_deadline(), None);
        assert!(state.tick(t0 + Duration::from_secs(3600)).is_empty());
        assert!(!state.is_idle());

        // Activity starts both windows again
        state.apply(KioskEvent::Activity, t0);
        assert_eq!(state.next_deadline(), Some(t0 + Duration::from_secs(45)));
    }
}
