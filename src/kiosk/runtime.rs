//! The kiosk event loop.
//!
//! One tokio task owns the [`KioskState`]. Everything else talks to it through
//! a cloneable [`KioskHandle`], which sends commands over a channel and waits
//! for the answer on a oneshot.
//!
//! ## Design
//!
//! - Timers are deadlines inside the state; the loop sleeps until the earliest
//!   one and then ticks
//! - Assistant and transcription calls block, so they run on the blocking
//!   pool and report back on a second channel
//! - Replies for a session that was reset in the meantime are logged but never
//!   shown
//! - The loop ends when every handle has been dropped
//!
//! ## Mock Support
//!
//! The assistant and transcriber are trait objects; tests inject closures.

use anyhow::{Context, Result};
use std::future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{KioskEvent, KioskSnapshot, KioskState, PendingChat};
use crate::models::ChatMessage;
use crate::services::{Assistant, Catalog, ChatStore, Transcriber};

/// Commands queued before the loop applies back-pressure.
const COMMAND_BUFFER: usize = 64;

/// A question and the reply it got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExchange {
    /// The visitor's message
    pub question: ChatMessage,
    /// The assistant's reply, or an inline error message
    pub answer: ChatMessage,
}

/// What happened to a chat or voice request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The reply (possibly an inline error message) is in the transcript
    Answered(ChatExchange),
    /// Nothing to send after trimming
    Empty,
    /// Another answer is still loading
    Busy,
    /// The session was reset before the reply arrived
    Discarded,
    /// Transcription failed; the message is shown as the panel's voice error
    VoiceFailed(String),
}

/// External collaborators of the kiosk loop.
pub struct KioskServices {
    /// Answers chat questions
    pub assistant: Arc<dyn Assistant>,
    /// Turns voice recordings into text
    pub transcriber: Arc<dyn Transcriber>,
    /// Persistent chat log
    pub store: Box<dyn ChatStore>,
}

enum Command {
    Event {
        event: KioskEvent,
        reply: oneshot::Sender<KioskSnapshot>,
    },
    Snapshot {
        reply: oneshot::Sender<KioskSnapshot>,
    },
    Chat {
        text: String,
        reply: oneshot::Sender<ChatOutcome>,
    },
    Voice {
        audio: Vec<u8>,
        reply: oneshot::Sender<ChatOutcome>,
    },
    ReplaceCatalog {
        catalog: Arc<Catalog>,
        reply: oneshot::Sender<KioskSnapshot>,
    },
    History {
        limit: usize,
        reply: oneshot::Sender<Result<Vec<ChatMessage>>>,
    },
    ClearHistory {
        reply: oneshot::Sender<Result<()>>,
    },
}

enum Completion {
    Chat {
        pending: PendingChat,
        outcome: Result<String>,
        reply: oneshot::Sender<ChatOutcome>,
    },
    Voice {
        epoch: u64,
        transcript: Result<String>,
        reply: oneshot::Sender<ChatOutcome>,
    },
}

/// Cloneable access to a running kiosk loop.
#[derive(Debug, Clone)]
pub struct KioskHandle {
    commands: mpsc::Sender<Command>,
}

impl KioskHandle {
    /// Applies a visitor event and returns the resulting state.
    pub async fn dispatch(&self, event: KioskEvent) -> Result<KioskSnapshot> {
        self.request(|reply| Command::Event { event, reply }).await
    }

    /// Current state, after firing any timer that is due.
    pub async fn snapshot(&self) -> Result<KioskSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Sends a typed question and waits for the reply.
    pub async fn chat(&self, text: impl Into<String>) -> Result<ChatOutcome> {
        let text = text.into();
        self.request(|reply| Command::Chat { text, reply }).await
    }

    /// Transcribes recorded audio and sends the text as a question.
    pub async fn voice(&self, audio: Vec<u8>) -> Result<ChatOutcome> {
        self.request(|reply| Command::Voice { audio, reply }).await
    }

    /// Swaps in a freshly scanned catalog.
    pub async fn replace_catalog(&self, catalog: Arc<Catalog>) -> Result<KioskSnapshot> {
        self.request(|reply| Command::ReplaceCatalog { catalog, reply })
            .await
    }

    /// The last `limit` persisted messages, oldest first.
    pub async fn history(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        self.request(|reply| Command::History { limit, reply })
            .await?
    }

    /// Deletes the persisted chat log.
    pub async fn clear_history(&self) -> Result<()> {
        self.request(|reply| Command::ClearHistory { reply }).await?
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .ok()
            .context("Kiosk loop has stopped")?;
        rx.await.context("Kiosk loop dropped the request")
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Event { .. } => "Event",
            Self::Snapshot { .. } => "Snapshot",
            Self::Chat { .. } => "Chat",
            Self::Voice { .. } => "Voice",
            Self::ReplaceCatalog { .. } => "ReplaceCatalog",
            Self::History { .. } => "History",
            Self::ClearHistory { .. } => "ClearHistory",
        };
        f.write_str(name)
    }
}

/// Starts the kiosk loop on the current tokio runtime.
///
/// # Arguments
///
/// * `state` - Initial kiosk state; its timers keep running from where they are
/// * `services` - Assistant, transcriber and chat log
///
/// # Returns
///
/// A handle for sending commands and the task's join handle. The task ends
/// once every clone of the handle is dropped and yields the final state,
/// with both timers stopped.
pub fn spawn(
    state: KioskState,
    services: KioskServices,
) -> (KioskHandle, JoinHandle<KioskState>) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (completion_tx, completion_rx) = mpsc::unbounded_channel();

    let runtime = Runtime {
        state,
        assistant: services.assistant,
        transcriber: services.transcriber,
        store: services.store,
        completions: completion_tx,
    };
    let task = tokio::spawn(runtime.run(command_rx, completion_rx));

    (
        KioskHandle {
            commands: command_tx,
        },
        task,
    )
}

struct Runtime {
    state: KioskState,
    assistant: Arc<dyn Assistant>,
    transcriber: Arc<dyn Transcriber>,
    store: Box<dyn ChatStore>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl Runtime {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) -> KioskState {
        info!("Kiosk loop started");
        loop {
            let deadline = self.state.next_deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(completion) = completions.recv() => self.complete(completion),
                () = wait_until(deadline) => {
                    for event in self.state.tick(Instant::now()) {
                        debug!(?event, "Timer fired");
                    }
                }
            }
        }
        self.state.stop_timers();
        info!("Kiosk loop stopped");
        self.state
    }

    fn handle(&mut self, command: Command) {
        debug!(?command, "Kiosk command");
        let now = Instant::now();
        // A deadline may have passed while this command was queued
        for event in self.state.tick(now) {
            debug!(?event, "Timer fired");
        }
        match command {
            Command::Event { event, reply } => {
                self.state.apply(event, now);
                let _ = reply.send(self.state.snapshot(now));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.state.snapshot(now));
            }
            Command::Chat { text, reply } => self.start_chat(&text, reply),
            Command::Voice { audio, reply } => {
                let epoch = self.state.begin_voice(now);
                let transcriber = Arc::clone(&self.transcriber);
                let completions = self.completions.clone();
                tokio::task::spawn_blocking(move || {
                    let transcript = transcriber.transcribe(&audio);
                    let _ = completions.send(Completion::Voice {
                        epoch,
                        transcript,
                        reply,
                    });
                });
            }
            Command::ReplaceCatalog { catalog, reply } => {
                self.state.replace_catalog(catalog, now);
                let _ = reply.send(self.state.snapshot(now));
            }
            Command::History { limit, reply } => {
                let _ = reply.send(self.store.recent(limit));
            }
            Command::ClearHistory { reply } => {
                let _ = reply.send(self.store.clear());
            }
        }
    }

    fn start_chat(&mut self, text: &str, reply: oneshot::Sender<ChatOutcome>) {
        let Some(pending) = self.state.begin_chat(text, Instant::now()) else {
            let outcome = if text.trim().is_empty() {
                ChatOutcome::Empty
            } else {
                ChatOutcome::Busy
            };
            let _ = reply.send(outcome);
            return;
        };

        self.persist(&pending.user_message);

        let assistant = Arc::clone(&self.assistant);
        let completions = self.completions.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = assistant.send(&pending.request);
            let _ = completions.send(Completion::Chat {
                pending,
                outcome,
                reply,
            });
        });
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Chat {
                pending,
                outcome,
                reply,
            } => {
                if let Err(e) = &outcome {
                    warn!(error = %e, "Assistant request failed");
                }
                let answer = pending.reply(&outcome);
                self.persist(&answer);

                let result = if self.state.finish_chat(&pending, answer.clone()) {
                    ChatOutcome::Answered(ChatExchange {
                        question: pending.user_message,
                        answer,
                    })
                } else {
                    ChatOutcome::Discarded
                };
                let _ = reply.send(result);
            }
            Completion::Voice {
                epoch,
                transcript,
                reply,
            } => {
                if epoch != self.state.epoch() {
                    let _ = reply.send(ChatOutcome::Discarded);
                    return;
                }
                match transcript {
                    Ok(text) => self.start_chat(&text, reply),
                    Err(e) => {
                        let message = e.to_string();
                        warn!(error = %message, "Transcription failed");
                        self.state.voice_failed(epoch, message.clone());
                        let _ = reply.send(ChatOutcome::VoiceFailed(message));
                    }
                }
            }
        }
    }

    fn persist(&mut self, message: &ChatMessage) {
        if let Err(e) = self.store.append(message) {
            warn!(error = %e, "Failed to record chat message");
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}
