//! Chat widget controller: panel toggling and the send flow.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::WidgetConfig;
use crate::context_store::load_context;
use crate::formatter::{escape_html, format_message};
use crate::interfaces::backend::{ChatBackend, ChatRequest};
use crate::interfaces::storage::ContextStore;
use crate::interfaces::surface::WidgetSurface;
use crate::panel_fsm::{self, PanelAction, PanelState};
use crate::transcript::{Message, Transcript};

pub const ENTER_KEY: &str = "Enter";

pub struct ChatWidget<S: WidgetSurface> {
    surface: S,
    backend: Arc<dyn ChatBackend>,
    store: Arc<dyn ContextStore>,
    context_key: String,
    apology_message: String,
    escape_backend_markup: bool,
    panel: PanelState,
    input: String,
    transcript: Transcript,
    next_seq: u64,
}

/// A chat request that has been recorded in the transcript but not yet sent.
///
/// Owns everything it needs, so it can be resolved on another task while the
/// widget keeps accepting input.
pub struct PendingReply {
    seq: u64,
    request: ChatRequest,
    backend: Arc<dyn ChatBackend>,
    apology_message: String,
    escape_backend_markup: bool,
}

impl PendingReply {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    /// Sends the request and turns the outcome into a bot message. Failures
    /// become the apology entry; nothing is retried.
    pub async fn resolve(self) -> Message {
        match self.backend.send(&self.request).await {
            Ok(reply) => {
                let raw = reply.response.map(|text| {
                    if self.escape_backend_markup {
                        escape_html(&text)
                    } else {
                        text
                    }
                });
                debug!(seq = self.seq, "chat reply received");
                Message::bot_markup(format_message(raw.as_deref()))
            }
            Err(err) => {
                error!(seq = self.seq, error = %err, "chat request failed");
                Message::bot_error(self.apology_message)
            }
        }
    }
}

impl<S: WidgetSurface> ChatWidget<S> {
    pub fn new(
        config: &WidgetConfig,
        surface: S,
        backend: Arc<dyn ChatBackend>,
        store: Arc<dyn ContextStore>,
    ) -> Self {
        let mut widget = Self {
            surface,
            backend,
            store,
            context_key: config.context_key.clone(),
            apology_message: config.apology_message.clone(),
            escape_backend_markup: config.escape_backend_markup,
            panel: PanelState::default(),
            input: String::new(),
            transcript: Transcript::new(),
            next_seq: 0,
        };
        widget.surface.apply_panel(&panel_fsm::render(widget.panel));
        widget
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Applies a panel action. Actions with no transition from the current
    /// state change nothing and render nothing.
    pub fn dispatch(&mut self, action: PanelAction) -> PanelState {
        match panel_fsm::transition(self.panel, action) {
            Some(next) => {
                debug!(from = ?self.panel, to = ?next, ?action, "panel transition");
                self.panel = next;
                self.surface.apply_panel(&panel_fsm::render(next));
            }
            None => debug!(state = ?self.panel, ?action, "panel action ignored"),
        }
        self.panel
    }

    /// Key press in the input field. Only Enter submits.
    pub fn on_key(&mut self, key: &str) -> Option<PendingReply> {
        if key == ENTER_KEY {
            self.submit()
        } else {
            None
        }
    }

    /// Records the typed message and prepares its request. Returns `None`
    /// when the input is blank, in which case nothing else happens.
    pub fn submit(&mut self) -> Option<PendingReply> {
        let message = self.input.trim().to_string();
        if message.is_empty() {
            return None;
        }

        let stored = self.transcript.append(Message::user(message.clone()));
        self.surface.append_message(stored);

        self.input.clear();
        self.surface.clear_input();
        self.surface.scroll_to_bottom();

        let context: Map<String, Value> = load_context(self.store.as_ref(), &self.context_key);

        self.next_seq += 1;
        info!(
            seq = self.next_seq,
            chars = message.chars().count(),
            context_keys = context.len(),
            "sending chat message"
        );
        Some(PendingReply {
            seq: self.next_seq,
            request: ChatRequest { message, context },
            backend: Arc::clone(&self.backend),
            apology_message: self.apology_message.clone(),
            escape_backend_markup: self.escape_backend_markup,
        })
    }

    /// Appends a resolved bot message and scrolls to it.
    pub fn receive(&mut self, message: Message) -> &Message {
        let stored = self.transcript.append(message);
        self.surface.append_message(stored);
        self.surface.scroll_to_bottom();
        stored
    }

    /// Submits and waits for the reply in place. Returns the bot entry, or
    /// `None` when the input was blank.
    pub async fn send(&mut self) -> Option<Message> {
        let pending = self.submit()?;
        let reply = pending.resolve().await;
        Some(self.receive(reply).clone())
    }
}
