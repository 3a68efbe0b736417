//! The chat widget controller: everything the page-level script kept in
//! globals lives on one [`ChatController`] owned by the UI.

use std::time::{Duration, Instant};

use crate::client::{ChatClient, ChatError};
use crate::input::ChatInput;
use crate::menu::{DropdownGroup, MenuPanel};
use crate::state::{ChatHistory, ChatMessage, ChatRole};
use crate::transcript::Transcript;

pub const DEFAULT_PLACEHOLDER: &str =
    "Ask me about Informatica access, repositories, or myAccess groups...";
pub const LOADING_PLACEHOLDER: &str = "Sending message...";
pub const SEND_LABEL: &str = "Send";
pub const LOADING_SEND_LABEL: &str = "Sending...";

/// How long an error stays in the error region.
pub const ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(5);

/// What an Enter key press in the input should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterAction {
    Submit,
    Newline,
    Ignore,
}

#[derive(Debug, Clone)]
pub struct ErrorBanner {
    pub message: String,
    shown_at: Instant,
}

impl ErrorBanner {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= ERROR_DISPLAY_DURATION
    }
}

pub struct ChatController {
    pub history: ChatHistory,
    pub input: ChatInput,
    pub transcript: Transcript,
    pub menu: MenuPanel,
    pub dropdowns: DropdownGroup,
    loading: bool,
    error: Option<ErrorBanner>,
    placeholder: String,
}

impl ChatController {
    pub fn new(placeholder: Option<String>, dropdown_count: usize) -> Self {
        let mut input = ChatInput::new();
        input.focus();

        Self {
            history: ChatHistory::new(),
            input,
            transcript: Transcript::new(),
            menu: MenuPanel::new(),
            dropdowns: DropdownGroup::new(dropdown_count),
            loading: false,
            error: None,
            placeholder: placeholder.unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn send_label(&self) -> &str {
        if self.loading {
            LOADING_SEND_LABEL
        } else {
            SEND_LABEL
        }
    }

    pub fn placeholder(&self) -> &str {
        if self.loading {
            LOADING_PLACEHOLDER
        } else {
            &self.placeholder
        }
    }

    /// The send button shares the input's enablement.
    pub fn is_send_enabled(&self) -> bool {
        !self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_ref().map(|banner| banner.message.as_str())
    }

    pub fn show_error(&mut self, message: impl Into<String>, now: Instant) {
        self.error = Some(ErrorBanner {
            message: message.into(),
            shown_at: now,
        });
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Periodic housekeeping: drops an error that has been shown long enough.
    pub fn tick(&mut self, now: Instant) {
        if self.error.as_ref().is_some_and(|banner| banner.is_expired(now)) {
            self.clear_error();
        }
    }

    pub fn enter_action(&self, shift: bool) -> EnterAction {
        if self.loading {
            EnterAction::Ignore
        } else if shift {
            EnterAction::Newline
        } else {
            EnterAction::Submit
        }
    }

    /// Start a turn. Returns the request payload, or `None` when the input is
    /// blank or a request is already in flight (the attempt is dropped).
    pub fn begin_submit(&mut self, now: Instant) -> Option<Vec<ChatMessage>> {
        let message = self.input.text().trim().to_string();
        if message.is_empty() || self.loading {
            return None;
        }

        self.clear_error();
        self.input.take();

        self.transcript.append(ChatRole::User, message.clone(), now);
        self.history.stage_user(message);

        self.set_loading(true);
        tracing::info!(history_len = self.history.len(), "chat message submitted");

        Some(self.history.messages().to_vec())
    }

    /// Finish the open turn with the request outcome.
    pub fn settle(&mut self, result: Result<String, ChatError>, now: Instant) {
        match result {
            Ok(reply) => {
                self.transcript.append(ChatRole::Assistant, reply.clone(), now);
                self.history.commit(reply);
                tracing::debug!(history_len = self.history.len(), "chat reply received");
            }
            Err(e) => {
                tracing::error!(error = %e, "chat request failed");
                self.show_error(e.user_message(), now);
                self.history.rollback();
            }
        }

        self.set_loading(false);
        self.input.focus();
    }

    /// Submit and wait for the reply in place. Returns whether a request was sent.
    pub async fn submit(&mut self, client: &ChatClient) -> bool {
        let Some(payload) = self.begin_submit(Instant::now()) else {
            return false;
        };
        let result = client.send(&payload).await;
        self.settle(result, Instant::now());
        true
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.input.set_disabled(loading);
    }
}
