use std::time::Instant;

use access_assistant_core::{ChatClient, ChatController, ChatError, Config, DropdownConfig};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;

/// Screen regions recorded during render for mouse hit-testing.
#[derive(Debug, Clone, Default)]
pub struct HitAreas {
    pub menu_toggle: Option<Rect>,
    pub menu_panel: Option<Rect>,
    pub menu_close: Option<Rect>,
    pub dropdown_triggers: Vec<Rect>,
    pub dropdown_content: Option<Rect>,
    pub transcript: Option<Rect>,
    pub input: Option<Rect>,
    pub send: Option<Rect>,
}

pub struct App {
    pub should_quit: bool,
    pub controller: ChatController,
    pub client: ChatClient,
    pub dropdowns: Vec<DropdownConfig>,

    // In-flight chat request, polled from the event loop
    pub pending: Option<JoinHandle<Result<String, ChatError>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub areas: HitAreas,
}

impl App {
    pub fn new(client: ChatClient, config: &Config) -> Self {
        let dropdowns = config.dropdowns();
        let controller = ChatController::new(config.placeholder.clone(), dropdowns.len());

        Self {
            should_quit: false,
            controller,
            client,
            dropdowns,
            pending: None,
            animation_frame: 0,
            areas: HitAreas::default(),
        }
    }

    /// Submit the input. The request runs on its own task so the UI keeps
    /// handling events; a submit while one is in flight is dropped.
    pub fn submit(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(payload) = self.controller.begin_submit(Instant::now()) else {
            return;
        };

        let client = self.client.clone();
        self.pending = Some(tokio::spawn(async move { client.send(&payload).await }));
    }

    /// Settle the in-flight request if it has finished.
    pub async fn poll_pending(&mut self) {
        let finished = self.pending.as_ref().is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.pending.take() {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(ChatError::Interrupted(e.to_string())),
            };
            self.controller.settle(result, Instant::now());
        }
    }

    /// Tick animation frame and expire stale errors (called by Tick event)
    pub fn tick(&mut self) {
        if self.controller.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.controller.tick(Instant::now());
    }
}
