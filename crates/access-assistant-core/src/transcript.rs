//! Rendered conversation: the visual blocks shown in the chat window.
//!
//! The transcript is a view, separate from [`crate::state::ChatHistory`]: a
//! failed turn is rolled back from the history but its user block stays on
//! screen.

use std::time::{Duration, Instant};

use crate::state::ChatRole;

/// How long a new block takes to settle.
pub const APPEAR_DURATION: Duration = Duration::from_millis(300);
/// Rows a new block starts below its settled position.
pub const APPEAR_OFFSET_ROWS: u16 = 1;

#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub role: ChatRole,
    pub content: String,
    appeared_at: Instant,
}

impl TranscriptEntry {
    pub fn label(&self) -> &'static str {
        self.role.label()
    }

    /// Animation progress in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.appeared_at);
        (elapsed.as_secs_f32() / APPEAR_DURATION.as_secs_f32()).min(1.0)
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Rows the block is still shifted down by.
    pub fn offset_rows(&self, now: Instant) -> u16 {
        let remaining = 1.0 - self.progress(now);
        (remaining * APPEAR_OFFSET_ROWS as f32).ceil() as u16
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    scroll: u16,
    follow_latest: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Append a block. The view jumps to the newest message on the next layout.
    pub fn append(&mut self, role: ChatRole, content: impl Into<String>, now: Instant) {
        self.entries.push(TranscriptEntry {
            role,
            content: content.into(),
            appeared_at: now,
        });
        self.follow_latest = true;
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.entries.iter().any(|entry| !entry.is_settled(now))
    }

    /// Fit the scroll offset to a viewport showing `content_rows` drawn rows,
    /// pinning to the bottom while following the newest message.
    pub fn layout(&mut self, content_rows: u16, height: u16) {
        let max_scroll = content_rows.saturating_sub(height);
        if self.follow_latest {
            self.scroll = max_scroll;
        } else {
            self.scroll = self.scroll.min(max_scroll);
        }
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_sub(rows);
        self.follow_latest = false;
    }

    /// Scroll down; the next layout clamps the offset and re-pins at the bottom.
    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_add(rows);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_latest = true;
    }
}
