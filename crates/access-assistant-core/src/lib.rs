pub mod client;
pub mod config;
pub mod controller;
pub mod input;
pub mod menu;
pub mod state;
pub mod transcript;

// Re-export main types for convenience
pub use client::{ChatClient, ChatError, FALLBACK_REPLY};
pub use config::{Config, DropdownConfig};
pub use controller::{ChatController, EnterAction};
pub use input::ChatInput;
pub use menu::{DropdownGroup, MenuPanel};
pub use state::{ChatHistory, ChatMessage, ChatRole};
pub use transcript::{Transcript, TranscriptEntry};
