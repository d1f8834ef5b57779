//! Widgets for the chat panel

pub mod input_box;
pub mod markdown;
pub mod message_list;
pub mod quick_actions;
pub mod typing;

pub use input_box::InputBox;
pub use message_list::{ChatMessage, MessageList, Speaker, transcript_height};
pub use quick_actions::{QuickActionBar, bar_height};
