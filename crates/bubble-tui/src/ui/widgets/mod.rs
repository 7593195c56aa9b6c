//! Reusable widgets for the bubble TUI.

pub mod bubble;
pub mod status_bar;
pub mod text_input;

pub use bubble::{transcript_lines, BUBBLE_WIDTH_PERCENT};
pub use status_bar::{KeyHint, StatusBar};
pub use text_input::TextInput;
