//! Bidrelay TUI - interactive submission console

pub mod app;
pub mod event;
pub mod tui;
pub mod views;

pub use app::{App, Tab};
pub use event::{Event, EventHandler};
pub use tui::Tui;
