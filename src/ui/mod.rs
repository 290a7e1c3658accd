//! TUI module for the pasapalabra trainer.

mod app;
pub mod theme;
mod widgets;

pub use app::App;
