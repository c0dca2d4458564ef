//! Ratatui front-end: the menu shell, the two filament forms, and the
//! inventory table.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
