//! Terminal user interface
//!
//! Single-channel event architecture: keyboard input, ticks, bridge
//! broadcasts, connectivity transitions, and async completions all arrive
//! as [`events::TuiEvent`] values on one mpsc channel and are handled
//! strictly in order. Long-running work is spawned and reports back as an
//! event, so handlers never block the loop.

pub mod app;
pub mod events;
pub mod keymap;
pub mod state;
pub mod ui;

pub use app::run_tui;
