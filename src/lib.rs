pub mod app;
pub mod bridge;
pub mod cli;
pub mod extract;
pub mod server;
pub mod tui;
pub mod util;

pub use app::{config::Config, state::AppState};
