//! Terminal front end for the rename engine.

mod app;
mod app_logic;
mod events;
mod models;
mod paste;
mod rendering;
mod utils;

use std::path::PathBuf;

use crate::suggest::ApiSettings;

pub use app::App;
pub use events::{handle_key, run_tui};
pub use models::{Focus, Popup, StatusKind};
pub use paste::parse_dropped_paths;

/// Start-up state for the UI.
#[derive(Debug, Clone, Default)]
pub struct TuiOptions {
    pub paths: Vec<PathBuf>,
    pub pattern: String,
    pub replacement: String,
    pub api: ApiSettings,
    /// Where the API settings dialog saves to.
    pub config_path: Option<PathBuf>,
}
