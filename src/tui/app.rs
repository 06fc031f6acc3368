use ratatui::widgets::{ListState, ScrollbarState};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

use super::TuiOptions;
use super::models::{ApiField, Focus, Popup, StatusKind, SuggestionOutcome};
use crate::rename_engine::{EntryId, Preview, PreviewItem, RenameEngine};
use crate::suggest::{ApiSettings, OpenAiSuggester};

const STATUS_TTL: Duration = Duration::from_secs(3);
const ERROR_TTL: Duration = Duration::from_secs(8);

pub struct App {
    pub engine: RenameEngine,
    pub pattern: String,
    pub replacement: String,
    pub focus: Focus,
    pub popup: Popup,
    pub preview: Preview,
    /// Set when the pattern does not compile; the list then shows plain entries.
    pub preview_error: Option<String>,
    pub list_state: ListState,
    pub scroll_state: ScrollbarState,
    pub status_message: Option<(StatusKind, String)>,
    pub status_message_time: Option<Instant>,
    pub api: ApiSettings,
    pub suggester: Option<OpenAiSuggester>,
    pub config_path: Option<PathBuf>,
    pub endpoint_input: String,
    pub key_input: String,
    pub api_field: ApiField,
    /// Entry to ask about once the API settings dialog is saved.
    pub pending_suggestion: Option<EntryId>,
    pub in_flight: HashSet<EntryId>,
    pub suggestion_tx: UnboundedSender<SuggestionOutcome>,
    pub suggestion_rx: UnboundedReceiver<SuggestionOutcome>,
    pub should_quit: bool,
}

impl App {
    pub fn new(options: TuiOptions) -> Self {
        let mut engine = RenameEngine::new();
        engine.set_files(&options.paths);

        let suggester = match OpenAiSuggester::new(options.api.clone()) {
            Ok(s) => Some(s),
            Err(err) => {
                warn!(%err, "Name suggestions unavailable until API settings are provided");
                None
            }
        };
        let (suggestion_tx, suggestion_rx) = mpsc::unbounded_channel();

        let mut list_state = ListState::default();
        list_state.select(Some(0));

        let mut app = Self {
            engine,
            pattern: options.pattern,
            replacement: options.replacement,
            focus: Focus::Pattern,
            popup: Popup::None,
            preview: Preview::default(),
            preview_error: None,
            list_state,
            scroll_state: ScrollbarState::default(),
            status_message: None,
            status_message_time: None,
            endpoint_input: options.api.endpoint.clone(),
            key_input: options.api.api_key.clone().unwrap_or_default(),
            api: options.api,
            suggester,
            config_path: options.config_path,
            api_field: ApiField::Endpoint,
            pending_suggestion: None,
            in_flight: HashSet::new(),
            suggestion_tx,
            suggestion_rx,
            should_quit: false,
        };
        app.refresh_preview();
        if app.engine.is_empty() {
            app.set_status(
                StatusKind::Info,
                "Drop or paste files into the terminal to add them".to_string(),
            );
        }
        app
    }

    pub fn set_status(&mut self, kind: StatusKind, message: String) {
        self.status_message = Some((kind, message));
        self.status_message_time = Some(Instant::now());
    }

    pub fn clear_status_message_if_expired(&mut self) {
        if let (Some((kind, _)), Some(time)) = (&self.status_message, self.status_message_time) {
            let ttl = if *kind == StatusKind::Error {
                ERROR_TTL
            } else {
                STATUS_TTL
            };
            if time.elapsed() > ttl {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Recompute the preview from the current inputs.
    pub fn refresh_preview(&mut self) {
        match self.engine.preview(&self.pattern, &self.replacement) {
            Ok(preview) => {
                self.preview = preview;
                self.preview_error = None;
            }
            Err(err) => {
                self.preview = Preview::default();
                self.preview_error = Some(err.to_string());
            }
        }
        self.clamp_selection();
    }

    /// Rows shown in the list, whichever source is current.
    pub fn row_count(&self) -> usize {
        if self.preview_error.is_some() {
            self.engine.len()
        } else {
            self.preview.items.len()
        }
    }

    pub fn selected_item(&self) -> Option<&PreviewItem> {
        self.preview.items.get(self.list_state.selected()?)
    }

    pub fn selected_id(&self) -> Option<EntryId> {
        let index = self.list_state.selected()?;
        if self.preview_error.is_some() {
            self.engine.entries().nth(index).map(|e| e.id)
        } else {
            self.preview.items.get(index).map(|i| i.id)
        }
    }

    fn clamp_selection(&mut self) {
        let rows = self.row_count();
        let selected = match self.list_state.selected() {
            _ if rows == 0 => None,
            Some(i) => Some(i.min(rows - 1)),
            None => Some(0),
        };
        self.list_state.select(selected);
        self.scroll_state = self
            .scroll_state
            .content_length(rows)
            .position(selected.unwrap_or(0));
    }

    pub fn next(&mut self) {
        let rows = self.row_count();
        if rows == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 >= rows => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i);
    }

    pub fn previous(&mut self) {
        let rows = self.row_count();
        if rows == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => rows - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i);
    }

    pub fn toggle_help(&mut self) {
        self.popup = if self.popup == Popup::Help {
            Popup::None
        } else {
            Popup::Help
        };
    }

    pub fn warning_count(&self) -> usize {
        self.preview
            .items
            .iter()
            .filter(|i| i.status.is_warning())
            .count()
    }
}
