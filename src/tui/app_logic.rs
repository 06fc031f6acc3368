//! User actions on [`App`]: editing, executing, history, suggestions.

use std::path::Path;
use tracing::{debug, info, warn};

use super::app::App;
use super::models::{ApiField, Focus, Popup, StatusKind, SuggestionOutcome};
use super::paste::parse_dropped_paths;
use crate::config::store_api_settings;
use crate::rename_engine::EntryId;
use crate::suggest::{ApiSettings, OpenAiSuggester};

impl App {
    fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Pattern => Some(&mut self.pattern),
            Focus::Replacement => Some(&mut self.replacement),
            Focus::List => None,
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(input) = self.focused_input() {
            input.push(c);
            self.refresh_preview();
        }
    }

    pub fn input_backspace(&mut self) {
        if let Some(input) = self.focused_input() {
            if input.pop().is_some() {
                self.refresh_preview();
            }
        }
    }

    /// Execute straight away, or ask first when the preview has warnings.
    pub fn request_execute(&mut self) {
        if let Some(err) = &self.preview_error {
            let message = format!("Fix the pattern first: {err}");
            self.set_status(StatusKind::Error, message);
            return;
        }
        if self.preview.actionable() == 0 {
            self.set_status(StatusKind::Info, "Nothing to rename".to_string());
            return;
        }
        if self.preview.has_warning {
            self.popup = Popup::Confirm;
        } else {
            self.execute();
        }
    }

    pub fn execute(&mut self) {
        let items = self.preview.items.clone();
        match self.engine.execute(&items) {
            Ok(summary) => {
                self.set_status(StatusKind::Success, summary.to_string());
                self.pattern.clear();
                self.replacement.clear();
            }
            Err(err) => self.set_status(StatusKind::Error, err.to_string()),
        }
        self.refresh_preview();
    }

    pub fn undo(&mut self) {
        let result = self.engine.undo();
        self.report_history_step(result);
    }

    pub fn redo(&mut self) {
        let result = self.engine.redo();
        self.report_history_step(result);
    }

    fn report_history_step(
        &mut self,
        result: Result<crate::rename_engine::BatchSummary, crate::error::RenameError>,
    ) {
        match result {
            Ok(summary) => self.set_status(StatusKind::Success, summary.to_string()),
            Err(err) if err.is_empty_history() => {
                self.set_status(StatusKind::Info, capitalise(&err.to_string()))
            }
            Err(err) => self.set_status(StatusKind::Error, err.to_string()),
        }
        self.refresh_preview();
    }

    pub fn clear_override(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.engine.entry(id).is_some_and(|e| e.override_name.is_some()) {
            self.engine.set_override(id, None);
            self.set_status(StatusKind::Info, "Override cleared".to_string());
            self.refresh_preview();
        }
    }

    pub fn remove_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.engine.remove_by_id(id) {
            self.in_flight.remove(&id);
            self.set_status(StatusKind::Info, "Removed from list".to_string());
            self.refresh_preview();
        }
    }

    /// Pasted text: paths are added to the list, anything else is typed into
    /// the focused input.
    pub fn handle_paste(&mut self, text: &str) {
        let paths = parse_dropped_paths(text);
        let all_exist = !paths.is_empty() && paths.iter().all(|p| p.exists());

        if !all_exist && self.focus != Focus::List {
            let line = text.lines().next().unwrap_or_default().to_string();
            if let Some(input) = self.focused_input() {
                input.push_str(&line);
            }
            self.refresh_preview();
            return;
        }

        let given = paths.len();
        let added = self.engine.add_files(paths);
        let message = match given - added {
            0 => format!("Added {added} item(s)"),
            ignored => format!("Added {added} item(s), ignored {ignored} missing or already listed"),
        };
        self.set_status(StatusKind::Info, message);
        self.refresh_preview();
    }

    /// Ask the model for a name for the selected entry.
    pub fn request_suggestion(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let Some(entry) = self.engine.entry(id) else {
            return;
        };
        if entry.is_dir {
            self.set_status(
                StatusKind::Error,
                "Name suggestions only work on files".to_string(),
            );
            return;
        }
        if self.in_flight.contains(&id) {
            self.set_status(StatusKind::Info, "Already waiting for a suggestion".to_string());
            return;
        }
        if self.suggester.is_none() {
            self.pending_suggestion = Some(id);
            self.open_api_settings();
            return;
        }
        self.spawn_suggestion(id);
    }

    fn spawn_suggestion(&mut self, id: EntryId) {
        let (Some(suggester), Some(entry)) = (self.suggester.clone(), self.engine.entry(id)) else {
            return;
        };
        let path = entry.path.clone();
        let tx = self.suggestion_tx.clone();
        self.in_flight.insert(id);
        self.set_status(
            StatusKind::Info,
            format!("Asking for a name for {}...", display_name(&path)),
        );

        tokio::spawn(async move {
            let result = suggester.suggest(&path).await.map_err(|e| e.to_string());
            // The receiver only goes away when the UI is shutting down.
            let _ = tx.send(SuggestionOutcome { id, path, result });
        });
    }

    /// Apply every suggestion that has arrived since the last frame.
    pub fn drain_suggestions(&mut self) {
        let mut changed = false;
        while let Ok(outcome) = self.suggestion_rx.try_recv() {
            self.in_flight.remove(&outcome.id);
            match outcome.result {
                Ok(name) if self.engine.entry(outcome.id).is_some() => {
                    info!(path = %outcome.path.display(), %name, "Suggestion received");
                    self.set_status(
                        StatusKind::Success,
                        format!("Suggested {} -> {name}", display_name(&outcome.path)),
                    );
                    self.engine.set_override(outcome.id, Some(name));
                    changed = true;
                }
                Ok(_) => {
                    debug!(id = %outcome.id, "Suggestion for an entry that is gone");
                }
                Err(err) => {
                    warn!(path = %outcome.path.display(), %err, "Suggestion failed");
                    self.set_status(StatusKind::Error, format!("Suggestion failed: {err}"));
                }
            }
        }
        if changed {
            self.refresh_preview();
        }
    }

    pub fn open_api_settings(&mut self) {
        self.endpoint_input = self.api.endpoint.clone();
        self.key_input = self.api.api_key.clone().unwrap_or_default();
        self.api_field = if self.endpoint_input.is_empty() {
            ApiField::Endpoint
        } else {
            ApiField::Key
        };
        self.popup = Popup::ApiSettings;
    }

    pub fn cancel_api_settings(&mut self) {
        self.pending_suggestion = None;
        self.popup = Popup::None;
    }

    pub fn toggle_api_field(&mut self) {
        self.api_field = match self.api_field {
            ApiField::Endpoint => ApiField::Key,
            ApiField::Key => ApiField::Endpoint,
        };
    }

    fn api_input(&mut self) -> &mut String {
        match self.api_field {
            ApiField::Endpoint => &mut self.endpoint_input,
            ApiField::Key => &mut self.key_input,
        }
    }

    pub fn api_input_char(&mut self, c: char) {
        self.api_input().push(c);
    }

    pub fn api_input_backspace(&mut self) {
        self.api_input().pop();
    }

    pub fn api_paste(&mut self, text: &str) {
        self.api_input().push_str(text.trim());
    }

    /// Apply and persist the dialog's endpoint and key.
    pub fn save_api_settings(&mut self) {
        let endpoint = self.endpoint_input.trim().to_string();
        let key = self.key_input.trim().to_string();
        if endpoint.is_empty() || key.is_empty() {
            self.set_status(
                StatusKind::Error,
                "Both endpoint and API key are required".to_string(),
            );
            return;
        }

        let settings = ApiSettings {
            endpoint: endpoint.clone(),
            api_key: Some(key.clone()),
            model: self.api.model.clone(),
        };
        match OpenAiSuggester::new(settings.clone()) {
            Ok(suggester) => {
                self.suggester = Some(suggester);
                self.api = settings;
            }
            Err(err) => {
                self.set_status(StatusKind::Error, err.to_string());
                return;
            }
        }

        let saved = match &self.config_path {
            Some(path) => match store_api_settings(path, &endpoint, &key) {
                Ok(()) => format!("API settings saved to {}", path.display()),
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "Could not save API settings");
                    format!("API settings applied for this session only ({err})")
                }
            },
            None => "API settings applied for this session".to_string(),
        };
        self.set_status(StatusKind::Info, saved);
        self.popup = Popup::None;

        if let Some(id) = self.pending_suggestion.take() {
            self.spawn_suggestion(id);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
