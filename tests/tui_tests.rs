// Key handling of the terminal UI, driven without a terminal

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use bulk_rename::suggest::ApiSettings;
use bulk_rename::tui::{App, Focus, Popup, TuiOptions, handle_key};

fn key(app: &mut App, code: KeyCode) {
    handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
}

fn ctrl(app: &mut App, c: char) {
    handle_key(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        key(app, KeyCode::Char(c));
    }
}

fn app_with(dir: &TempDir, names: &[&str]) -> App {
    let paths: Vec<PathBuf> = names
        .iter()
        .map(|n| {
            let p = dir.path().join(n);
            fs::write(&p, n).unwrap();
            p
        })
        .collect();
    App::new(TuiOptions {
        paths,
        api: ApiSettings::default(),
        ..TuiOptions::default()
    })
}

#[test]
fn test_typing_updates_preview_and_enter_renames() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(&dir, &["a.txt", "b.txt"]);

    type_text(&mut app, r"(.*)\.txt");
    key(&mut app, KeyCode::Tab);
    type_text(&mut app, "$1_v2.txt");
    assert_eq!(app.preview.items[0].new_name, "a_v2.txt");

    key(&mut app, KeyCode::Enter);
    assert!(dir.path().join("a_v2.txt").exists());
    assert!(app.pattern.is_empty() && app.replacement.is_empty());

    ctrl(&mut app, 'z');
    assert!(dir.path().join("a.txt").exists());
    ctrl(&mut app, 'y');
    assert!(dir.path().join("b_v2.txt").exists());
}

#[test]
fn test_incomplete_pattern_shows_error_instead_of_preview() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(&dir, &["a.txt"]);

    type_text(&mut app, "(a");
    assert!(app.preview_error.is_some());
    assert_eq!(app.row_count(), 1);

    key(&mut app, KeyCode::Char(')'));
    assert!(app.preview_error.is_none());
}

#[test]
fn test_warnings_ask_for_confirmation() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(&dir, &["a.txt", "b.txt"]);
    fs::write(dir.path().join("a2.txt"), "").unwrap();

    type_text(&mut app, r"\.txt$");
    key(&mut app, KeyCode::Tab);
    type_text(&mut app, "2.txt");
    key(&mut app, KeyCode::Enter);
    assert_eq!(app.popup, Popup::Confirm);

    key(&mut app, KeyCode::Char('n'));
    assert_eq!(app.popup, Popup::None);
    assert!(dir.path().join("b.txt").exists());

    key(&mut app, KeyCode::Enter);
    key(&mut app, KeyCode::Char('y'));
    assert!(dir.path().join("b2.txt").exists());
    assert!(dir.path().join("a.txt").exists(), "conflicting item is skipped");
}

#[test]
fn test_suggestion_without_key_opens_api_settings() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(&dir, &["a.txt"]);
    app.focus = Focus::List;

    key(&mut app, KeyCode::Char('a'));
    assert_eq!(app.popup, Popup::ApiSettings);
    assert!(app.pending_suggestion.is_some());

    key(&mut app, KeyCode::Esc);
    assert_eq!(app.popup, Popup::None);
    assert!(app.pending_suggestion.is_none());
    assert!(!app.should_quit);
}

#[test]
fn test_list_keys_remove_and_navigate() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(&dir, &["a.txt", "b.txt", "c.txt"]);
    app.focus = Focus::List;

    key(&mut app, KeyCode::Down);
    key(&mut app, KeyCode::Char('x'));
    let names: Vec<_> = app.preview.items.iter().map(|i| i.original_name.clone()).collect();
    assert_eq!(names, ["a.txt", "c.txt"]);
    assert!(dir.path().join("b.txt").exists(), "removal only stops tracking");

    key(&mut app, KeyCode::Up);
    assert_eq!(app.selected_item().unwrap().original_name, "a.txt");
}

#[test]
fn test_paste_adds_existing_paths() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(&dir, &["a.txt"]);
    let extra = dir.path().join("my notes.md");
    fs::write(&extra, "").unwrap();
    app.focus = Focus::List;

    app.handle_paste(&format!("{{{}}}", extra.display()));
    assert_eq!(app.engine.len(), 2);
}

#[test]
fn test_paste_into_input_types_text() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(&dir, &["a.txt"]);

    app.handle_paste(r"^(\w+)");
    assert_eq!(app.pattern, r"^(\w+)");
    assert_eq!(app.engine.len(), 1);
}

#[test]
fn test_escape_quits() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with(&dir, &["a.txt"]);
    key(&mut app, KeyCode::Esc);
    assert!(app.should_quit);
}
