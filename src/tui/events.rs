use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::io;
use std::time::Duration;

use super::TuiOptions;
use super::app::App;
use super::models::{Focus, Popup, StatusKind};
use super::rendering::ui;

/// Run the interactive UI until the user quits.
///
/// Must be called from inside a tokio runtime; suggestion requests are
/// spawned onto it.
pub fn run_tui(options: TuiOptions) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(options);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.drain_suggestions();
        app.clear_status_message_if_expired();

        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
                Event::Paste(text) if app.popup == Popup::ApiSettings => app.api_paste(&text),
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.popup {
        Popup::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q')) {
                app.toggle_help();
            }
            return;
        }
        Popup::Confirm => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.popup = Popup::None;
                    app.execute();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.popup = Popup::None;
                    app.set_status(StatusKind::Info, "Rename cancelled".to_string());
                }
                _ => {}
            }
            return;
        }
        Popup::ApiSettings => {
            match key.code {
                KeyCode::Esc => app.cancel_api_settings(),
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    app.toggle_api_field()
                }
                KeyCode::Enter => app.save_api_settings(),
                KeyCode::Backspace => app.api_input_backspace(),
                KeyCode::Char(c) if !ctrl => app.api_input_char(c),
                _ => {}
            }
            return;
        }
        Popup::None => {}
    }

    match key.code {
        KeyCode::Char('s') if ctrl => app.request_execute(),
        KeyCode::Char('z') if ctrl => app.undo(),
        KeyCode::Char('y') if ctrl => app.redo(),
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.previous(),
        KeyCode::Enter => app.request_execute(),
        _ if app.focus == Focus::List => handle_list_key(app, key),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Char(c) if !ctrl => app.input_char(c),
        _ => {}
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.next(),
        KeyCode::Up | KeyCode::Char('k') => app.previous(),
        KeyCode::Char('a') => app.request_suggestion(),
        KeyCode::Char('c') => app.clear_override(),
        KeyCode::Char('x') | KeyCode::Delete => app.remove_selected(),
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') | KeyCode::Char('h') => app.toggle_help(),
        _ => {}
    }
}
