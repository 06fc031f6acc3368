use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, Wrap,
    },
};

use super::app::App;
use super::models::{ApiField, Focus, Popup, StatusKind};
use super::utils::{centered_box, centered_rect};
use crate::rename_engine::{PreviewItem, PreviewStatus};

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, chunks[0], app);
    render_inputs(f, chunks[1], app);
    render_file_list(f, chunks[2], app);
    render_status_bar(f, chunks[3], app);

    match app.popup {
        Popup::Confirm => render_confirm_popup(f, app),
        Popup::ApiSettings => render_api_popup(f, app),
        Popup::Help => render_help_popup(f),
        Popup::None => {}
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    }
}

pub fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let (undo, redo) = app.engine.history_depth();
    let history = format!("Undo: {undo}  Redo: {redo}");
    let title = Line::from(vec![
        Span::styled(
            "Bulk Rename",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {} item(s)  ", app.engine.len())),
        Span::styled(history, Style::default().fg(Color::Gray)),
    ]);

    let header = Paragraph::new(title).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(header, area);
}

fn render_inputs(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let pattern_focused = app.focus == Focus::Pattern;
    let pattern_title = if app.preview_error.is_some() {
        "Pattern (regex) - invalid"
    } else {
        "Pattern (regex)"
    };
    let pattern = Paragraph::new(app.pattern.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(pattern_title)
            .border_style(if app.preview_error.is_some() {
                Style::default().fg(Color::Red)
            } else {
                border_style(pattern_focused)
            }),
    );
    f.render_widget(pattern, chunks[0]);

    let replacement_focused = app.focus == Focus::Replacement;
    let replacement = Paragraph::new(app.replacement.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Replace with ($1, $2 ...)")
            .border_style(border_style(replacement_focused)),
    );
    f.render_widget(replacement, chunks[1]);

    let cursor = match app.focus {
        Focus::Pattern => Some((chunks[0], app.pattern.chars().count())),
        Focus::Replacement => Some((chunks[1], app.replacement.chars().count())),
        Focus::List => None,
    };
    if let (Some((rect, len)), Popup::None) = (cursor, app.popup) {
        let x = rect.x + 1 + (len as u16).min(rect.width.saturating_sub(3));
        f.set_cursor_position((x, rect.y + 1));
    }
}

fn preview_line<'a>(item: &'a PreviewItem, in_flight: bool) -> Line<'a> {
    let kind = if item.is_dir { "[D] " } else { "[F] " };
    let mut spans = vec![
        Span::styled(kind, Style::default().fg(Color::DarkGray)),
        Span::styled(item.original_name.as_str(), Style::default().fg(Color::White)),
    ];

    if item.new_name != item.original_name {
        let color = match item.status {
            PreviewStatus::Ok => Color::Green,
            PreviewStatus::Conflict | PreviewStatus::Duplicate => Color::Red,
        };
        spans.push(Span::styled(" -> ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(item.new_name.as_str(), Style::default().fg(color)));
    }
    if item.status.is_warning() {
        spans.push(Span::styled(
            format!(" [{}]", item.status),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    if item.is_overridden {
        spans.push(Span::styled(" [AI]", Style::default().fg(Color::Magenta)));
    }
    if in_flight {
        spans.push(Span::styled(" [asking...]", Style::default().fg(Color::Blue)));
    }
    Line::from(spans)
}

pub fn render_file_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = if app.preview_error.is_some() {
        app.engine
            .entries()
            .map(|entry| {
                let name = entry
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ListItem::new(Line::from(vec![
                    Span::styled(
                        if entry.is_dir { "[D] " } else { "[F] " },
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(name),
                ]))
            })
            .collect()
    } else {
        app.preview
            .items
            .iter()
            .map(|item| ListItem::new(preview_line(item, app.in_flight.contains(&item.id))))
            .collect()
    };

    let title = match &app.preview_error {
        Some(err) => format!("Files - {err}"),
        None => format!(
            "Files ({} to rename, {} warning(s))",
            app.preview.actionable(),
            app.warning_count()
        ),
    };

    let files_list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style(app.focus == Focus::List)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(files_list, area, &mut app.list_state.clone());

    if app.row_count() > area.height.saturating_sub(2) as usize {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut app.scroll_state.clone(),
        );
    }
}

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let (text, color) = match &app.status_message {
        Some((StatusKind::Error, msg)) => (msg.clone(), Color::Red),
        Some((StatusKind::Success, msg)) => (msg.clone(), Color::Green),
        Some((StatusKind::Info, msg)) => (msg.clone(), Color::Cyan),
        None if !app.in_flight.is_empty() => (
            format!("Waiting for {} suggestion(s)", app.in_flight.len()),
            Color::Blue,
        ),
        None => ("Ready".to_string(), Color::Gray),
    };
    let status = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[0]);

    let controls_text = match app.focus {
        Focus::List => "a AI  c clear  x remove  Enter rename  F1 help",
        _ => "Tab switch  Enter rename  ^Z undo  ^Y redo  F1 help",
    };
    let controls = Paragraph::new(controls_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(controls, chunks[1]);
}

fn render_confirm_popup(f: &mut Frame, app: &App) {
    let area = centered_box(60, 7, f.area());
    let lines = vec![
        Line::from(Span::styled(
            format!(
                "{} item(s) have conflicts or duplicates and will be skipped.",
                app.warning_count()
            ),
            Style::default().fg(Color::Red),
        )),
        Line::from(format!("Rename the other {} item(s)?", app.preview.actionable())),
        Line::from(""),
        Line::from(Span::styled(
            "y / Enter: rename    n / Esc: cancel",
            Style::default().fg(Color::Gray),
        )),
    ];
    let popup = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title("Confirm")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn render_api_popup(f: &mut Frame, app: &App) {
    let area = centered_box(70, 10, f.area());
    f.render_widget(Clear, area);

    let outer = Block::default()
        .title("API Settings")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    let endpoint = Paragraph::new(app.endpoint_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Endpoint")
            .border_style(border_style(app.api_field == ApiField::Endpoint)),
    );
    f.render_widget(endpoint, rows[0]);

    let masked = "*".repeat(app.key_input.chars().count());
    let key = Paragraph::new(masked).block(
        Block::default()
            .borders(Borders::ALL)
            .title("API key")
            .border_style(border_style(app.api_field == ApiField::Key)),
    );
    f.render_widget(key, rows[1]);

    let hint = Paragraph::new("Tab switch field  Enter save  Esc cancel")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(hint, rows[2]);
}

pub fn render_help_popup(f: &mut Frame) {
    let popup_area = centered_rect(60, 70, f.area());

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Bulk Rename - Help",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Editing:"),
        Line::from("  Tab / S-Tab  - Switch between pattern, replacement and list"),
        Line::from("  $1, $2 ...   - Insert capture groups; \\$ for a literal $"),
        Line::from(""),
        Line::from("List:"),
        Line::from("  Up/k Down/j  - Move selection"),
        Line::from("  a            - Ask AI for a name"),
        Line::from("  c            - Clear AI name"),
        Line::from("  x / Delete   - Remove from list"),
        Line::from(""),
        Line::from("Anywhere:"),
        Line::from("  Enter / ^S   - Rename"),
        Line::from("  ^Z / ^Y      - Undo / redo"),
        Line::from("  Paste / drop - Add files"),
        Line::from("  F1           - Toggle this help"),
        Line::from("  Esc / ^C     - Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press Esc or F1 to close",
            Style::default().fg(Color::Gray),
        )]),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}
