use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// A rectangle of the given percentage size centred in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    centered(
        Constraint::Percentage(percent_x),
        Constraint::Percentage(percent_y),
        area,
    )
}

/// A rectangle `percent_x` wide and exactly `height` rows tall, centred.
pub fn centered_box(percent_x: u16, height: u16, area: Rect) -> Rect {
    centered(Constraint::Percentage(percent_x), Constraint::Length(height), area)
}

fn centered(width: Constraint, height: Constraint, area: Rect) -> Rect {
    let [row] = Layout::vertical([height]).flex(Flex::Center).areas(area);
    let [cell] = Layout::horizontal([width]).flex(Flex::Center).areas(row);
    cell
}
