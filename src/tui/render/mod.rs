pub mod outline_view;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::util::unicode::{display_width, truncate_to_width};

use super::app::App;

/// Main render function: header, outline, status row
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (2 rows) | outline | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    outline_view::render_outline_view(frame, app, chunks[1]);
    status_row::render_status_row(frame, app, chunks[2]);
}

/// Task title plus checklist progress
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let count = app.progress();
    let progress = format!("{}/{} done", count.completed, count.total);
    let width = area.width as usize;
    let progress_width = display_width(&progress);
    let title = truncate_to_width(&app.task.title, width.saturating_sub(progress_width + 3));
    let padding = width.saturating_sub(display_width(&title) + progress_width + 2);

    let progress_color = if count.total > 0 && count.remaining() == 0 {
        app.theme.green
    } else {
        app.theme.dim
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {}", title),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ".repeat(padding), Style::default().bg(bg)),
        Span::styled(progress, Style::default().fg(progress_color).bg(bg)),
    ]);
    let separator = Line::from(Span::styled(
        "\u{2500}".repeat(width),
        Style::default().fg(app.theme.dim).bg(bg),
    ));
    frame.render_widget(
        Paragraph::new(vec![line, separator]).style(Style::default().bg(bg)),
        area,
    );
}
