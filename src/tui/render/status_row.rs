use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};

const NAVIGATE_HINTS: &str =
    "space toggle  enter new  a child  e edit  tab/S-tab indent  d delete  q quit";
const EDIT_HINTS: &str = "enter next  esc done  backspace on empty deletes";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = if let Some(msg) = &app.status {
        Line::from(Span::styled(
            format!(" {}", msg),
            Style::default().fg(app.theme.red).bg(bg),
        ))
    } else if app.show_key_hints {
        let hint = match app.mode {
            Mode::Navigate => NAVIGATE_HINTS,
            Mode::Edit => EDIT_HINTS,
        };
        let hint_width = hint.chars().count();
        let padding = width.saturating_sub(hint_width + 1);
        Line::from(vec![
            Span::styled(" ".repeat(padding), Style::default().bg(bg)),
            Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)),
        ])
    } else {
        Line::from(Span::styled(" ".repeat(width), Style::default().bg(bg)))
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
