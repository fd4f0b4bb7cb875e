use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode, Row};
use crate::util::unicode::{display_width, tail_to_width, truncate_to_width};

fn checkbox(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}

/// Render the task's outline as indented checklist rows
pub fn render_outline_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;

    if app.rows.is_empty() {
        let hint = Paragraph::new(" no subtasks yet (Enter or a to add one)")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(hint, area);
        return;
    }

    // Keep the cursor on screen
    let visible_height = (area.height as usize).max(1);
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if app.cursor >= app.scroll_offset + visible_height {
        app.scroll_offset = app.cursor + 1 - visible_height;
    }

    let width = area.width as usize;
    let lines: Vec<Line> = app
        .rows
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(visible_height)
        .map(|(idx, row)| row_line(app, idx, row, width))
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

fn row_line(app: &App, idx: usize, row: &Row, width: usize) -> Line<'static> {
    let selected = idx == app.cursor;
    let bg = if selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let editing = app.mode == Mode::Edit && app.editing.as_deref() == Some(row.id.as_str());

    let indent = " ".repeat(1 + row.depth * app.indent_width);
    let check = checkbox(row.completed);
    let check_color = if row.completed {
        app.theme.green
    } else {
        app.theme.text
    };
    let prefix_width = indent.len() + check.len() + 1;
    let room = width.saturating_sub(prefix_width + 1);

    let mut spans = vec![
        Span::styled(indent, Style::default().bg(bg)),
        Span::styled(check, Style::default().fg(check_color).bg(bg)),
        Span::styled(" ", Style::default().bg(bg)),
    ];

    if editing {
        // Show the tail of long buffers so the cursor stays visible
        let shown = tail_to_width(&app.edit_buffer, room).to_string();
        spans.push(Span::styled(
            shown,
            Style::default().fg(app.theme.text_bright).bg(bg),
        ));
        spans.push(Span::styled(
            "\u{258C}",
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    } else if row.title.is_empty() {
        spans.push(Span::styled(
            "(untitled)",
            Style::default()
                .fg(app.theme.dim)
                .bg(bg)
                .add_modifier(Modifier::ITALIC),
        ));
    } else {
        let fg = if row.completed {
            app.theme.dim
        } else if selected {
            app.theme.text_bright
        } else {
            app.theme.text
        };
        let mut style = Style::default().fg(fg).bg(bg);
        if row.completed {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        spans.push(Span::styled(truncate_to_width(&row.title, room), style));
    }

    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    if selected && used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
    }
    Line::from(spans)
}
