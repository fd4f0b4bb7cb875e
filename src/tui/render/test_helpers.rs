use ratatui::Terminal;
use ratatui::backend::TestBackend;

use crate::io::store::MemoryStore;
use crate::model::config::UiConfig;
use crate::model::outline::{Forest, OutlineNode};
use crate::model::task::Task;
use crate::tui::app::App;
use crate::util::id::SequentialIds;

pub const TERM_W: u16 = 60;
pub const TERM_H: u16 = 10;

/// Render the whole editor into an in-memory buffer and return plain text.
pub fn render_app(app: &mut App, w: u16, h: u16) -> String {
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| super::render(frame, app))
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// "Trip" with `a: Book > b: Flights` and `c: Pack`, backed by a memory store.
/// New nodes get ids `n1`, `n2`, ...
pub fn sample_app() -> App {
    let mut task = Task::new("t1".into(), "Trip".into(), 1);
    task.subtasks = Forest::from(vec![
        OutlineNode::leaf("a", "Book").with_children(vec![OutlineNode::leaf("b", "Flights")]),
        OutlineNode::leaf("c", "Pack"),
    ]);
    App::new(
        task.clone(),
        Box::new(MemoryStore::with_tasks(vec![task])),
        Box::new(SequentialIds::new("n")),
        &UiConfig::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_header_rows_and_hints() {
        let mut app = sample_app();
        app.show_key_hints = false;
        let text = render_app(&mut app, TERM_W, TERM_H);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with(" Trip"));
        assert!(lines[0].ends_with("0/3 done"));
        assert_eq!(lines[2], " [ ] Book");
        assert_eq!(lines[3], "   [ ] Flights");
        assert_eq!(lines[4], " [ ] Pack");
    }

    #[test]
    fn wide_titles_keep_progress_on_screen() {
        let mut app = sample_app();
        app.show_key_hints = false;
        app.task.title = "日本".repeat(20);
        let text = render_app(&mut app, TERM_W, TERM_H);
        let header = text.lines().next().unwrap();
        assert!(header.contains('\u{2026}'));
        assert!(header.ends_with("0/3 done"));
    }

    #[test]
    fn long_edit_buffer_shows_its_tail() {
        let mut app = sample_app();
        crate::tui::input::handle_key(&mut app, KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE));
        app.edit_buffer = format!("{}end", "x".repeat(100));
        let text = render_app(&mut app, TERM_W, TERM_H);
        let row = text.lines().nth(2).unwrap();
        assert!(row.starts_with(" [ ] xxx"));
        assert!(row.ends_with("end\u{258C}"));
    }

    #[test]
    fn edit_mode_shows_buffer_and_cursor() {
        let mut app = sample_app();
        crate::tui::input::handle_key(&mut app, KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE));
        app.edit_buffer = "Book now".into();
        let text = render_app(&mut app, TERM_W, TERM_H);
        assert!(text.lines().nth(2).unwrap().starts_with(" [ ] Book now\u{258C}"));
        assert!(text.contains("backspace on empty deletes"));
    }

    #[test]
    fn empty_outline_hint() {
        let mut app = sample_app();
        app.apply(crate::ops::outline_command::OutlineCommand::Delete { id: "a".into() });
        app.apply(crate::ops::outline_command::OutlineCommand::Delete { id: "c".into() });
        let text = render_app(&mut app, TERM_W, TERM_H);
        assert!(text.contains("no subtasks yet"));
        assert!(text.lines().next().unwrap().ends_with("0/0 done"));
    }

    #[test]
    fn long_outlines_scroll_to_cursor() {
        let mut app = sample_app();
        for _ in 0..10 {
            app.apply(crate::ops::outline_command::OutlineCommand::AddRoot {
                title: "more".into(),
            });
        }
        app.cursor = app.rows.len() - 1;
        render_app(&mut app, TERM_W, TERM_H);
        // 10 rows minus header and status leaves 7 outline rows
        assert_eq!(app.scroll_offset, app.rows.len() - 7);
    }
}
