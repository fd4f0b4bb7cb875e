mod edit;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent};

use super::app::{App, Mode};

use edit::handle_edit;
use navigate::handle_navigate;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.status = None;

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Edit => handle_edit(app, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::sample_app;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn outline(app: &App) -> Vec<(usize, &str)> {
        app.rows.iter().map(|r| (r.depth, r.title.as_str())).collect()
    }

    fn stored_titles(app: &App) -> usize {
        let task = app.store.get(&app.task.id).unwrap().unwrap();
        crate::ops::outline_ops::count(&task.subtasks).total
    }

    #[test]
    fn cursor_moves_and_clamps() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.cursor_id(), Some("c"));
        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.cursor_id(), Some("a"));
    }

    #[test]
    fn space_toggles_completion() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char(' '));
        assert!(app.rows[0].completed);
        assert_eq!(app.progress().completed, 1);
    }

    #[test]
    fn enter_inserts_sibling_and_edits_it() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Edit);
        type_str(&mut app, "Visa");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(
            outline(&app),
            vec![(0, "Book"), (1, "Flights"), (0, "Visa"), (0, "Pack")]
        );
        assert_eq!(app.cursor_id(), Some("n1"));
        assert_eq!(stored_titles(&app), 4);
    }

    #[test]
    fn enter_while_editing_chains_new_siblings() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, "!");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "Hotel");
        press(&mut app, KeyCode::Esc);
        assert_eq!(
            outline(&app),
            vec![(0, "Book"), (1, "Flights!"), (1, "Hotel"), (0, "Pack")]
        );
    }

    #[test]
    fn add_child_appends_under_cursor() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "Train");
        press(&mut app, KeyCode::Esc);
        assert_eq!(
            outline(&app),
            vec![(0, "Book"), (1, "Flights"), (1, "Train"), (0, "Pack")]
        );
    }

    #[test]
    fn tab_and_backtab_reshape() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.cursor_id(), Some("c"));
        press(&mut app, KeyCode::Tab);
        assert_eq!(outline(&app), vec![(0, "Book"), (1, "Flights"), (1, "Pack")]);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(outline(&app), vec![(0, "Book"), (1, "Flights"), (0, "Pack")]);
        assert_eq!(app.cursor_id(), Some("c"));
    }

    #[test]
    fn indent_of_first_row_reports_noop() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(outline(&app), vec![(0, "Book"), (1, "Flights"), (0, "Pack")]);
        assert!(app.status.is_some());
    }

    #[test]
    fn delete_focuses_predecessor() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('G'));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(outline(&app), vec![(0, "Book"), (1, "Flights")]);
        assert_eq!(app.cursor_id(), Some("b"));
    }

    #[test]
    fn backspace_on_empty_buffer_deletes_node() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.rows.len(), 4);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.rows.len(), 3);
        assert_eq!(app.cursor_id(), Some("b"));
    }

    #[test]
    fn backspace_edits_before_deleting() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.edit_buffer, "Boo");
        assert_eq!(app.mode, Mode::Edit);
    }

    #[test]
    fn empty_outline_starts_with_a_root() {
        let mut app = sample_app();
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('d'));
        }
        assert!(app.rows.is_empty());
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "Fresh");
        press(&mut app, KeyCode::Esc);
        assert_eq!(outline(&app), vec![(0, "Fresh")]);
    }

    #[test]
    fn q_quits() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
