use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::outline_command::OutlineCommand;
use crate::tui::app::{App, Mode};
use crate::util::unicode::pop_grapheme;

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            app.commit_edit();
        }
        (_, KeyCode::Enter) => {
            if let Some(id) = app.commit_edit() {
                let inserted = app.apply(OutlineCommand::InsertAfter {
                    id,
                    title: String::new(),
                });
                if inserted {
                    app.begin_edit();
                }
            }
        }
        (_, KeyCode::Backspace) => {
            if !pop_grapheme(&mut app.edit_buffer) {
                delete_edited_node(app);
            }
        }
        (m, KeyCode::Char('u')) if m.contains(KeyModifiers::CONTROL) => {
            app.edit_buffer.clear();
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => {
            app.edit_buffer.push(c);
        }
        _ => {}
    }
}

/// Backspace on an empty title removes the node; focus goes to the row above.
fn delete_edited_node(app: &mut App) {
    app.mode = Mode::Navigate;
    app.edit_buffer.clear();
    if let Some(id) = app.editing.take() {
        app.apply(OutlineCommand::Delete { id });
    }
}
