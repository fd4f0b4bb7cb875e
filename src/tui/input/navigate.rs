use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::outline_command::OutlineCommand;
use crate::tui::app::App;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.cursor = app.rows.len().saturating_sub(1),
        KeyCode::Char(' ') => on_cursor(app, |id| OutlineCommand::Toggle { id }),
        KeyCode::Enter => {
            let command = match app.cursor_id() {
                Some(id) => OutlineCommand::InsertAfter {
                    id: id.to_string(),
                    title: String::new(),
                },
                None => OutlineCommand::AddRoot {
                    title: String::new(),
                },
            };
            if app.apply(command) {
                app.begin_edit();
            }
        }
        KeyCode::Char('a') => {
            let command = match app.cursor_id() {
                Some(id) => OutlineCommand::AddChild {
                    parent: id.to_string(),
                    title: String::new(),
                },
                None => OutlineCommand::AddRoot {
                    title: String::new(),
                },
            };
            if app.apply(command) {
                app.begin_edit();
            }
        }
        KeyCode::Char('i') | KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Tab => on_cursor(app, |id| OutlineCommand::Indent { id }),
        KeyCode::BackTab => on_cursor(app, |id| OutlineCommand::Outdent { id }),
        KeyCode::Char('d') | KeyCode::Delete => {
            on_cursor(app, |id| OutlineCommand::Delete { id });
        }
        _ => {}
    }
}

/// Apply a command aimed at the node under the cursor.
fn on_cursor<F>(app: &mut App, make: F)
where
    F: FnOnce(String) -> OutlineCommand,
{
    let Some(id) = app.cursor_id().map(str::to_string) else {
        return;
    };
    let command = make(id);
    let name = command.name();
    if !app.apply(command) && app.status.is_none() {
        app.status = Some(format!("cannot {} here", name));
    }
}
