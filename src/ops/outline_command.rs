use tracing::debug;

use crate::model::outline::Forest;
use crate::ops::outline_ops;
use crate::util::id::IdSource;

/// An outline gesture from a front end (key press, CLI subcommand).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineCommand {
    Rename { id: String, title: String },
    Toggle { id: String },
    AddChild { parent: String, title: String },
    AddRoot { title: String },
    Delete { id: String },
    InsertAfter { id: String, title: String },
    Indent { id: String },
    Outdent { id: String },
}

impl OutlineCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OutlineCommand::Rename { .. } => "rename",
            OutlineCommand::Toggle { .. } => "toggle",
            OutlineCommand::AddChild { .. } => "add-child",
            OutlineCommand::AddRoot { .. } => "add-root",
            OutlineCommand::Delete { .. } => "delete",
            OutlineCommand::InsertAfter { .. } => "insert-after",
            OutlineCommand::Indent { .. } => "indent",
            OutlineCommand::Outdent { .. } => "outdent",
        }
    }
}

/// The forest after a command, plus which node the front end should focus.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub forest: Forest,
    pub applied: bool,
    pub focus: Option<String>,
}

/// Run one command against `forest`.
///
/// Focus rules: a delete moves focus to the pre-order predecessor of the
/// removed node, anything that creates a node focuses the new node, and
/// everything else keeps focus on its target. Nothing is focused when the
/// command turned out to be a no-op.
pub fn apply(forest: &Forest, command: &OutlineCommand, ids: &mut dyn IdSource) -> CommandOutcome {
    let (edit, focus) = match command {
        OutlineCommand::Rename { id, title } => {
            (outline_ops::update_title(forest, id, title), Some(id.clone()))
        }
        OutlineCommand::Toggle { id } => (outline_ops::toggle_completed(forest, id), Some(id.clone())),
        OutlineCommand::AddChild { parent, title } => {
            let node = outline_ops::new_leaf(ids, title.as_str());
            let new_id = node.id.clone();
            (outline_ops::add_child(forest, parent, node), Some(new_id))
        }
        OutlineCommand::AddRoot { title } => {
            let node = outline_ops::new_leaf(ids, title.as_str());
            let new_id = node.id.clone();
            (outline_ops::push_root(forest, node), Some(new_id))
        }
        OutlineCommand::Delete { id } => {
            let prev = outline_ops::find_predecessor(forest, id).map(str::to_string);
            (outline_ops::delete_node(forest, id), prev)
        }
        OutlineCommand::InsertAfter { id, title } => {
            let ins = outline_ops::insert_sibling_after(forest, id, title, ids);
            (
                outline_ops::Edit {
                    forest: ins.forest,
                    applied: ins.inserted,
                },
                Some(ins.new_id),
            )
        }
        OutlineCommand::Indent { id } => (outline_ops::indent(forest, id), Some(id.clone())),
        OutlineCommand::Outdent { id } => (outline_ops::outdent(forest, id), Some(id.clone())),
    };

    if !edit.applied {
        debug!(command = command.name(), "outline command had no effect");
    }

    CommandOutcome {
        focus: if edit.applied { focus } else { None },
        forest: edit.forest,
        applied: edit.applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::outline::OutlineNode;
    use crate::util::id::SequentialIds;

    fn sample() -> Forest {
        Forest::from(vec![
            OutlineNode::leaf("a", "A").with_children(vec![OutlineNode::leaf("b", "B")]),
            OutlineNode::leaf("c", "C"),
        ])
    }

    #[test]
    fn delete_focuses_predecessor() {
        let mut ids = SequentialIds::new("n");
        let out = apply(&sample(), &OutlineCommand::Delete { id: "c".into() }, &mut ids);
        assert!(out.applied);
        assert_eq!(out.focus.as_deref(), Some("b"));
    }

    #[test]
    fn delete_first_node_has_no_focus() {
        let mut ids = SequentialIds::new("n");
        let out = apply(&sample(), &OutlineCommand::Delete { id: "a".into() }, &mut ids);
        assert!(out.applied);
        assert_eq!(out.focus, None);
    }

    #[test]
    fn insert_after_focuses_new_node() {
        let mut ids = SequentialIds::new("n");
        let cmd = OutlineCommand::InsertAfter {
            id: "b".into(),
            title: String::new(),
        };
        let out = apply(&sample(), &cmd, &mut ids);
        assert_eq!(out.focus.as_deref(), Some("n1"));
        assert_eq!(out.forest[0].children[1].id, "n1");
    }

    #[test]
    fn add_root_and_child() {
        let mut ids = SequentialIds::new("n");
        let out = apply(
            &Forest::new(),
            &OutlineCommand::AddRoot {
                title: "first".into(),
            },
            &mut ids,
        );
        assert_eq!(out.forest.len(), 1);
        let out = apply(
            &out.forest,
            &OutlineCommand::AddChild {
                parent: "n1".into(),
                title: "inner".into(),
            },
            &mut ids,
        );
        assert_eq!(out.forest[0].children[0].title, "inner");
        assert_eq!(out.focus.as_deref(), Some("n2"));
    }

    #[test]
    fn blocked_indent_keeps_forest_and_clears_focus() {
        let forest = sample();
        let mut ids = SequentialIds::new("n");
        let out = apply(&forest, &OutlineCommand::Indent { id: "a".into() }, &mut ids);
        assert!(!out.applied);
        assert!(out.forest.ptr_eq(&forest));
        assert_eq!(out.focus, None);
    }

    #[test]
    fn add_child_to_missing_parent_is_noop() {
        let forest = sample();
        let mut ids = SequentialIds::new("n");
        let cmd = OutlineCommand::AddChild {
            parent: "ghost".into(),
            title: "x".into(),
        };
        let out = apply(&forest, &cmd, &mut ids);
        assert!(!out.applied);
        assert_eq!(out.forest, forest);
    }
}
