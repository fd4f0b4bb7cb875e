//! Structural edits on a task's outline forest.
//!
//! Every operation is a pure function of the current forest and returns a
//! new one. A target id that does not exist is never an error: the result is
//! the input forest itself (pointer-equal) with `applied == false`. When an
//! edit does land, only the lists on the path from the root to the change are
//! rebuilt; every other subtree is shared with the input.

use crate::model::outline::{Forest, OutlineCount, OutlineNode};
use crate::util::id::IdSource;

/// Result of an edit that either rewrote the forest or left it alone.
#[derive(Debug, Clone)]
pub struct Edit {
    pub forest: Forest,
    /// False when the target was not found (or the move was not possible)
    pub applied: bool,
}

impl Edit {
    fn unchanged(forest: &Forest) -> Self {
        Edit {
            forest: forest.clone(),
            applied: false,
        }
    }

    fn from_rewrite(original: &Forest, rewrite: Rewrite) -> Self {
        match rewrite {
            Rewrite::Changed(forest) => Edit {
                forest,
                applied: true,
            },
            Rewrite::Halted | Rewrite::Missing => Edit::unchanged(original),
        }
    }
}

/// Result of [`insert_sibling_after`].
///
/// `new_id` is minted even when the anchor is missing, so callers written
/// against "always focus the returned id" keep working; check `inserted`
/// before trusting it.
#[derive(Debug, Clone)]
pub struct Insertion {
    pub forest: Forest,
    pub new_id: String,
    pub inserted: bool,
}

// ---------------------------------------------------------------------------
// Traversal core
// ---------------------------------------------------------------------------

/// What a list visitor decided for one sibling list.
enum Step {
    /// The target was handled here; use this list instead
    Replace(Vec<OutlineNode>),
    /// The target was found here but nothing changes; stop searching
    Halt,
    /// Not in this list; look inside the children
    Descend,
}

enum Rewrite {
    Changed(Forest),
    Halted,
    Missing,
}

/// Walk the forest list by list (parents before their children, siblings in
/// order), letting `visit` decide at each list. The first list that returns
/// `Replace` or `Halt` ends the walk. Lists on the path to a replacement are
/// rebuilt; all others are shared.
fn rewrite<F>(list: &Forest, visit: &mut F) -> Rewrite
where
    F: FnMut(&[OutlineNode]) -> Step,
{
    match visit(list.as_slice()) {
        Step::Replace(nodes) => return Rewrite::Changed(Forest::from(nodes)),
        Step::Halt => return Rewrite::Halted,
        Step::Descend => {}
    }

    for (i, node) in list.iter().enumerate() {
        if node.children.is_empty() {
            continue;
        }
        match rewrite(&node.children, visit) {
            Rewrite::Changed(children) => {
                let mut nodes = list.to_vec();
                nodes[i].children = children;
                return Rewrite::Changed(Forest::from(nodes));
            }
            Rewrite::Halted => return Rewrite::Halted,
            Rewrite::Missing => {}
        }
    }
    Rewrite::Missing
}

fn position(list: &[OutlineNode], id: &str) -> Option<usize> {
    list.iter().position(|n| n.id == id)
}

/// Rewrite the node with `id` in place using `f`.
fn edit_node<F>(forest: &Forest, id: &str, mut f: F) -> Edit
where
    F: FnMut(&mut OutlineNode),
{
    let result = rewrite(forest, &mut |list: &[OutlineNode]| match position(list, id) {
        Some(idx) => {
            let mut nodes = list.to_vec();
            f(&mut nodes[idx]);
            Step::Replace(nodes)
        }
        None => Step::Descend,
    });
    Edit::from_rewrite(forest, result)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Pre-order iterator yielding `(depth, node)`, roots at depth 0.
pub struct Preorder<'a> {
    stack: Vec<(usize, std::slice::Iter<'a, OutlineNode>)>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (usize, &'a OutlineNode);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (depth, iter) = self.stack.last_mut()?;
            let depth = *depth;
            match iter.next() {
                Some(node) => {
                    if !node.children.is_empty() {
                        self.stack.push((depth + 1, node.children.iter()));
                    }
                    return Some((depth, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Visit every node: parent before children, siblings left to right.
pub fn preorder(forest: &Forest) -> Preorder<'_> {
    Preorder {
        stack: vec![(0, forest.iter())],
    }
}

/// Count all nodes at every depth and how many are completed.
pub fn count(forest: &Forest) -> OutlineCount {
    let mut counts = OutlineCount::default();
    for node in forest.iter() {
        counts.total += 1;
        if node.completed {
            counts.completed += 1;
        }
        let inner = count(&node.children);
        counts.total += inner.total;
        counts.completed += inner.completed;
    }
    counts
}

/// Find a node anywhere in the forest.
pub fn find_node<'a>(forest: &'a Forest, id: &str) -> Option<&'a OutlineNode> {
    preorder(forest).map(|(_, n)| n).find(|n| n.id == id)
}

/// The node visited immediately before `id` in pre-order, if any.
pub fn find_predecessor<'a>(forest: &'a Forest, id: &str) -> Option<&'a str> {
    let mut prev: Option<&'a str> = None;
    for (_, node) in preorder(forest) {
        if node.id == id {
            return prev;
        }
        prev = Some(node.id.as_str());
    }
    None
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

/// Build a new uncompleted leaf with a freshly minted id.
pub fn new_leaf(ids: &mut dyn IdSource, title: impl Into<String>) -> OutlineNode {
    OutlineNode::leaf(ids.next_id(), title)
}

/// Replace the title of the node with `id`.
pub fn update_title(forest: &Forest, id: &str, title: &str) -> Edit {
    edit_node(forest, id, |node| node.title = title.to_string())
}

/// Flip `completed` on exactly the node with `id`. No cascading.
pub fn toggle_completed(forest: &Forest, id: &str) -> Edit {
    edit_node(forest, id, |node| node.completed = !node.completed)
}

/// Append `child` as the last child of `parent_id`.
pub fn add_child(forest: &Forest, parent_id: &str, child: OutlineNode) -> Edit {
    let mut child = Some(child);
    edit_node(forest, parent_id, |parent| {
        if let Some(child) = child.take() {
            let mut children = parent.children.to_vec();
            children.push(child);
            parent.children = Forest::from(children);
        }
    })
}

/// Append `node` to the end of the root list. Always applies.
pub fn push_root(forest: &Forest, node: OutlineNode) -> Edit {
    let mut nodes = forest.to_vec();
    nodes.push(node);
    Edit {
        forest: Forest::from(nodes),
        applied: true,
    }
}

/// Remove the node with `id` together with its whole subtree.
pub fn delete_node(forest: &Forest, id: &str) -> Edit {
    let result = rewrite(forest, &mut |list: &[OutlineNode]| match position(list, id) {
        Some(idx) => {
            let mut nodes = list.to_vec();
            nodes.remove(idx);
            Step::Replace(nodes)
        }
        None => Step::Descend,
    });
    Edit::from_rewrite(forest, result)
}

/// Insert a new leaf titled `title` directly after `id` in its sibling list.
pub fn insert_sibling_after(
    forest: &Forest,
    id: &str,
    title: &str,
    ids: &mut dyn IdSource,
) -> Insertion {
    let node = new_leaf(ids, title);
    let new_id = node.id.clone();
    let mut node = Some(node);

    let result = rewrite(forest, &mut |list: &[OutlineNode]| match position(list, id) {
        Some(idx) => match node.take() {
            Some(node) => {
                let mut nodes = list.to_vec();
                nodes.insert(idx + 1, node);
                Step::Replace(nodes)
            }
            None => Step::Halt,
        },
        None => Step::Descend,
    });

    let edit = Edit::from_rewrite(forest, result);
    Insertion {
        forest: edit.forest,
        new_id,
        inserted: edit.applied,
    }
}

/// Make `id` the last child of its previous sibling.
///
/// A first child (or a first root) has nowhere to go and is left alone.
pub fn indent(forest: &Forest, id: &str) -> Edit {
    let result = rewrite(forest, &mut |list: &[OutlineNode]| match position(list, id) {
        Some(0) => Step::Halt,
        Some(idx) => {
            let mut nodes = list.to_vec();
            let node = nodes.remove(idx);
            let prev = &mut nodes[idx - 1];
            let mut children = prev.children.to_vec();
            children.push(node);
            prev.children = Forest::from(children);
            Step::Replace(nodes)
        }
        None => Step::Descend,
    });
    Edit::from_rewrite(forest, result)
}

/// Move `id` out of its parent so it sits right after that parent.
///
/// Roots have no parent and are left alone.
pub fn outdent(forest: &Forest, id: &str) -> Edit {
    let result = rewrite(forest, &mut |list: &[OutlineNode]| {
        // Only reachable for the root list: deeper lists are inspected
        // from their parent's list below.
        if position(list, id).is_some() {
            return Step::Halt;
        }
        for (i, parent) in list.iter().enumerate() {
            if let Some(child_idx) = position(&parent.children, id) {
                let mut children = parent.children.to_vec();
                let node = children.remove(child_idx);
                let mut nodes = list.to_vec();
                nodes[i].children = Forest::from(children);
                nodes.insert(i + 1, node);
                return Step::Replace(nodes);
            }
        }
        Step::Descend
    });
    Edit::from_rewrite(forest, result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
