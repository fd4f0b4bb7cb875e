use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One checklist entry in a task's outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Opaque id, unique across every depth of the owning forest
    pub id: String,
    /// Label text (may be empty while being edited)
    pub title: String,
    /// Completion flag, independent of parent and children
    pub completed: bool,
    /// Ordered child nodes. Absent and empty mean the same thing.
    #[serde(default, rename = "subtasks", skip_serializing_if = "Forest::is_empty")]
    pub children: Forest,
}

impl OutlineNode {
    /// A fresh, uncompleted leaf.
    pub fn leaf(id: impl Into<String>, title: impl Into<String>) -> Self {
        OutlineNode {
            id: id.into(),
            title: title.into(),
            completed: false,
            children: Forest::new(),
        }
    }

    /// Builder helper used by tests and fixtures
    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = Forest::from(children);
        self
    }

    /// Builder helper used by tests and fixtures
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An ordered list of outline roots.
///
/// Cloning a `Forest` is cheap: the node list sits behind an `Arc`, so every
/// edit can hand back a new forest that shares all untouched subtrees with
/// the one it was derived from. `==` compares by value; [`Forest::ptr_eq`]
/// compares by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest(Arc<Vec<OutlineNode>>);

impl Forest {
    pub fn new() -> Self {
        Forest::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when both handles point at the same node list.
    pub fn ptr_eq(&self, other: &Forest) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_slice(&self) -> &[OutlineNode] {
        self.0.as_slice()
    }
}

impl Deref for Forest {
    type Target = [OutlineNode];

    fn deref(&self) -> &[OutlineNode] {
        self.0.as_slice()
    }
}

impl From<Vec<OutlineNode>> for Forest {
    fn from(nodes: Vec<OutlineNode>) -> Self {
        Forest(Arc::new(nodes))
    }
}

impl FromIterator<OutlineNode> for Forest {
    fn from_iter<I: IntoIterator<Item = OutlineNode>>(iter: I) -> Self {
        Forest::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a Forest {
    type Item = &'a OutlineNode;
    type IntoIter = std::slice::Iter<'a, OutlineNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Node totals for a forest, every depth included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutlineCount {
    pub total: usize,
    pub completed: usize,
}

impl OutlineCount {
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }

    /// Completion percentage, rounded down. An empty outline is 0%.
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }
}
