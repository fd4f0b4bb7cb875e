use std::collections::HashSet;

use serde::Serialize;

use crate::model::outline::Forest;
use crate::model::task::Task;
use crate::ops::outline_ops;

/// Structured result from `flow check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (the stored data breaks an invariant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// Two task records share an id
    #[serde(rename = "duplicate_task_id")]
    DuplicateTaskId { task_id: String },
    /// Two outline nodes in one task share an id (at any depth)
    #[serde(rename = "duplicate_node_id")]
    DuplicateNodeId { task_id: String, node_id: String },
    /// A task has an empty id
    #[serde(rename = "empty_task_id")]
    EmptyTaskId { title: String },
    /// An outline node has an empty id
    #[serde(rename = "empty_node_id")]
    EmptyNodeId { task_id: String, title: String },
}

/// A validation warning (odd but harmless).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// An outline node with a blank title, usually left over from editing
    #[serde(rename = "untitled_node")]
    UntitledNode { task_id: String, node_id: String },
    /// Recurrence with interval 0 (treated as 1)
    #[serde(rename = "zero_interval")]
    ZeroInterval { task_id: String },
    /// Recurrence without a due date never spawns a next occurrence
    #[serde(rename = "recurrence_without_due_date")]
    RecurrenceWithoutDueDate { task_id: String },
}

/// Validate every task and its outline. Read-only.
pub fn check_tasks(tasks: &[Task]) -> CheckResult {
    let mut result = CheckResult::default();
    let mut seen = HashSet::new();

    for task in tasks {
        if task.id.is_empty() {
            result.errors.push(CheckError::EmptyTaskId {
                title: task.title.clone(),
            });
        } else if !seen.insert(task.id.as_str()) {
            result.errors.push(CheckError::DuplicateTaskId {
                task_id: task.id.clone(),
            });
        }

        if let Some(recurrence) = task.recurrence {
            if recurrence.interval == 0 {
                result.warnings.push(CheckWarning::ZeroInterval {
                    task_id: task.id.clone(),
                });
            }
            if task.due_date.is_none() {
                result.warnings.push(CheckWarning::RecurrenceWithoutDueDate {
                    task_id: task.id.clone(),
                });
            }
        }

        check_forest(&task.id, &task.subtasks, &mut result);
    }

    result.valid = result.errors.is_empty();
    result
}

/// Validate one outline: ids present and unique across all depths.
pub fn check_forest(task_id: &str, forest: &Forest, result: &mut CheckResult) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for (_, node) in outline_ops::preorder(forest) {
        if node.id.is_empty() {
            result.errors.push(CheckError::EmptyNodeId {
                task_id: task_id.to_string(),
                title: node.title.clone(),
            });
            continue;
        }
        if !seen.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
            result.errors.push(CheckError::DuplicateNodeId {
                task_id: task_id.to_string(),
                node_id: node.id.clone(),
            });
        }
        if node.title.trim().is_empty() {
            result.warnings.push(CheckWarning::UntitledNode {
                task_id: task_id.to_string(),
                node_id: node.id.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::outline::OutlineNode;
    use crate::model::task::{Recurrence, RecurrenceKind};

    fn task_with(id: &str, nodes: Vec<OutlineNode>) -> Task {
        let mut task = Task::new(id.into(), "T".into(), 0);
        task.subtasks = Forest::from(nodes);
        task
    }

    #[test]
    fn clean_tasks_are_valid() {
        let tasks = vec![task_with(
            "t1",
            vec![OutlineNode::leaf("a", "A").with_children(vec![OutlineNode::leaf("b", "B")])],
        )];
        let result = check_tasks(&tasks);
        assert!(result.valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn duplicate_node_ids_across_depths() {
        let tasks = vec![task_with(
            "t1",
            vec![
                OutlineNode::leaf("a", "A").with_children(vec![OutlineNode::leaf("x", "X")]),
                OutlineNode::leaf("x", "again"),
                OutlineNode::leaf("x", "third"),
            ],
        )];
        let result = check_tasks(&tasks);
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![CheckError::DuplicateNodeId {
                task_id: "t1".into(),
                node_id: "x".into()
            }]
        );
    }

    #[test]
    fn duplicate_task_ids_and_empty_ids() {
        let tasks = vec![
            task_with("t1", vec![]),
            task_with("t1", vec![OutlineNode::leaf("", "nameless")]),
        ];
        let result = check_tasks(&tasks);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.contains(&CheckError::DuplicateTaskId {
            task_id: "t1".into()
        }));
        assert!(result.errors.contains(&CheckError::EmptyNodeId {
            task_id: "t1".into(),
            title: "nameless".into()
        }));
    }

    #[test]
    fn warnings_for_untitled_and_recurrence() {
        let mut task = task_with("t1", vec![OutlineNode::leaf("a", "  ")]);
        task.recurrence = Some(Recurrence {
            kind: RecurrenceKind::Daily,
            interval: 0,
        });
        let result = check_tasks(&[task]);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 3);
    }
}
