use serde::Serialize;

use crate::model::outline::{Forest, OutlineCount};
use crate::model::task::{Recurrence, RecurrenceKind, Task, TaskStatus};
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::outline_ops;
use crate::ops::task_ops;
use crate::util::id::short_id;

/// Characters of an id shown in human-readable output
pub const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub progress: OutlineCount,
}

#[derive(Serialize)]
pub struct OutlineEditJson<'a> {
    pub task_id: &'a str,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<&'a str>,
    pub subtasks: &'a Forest,
    pub progress: OutlineCount,
}

#[derive(Serialize)]
pub struct PredecessorJson<'a> {
    pub node_id: &'a str,
    pub predecessor: Option<&'a str>,
}

pub fn task_to_json(task: &Task) -> TaskJson<'_> {
    TaskJson {
        task,
        progress: task_ops::outline_progress(task),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn recurrence_label(r: Recurrence) -> String {
    let unit = match r.kind {
        RecurrenceKind::Daily => "day",
        RecurrenceKind::Weekly => "week",
        RecurrenceKind::Monthly => "month",
        RecurrenceKind::Yearly => "year",
    };
    if r.interval <= 1 {
        format!("every {}", unit)
    } else {
        format!("every {} {}s", r.interval, unit)
    }
}

/// One-line task summary: `[x] 1a2b3c4d Title  due 2025-03-01 ★ #tag (2/3)`
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!(
        "[{}] {} {}",
        task.status.checkbox_char(),
        short_id(&task.id, SHORT_ID_LEN),
        task.title
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due {}", due));
    }
    if task.star_level > 0 {
        line.push_str(" \u{2605}");
    }
    for tag in &task.tags {
        line.push_str(&format!(" #{}", tag));
    }
    let progress = task_ops::outline_progress(task);
    if progress.total > 0 {
        line.push_str(&format!(" ({}/{})", progress.completed, progress.total));
    }
    line
}

/// Indented checklist rows for an outline, one per node in pre-order.
/// The row for `focus` is marked with `>`.
pub fn format_outline(forest: &Forest, indent_width: usize, focus: Option<&str>) -> Vec<String> {
    outline_ops::preorder(forest)
        .map(|(depth, node)| {
            let marker = if Some(node.id.as_str()) == focus { '>' } else { ' ' };
            let check = if node.completed { 'x' } else { ' ' };
            let title = if node.title.is_empty() {
                "(untitled)"
            } else {
                node.title.as_str()
            };
            format!(
                "{}{}[{}] {}  {}",
                marker,
                " ".repeat(depth * indent_width + 1),
                check,
                title,
                short_id(&node.id, SHORT_ID_LEN)
            )
        })
        .collect()
}

pub fn format_progress(count: OutlineCount) -> String {
    format!(
        "{}/{} done ({}%)",
        count.completed,
        count.total,
        count.percent()
    )
}

/// Detailed task view for `flow show`
pub fn format_task_detail(task: &Task, indent_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "[{}] {}",
        task.status.checkbox_char(),
        task.title
    ));
    lines.push(format!("id: {}", task.id));
    lines.push(format!("status: {}", status_label(task.status)));
    if let Some(due) = task.due_date {
        lines.push(format!("due: {}", due));
    }
    if let Some(r) = task.recurrence {
        lines.push(format!("repeats: {}", recurrence_label(r)));
    }
    if let Some(minutes) = task.estimated_minutes {
        lines.push(format!("estimate: {}m", minutes));
    }
    if task.star_level > 0 {
        lines.push("starred".to_string());
    }
    if !task.tags.is_empty() {
        let tags: Vec<String> = task.tags.iter().map(|t| format!("#{}", t)).collect();
        lines.push(format!("tags: {}", tags.join(" ")));
    }
    if let Some(desc) = &task.description {
        lines.push("description:".to_string());
        for line in desc.lines() {
            lines.push(format!("  {}", line));
        }
    }
    if !task.subtasks.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "subtasks: {}",
            format_progress(task_ops::outline_progress(task))
        ));
        lines.extend(format_outline(&task.subtasks, indent_width, None));
    }
    lines
}

pub fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "todo",
        TaskStatus::InProgress => "in progress",
        TaskStatus::Completed => "completed",
    }
}

pub fn format_check(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    for e in &result.errors {
        lines.push(match e {
            CheckError::DuplicateTaskId { task_id } => {
                format!("error: duplicate task id {}", task_id)
            }
            CheckError::DuplicateNodeId { task_id, node_id } => {
                format!("error: task {}: duplicate subtask id {}", task_id, node_id)
            }
            CheckError::EmptyTaskId { title } => format!("error: task '{}' has no id", title),
            CheckError::EmptyNodeId { task_id, title } => {
                format!("error: task {}: subtask '{}' has no id", task_id, title)
            }
        });
    }
    for w in &result.warnings {
        lines.push(match w {
            CheckWarning::UntitledNode { task_id, node_id } => {
                format!("warning: task {}: subtask {} is untitled", task_id, node_id)
            }
            CheckWarning::ZeroInterval { task_id } => {
                format!("warning: task {}: repeat interval 0 treated as 1", task_id)
            }
            CheckWarning::RecurrenceWithoutDueDate { task_id } => {
                format!("warning: task {}: repeats but has no due date", task_id)
            }
        });
    }
    if result.valid && result.warnings.is_empty() {
        lines.push("ok".to_string());
    }
    lines
}
