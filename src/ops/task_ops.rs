use chrono::{Days, Months, NaiveDate};

use crate::model::outline::OutlineCount;
use crate::model::task::{Recurrence, RecurrenceKind, Task, TaskPatch, TaskStatus};
use crate::ops::outline_ops;
use crate::util::id::IdSource;

/// Create a new open task with a fresh id.
pub fn new_task(title: &str, ids: &mut dyn IdSource, now_ms: i64) -> Task {
    Task::new(ids.next_id(), title.trim().to_string(), now_ms)
}

/// The due date one recurrence step after `date`.
///
/// Months and years clamp to the end of a shorter month (Jan 31 + 1 month
/// is Feb 28/29). Returns `date` unchanged if the result would overflow.
pub fn next_due_date(date: NaiveDate, recurrence: Recurrence) -> NaiveDate {
    let n = recurrence.interval.max(1);
    let next = match recurrence.kind {
        RecurrenceKind::Daily => date.checked_add_days(Days::new(n as u64)),
        RecurrenceKind::Weekly => date.checked_add_days(Days::new(n as u64 * 7)),
        RecurrenceKind::Monthly => date.checked_add_months(Months::new(n)),
        RecurrenceKind::Yearly => n
            .checked_mul(12)
            .and_then(|months| date.checked_add_months(Months::new(months))),
    };
    next.unwrap_or(date)
}

/// What toggling a task's status produces.
#[derive(Debug, Clone)]
pub struct StatusToggle {
    /// Update for the toggled task
    pub patch: TaskPatch,
    /// The next occurrence of a recurring task, to be saved as a new record
    pub spawned: Option<Task>,
}

/// Completed tasks reopen; anything else completes. Completing a recurring
/// task with a due date also yields its next occurrence.
pub fn toggle_status(task: &Task, ids: &mut dyn IdSource, now_ms: i64) -> StatusToggle {
    let new_status = if task.status == TaskStatus::Completed {
        TaskStatus::Todo
    } else {
        TaskStatus::Completed
    };

    let spawned = match (new_status, task.recurrence, task.due_date) {
        (TaskStatus::Completed, Some(recurrence), Some(due)) => Some(Task {
            id: ids.next_id(),
            status: TaskStatus::Todo,
            due_date: Some(next_due_date(due, recurrence)),
            created_at: now_ms,
            ..task.clone()
        }),
        _ => None,
    };

    StatusToggle {
        patch: TaskPatch::status(new_status),
        spawned,
    }
}

/// Toggle task `id` inside a stored list, inserting any next occurrence at
/// the front. Returns the toggled task and the spawned one, or `None` when
/// `id` is not in the list.
pub fn toggle_in_list(
    tasks: &mut Vec<Task>,
    id: &str,
    ids: &mut dyn IdSource,
    now_ms: i64,
) -> Option<(Task, Option<Task>)> {
    let task = tasks.iter_mut().find(|t| t.id == id)?;
    let toggle = toggle_status(task, ids, now_ms);
    toggle.patch.apply(task);
    let updated = task.clone();
    if let Some(next) = &toggle.spawned {
        tasks.insert(0, next.clone());
    }
    Some((updated, toggle.spawned))
}

/// Tasks due on `date`: open ones first, newest first within each group.
pub fn tasks_due_on(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    let mut due: Vec<&Task> = tasks.iter().filter(|t| t.due_date == Some(date)).collect();
    due.sort_by(|a, b| {
        a.is_completed()
            .cmp(&b.is_completed())
            .then(b.created_at.cmp(&a.created_at))
    });
    due
}

/// Dashboard order: newest first.
pub fn sorted_by_created(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

/// Checklist progress for a task's outline.
pub fn outline_progress(task: &Task) -> OutlineCount {
    outline_ops::count(&task.subtasks)
}

/// Resolve a full id or a unique prefix against `candidates`.
pub fn resolve_prefix<'a, I>(candidates: I, query: &str) -> Result<&'a str, PrefixError>
where
    I: IntoIterator<Item = &'a str>,
{
    if query.is_empty() {
        return Err(PrefixError::NotFound(query.to_string()));
    }
    let mut matches: Vec<&'a str> = Vec::new();
    for id in candidates {
        if id == query {
            return Ok(id);
        }
        if id.starts_with(query) {
            matches.push(id);
        }
    }
    match matches.len() {
        0 => Err(PrefixError::NotFound(query.to_string())),
        1 => Ok(matches[0]),
        n => Err(PrefixError::Ambiguous(query.to_string(), n)),
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PrefixError {
    #[error("no id matches '{0}'")]
    NotFound(String),
    #[error("'{0}' is ambiguous ({1} ids match)")]
    Ambiguous(String, usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::id::SequentialIds;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn every(kind: RecurrenceKind, interval: u32) -> Recurrence {
        Recurrence { kind, interval }
    }

    #[test]
    fn next_due_date_steps() {
        let d = date(2025, 1, 31);
        assert_eq!(next_due_date(d, every(RecurrenceKind::Daily, 1)), date(2025, 2, 1));
        assert_eq!(next_due_date(d, every(RecurrenceKind::Weekly, 2)), date(2025, 2, 14));
        assert_eq!(next_due_date(d, every(RecurrenceKind::Monthly, 1)), date(2025, 2, 28));
        assert_eq!(next_due_date(d, every(RecurrenceKind::Yearly, 1)), date(2026, 1, 31));
        assert_eq!(
            next_due_date(date(2024, 2, 29), every(RecurrenceKind::Yearly, 1)),
            date(2025, 2, 28)
        );
    }

    #[test]
    fn zero_interval_counts_as_one() {
        let d = date(2025, 5, 1);
        assert_eq!(next_due_date(d, every(RecurrenceKind::Daily, 0)), date(2025, 5, 2));
    }

    #[test]
    fn toggle_plain_task() {
        let mut ids = SequentialIds::new("t");
        let task = new_task("  Water plants ", &mut ids, 10);
        assert_eq!(task.title, "Water plants");

        let toggle = toggle_status(&task, &mut ids, 20);
        assert_eq!(toggle.patch.status, Some(TaskStatus::Completed));
        assert!(toggle.spawned.is_none());

        let mut done = task.clone();
        toggle.patch.apply(&mut done);
        let reopen = toggle_status(&done, &mut ids, 30);
        assert_eq!(reopen.patch.status, Some(TaskStatus::Todo));
    }

    #[test]
    fn completing_recurring_task_spawns_next() {
        let mut ids = SequentialIds::new("t");
        let mut task = new_task("Standup", &mut ids, 10);
        task.recurrence = Some(every(RecurrenceKind::Daily, 1));
        task.due_date = Some(date(2025, 6, 1));

        let toggle = toggle_status(&task, &mut ids, 99);
        let next = toggle.spawned.expect("next occurrence");
        assert_eq!(next.id, "t2");
        assert_eq!(next.status, TaskStatus::Todo);
        assert_eq!(next.due_date, Some(date(2025, 6, 2)));
        assert_eq!(next.created_at, 99);
        assert_eq!(next.title, "Standup");
    }

    #[test]
    fn recurring_without_due_date_does_not_spawn() {
        let mut ids = SequentialIds::new("t");
        let mut task = new_task("Someday", &mut ids, 10);
        task.recurrence = Some(every(RecurrenceKind::Weekly, 1));
        assert!(toggle_status(&task, &mut ids, 20).spawned.is_none());
    }

    #[test]
    fn toggle_in_list_completes_and_prepends_next() {
        let mut t = Task::new("t1".into(), "Rent".into(), 1);
        t.due_date = Some(date(2025, 1, 31));
        t.recurrence = Some(every(RecurrenceKind::Monthly, 1));
        let mut tasks = vec![Task::new("t0".into(), "Other".into(), 0), t];
        let mut ids = SequentialIds::new("r");

        let (done, next) = toggle_in_list(&mut tasks, "t1", &mut ids, 5).unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        let next = next.unwrap();
        assert_eq!(next.due_date, Some(date(2025, 2, 28)));

        let order: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec![next.id.as_str(), "t0", "t1"]);
        assert_eq!(tasks[2], done);

        assert!(toggle_in_list(&mut tasks, "nope", &mut ids, 6).is_none());
        assert_eq!(tasks.len(), 3);
    }

    #[test]
    fn due_on_orders_open_first_then_newest() {
        let d = date(2025, 6, 1);
        let mut a = Task::new("a".into(), "A".into(), 1);
        a.due_date = Some(d);
        let mut b = Task::new("b".into(), "B".into(), 2);
        b.due_date = Some(d);
        b.status = TaskStatus::Completed;
        let mut c = Task::new("c".into(), "C".into(), 3);
        c.due_date = Some(d);
        let other = Task::new("x".into(), "X".into(), 4);

        let tasks = vec![a, b, c, other];
        let due: Vec<&str> = tasks_due_on(&tasks, d).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(due, vec!["c", "a", "b"]);
    }

    #[test]
    fn sorted_newest_first() {
        let tasks = vec![
            Task::new("old".into(), "".into(), 1),
            Task::new("new".into(), "".into(), 5),
        ];
        assert_eq!(sorted_by_created(&tasks)[0].id, "new");
    }

    #[test]
    fn resolve_prefix_cases() {
        let ids = ["abc123", "abd456", "xyz"];
        assert_eq!(resolve_prefix(ids.iter().copied(), "abc"), Ok("abc123"));
        assert_eq!(resolve_prefix(ids.iter().copied(), "xyz"), Ok("xyz"));
        assert_eq!(
            resolve_prefix(ids.iter().copied(), "ab"),
            Err(PrefixError::Ambiguous("ab".into(), 2))
        );
        assert_eq!(
            resolve_prefix(ids.iter().copied(), "q"),
            Err(PrefixError::NotFound("q".into()))
        );
    }
}
