//! Pure task transitions. Each one takes the current task by reference and
//! returns the next version with a history entry appended; the input is
//! never touched.
//!
//! Validation (blank titles, blank note text, duplicate tags, completing an
//! already completed task) belongs to the caller.

use crate::clock::{format_date, format_timestamp, generate_id, local_offset};
use crate::model::{
    HistoryAction, HistoryEntry, Note, Task, TaskDraft, TaskMetrics, TaskStatus, TaskUpdate,
};
use time::OffsetDateTime;

pub fn create_task(draft: TaskDraft) -> Task {
    create_task_at(draft, OffsetDateTime::now_utc())
}

pub fn update_task(task: &Task, update: &TaskUpdate) -> Task {
    update_task_at(task, update, OffsetDateTime::now_utc())
}

/// Marks the task completed. Not idempotent: calling it again appends
/// another `completed` entry and bumps the streak again.
pub fn complete_task(task: &Task, completion_note: &str) -> Task {
    complete_task_at(task, completion_note, OffsetDateTime::now_utc())
}

pub fn add_note_to_task(task: &Task, text: &str) -> Task {
    add_note_to_task_at(task, text, OffsetDateTime::now_utc())
}

pub(crate) fn create_task_at(draft: TaskDraft, now: OffsetDateTime) -> Task {
    let timestamp = format_timestamp(now);
    let start_date = draft
        .start_date
        .unwrap_or_else(|| format_date(now.to_offset(local_offset()).date()));

    let details = serde_json::json!({
        "title": draft.title,
        "description": draft.description,
        "startDate": start_date,
        "endDate": draft.end_date,
        "color": draft.color,
        "priority": draft.priority,
        "estimatedTime": draft.estimated_time,
        "category": draft.category,
        "tags": draft.tags,
    });

    Task {
        id: generate_id(),
        title: draft.title,
        description: draft.description,
        start_date,
        end_date: draft.end_date,
        color: draft.color,
        status: TaskStatus::Active,
        created_at: timestamp.clone(),
        completed_at: None,
        completion_note: None,
        notes: Vec::new(),
        history: vec![HistoryEntry {
            action: HistoryAction::Created,
            timestamp,
            details,
        }],
        metrics: TaskMetrics {
            priority: draft.priority,
            estimated_time: draft.estimated_time,
            actual_time: Some(0),
            category: draft.category,
            tags: draft.tags,
            streak: 0,
            completion_rate: 0.0,
        },
    }
}

pub(crate) fn update_task_at(task: &Task, update: &TaskUpdate, now: OffsetDateTime) -> Task {
    let mut updated = task.clone();

    if let Some(title) = update.title.as_ref() {
        updated.title = title.clone();
    }
    if let Some(description) = update.description.as_ref() {
        updated.description = description.clone();
    }
    if let Some(start_date) = update.start_date.as_ref() {
        updated.start_date = start_date.clone();
    }
    if let Some(end_date) = update.end_date.as_ref() {
        updated.end_date = end_date.clone();
    }
    if let Some(color) = update.color.as_ref() {
        updated.color = color.clone();
    }
    if let Some(patch) = update.metrics.as_ref() {
        updated.metrics = patch.apply_to(&task.metrics);
    }

    updated.history.push(HistoryEntry {
        action: HistoryAction::Updated,
        timestamp: format_timestamp(now),
        details: serde_json::to_value(update).unwrap_or_default(),
    });

    updated
}

pub(crate) fn complete_task_at(task: &Task, completion_note: &str, now: OffsetDateTime) -> Task {
    let timestamp = format_timestamp(now);
    let mut updated = task.clone();

    updated.history.push(HistoryEntry {
        action: HistoryAction::Completed,
        timestamp: timestamp.clone(),
        details: serde_json::json!({ "completionNote": completion_note }),
    });
    updated.status = TaskStatus::Completed;
    updated.completed_at = Some(timestamp);
    updated.completion_note = if completion_note.is_empty() {
        None
    } else {
        Some(completion_note.to_string())
    };
    updated.metrics.streak += 1;
    updated.metrics.completion_rate = history_completion_rate(&updated.history);

    updated
}

pub(crate) fn add_note_to_task_at(task: &Task, text: &str, now: OffsetDateTime) -> Task {
    let timestamp = format_timestamp(now);
    let note = Note {
        id: generate_id(),
        text: text.to_string(),
        timestamp: timestamp.clone(),
    };

    let mut updated = task.clone();
    updated.history.push(HistoryEntry {
        action: HistoryAction::NoteAdded,
        timestamp,
        details: serde_json::json!({ "noteId": note.id, "text": text }),
    });
    updated.notes.push(note);

    updated
}

// Share of this task's own audit log made of `completed` entries. Kept as
// the stored per-task `completionRate`; the collection-wide rate lives in
// `metrics::completion_rate`.
fn history_completion_rate(history: &[HistoryEntry]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let completed = history
        .iter()
        .filter(|entry| entry.action == HistoryAction::Completed)
        .count();
    completed as f64 * 100.0 / history.len() as f64
}

#[cfg(test)]
mod tests {
    use super::{
        add_note_to_task, add_note_to_task_at, complete_task, complete_task_at, create_task,
        create_task_at, update_task, update_task_at,
    };
    use crate::model::{
        HistoryAction, MetricsPatch, Priority, TaskDraft, TaskStatus, TaskUpdate,
    };
    use time::Duration;
    use time::macros::datetime;

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            start_date: Some("2025-12-20".to_string()),
            ..TaskDraft::new(title)
        }
    }

    #[test]
    fn create_task_sets_defaults_and_created_entry() {
        let now = datetime!(2025-12-20 08:00:00 UTC);
        let task = create_task_at(draft("demo"), now);

        assert!(!task.id.is_empty());
        assert_eq!(task.title, "demo");
        assert_eq!(task.status, TaskStatus::Active);
        assert_eq!(task.created_at, "2025-12-20T08:00:00Z");
        assert_eq!(task.start_date, "2025-12-20");
        assert_eq!(task.end_date, None);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.completion_note, None);
        assert!(task.notes.is_empty());
        assert_eq!(task.history.len(), 1);
        assert_eq!(task.history[0].action, HistoryAction::Created);
        assert_eq!(task.history[0].details["title"], "demo");
        assert_eq!(task.history[0].details["color"], "#FF6363");
        assert_eq!(task.metrics.priority.level(), 3);
        assert_eq!(task.metrics.estimated_time, Some(30));
        assert_eq!(task.metrics.actual_time, Some(0));
        assert_eq!(task.metrics.category, "Uncategorized");
        assert_eq!(task.metrics.streak, 0);
        assert_eq!(task.metrics.completion_rate, 0.0);
    }

    #[test]
    fn create_task_assigns_distinct_ids() {
        let first = create_task(draft("one"));
        let second = create_task(draft("two"));

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn create_task_accepts_empty_title() {
        let task = create_task(draft(""));
        assert_eq!(task.title, "");
    }

    #[test]
    fn update_task_patches_fields_and_records_patch() {
        let task = create_task(draft("old"));
        let update = TaskUpdate {
            title: Some("new".to_string()),
            end_date: Some(Some("2025-12-31".to_string())),
            ..TaskUpdate::default()
        };

        let updated = update_task(&task, &update);

        assert_eq!(updated.title, "new");
        assert_eq!(updated.end_date.as_deref(), Some("2025-12-31"));
        assert_eq!(updated.description, task.description);
        assert_eq!(updated.id, task.id);
        assert_eq!(updated.created_at, task.created_at);
        assert_eq!(updated.history.len(), 2);
        assert_eq!(updated.history[1].action, HistoryAction::Updated);
        assert_eq!(
            updated.history[1].details,
            serde_json::json!({ "title": "new", "endDate": "2025-12-31" })
        );
        assert_eq!(task.title, "old");
        assert_eq!(task.history.len(), 1);
    }

    #[test]
    fn update_task_merges_metrics_patch() {
        let task = create_task(TaskDraft {
            category: "Work".to_string(),
            tags: vec!["deep".to_string()],
            ..draft("demo")
        });
        let update = TaskUpdate {
            metrics: Some(MetricsPatch {
                priority: Priority::new(5),
                actual_time: Some(Some(20)),
                ..MetricsPatch::default()
            }),
            ..TaskUpdate::default()
        };

        let updated = update_task(&task, &update);

        assert_eq!(updated.metrics.priority.level(), 5);
        assert_eq!(updated.metrics.actual_time, Some(20));
        assert_eq!(updated.metrics.estimated_time, Some(30));
        assert_eq!(updated.metrics.category, "Work");
        assert_eq!(updated.metrics.tags, vec!["deep".to_string()]);
    }

    #[test]
    fn update_task_can_clear_end_date() {
        let task = create_task(TaskDraft {
            end_date: Some("2025-12-31".to_string()),
            ..draft("demo")
        });
        let update = TaskUpdate {
            end_date: Some(None),
            ..TaskUpdate::default()
        };

        let updated = update_task(&task, &update);

        assert_eq!(updated.end_date, None);
    }

    #[test]
    fn empty_update_still_records_history() {
        let task = create_task(draft("demo"));
        let updated = update_task_at(&task, &TaskUpdate::default(), datetime!(2025-12-21 00:00 UTC));

        assert_eq!(updated.history.len(), 2);
        assert_eq!(updated.history[1].details, serde_json::json!({}));
    }

    #[test]
    fn complete_task_sets_completion_fields() {
        let task = create_task_at(draft("demo"), datetime!(2025-12-20 08:00 UTC));
        let completed = complete_task_at(&task, "ship it", datetime!(2025-12-20 10:00 UTC));

        assert_eq!(completed.status, TaskStatus::Completed);
        assert_eq!(completed.completed_at.as_deref(), Some("2025-12-20T10:00:00Z"));
        assert_eq!(completed.completion_note.as_deref(), Some("ship it"));
        assert_eq!(completed.history.len(), 2);
        assert_eq!(completed.history[1].action, HistoryAction::Completed);
        assert_eq!(completed.history[1].details["completionNote"], "ship it");
        assert_eq!(completed.metrics.streak, 1);
        assert_eq!(completed.metrics.completion_rate, 50.0);
        assert_eq!(task.status, TaskStatus::Active);
    }

    #[test]
    fn complete_task_with_empty_note_stores_none() {
        let task = create_task(draft("demo"));
        let completed = complete_task(&task, "");

        assert_eq!(completed.completion_note, None);
        assert!(completed.completed_at.is_some());
    }

    #[test]
    fn complete_task_twice_is_not_idempotent() {
        let now = datetime!(2025-12-20 08:00 UTC);
        let task = create_task_at(draft("demo"), now);
        let once = complete_task_at(&task, "", now + Duration::hours(1));
        let twice = complete_task_at(&once, "", now + Duration::hours(2));

        let completed_entries = twice
            .history
            .iter()
            .filter(|entry| entry.action == HistoryAction::Completed)
            .count();
        assert_eq!(completed_entries, 2);
        assert_eq!(twice.metrics.streak, 2);
        assert_eq!(twice.completed_at.as_deref(), Some("2025-12-20T10:00:00Z"));
        assert!((twice.metrics.completion_rate - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn add_note_appends_without_touching_input() {
        let task = create_task(draft("demo"));
        let first = add_note_to_task(&task, "ok");
        let second = add_note_to_task(&first, "again");

        assert_eq!(second.notes.len(), 2);
        assert_eq!(second.notes[0].text, "ok");
        assert_eq!(second.notes[1].text, "again");
        assert_ne!(second.notes[0].id, second.notes[1].id);
        let note_entries = second
            .history
            .iter()
            .filter(|entry| entry.action == HistoryAction::NoteAdded)
            .count();
        assert_eq!(note_entries, 2);
        assert_eq!(second.history[0].action, HistoryAction::Created);
        assert!(task.notes.is_empty());
        assert_eq!(task.history.len(), 1);
        assert_eq!(first.notes.len(), 1);
    }

    #[test]
    fn add_note_accepts_blank_text() {
        let task = create_task(draft("demo"));
        let updated = add_note_to_task_at(&task, "", datetime!(2025-12-20 12:00 UTC));

        assert_eq!(updated.notes.len(), 1);
        assert_eq!(updated.notes[0].text, "");
        assert_eq!(updated.notes[0].timestamp, "2025-12-20T12:00:00Z");
        assert_eq!(updated.history[1].details["noteId"], updated.notes[0].id.as_str());
    }
}
