pub mod achievements;
pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod model;
pub mod session;
pub mod storage;
pub mod task_api;

#[cfg(test)]
mod tests {
    use crate::model::{Task, TaskDraft, TaskStatus};
    use crate::task_api::{add_note_to_task, complete_task, create_task, update_task};

    fn history_is_append_only(before: &Task, after: &Task) -> bool {
        after.history.len() > before.history.len()
            && after.history[..before.history.len()] == before.history[..]
    }

    #[test]
    fn every_transition_keeps_created_first_and_grows_history() {
        let created = create_task(TaskDraft::new("demo"));
        let updated = update_task(&created, &Default::default());
        let noted = add_note_to_task(&updated, "note");
        let completed = complete_task(&noted, "");

        for task in [&created, &updated, &noted, &completed] {
            assert_eq!(task.history[0].action, crate::model::HistoryAction::Created);
        }
        assert!(history_is_append_only(&created, &updated));
        assert!(history_is_append_only(&updated, &noted));
        assert!(history_is_append_only(&noted, &completed));
    }

    #[test]
    fn completed_at_is_set_exactly_when_completed() {
        let created = create_task(TaskDraft::new("demo"));
        assert_eq!(created.status, TaskStatus::Active);
        assert!(created.completed_at.is_none());

        let completed = complete_task(&created, "");
        assert_eq!(completed.status, TaskStatus::Completed);
        assert!(completed.completed_at.is_some());

        let edited = update_task(&completed, &Default::default());
        assert_eq!(edited.status, TaskStatus::Completed);
        assert_eq!(edited.completed_at, completed.completed_at);
    }
}
