//! The state holder: owns the task collection and the active filters, and
//! keeps the filtered view and the persisted copy in step with them.
//!
//! Every mutation builds a new collection and swaps it in whole, then
//! re-derives the filtered view and saves. Operations on an unknown id leave
//! everything untouched and return `None`.

use crate::achievements::{Achievement, evaluate_achievements};
use crate::clock::{local_offset, today};
use crate::filter::{FilterPatch, TaskFilters, filter_tasks};
use crate::metrics::{TaskSummary, summarize};
use crate::model::{Task, TaskDraft, TaskUpdate};
use crate::storage::{KeyValueStore, TaskGateway};
use crate::task_api::{add_note_to_task, complete_task, create_task, update_task};

pub struct TaskSession {
    gateway: TaskGateway,
    tasks: Vec<Task>,
    filters: TaskFilters,
    filtered: Vec<Task>,
    selected_task_id: Option<String>,
}

impl TaskSession {
    /// Hydrates the collection from `store`.
    pub fn open(store: Box<dyn KeyValueStore>) -> Self {
        let gateway = TaskGateway::new(store);
        let tasks = gateway.load();
        let filters = TaskFilters::default();
        let filtered = filter_tasks(&tasks, &filters);

        Self {
            gateway,
            tasks,
            filters,
            filtered,
            selected_task_id: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filtered_tasks(&self) -> &[Task] {
        &self.filtered
    }

    pub fn filters(&self) -> &TaskFilters {
        &self.filters
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn selected_task_id(&self) -> Option<&str> {
        self.selected_task_id.as_deref()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_task_id
            .as_deref()
            .and_then(|id| self.task(id))
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> Task {
        let task = create_task(draft);
        tracing::info!("created task {}", task.id);

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next);

        task
    }

    /// Removes the task outright; no `deleted` entry is recorded anywhere.
    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        let removed = self.tasks[index].clone();
        let next: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect();

        if self.selected_task_id.as_deref() == Some(id) {
            self.selected_task_id = None;
        }
        tracing::info!("deleted task {}", id);
        self.commit(next);

        Some(removed)
    }

    pub fn update_task_item(&mut self, id: &str, update: &TaskUpdate) -> Option<Task> {
        self.replace_task(id, |task| update_task(task, update))
    }

    /// Completes the task without checking its current status; callers
    /// gate this to active tasks.
    pub fn mark_task_complete(&mut self, id: &str, completion_note: &str) -> Option<Task> {
        self.replace_task(id, |task| complete_task(task, completion_note))
    }

    pub fn add_note(&mut self, id: &str, text: &str) -> Option<Task> {
        self.replace_task(id, |task| add_note_to_task(task, text))
    }

    pub fn set_filters(&mut self, patch: &FilterPatch) {
        self.filters = self.filters.merged(patch);
        self.refresh_filtered();
    }

    pub fn reset_filters(&mut self) {
        self.filters = TaskFilters::default();
        self.refresh_filtered();
    }

    pub fn select_task(&mut self, id: Option<&str>) {
        self.selected_task_id = id.map(str::to_string);
    }

    pub fn summary(&self) -> TaskSummary {
        summarize(&self.tasks, today(), local_offset())
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        evaluate_achievements(&self.tasks, today(), local_offset())
    }

    fn replace_task<F>(&mut self, id: &str, transition: F) -> Option<Task>
    where
        F: FnOnce(&Task) -> Task,
    {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        let updated = transition(&self.tasks[index]);
        tracing::debug!("task {} now has {} history entries", id, updated.history.len());

        let mut next = self.tasks.clone();
        next[index] = updated.clone();
        self.commit(next);

        Some(updated)
    }

    fn commit(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.refresh_filtered();
        self.gateway.save(&self.tasks);
    }

    fn refresh_filtered(&mut self) {
        self.filtered = filter_tasks(&self.tasks, &self.filters);
    }
}
