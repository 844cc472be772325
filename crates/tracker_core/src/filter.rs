use crate::model::{Priority, Task, TaskStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == TaskStatus::Active,
            Self::Completed => status == TaskStatus::Completed,
        }
    }
}

/// Every set field narrows the result; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilters {
    #[serde(default)]
    pub search_text: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl TaskFilters {
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }

    pub fn merged(&self, patch: &FilterPatch) -> TaskFilters {
        let mut merged = self.clone();
        if let Some(search_text) = patch.search_text.as_ref() {
            merged.search_text = search_text.clone();
        }
        if let Some(start_date) = patch.start_date.as_ref() {
            merged.start_date = start_date.clone();
        }
        if let Some(end_date) = patch.end_date.as_ref() {
            merged.end_date = end_date.clone();
        }
        if let Some(status) = patch.status {
            merged.status = status;
        }
        if let Some(color) = patch.color.as_ref() {
            merged.color = color.clone();
        }
        if let Some(category) = patch.category.as_ref() {
            merged.category = category.clone();
        }
        if let Some(priority) = patch.priority {
            merged.priority = priority;
        }
        if let Some(tags) = patch.tags.as_ref() {
            merged.tags = tags.clone();
        }
        merged
    }
}

/// Partial filter update. The outer `Option` selects the field, the inner
/// one sets or clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub search_text: Option<String>,
    pub start_date: Option<Option<String>>,
    pub end_date: Option<Option<String>>,
    pub status: Option<StatusFilter>,
    pub color: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub priority: Option<Option<Priority>>,
    pub tags: Option<Option<Vec<String>>>,
}

impl FilterPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

pub fn filter_tasks(tasks: &[Task], filters: &TaskFilters) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task_matches(task, filters))
        .cloned()
        .collect()
}

pub fn task_matches(task: &Task, filters: &TaskFilters) -> bool {
    matches_search(task, &filters.search_text)
        && filters.status.matches(task.status)
        && matches_start_date(task, filters.start_date.as_deref())
        && matches_end_date(task, filters.end_date.as_deref())
        && filters
            .color
            .as_deref()
            .is_none_or(|color| task.color == color)
        && filters
            .category
            .as_deref()
            .is_none_or(|category| task.metrics.category == category)
        && filters
            .priority
            .is_none_or(|priority| task.metrics.priority == priority)
        && matches_tags(task, filters.tags.as_deref())
}

fn matches_search(task: &Task, search_text: &str) -> bool {
    if search_text.is_empty() {
        return true;
    }
    let needle = search_text.to_lowercase();
    task.title.to_lowercase().contains(&needle) || task.description.to_lowercase().contains(&needle)
}

// ISO dates order lexicographically.
fn matches_start_date(task: &Task, start_date: Option<&str>) -> bool {
    start_date.is_none_or(|start| task.start_date.as_str() >= start)
}

// Open-ended tasks never pass an end date bound.
fn matches_end_date(task: &Task, end_date: Option<&str>) -> bool {
    match end_date {
        None => true,
        Some(end) => task
            .end_date
            .as_deref()
            .is_some_and(|task_end| task_end <= end),
    }
}

fn matches_tags(task: &Task, tags: Option<&[String]>) -> bool {
    tags.is_none_or(|wanted| wanted.iter().all(|tag| task.metrics.tags.contains(tag)))
}
