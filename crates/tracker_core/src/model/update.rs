use crate::model::task::{
    DEFAULT_CATEGORY, DEFAULT_COLOR, DEFAULT_ESTIMATED_TIME, Priority, TaskMetrics,
};
use serde::{Deserialize, Serialize};

/// Constructor arguments for a new task. `start_date: None` means today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub color: String,
    pub priority: Priority,
    pub estimated_time: Option<u32>,
    pub category: String,
    pub tags: Vec<String>,
}

impl TaskDraft {
    pub fn new<T: Into<String>>(title: T) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            start_date: None,
            end_date: None,
            color: DEFAULT_COLOR.to_string(),
            priority: Priority::default(),
            estimated_time: Some(DEFAULT_ESTIMATED_TIME),
            category: DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
        }
    }
}

/// Partial metrics update, merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_time: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl MetricsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, metrics: &TaskMetrics) -> TaskMetrics {
        let mut merged = metrics.clone();
        if let Some(priority) = self.priority {
            merged.priority = priority;
        }
        if let Some(estimated_time) = self.estimated_time {
            merged.estimated_time = estimated_time;
        }
        if let Some(actual_time) = self.actual_time {
            merged.actual_time = actual_time;
        }
        if let Some(category) = self.category.as_ref() {
            merged.category = category.clone();
        }
        if let Some(tags) = self.tags.as_ref() {
            merged.tags = tags.clone();
        }
        merged
    }
}

/// Editable task fields. Status, completion data, notes and history are
/// only changed by their own transitions.
///
/// `end_date: Some(None)` clears the end date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsPatch>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
