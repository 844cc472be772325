use crate::error::AppError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COLOR: &str = "#FF6363";
pub const COLOR_PALETTE: [&str; 5] = ["#FF6363", "#FFB563", "#63FF8C", "#63B5FF", "#D463FF"];
pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const DEFAULT_ESTIMATED_TIME: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    Updated,
    Completed,
    NoteAdded,
    /// Reserved. Deleting a task removes it without appending this.
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    pub timestamp: String,
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Priority level between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Priority> {
        (Self::MIN..=Self::MAX).map(Priority)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for Priority {
    type Error = AppError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Priority::new(level).ok_or_else(|| AppError::invalid_data("priority must be between 1 and 5"))
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetrics {
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub estimated_time: Option<u32>,
    #[serde(default)]
    pub actual_time: Option<u32>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub completion_rate: f64,
}

impl Default for TaskMetrics {
    fn default() -> Self {
        Self {
            priority: Priority::default(),
            estimated_time: None,
            actual_time: None,
            category: default_category(),
            tags: Vec::new(),
            streak: 0,
            completion_rate: 0.0,
        }
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    pub color: String,
    pub status: TaskStatus,
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub completion_note: Option<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub metrics: TaskMetrics,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Estimate and actual minutes, when both are set.
    pub fn times(&self) -> Option<(u32, u32)> {
        self.metrics.estimated_time.zip(self.metrics.actual_time)
    }

    /// Like [`Task::times`], but a zero actual time counts as unrecorded
    /// so the pair can be used as a divisor.
    pub fn recorded_times(&self) -> Option<(u32, u32)> {
        self.times().filter(|(_, actual)| *actual > 0)
    }

    /// Completed within its estimate.
    pub fn finished_on_time(&self) -> bool {
        self.is_completed()
            && self
                .times()
                .is_some_and(|(estimated, actual)| actual <= estimated)
    }

    /// Completed strictly faster than estimated.
    pub fn finished_early(&self) -> bool {
        self.is_completed()
            && self
                .times()
                .is_some_and(|(estimated, actual)| actual < estimated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Active,
    Completed,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}
