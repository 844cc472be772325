pub mod task;
pub mod update;

pub use task::{
    COLOR_PALETTE, DEFAULT_CATEGORY, DEFAULT_COLOR, DEFAULT_ESTIMATED_TIME, HistoryAction,
    HistoryEntry, Note, Priority, Task, TaskMetrics, TaskStatus,
};
pub use update::{MetricsPatch, TaskDraft, TaskUpdate};
