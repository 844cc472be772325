//! Achievements are recomputed from the collection on every evaluation;
//! no unlock state is stored.

use crate::clock::parse_timestamp;
use crate::metrics::{completed_count, current_streak};
use crate::model::Task;
use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

pub const TASK_MASTER_TARGET: usize = 10;
pub const STREAK_WARRIOR_TARGET: u32 = 5;
const CATEGORY_MASTER_PROGRESS: u32 = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Percent towards the target. `streak_warrior` keeps counting past 100.
    pub progress: u32,
    pub target: u32,
    pub unlocked_at: Option<String>,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

pub fn evaluate_achievements(tasks: &[Task], today: Date, offset: UtcOffset) -> Vec<Achievement> {
    vec![
        first_task(tasks),
        task_master(tasks),
        streak_warrior(tasks, today, offset),
        efficiency_expert(tasks),
        category_master(),
    ]
}

fn first_task(tasks: &[Task]) -> Achievement {
    let unlocked_at = earliest(tasks.iter().map(|task| task.created_at.as_str()))
        .or_else(|| tasks.first().map(|task| task.created_at.clone()));

    Achievement {
        id: "first_task",
        title: "First Task",
        description: "Create your first task",
        progress: if tasks.is_empty() { 0 } else { 100 },
        target: 1,
        unlocked_at,
    }
}

fn task_master(tasks: &[Task]) -> Achievement {
    let completed = completed_count(tasks);
    let unlocked_at = if completed >= TASK_MASTER_TARGET {
        // The completion that reached the target; falls back to the latest
        // one when timestamps are unreadable.
        let ordered = ordered_completions(tasks);
        ordered
            .get(TASK_MASTER_TARGET - 1)
            .or(ordered.last())
            .map(|(_, completed_at)| completed_at.to_string())
    } else {
        None
    };

    Achievement {
        id: "task_master",
        title: "Task Master",
        description: "Complete 10 tasks",
        progress: (completed.saturating_mul(10)).min(100) as u32,
        target: TASK_MASTER_TARGET as u32,
        unlocked_at,
    }
}

fn streak_warrior(tasks: &[Task], today: Date, offset: UtcOffset) -> Achievement {
    let streak = current_streak(tasks, today, offset);
    // Approximated by the latest completion, which sits on the streak's
    // most recent day.
    let unlocked_at = if streak >= STREAK_WARRIOR_TARGET {
        ordered_completions(tasks)
            .last()
            .map(|(_, completed_at)| completed_at.to_string())
    } else {
        None
    };

    Achievement {
        id: "streak_warrior",
        title: "Streak Warrior",
        description: "Complete tasks 5 days in a row",
        progress: streak.saturating_mul(100) / STREAK_WARRIOR_TARGET,
        target: STREAK_WARRIOR_TARGET,
        unlocked_at,
    }
}

fn efficiency_expert(tasks: &[Task]) -> Achievement {
    let early: Vec<&Task> = tasks.iter().filter(|task| task.finished_early()).collect();
    let unlocked_at = earliest(
        early
            .iter()
            .filter_map(|task| task.completed_at.as_deref()),
    )
    .or_else(|| early.first().and_then(|task| task.completed_at.clone()));

    Achievement {
        id: "efficiency_expert",
        title: "Efficiency Expert",
        description: "Finish a task faster than estimated",
        progress: if early.is_empty() { 0 } else { 100 },
        target: 1,
        unlocked_at,
    }
}

fn category_master() -> Achievement {
    Achievement {
        id: "category_master",
        title: "Category Master",
        description: "Complete a task in every category",
        progress: CATEGORY_MASTER_PROGRESS,
        target: 5,
        unlocked_at: None,
    }
}

// Completion timestamps in chronological order; unparseable ones are dropped.
fn ordered_completions(tasks: &[Task]) -> Vec<(OffsetDateTime, &str)> {
    let mut ordered: Vec<(OffsetDateTime, &str)> = tasks
        .iter()
        .filter(|task| task.is_completed())
        .filter_map(|task| task.completed_at.as_deref())
        .filter_map(|value| parse_timestamp(value).ok().map(|at| (at, value)))
        .collect();
    ordered.sort_by_key(|(at, _)| *at);
    ordered
}

fn earliest<'a>(timestamps: impl Iterator<Item = &'a str>) -> Option<String> {
    timestamps
        .filter_map(|value| parse_timestamp(value).ok().map(|at| (at, value)))
        .min_by_key(|(at, _)| *at)
        .map(|(_, value)| value.to_string())
}
