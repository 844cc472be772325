//! Read-only reductions over the task collection.
//!
//! Date-sensitive functions take `today` and the `UtcOffset` used to place
//! completion timestamps on calendar days.

use crate::clock::local_date_of;
use crate::model::{DEFAULT_CATEGORY, Priority, Task};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use time::{Date, Duration, UtcOffset};

pub const TREND_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCompletions {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAccuracy {
    pub task_id: String,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeAccuracy {
    pub tasks: Vec<TaskAccuracy>,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub completion_rate: f64,
    pub time_efficiency: f64,
    pub productivity_score: u32,
    pub daily_average: f64,
    pub average_time_accuracy: f64,
    pub current_streak: u32,
    pub best_streak: u32,
    pub completion_trend: Vec<DailyCompletions>,
    pub categories: BTreeMap<String, usize>,
    pub priorities: BTreeMap<u8, usize>,
}

/// Completions per day for the week ending `today`, oldest first.
pub fn completion_trend(tasks: &[Task], today: Date, offset: UtcOffset) -> Vec<DailyCompletions> {
    let dates: Vec<Date> = completion_dates(tasks, offset).collect();

    (0..TREND_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back as i64);
            DailyCompletions {
                date,
                completed: dates.iter().filter(|day| **day == date).count(),
            }
        })
        .collect()
}

pub fn average_daily_completions(trend: &[DailyCompletions]) -> f64 {
    let total: usize = trend.iter().map(|day| day.completed).sum();
    total as f64 / TREND_DAYS as f64
}

pub fn category_distribution(tasks: &[Task]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for task in tasks {
        let category = if task.metrics.category.is_empty() {
            DEFAULT_CATEGORY
        } else {
            task.metrics.category.as_str()
        };
        *counts.entry(category.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Counts per priority level; all five levels are always present.
pub fn priority_distribution(tasks: &[Task]) -> BTreeMap<u8, usize> {
    let mut counts: BTreeMap<u8, usize> = Priority::all().map(|level| (level.level(), 0)).collect();
    for task in tasks {
        *counts.entry(task.metrics.priority.level()).or_insert(0) += 1;
    }
    counts
}

/// `estimated / actual × 100` per completed task with both times recorded.
/// Tasks with a zero actual time are skipped.
pub fn time_accuracy(tasks: &[Task]) -> TimeAccuracy {
    let per_task: Vec<TaskAccuracy> = tasks
        .iter()
        .filter(|task| task.is_completed())
        .filter_map(|task| {
            task.recorded_times().map(|(estimated, actual)| TaskAccuracy {
                task_id: task.id.clone(),
                accuracy: estimated as f64 / actual as f64 * 100.0,
            })
        })
        .collect();

    let average = if per_task.is_empty() {
        0.0
    } else {
        per_task.iter().map(|entry| entry.accuracy).sum::<f64>() / per_task.len() as f64
    };

    TimeAccuracy {
        tasks: per_task,
        average,
    }
}

pub fn completion_rate(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    completed_count(tasks) as f64 * 100.0 / tasks.len() as f64
}

/// Share of completed tasks finished within their estimate. A zero actual
/// time is within any estimate.
pub fn time_efficiency(tasks: &[Task]) -> f64 {
    let completed = completed_count(tasks);
    if completed == 0 {
        return 0.0;
    }
    let on_time = tasks.iter().filter(|task| task.finished_on_time()).count();
    on_time as f64 * 100.0 / completed as f64
}

/// Mean of completion rate and time efficiency, rounded. Always in 0..=100.
pub fn productivity_score(tasks: &[Task]) -> u32 {
    let score = ((completion_rate(tasks) + time_efficiency(tasks)) / 2.0).round();
    score.clamp(0.0, 100.0) as u32
}

/// Consecutive days with a completion, walking back from `today`. A day
/// without completions ends the streak, including today itself.
pub fn current_streak(tasks: &[Task], today: Date, offset: UtcOffset) -> u32 {
    let days = completion_days(tasks, offset);
    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        match day.previous_day() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

pub fn best_streak(tasks: &[Task], offset: UtcOffset) -> u32 {
    let days = completion_days(tasks, offset);
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<Date> = None;

    for day in &days {
        run = match previous {
            Some(prev) if prev.next_day() == Some(*day) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(*day);
    }

    best
}

pub fn completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| task.is_completed()).count()
}

pub fn summarize(tasks: &[Task], today: Date, offset: UtcOffset) -> TaskSummary {
    let completed = completed_count(tasks);
    let trend = completion_trend(tasks, today, offset);

    TaskSummary {
        total: tasks.len(),
        completed,
        active: tasks.len() - completed,
        completion_rate: completion_rate(tasks),
        time_efficiency: time_efficiency(tasks),
        productivity_score: productivity_score(tasks),
        daily_average: average_daily_completions(&trend),
        average_time_accuracy: time_accuracy(tasks).average,
        current_streak: current_streak(tasks, today, offset),
        best_streak: best_streak(tasks, offset),
        completion_trend: trend,
        categories: category_distribution(tasks),
        priorities: priority_distribution(tasks),
    }
}

// Tasks with a missing or unparseable `completed_at` are skipped.
fn completion_dates(tasks: &[Task], offset: UtcOffset) -> impl Iterator<Item = Date> + '_ {
    tasks
        .iter()
        .filter_map(|task| task.completed_at.as_deref())
        .filter_map(move |completed_at| local_date_of(completed_at, offset))
}

fn completion_days(tasks: &[Task], offset: UtcOffset) -> BTreeSet<Date> {
    completion_dates(tasks, offset).collect()
}

mod iso_date {
    use crate::clock::format_date;
    use serde::Serializer;
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date(*date))
    }
}
