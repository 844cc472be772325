use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracker_core::achievements::Achievement;
use tracker_core::error::AppError;
use tracker_core::metrics::TaskSummary;
use tracker_core::model::Task;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Priority")]
    priority: u8,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Color")]
    color: String,
}

#[derive(Tabled)]
struct AchievementRow {
    #[tabled(rename = "Achievement")]
    title: &'static str,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Unlocked")]
    unlocked_at: String,
    #[tabled(rename = "Goal")]
    description: &'static str,
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Completed")]
    completed: usize,
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub fn render_tasks(tasks: &[Task], selected_task_id: Option<&str>) -> String {
    if tasks.is_empty() {
        return "No tasks".to_string();
    }

    let rows = tasks.iter().map(|task| TaskRow {
        marker: if selected_task_id == Some(task.id.as_str()) {
            "*"
        } else {
            ""
        },
        id: task.id.clone(),
        title: task.title.clone(),
        status: task.status.label(),
        priority: task.metrics.priority.level(),
        category: task.metrics.category.clone(),
        start: task.start_date.clone(),
        end: task.end_date.clone().unwrap_or_else(|| "-".to_string()),
        color: task.color.clone(),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

pub fn render_task_detail(task: &Task) -> String {
    let mut lines = vec![
        format!("{} ({})", task.title, task.id),
        format!("status: {}", task.status.label()),
        format!("created: {}", task.created_at),
        format!(
            "dates: {} -> {}",
            task.start_date,
            task.end_date.as_deref().unwrap_or("-")
        ),
        format!("color: {}", task.color),
        format!(
            "priority: {} | category: {} | tags: {}",
            task.metrics.priority.level(),
            task.metrics.category,
            if task.metrics.tags.is_empty() {
                "-".to_string()
            } else {
                task.metrics.tags.join(", ")
            }
        ),
        format!(
            "time: estimated {} min, actual {} min",
            minutes(task.metrics.estimated_time),
            minutes(task.metrics.actual_time)
        ),
    ];

    if !task.description.is_empty() {
        lines.push(format!("description: {}", task.description));
    }
    if let Some(completed_at) = task.completed_at.as_deref() {
        lines.push(format!("completed: {}", completed_at));
    }
    if let Some(note) = task.completion_note.as_deref() {
        lines.push(format!("completion note: {}", note));
    }

    if !task.notes.is_empty() {
        lines.push("notes:".to_string());
        for note in &task.notes {
            lines.push(format!("  [{}] {}", note.timestamp, note.text));
        }
    }

    lines.push("history:".to_string());
    for entry in &task.history {
        let action = serde_json::to_value(entry.action)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();
        lines.push(format!("  {} {}", entry.timestamp, action));
    }

    lines.join("\n")
}

pub fn render_summary(summary: &TaskSummary) -> String {
    let mut lines = vec![
        format!(
            "tasks: {} total, {} completed, {} active",
            summary.total, summary.completed, summary.active
        ),
        format!("completion rate: {:.0}%", summary.completion_rate),
        format!("on-time completions: {:.0}%", summary.time_efficiency),
        format!("productivity score: {}", summary.productivity_score),
        format!("average per day (7d): {:.1}", summary.daily_average),
        format!("time accuracy: {:.0}%", summary.average_time_accuracy),
        format!(
            "streak: {} day(s), best {}",
            summary.current_streak, summary.best_streak
        ),
    ];

    let days = summary.completion_trend.iter().map(|day| DayRow {
        day: tracker_core::clock::format_date(day.date),
        completed: day.completed,
    });
    let mut trend = Table::new(days);
    trend.with(Style::psql());
    lines.push(trend.to_string());

    let categories: Vec<String> = summary
        .categories
        .iter()
        .map(|(category, count)| format!("{category}: {count}"))
        .collect();
    lines.push(format!("categories: {}", categories.join(", ")));

    let priorities: Vec<String> = summary
        .priorities
        .iter()
        .map(|(level, count)| format!("P{level}: {count}"))
        .collect();
    lines.push(format!("priorities: {}", priorities.join(", ")));

    lines.join("\n")
}

pub fn render_achievements(achievements: &[Achievement]) -> String {
    let rows = achievements.iter().map(|achievement| AchievementRow {
        title: achievement.title,
        progress: format!("{}%", achievement.progress),
        unlocked_at: achievement
            .unlocked_at
            .clone()
            .unwrap_or_else(|| "-".to_string()),
        description: achievement.description,
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

fn minutes(value: Option<u32>) -> String {
    value
        .map(|minutes| minutes.to_string())
        .unwrap_or_else(|| "-".to_string())
}
