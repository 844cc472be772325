use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use tracing_subscriber::EnvFilter;
use tracker_cli::cli::{Cli, Command, ConfigOverrideTarget, parse_config_override};
use tracker_cli::output::{
    print_json, render_achievements, render_summary, render_task_detail, render_tasks,
};
use tracker_core::clock::{format_date, parse_date};
use tracker_core::config::{
    Config, ConfigOverrides, canonical_color, load_config_with_fallback, merge_overrides,
};
use tracker_core::error::AppError;
use tracker_core::filter::FilterPatch;
use tracker_core::model::{MetricsPatch, Priority, Task, TaskUpdate};
use tracker_core::session::TaskSession;
use tracker_core::storage::store_from_env;

const LOG_ENV_VAR: &str = "TRACKER_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        eprintln!("WARNING: using default config ({err})");
    }

    let mut overrides = ConfigOverrides::default();
    for raw in &cli.config_override {
        let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Color => {
                let color = canonical_color(&parsed.value).ok_or_else(|| {
                    AppError::invalid_input(format!("unknown color '{}'", parsed.value))
                })?;
                overrides.default_color = Some(color);
            }
            ConfigOverrideTarget::Category => {
                overrides.default_category = Some(parsed.value);
            }
            ConfigOverrideTarget::Priority => {
                let priority = parsed
                    .value
                    .parse::<u8>()
                    .ok()
                    .and_then(Priority::new)
                    .ok_or_else(|| AppError::invalid_input("priority must be 1-5"))?;
                overrides.default_priority = Some(priority);
            }
            ConfigOverrideTarget::EstimatedTime => {
                let minutes = parsed.value.parse::<u32>().map_err(|_| {
                    AppError::invalid_input("estimated time must be a whole number of minutes")
                })?;
                overrides.default_estimated_time = Some(minutes);
            }
        }
    }

    Ok(merge_overrides(&loaded.config, &overrides))
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed)
}

fn existing_task<'a>(session: &'a TaskSession, id: &str) -> Result<&'a Task, AppError> {
    session
        .task(required_id(id)?)
        .ok_or_else(|| AppError::invalid_input("task not found"))
}

fn normalize_date(raw: &str) -> Result<String, AppError> {
    parse_date(raw).map(format_date)
}

fn normalize_color(raw: &str) -> Result<String, AppError> {
    canonical_color(raw).ok_or_else(|| AppError::invalid_input(format!("unknown color '{raw}'")))
}

/// Trims each tag, drops empties and keeps the first occurrence of duplicates.
fn normalize_tags(raw: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let trimmed = tag.trim();
        if !trimmed.is_empty() && !tags.iter().any(|existing| existing == trimmed) {
            tags.push(trimmed.to_string());
        }
    }
    tags
}

/// Search text is matched as typed after trimming; case is folded by the filter.
fn normalize_search(raw: &str) -> String {
    raw.trim().to_string()
}

fn to_priority(level: u8) -> Result<Priority, AppError> {
    Priority::new(level).ok_or_else(|| AppError::invalid_input("priority must be 1-5"))
}

fn print_task(cli_json: bool, verb: &str, task: &Task) -> Result<(), AppError> {
    if cli_json {
        print_json(task)
    } else {
        println!("{verb} task: {} ({})", task.title, task.id);
        Ok(())
    }
}

fn run_command(session: &mut TaskSession, config: &Config, cli: Cli) -> Result<(), AppError> {
    let json = cli.json;

    match cli.command {
        Command::Add {
            title,
            description,
            start,
            end,
            color,
            priority,
            estimate,
            category,
            tags,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value.trim().to_string(),
                _ => return Err(AppError::invalid_input("title is required")),
            };

            let mut draft = config.draft(title);
            if let Some(description) = description {
                draft.description = description;
            }
            if let Some(start) = start {
                draft.start_date = Some(normalize_date(&start)?);
            }
            if let Some(end) = end {
                draft.end_date = Some(normalize_date(&end)?);
            }
            if let Some(color) = color {
                draft.color = normalize_color(&color)?;
            }
            if let Some(priority) = priority {
                draft.priority = to_priority(priority)?;
            }
            if let Some(estimate) = estimate {
                draft.estimated_time = Some(estimate);
            }
            if let Some(category) = category.filter(|value| !value.trim().is_empty()) {
                draft.category = category.trim().to_string();
            }
            draft.tags = normalize_tags(tags);

            let task = session.add_task(draft);
            print_task(json, "Added", &task)?;
        }
        Command::Edit {
            id,
            title,
            description,
            start,
            end,
            clear_end,
            color,
            priority,
            estimate,
            actual,
            category,
            tags,
        } => {
            let id = existing_task(session, &id)?.id.clone();

            let title = match title {
                Some(value) if value.trim().is_empty() => {
                    return Err(AppError::invalid_input("title is required"));
                }
                other => other.map(|value| value.trim().to_string()),
            };
            let end_date = if clear_end {
                Some(None)
            } else {
                end.map(|value| normalize_date(&value)).transpose()?.map(Some)
            };

            let metrics = MetricsPatch {
                priority: priority.map(to_priority).transpose()?,
                estimated_time: estimate.map(Some),
                actual_time: actual.map(Some),
                category: category
                    .filter(|value| !value.trim().is_empty())
                    .map(|value| value.trim().to_string()),
                tags: if tags.is_empty() {
                    None
                } else {
                    Some(normalize_tags(tags))
                },
            };
            let update = TaskUpdate {
                title,
                description,
                start_date: start.map(|value| normalize_date(&value)).transpose()?,
                end_date,
                color: color.map(|value| normalize_color(&value)).transpose()?,
                metrics: if metrics.is_empty() {
                    None
                } else {
                    Some(metrics)
                },
            };

            if update.is_empty() {
                return Err(AppError::invalid_input("nothing to update"));
            }

            let task = session
                .update_task_item(&id, &update)
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            print_task(json, "Updated", &task)?;
        }
        Command::Delete { id } => {
            let task = session
                .delete_task(required_id(&id)?)
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            print_task(json, "Deleted", &task)?;
        }
        Command::Show { id } => {
            let task = existing_task(session, &id)?;
            if json {
                print_json(task)?;
            } else {
                println!("{}", render_task_detail(task));
            }
        }
        Command::Done {
            id,
            message,
            message_flag,
            actual,
        } => {
            let task = existing_task(session, &id)?;
            if task.is_completed() {
                return Err(AppError::invalid_input("task already completed"));
            }
            let id = task.id.clone();

            if let Some(actual) = actual {
                let update = TaskUpdate {
                    metrics: Some(MetricsPatch {
                        actual_time: Some(Some(actual)),
                        ..MetricsPatch::default()
                    }),
                    ..TaskUpdate::default()
                };
                session.update_task_item(&id, &update);
            }

            let note = message_flag.or(message).unwrap_or_default();
            let task = session
                .mark_task_complete(&id, note.trim())
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            print_task(json, "Completed", &task)?;
        }
        Command::Note { id, text } => {
            let id = existing_task(session, &id)?.id.clone();
            let text = match text {
                Some(value) if !value.trim().is_empty() => value.trim().to_string(),
                _ => return Err(AppError::invalid_input("note text is required")),
            };

            let task = session
                .add_note(&id, &text)
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            print_task(json, "Noted", &task)?;
        }
        Command::List {
            search,
            status,
            from,
            to,
            color,
            category,
            priority,
            tags,
        } => {
            let tags = normalize_tags(tags);
            let patch = FilterPatch {
                search_text: search.map(|value| normalize_search(&value)),
                start_date: from.map(|value| normalize_date(&value)).transpose()?.map(Some),
                end_date: to.map(|value| normalize_date(&value)).transpose()?.map(Some),
                status: status.map(Into::into),
                color: color.map(|value| normalize_color(&value)).transpose()?.map(Some),
                category: category.map(Some),
                priority: priority.map(to_priority).transpose()?.map(Some),
                tags: if tags.is_empty() {
                    None
                } else {
                    Some(Some(tags))
                },
            };
            if !patch.is_empty() {
                session.set_filters(&patch);
            }

            if json {
                print_json(session.filtered_tasks())?;
            } else {
                println!(
                    "{}",
                    render_tasks(session.filtered_tasks(), session.selected_task_id())
                );
            }
        }
        Command::ResetFilters => {
            session.reset_filters();
            if json {
                print_json(session.filters())?;
            } else {
                println!("Filters cleared");
            }
        }
        Command::Select { id } => {
            match id {
                Some(id) => {
                    let id = existing_task(session, &id)?.id.clone();
                    session.select_task(Some(id.as_str()));
                }
                None => session.select_task(None),
            }

            if json {
                print_json(&serde_json::json!({ "selectedTaskId": session.selected_task_id() }))?;
            } else {
                match session.selected_task() {
                    Some(task) => println!("Selected task: {} ({})", task.title, task.id),
                    None => println!("Selection cleared"),
                }
            }
        }
        Command::Stats => {
            let summary = session.summary();
            if json {
                print_json(&summary)?;
            } else {
                println!("{}", render_summary(&summary));
            }
        }
        Command::Achievements => {
            let achievements = session.achievements();
            if json {
                print_json(&achievements)?;
            } else {
                println!("{}", render_achievements(&achievements));
            }
        }
    }

    Ok(())
}

fn parse_and_run(session: &mut TaskSession, argv: Vec<String>) -> Result<(), AppError> {
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(normalize_parse_error(err)),
    };
    tracing::debug!("dispatching {:?}", cli.command);
    let config = resolve_config(&cli)?;
    run_command(session, &config, cli)
}

fn run_interactive(session: &mut TaskSession) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tracker".to_string());
        argv.extend(args);

        if let Err(err) = parse_and_run(session, argv) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn open_session() -> Result<TaskSession, AppError> {
    let store = store_from_env()?;
    Ok(TaskSession::open(store))
}

fn main() {
    init_logging();

    let mut session = match open_session() {
        Ok(session) => session,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    let argv: Vec<String> = std::env::args().collect();
    if argv.len() < 2 {
        if let Err(err) = run_interactive(&mut session) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    if let Err(err) = parse_and_run(&mut session, argv) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
