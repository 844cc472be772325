use clap::{Parser, Subcommand, ValueEnum};
use tracker_core::filter::StatusFilter;

#[derive(Parser, Debug)]
#[command(name = "tracker", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tracker add "Write report" --end 2025-12-31 --priority 4 --tag work
    Add {
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Palette color name or hex
        #[arg(long)]
        color: Option<String>,
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        priority: Option<u8>,
        /// Estimated minutes
        #[arg(long)]
        estimate: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Edit task fields
    ///
    /// Example: tracker edit <id> --title "Write final report" --actual 40
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long, conflicts_with = "clear_end")]
        end: Option<String>,
        /// Remove the end date
        #[arg(long)]
        clear_end: bool,
        #[arg(long)]
        color: Option<String>,
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        priority: Option<u8>,
        #[arg(long)]
        estimate: Option<u32>,
        /// Actual minutes spent
        #[arg(long)]
        actual: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        /// Replace the tag list
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Delete a task
    ///
    /// Example: tracker delete <id>
    Delete {
        id: String,
    },
    /// Show details of a task
    ///
    /// Example: tracker show <id>
    Show {
        id: String,
    },
    /// Mark a task as completed
    ///
    /// Example: tracker done <id>
    /// Example: tracker done <id> -m "Sent to the team" --actual 25
    Done {
        id: String,
        message: Option<String>,
        #[arg(short = 'm', long = "message", value_name = "MESSAGE")]
        message_flag: Option<String>,
        /// Record actual minutes before completing
        #[arg(long)]
        actual: Option<u32>,
    },
    /// Add a note to a task
    ///
    /// Example: tracker note <id> "Waiting on numbers"
    Note {
        id: String,
        text: Option<String>,
    },
    /// List tasks matching the current filters
    ///
    /// Example: tracker list --status active --tag work
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Earliest start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Latest end date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        priority: Option<u8>,
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Clear all list filters
    ///
    /// Example: tracker reset-filters
    ResetFilters,
    /// Select a task, or clear the selection when no id is given
    ///
    /// Example: tracker select <id>
    Select {
        id: Option<String>,
    },
    /// Show completion analytics
    ///
    /// Example: tracker stats
    Stats,
    /// Show achievement progress
    ///
    /// Example: tracker achievements
    Achievements,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    All,
    Active,
    Completed,
}

impl From<StatusArg> for StatusFilter {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::All => StatusFilter::All,
            StatusArg::Active => StatusFilter::Active,
            StatusArg::Completed => StatusFilter::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Color,
    Category,
    Priority,
    EstimatedTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "default_color" | "color" => ConfigOverrideTarget::Color,
        "default_category" | "category" => ConfigOverrideTarget::Category,
        "default_priority" | "priority" => ConfigOverrideTarget::Priority,
        "default_estimated_time" | "estimated_time" | "estimate" => {
            ConfigOverrideTarget::EstimatedTime
        }
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("override value for '{field}' cannot be empty"));
    }

    Ok(ParsedConfigOverride { target, value })
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
