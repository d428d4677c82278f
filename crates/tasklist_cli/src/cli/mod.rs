use clap::{Parser, Subcommand};
use tasklist_core::config::{ConfigOverrides, canonical_log_level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Task list with deadlines, search and themes", long_about = None)]
pub struct Cli {
    /// Without a command an interactive session starts
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE); startup only
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tasklist add "Buy groceries" "Buy milk, eggs, bread and vegetables" 2025-01-01T10:00
    Add {
        title: Option<String>,
        description: Option<String>,
        deadline: Option<String>,
    },
    /// Edit an open task
    ///
    /// Without field flags the task is loaded into the form and the session
    /// stays in edit mode until `submit` or `cancel`.
    ///
    /// Example: tasklist edit 1735632000000 --title "Buy more food"
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
    },
    /// Submit the form: adds a task, or updates the one being edited
    ///
    /// Example: submit --deadline 2025-01-02T09:00
    Submit {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
    },
    /// Leave edit mode and clear the form
    Cancel,
    /// Show the form
    Form,
    /// Mark a task as completed
    ///
    /// Example: tasklist done 1735632000000
    Done {
        id: u64,
    },
    /// Delete a task after confirmation
    ///
    /// Example: tasklist delete 1735632000000 --yes
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List tasks ordered by deadline, optionally filtered
    ///
    /// Example: tasklist list groceries
    List {
        search: Option<String>,
    },
    /// Show details of a task
    ///
    /// Example: tasklist show 1735632000000
    Show {
        id: u64,
    },
    /// Show or toggle the light/dark theme
    ///
    /// Example: tasklist theme --toggle
    Theme {
        #[arg(long)]
        toggle: bool,
    },
    /// Print the current time every second
    ///
    /// Example: tasklist clock --ticks 3
    Clock {
        /// Stop after this many updates
        #[arg(long)]
        ticks: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    StoreDir,
    LogLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    match field.as_str() {
        "store_dir" | "store" => {
            if value.is_empty() {
                Err("store_dir override cannot be empty".to_string())
            } else {
                Ok(ParsedConfigOverride {
                    target: ConfigOverrideTarget::StoreDir,
                    value,
                })
            }
        }
        "log_level" | "log" => {
            let level = canonical_log_level(&value)
                .ok_or_else(|| format!("unknown log level '{value}'"))?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::LogLevel,
                value: level,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

/// Folds all `--config-override` values; later ones win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::StoreDir => overrides.store_dir = Some(parsed.value),
            ConfigOverrideTarget::LogLevel => overrides.log_level = Some(parsed.value),
        }
    }
    Ok(overrides)
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
