use clap::{CommandFactory, Parser};
use std::io;
use tasklist_cli::app::App;
use tasklist_cli::cli::{Cli, collect_overrides};
use tasklist_core::clock::{SystemClock, local_offset};
use tasklist_core::config::{Config, load_config_with_fallback, merge_overrides};
use tasklist_core::error::AppError;
use tasklist_core::session::Session;
use tasklist_core::storage::file_store::store_dir;
use tasklist_core::storage::{FileStore, Storage};

const LOG_ENV_VAR: &str = "TASKLIST_LOG";

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

fn init_logging(config: &Config) {
    env_logger::Builder::new()
        .parse_filters(config.log_level())
        .parse_env(LOG_ENV_VAR)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    let overrides = collect_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    let config = merge_overrides(&loaded.config, &overrides);

    init_logging(&config);
    if let Some(err) = loaded.error {
        log::warn!("using default configuration: {err}");
    }

    Ok(config)
}

fn open_app(config: &Config) -> Result<App, AppError> {
    let dir = store_dir(config.store_dir.as_deref())?;
    log::debug!("using store directory {}", dir.display());
    let storage = Storage::new(Box::new(FileStore::new(dir)));
    let session = Session::open(storage, Box::new(SystemClock));
    Ok(App::new(session, local_offset()))
}

fn run_interactive(app: &mut App) -> Result<(), AppError> {
    let mut input = String::new();

    loop {
        input.clear();
        // Not holding the stdin lock: delete confirmations read from it too.
        let bytes = io::stdin().read_line(&mut input)?;

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

        if line.eq_ignore_ascii_case("escape") || line.eq_ignore_ascii_case("esc") {
            if app.escape() {
                println!("Edit cancelled");
            }
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
        argv.push("tasklist".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if !cli.config_override.is_empty() {
            eprintln!(
                "ERROR: {}",
                AppError::invalid_input("--config-override only applies at startup")
            );
            continue;
        }

        let Some(command) = cli.command else {
            print_help();
            continue;
        };

        if let Err(err) = app.run(command, cli.json) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli)?;
    let mut app = open_app(&config)?;

    match cli.command {
        Some(command) => app.run(command, cli.json),
        None => run_interactive(&mut app),
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
