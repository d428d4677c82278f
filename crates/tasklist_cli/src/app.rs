use crate::cli::Command;
use crate::render::{palette_for_theme, render_form, render_list, render_task};
use std::io::{self, Write};
use std::time::Duration;
use tasklist_core::clock::{Clock, SystemClock, format_long};
use tasklist_core::error::AppError;
use tasklist_core::model::Task;
use tasklist_core::session::{Confirm, EditMode, Key, Session, SubmitOutcome};
use tasklist_core::validation::FieldErrors;
use tasklist_core::view;
use time::UtcOffset;

const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// Asks on stdout and reads the answer from stdin. Anything but yes declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(
                answer.trim().to_ascii_lowercase().as_str(),
                "y" | "yes" | "ya"
            ),
        }
    }
}

pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// A session plus the presentation settings it is rendered with.
pub struct App {
    session: Session,
    offset: UtcOffset,
}

impl App {
    pub fn new(session: Session, offset: UtcOffset) -> Self {
        Self { session, offset }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handles the cancel key of the interactive prompt.
    pub fn escape(&mut self) -> bool {
        self.session.handle_key(Key::Escape)
    }

    pub fn run(&mut self, command: Command, json: bool) -> Result<(), AppError> {
        match command {
            Command::Add {
                title,
                description,
                deadline,
            } => {
                if let EditMode::Editing(_) = self.session.mode() {
                    return Err(AppError::invalid_input(
                        "finish or cancel the current edit first",
                    ));
                }
                let form = self.session.form_mut();
                form.title = title.unwrap_or_default();
                form.description = description.unwrap_or_default();
                form.deadline = deadline.unwrap_or_default();
                self.submit(json)
            }
            Command::Edit {
                id,
                title,
                description,
                deadline,
            } => {
                if !self.session.start_edit(id) {
                    return Err(AppError::invalid_input(format!(
                        "task {id} not found or already completed"
                    )));
                }

                if title.is_none() && description.is_none() && deadline.is_none() {
                    self.print_form(json);
                    return Ok(());
                }

                self.apply_fields(title, description, deadline);
                self.submit(json)
            }
            Command::Submit {
                title,
                description,
                deadline,
            } => {
                self.apply_fields(title, description, deadline);
                self.submit(json)
            }
            Command::Cancel => {
                self.session.cancel_edit();
                if !json {
                    println!("Edit cancelled");
                }
                Ok(())
            }
            Command::Form => {
                self.print_form(json);
                Ok(())
            }
            Command::Done { id } => {
                if !self.session.complete(id)? {
                    return Err(AppError::invalid_input(format!(
                        "task {id} not found or already completed"
                    )));
                }
                let task = self.task(id)?;
                if json {
                    print_task_json(&task)?;
                } else {
                    println!("Completed task: {} ({})", task.title, task.id);
                }
                Ok(())
            }
            Command::Delete { id, yes } => {
                let deleted = if yes {
                    self.session.delete(id, &AutoConfirm)?
                } else {
                    self.session.delete(id, &StdinConfirm)?
                };
                if json {
                    println!("{}", serde_json::json!({ "id": id, "deleted": deleted }));
                } else if deleted {
                    println!("Deleted task: {id}");
                } else {
                    println!("Delete cancelled");
                }
                Ok(())
            }
            Command::List { search } => {
                self.session.set_search(search.unwrap_or_default());
                if json {
                    let tasks = self.session.store().list_at(self.session.search(), self.offset);
                    println!("{}", serde_json::to_string(&tasks)?);
                } else {
                    let view = self.session.view(self.offset);
                    let palette = palette_for_theme(self.session.theme());
                    println!("{}", render_list(&view, &palette));
                }
                Ok(())
            }
            Command::Show { id } => {
                if json {
                    return print_task_json(&self.task(id)?);
                }
                let store = self.session.store();
                let view = view::project(store.tasks(), "", store.now(), self.offset);
                let item = view
                    .items
                    .iter()
                    .find(|item| item.id == id)
                    .ok_or_else(|| AppError::invalid_input("task not found"))?;
                let palette = palette_for_theme(self.session.theme());
                println!("{}", render_task(item, &palette));
                Ok(())
            }
            Command::Theme { toggle } => {
                let theme = if toggle {
                    self.session.toggle_theme()?
                } else {
                    self.session.theme()
                };
                if json {
                    println!("{}", serde_json::json!({ "dark": theme.is_dark() }));
                } else {
                    println!("Theme: {}", theme.label());
                }
                Ok(())
            }
            Command::Clock { ticks } => {
                run_clock(&SystemClock, self.offset, ticks);
                Ok(())
            }
        }
    }

    fn apply_fields(
        &mut self,
        title: Option<String>,
        description: Option<String>,
        deadline: Option<String>,
    ) {
        let form = self.session.form_mut();
        if let Some(title) = title {
            form.title = title;
        }
        if let Some(description) = description {
            form.description = description;
        }
        if let Some(deadline) = deadline {
            form.deadline = deadline;
        }
    }

    fn submit(&mut self, json: bool) -> Result<(), AppError> {
        match self.session.submit()? {
            SubmitOutcome::Created(task) => {
                if json {
                    print_task_json(&task)?;
                } else {
                    println!("Added task: {} ({})", task.title, task.id);
                }
                Ok(())
            }
            SubmitOutcome::Updated(task) => {
                if json {
                    print_task_json(&task)?;
                } else {
                    println!("Updated task: {} ({})", task.title, task.id);
                }
                Ok(())
            }
            SubmitOutcome::UpdateSkipped(id) => {
                if json {
                    println!("{}", serde_json::json!({ "id": id, "updated": false }));
                } else {
                    println!("Task {id} is no longer editable; form cleared");
                }
                Ok(())
            }
            SubmitOutcome::Invalid(errors) => Err(validation_error(&errors)),
        }
    }

    fn print_form(&self, json: bool) {
        let form = self.session.form_view();
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "editing": form.cancel_visible,
                    "title": form.fields.title,
                    "description": form.fields.description,
                    "deadline": form.fields.deadline,
                })
            );
        } else {
            let palette = palette_for_theme(self.session.theme());
            println!("{}", render_form(&form, &palette));
        }
    }

    fn task(&self, id: u64) -> Result<Task, AppError> {
        self.session
            .store()
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::invalid_input("task not found"))
    }
}

pub fn validation_error(errors: &FieldErrors) -> AppError {
    let message = errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ");
    AppError::invalid_input(message)
}

fn print_task_json(task: &Task) -> Result<(), AppError> {
    println!("{}", serde_json::to_string(task)?);
    Ok(())
}

/// Prints the formatted time once per second. Runs forever without `ticks`.
pub fn run_clock(clock: &dyn Clock, offset: UtcOffset, ticks: Option<u64>) {
    let mut printed = 0u64;
    loop {
        let now = clock.now();
        println!("{}", format_long(now, offset).unwrap_or_else(|| now.to_string()));
        printed += 1;
        if ticks.is_some_and(|limit| printed >= limit) {
            break;
        }
        std::thread::sleep(CLOCK_INTERVAL);
    }
}
