use crate::clock::Clock;
use crate::error::AppError;
use crate::model::{Task, Theme};
use crate::storage::Storage;
use crate::task_store::TaskStore;
use crate::validation::{FieldErrors, validate};
use crate::view::{self, FormView, ViewModel};
use time::UtcOffset;

pub const DELETE_PROMPT: &str = "Apakah Anda yakin ingin menghapus tugas ini?";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Idle,
    Editing(u64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub title: String,
    pub description: String,
    pub deadline: String,
}

impl FormFields {
    pub fn new<T, D, L>(title: T, description: D, deadline: L) -> Self
    where
        T: Into<String>,
        D: Into<String>,
        L: Into<String>,
    {
        Self {
            title: title.into(),
            description: description.into(),
            deadline: deadline.into(),
        }
    }

    fn from_task(task: &Task) -> Self {
        Self::new(&task.title, &task.description, &task.deadline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Interactive yes/no question asked before a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Task),
    Updated(Task),
    /// The edited task disappeared or was completed meanwhile.
    UpdateSkipped(u64),
    Invalid(FieldErrors),
}

/// One user session: the task store plus form, edit-mode, search and theme
/// state.
pub struct Session {
    store: TaskStore,
    mode: EditMode,
    form: FormFields,
    errors: FieldErrors,
    search: String,
    theme: Theme,
}

impl Session {
    pub fn open(storage: Storage, clock: Box<dyn Clock>) -> Self {
        Self::from_store(TaskStore::open(storage, clock))
    }

    pub fn from_store(store: TaskStore) -> Self {
        let theme = Theme::from_dark_flag(store.storage().load_theme_flag());
        Self {
            store,
            mode: EditMode::Idle,
            form: FormFields::default(),
            errors: FieldErrors::default(),
            search: String::new(),
            theme,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn form(&self) -> &FormFields {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormFields {
        &mut self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search<S: Into<String>>(&mut self, term: S) {
        self.search = term.into();
    }

    /// Enters edit mode for an open task and fills the form from it.
    ///
    /// Missing or completed tasks leave the session untouched.
    pub fn start_edit(&mut self, id: u64) -> bool {
        let Some(task) = self.store.get(id).filter(|task| task.is_editable()) else {
            log::debug!("refusing to edit task {id}");
            return false;
        };

        self.form = FormFields::from_task(task);
        self.errors = FieldErrors::default();
        self.mode = EditMode::Editing(id);
        true
    }

    pub fn cancel_edit(&mut self) {
        self.reset_form();
    }

    /// Escape leaves edit mode; any other key is ignored.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match (key, self.mode) {
            (Key::Escape, EditMode::Editing(_)) => {
                self.reset_form();
                true
            }
            _ => false,
        }
    }

    /// Validates the form, then creates (idle) or updates (editing).
    ///
    /// Invalid input keeps the form and mode so the user can correct it.
    /// Any valid submission ends in the idle state with a cleared form.
    pub fn submit(&mut self) -> Result<SubmitOutcome, AppError> {
        let result = validate(&self.form.title, &self.form.description, &self.form.deadline);
        if !result.valid {
            self.errors = result.field_errors.clone();
            return Ok(SubmitOutcome::Invalid(result.field_errors));
        }

        let FormFields {
            title,
            description,
            deadline,
        } = &self.form;
        let outcome = match self.mode {
            EditMode::Idle => {
                SubmitOutcome::Created(self.store.create(title, description, deadline)?)
            }
            EditMode::Editing(id) => {
                if self.store.update(id, title, description, deadline)? {
                    match self.store.get(id) {
                        Some(task) => SubmitOutcome::Updated(task.clone()),
                        None => SubmitOutcome::UpdateSkipped(id),
                    }
                } else {
                    SubmitOutcome::UpdateSkipped(id)
                }
            }
        };

        self.reset_form();
        Ok(outcome)
    }

    pub fn complete(&mut self, id: u64) -> Result<bool, AppError> {
        self.store.complete(id)
    }

    /// Deletes after the user agreed to `DELETE_PROMPT`.
    ///
    /// Returns `false` when the user declined.
    pub fn delete(&mut self, id: u64, confirm: &dyn Confirm) -> Result<bool, AppError> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(false);
        }
        self.store.delete(id)?;
        Ok(true)
    }

    /// Flips the theme and persists the flag matching the new state.
    pub fn toggle_theme(&mut self) -> Result<Theme, AppError> {
        let next = self.theme.toggled();
        self.store.storage().save_theme_flag(next.is_dark())?;
        self.theme = next;
        log::debug!("theme switched to {}", next.label());
        Ok(next)
    }

    pub fn view(&self, offset: UtcOffset) -> ViewModel {
        view::project(self.store.tasks(), &self.search, self.store.now(), offset)
    }

    pub fn form_view(&self) -> FormView {
        view::project_form(self.mode, &self.form, &self.errors)
    }

    fn reset_form(&mut self) {
        self.mode = EditMode::Idle;
        self.form = FormFields::default();
        self.errors = FieldErrors::default();
    }
}

#[cfg(test)]
mod tests {
    use super::{DELETE_PROMPT, EditMode, FormFields, Key, Session, SubmitOutcome};
    use crate::clock::FixedClock;
    use crate::model::Theme;
    use crate::storage::{KeyValueStore, MemoryStore, Storage, THEME_KEY};
    use crate::validation::{DESCRIPTION_ERROR, TITLE_ERROR};
    use crate::view::{ADD_LABEL, UPDATE_LABEL};
    use std::cell::RefCell;
    use time::macros::datetime;
    use time::{Duration, UtcOffset};

    const DESCRIPTION: &str = "Buy milk, eggs, bread and vegetables for the week";

    fn open(memory: &MemoryStore, clock: &FixedClock) -> Session {
        Session::open(
            Storage::new(Box::new(memory.clone())),
            Box::new(clock.clone()),
        )
    }

    fn setup() -> (Session, MemoryStore, FixedClock) {
        let memory = MemoryStore::new();
        let clock = FixedClock::new(datetime!(2024-12-31 08:00:00 UTC));
        (open(&memory, &clock), memory, clock)
    }

    fn create(session: &mut Session, title: &str) -> u64 {
        *session.form_mut() = FormFields::new(title, DESCRIPTION, "2025-01-01T10:00");
        match session.submit().unwrap() {
            SubmitOutcome::Created(task) => task.id,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn idle_submit_creates_task() {
        let (mut session, _memory, _clock) = setup();
        *session.form_mut() = FormFields::new("Buy groceries", DESCRIPTION, "2025-01-01T10:00");

        let outcome = session.submit().unwrap();

        let SubmitOutcome::Created(task) = outcome else {
            panic!("expected created");
        };
        assert_eq!(task.title, "Buy groceries");
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
        assert_eq!(session.store().list(""), vec![task]);
        assert_eq!(session.form(), &FormFields::default());
        assert_eq!(session.mode(), EditMode::Idle);
    }

    #[test]
    fn invalid_submit_keeps_form_and_reports_fields() {
        let (mut session, _memory, _clock) = setup();
        *session.form_mut() = FormFields::new("Buy", "too short", "2025-01-01");

        let outcome = session.submit().unwrap();

        let SubmitOutcome::Invalid(errors) = outcome else {
            panic!("expected invalid");
        };
        assert_eq!(errors.title, Some(TITLE_ERROR));
        assert_eq!(errors.description, Some(DESCRIPTION_ERROR));
        assert_eq!(errors.deadline, None);
        assert_eq!(session.errors(), &errors);
        assert_eq!(session.form().title, "Buy");
        assert!(session.store().tasks().is_empty());
    }

    #[test]
    fn start_edit_fills_form_and_switches_label() {
        let (mut session, _memory, _clock) = setup();
        let id = create(&mut session, "Buy groceries");

        assert!(session.start_edit(id));

        assert_eq!(session.mode(), EditMode::Editing(id));
        assert_eq!(session.form().title, "Buy groceries");
        assert_eq!(session.form().deadline, "2025-01-01T10:00");
        assert_eq!(session.form_view().submit_label, UPDATE_LABEL);
        assert!(session.form_view().cancel_visible);
    }

    #[test]
    fn editing_submit_updates_and_returns_to_idle() {
        let (mut session, _memory, _clock) = setup();
        let id = create(&mut session, "Buy groceries");
        session.start_edit(id);
        session.form_mut().title = "Buy more food".to_string();

        let outcome = session.submit().unwrap();

        let SubmitOutcome::Updated(task) = outcome else {
            panic!("expected updated");
        };
        assert_eq!(task.id, id);
        assert_eq!(task.title, "Buy more food");
        assert_eq!(session.store().tasks().len(), 1);
        assert_eq!(session.mode(), EditMode::Idle);
        assert_eq!(session.form_view().submit_label, ADD_LABEL);
    }

    #[test]
    fn invalid_edit_stays_in_edit_mode() {
        let (mut session, _memory, _clock) = setup();
        let id = create(&mut session, "Buy groceries");
        session.start_edit(id);
        session.form_mut().title = "Buy".to_string();

        let outcome = session.submit().unwrap();

        assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
        assert_eq!(session.mode(), EditMode::Editing(id));
        assert_eq!(session.store().get(id).unwrap().title, "Buy groceries");
    }

    #[test]
    fn edit_of_task_completed_meanwhile_is_skipped() {
        let (mut session, _memory, _clock) = setup();
        let id = create(&mut session, "Buy groceries");
        session.start_edit(id);
        session.complete(id).unwrap();
        session.form_mut().title = "Changed title".to_string();

        let outcome = session.submit().unwrap();

        assert_eq!(outcome, SubmitOutcome::UpdateSkipped(id));
        assert_eq!(session.mode(), EditMode::Idle);
        assert_eq!(session.form(), &FormFields::default());
        assert_eq!(session.store().get(id).unwrap().title, "Buy groceries");
    }

    #[test]
    fn edit_of_task_deleted_meanwhile_is_skipped() {
        let (mut session, _memory, _clock) = setup();
        let id = create(&mut session, "Buy groceries");
        session.start_edit(id);
        session.delete(id, &|_: &str| true).unwrap();

        let outcome = session.submit().unwrap();

        assert_eq!(outcome, SubmitOutcome::UpdateSkipped(id));
        assert_eq!(session.mode(), EditMode::Idle);
        assert!(session.store().tasks().is_empty());
    }

    #[test]
    fn start_edit_on_completed_task_is_rejected() {
        let (mut session, _memory, _clock) = setup();
        let id = create(&mut session, "Buy groceries");
        session.complete(id).unwrap();

        assert!(!session.start_edit(id));
        assert!(!session.start_edit(id + 1));
        assert_eq!(session.mode(), EditMode::Idle);
        assert_eq!(session.form(), &FormFields::default());
    }

    #[test]
    fn cancel_and_escape_leave_edit_mode() {
        let (mut session, _memory, _clock) = setup();
        let id = create(&mut session, "Buy groceries");

        session.start_edit(id);
        session.cancel_edit();
        assert_eq!(session.mode(), EditMode::Idle);
        assert_eq!(session.form(), &FormFields::default());

        session.start_edit(id);
        assert!(!session.handle_key(Key::Other));
        assert!(session.handle_key(Key::Escape));
        assert_eq!(session.mode(), EditMode::Idle);
        assert!(!session.handle_key(Key::Escape));
    }

    #[test]
    fn escape_while_idle_keeps_draft() {
        let (mut session, _memory, _clock) = setup();
        session.form_mut().title = "Draft".to_string();

        assert!(!session.handle_key(Key::Escape));
        assert_eq!(session.form().title, "Draft");
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let (mut session, _memory, _clock) = setup();
        let id = create(&mut session, "Buy groceries");
        let prompts = RefCell::new(Vec::new());
        let decline = |prompt: &str| {
            prompts.borrow_mut().push(prompt.to_string());
            false
        };

        assert!(!session.delete(id, &decline).unwrap());
        assert_eq!(session.store().tasks().len(), 1);
        assert_eq!(prompts.borrow().as_slice(), [DELETE_PROMPT.to_string()]);

        assert!(session.delete(id, &|_: &str| true).unwrap());
        assert!(session.store().tasks().is_empty());
    }

    #[test]
    fn completing_scenario_blocks_later_updates() {
        let (mut session, _memory, clock) = setup();
        let id = create(&mut session, "Buy groceries");
        clock.advance(Duration::minutes(10));

        assert!(session.complete(id).unwrap());
        assert!(!session.complete(id).unwrap());
        let task = session.store().get(id).unwrap().clone();
        assert!(task.completed);
        assert_eq!(task.completed_at.as_deref(), Some("2024-12-31T08:10:00.000Z"));

        assert!(!session.start_edit(id));
        let view = session.view(UtcOffset::UTC);
        assert!(!view.items[0].actions.edit);
        assert!(view.items[0].actions.delete);
    }

    #[test]
    fn search_narrows_view() {
        let (mut session, _memory, _clock) = setup();
        create(&mut session, "Buy groceries");
        create(&mut session, "Call plumber");

        session.set_search("PLUMB");
        let view = session.view(UtcOffset::UTC);

        assert_eq!(session.search(), "PLUMB");
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].title, "Call plumber");
        assert!(view.items[0].is_new);
    }

    #[test]
    fn toggling_theme_twice_returns_to_light() {
        let (mut session, memory, _clock) = setup();
        assert_eq!(session.theme(), Theme::Light);

        assert_eq!(session.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(memory.get(THEME_KEY).unwrap().as_deref(), Some("true"));

        assert_eq!(session.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(memory.get(THEME_KEY).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn theme_is_restored_on_open() {
        let (mut session, memory, clock) = setup();
        session.toggle_theme().unwrap();

        let reopened = open(&memory, &clock);

        assert_eq!(reopened.theme(), Theme::Dark);
    }
}
