use crate::clock::{format_stored, parse_timestamp};
use crate::model::Task;
use crate::session::{EditMode, FormFields};
use crate::task_store::select;
use crate::validation::FieldErrors;
use time::{Duration, OffsetDateTime, UtcOffset};

pub const EMPTY_MESSAGE: &str = "Belum ada tugas. Tambahkan tugas baru!";
pub const ADD_LABEL: &str = "Tambah Tugas";
pub const UPDATE_LABEL: &str = "Update Tugas";

/// Tasks created less than this long ago carry the "new" badge.
pub const NEW_BADGE_WINDOW: Duration = Duration::hours(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actions {
    pub complete: bool,
    pub edit: bool,
    pub delete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub is_new: bool,
    pub actions: Actions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub items: Vec<TaskView>,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub fields: FormFields,
    pub errors: FieldErrors,
    pub submit_label: &'static str,
    pub cancel_visible: bool,
}

/// Display model for the task list: filtered, ordered by deadline, with
/// timestamps formatted in `offset`.
pub fn project(
    tasks: &[Task],
    search_term: &str,
    now: OffsetDateTime,
    offset: UtcOffset,
) -> ViewModel {
    let items: Vec<TaskView> = select(tasks, search_term, offset)
        .into_iter()
        .map(|task| task_view(task, now, offset))
        .collect();
    let empty_message = items.is_empty().then_some(EMPTY_MESSAGE);

    ViewModel {
        items,
        empty_message,
    }
}

pub fn project_form(mode: EditMode, fields: &FormFields, errors: &FieldErrors) -> FormView {
    let editing = matches!(mode, EditMode::Editing(_));
    FormView {
        fields: fields.clone(),
        errors: errors.clone(),
        submit_label: if editing { UPDATE_LABEL } else { ADD_LABEL },
        cancel_visible: editing,
    }
}

fn task_view(task: Task, now: OffsetDateTime, offset: UtcOffset) -> TaskView {
    let is_new = parse_timestamp(&task.created_at, offset)
        .is_some_and(|created| now - created < NEW_BADGE_WINDOW);
    let completed_at = task
        .completed_at
        .as_deref()
        .filter(|_| task.completed)
        .map(|value| format_stored(value, offset));

    TaskView {
        id: task.id,
        deadline: format_stored(&task.deadline, offset),
        completed: task.completed,
        completed_at,
        is_new,
        actions: Actions {
            complete: !task.completed,
            edit: !task.completed,
            delete: true,
        },
        title: task.title,
        description: task.description,
    }
}
