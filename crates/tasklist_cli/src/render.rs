use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasklist_core::model::Theme;
use tasklist_core::view::{FormView, TaskView, ViewModel};

const CANCEL_LABEL: &str = "Batal";

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}

/// Light output is plain; dark output uses ANSI colours for emphasis.
pub fn palette_for_theme(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        Theme::Light => Palette {
            accent: "",
            muted: "",
            reset: "",
        },
    }
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Judul")]
    title: String,
    #[tabled(rename = "Deskripsi")]
    description: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Aksi")]
    actions: String,
}

impl TaskRow {
    fn from_view(item: &TaskView) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            deadline: item.deadline.clone(),
            status: status_label(item),
            actions: actions_label(item),
        }
    }
}

fn status_label(item: &TaskView) -> String {
    match (item.completed_at.as_deref(), item.is_new) {
        (Some(at), _) => format!("Selesai pada: {at}"),
        (None, true) => "baru".to_string(),
        (None, false) => "-".to_string(),
    }
}

fn actions_label(item: &TaskView) -> String {
    let mut actions = Vec::new();
    if item.actions.complete {
        actions.push("done");
    }
    if item.actions.edit {
        actions.push("edit");
    }
    if item.actions.delete {
        actions.push("delete");
    }
    actions.join(" ")
}

pub fn render_list(view: &ViewModel, palette: &Palette) -> String {
    if let Some(message) = view.empty_message {
        return palette.mutedize(message);
    }

    let rows: Vec<TaskRow> = view.items.iter().map(TaskRow::from_view).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());

    // Escape codes must stay out of the width calculation. Line 1 is the header.
    table
        .to_string()
        .lines()
        .enumerate()
        .map(|(index, line)| {
            if index == 1 {
                palette.accentize(line)
            } else {
                palette.mutedize(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_task(item: &TaskView, palette: &Palette) -> String {
    let mut lines = vec![
        palette.accentize(&item.title),
        item.description.clone(),
        format!("Deadline: {}", item.deadline),
    ];
    if let Some(at) = item.completed_at.as_deref() {
        lines.push(format!("Selesai pada: {at}"));
    }
    if item.is_new {
        lines.push(palette.mutedize("baru"));
    }
    lines.push(format!("ID: {} | aksi: {}", item.id, actions_label(item)));
    lines.join("\n")
}

pub fn render_form(form: &FormView, palette: &Palette) -> String {
    let field = |name: &str, value: &str, error: Option<&str>| {
        let mut line = format!("{name}: {value}");
        if let Some(error) = error {
            line.push_str(&format!("  ({})", palette.accentize(error)));
        }
        line
    };

    let mut lines = vec![
        field("Judul", &form.fields.title, form.errors.title),
        field("Deskripsi", &form.fields.description, form.errors.description),
        field("Deadline", &form.fields.deadline, form.errors.deadline),
    ];
    let mut buttons = format!("[{}]", form.submit_label);
    if form.cancel_visible {
        buttons.push_str(&format!(" [{CANCEL_LABEL}]"));
    }
    lines.push(buttons);
    lines.join("\n")
}
