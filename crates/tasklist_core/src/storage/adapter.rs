use crate::error::AppError;
use crate::model::Task;
use crate::storage::KeyValueStore;

pub const TASKS_KEY: &str = "todoList";
pub const THEME_KEY: &str = "theme";

/// Reads and writes the task collection and the theme flag.
pub struct Storage {
    store: Box<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the persisted collection.
    ///
    /// A missing value, a read failure or malformed JSON all yield an empty
    /// collection; the cause is only logged.
    pub fn load(&self) -> Vec<Task> {
        let content = match self.store.get(TASKS_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(err) => {
                log::warn!("could not read {TASKS_KEY}: {err}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Task>>(&content) {
            Ok(tasks) => {
                log::debug!("loaded {} tasks", tasks.len());
                tasks
            }
            Err(err) => {
                log::warn!("ignoring malformed {TASKS_KEY}: {err}");
                Vec::new()
            }
        }
    }

    /// Writes the whole collection, replacing whatever was stored.
    pub fn save(&self, tasks: &[Task]) -> Result<(), AppError> {
        let content = serde_json::to_string(tasks)?;
        self.store.set(TASKS_KEY, &content)?;
        log::debug!("saved {} tasks", tasks.len());
        Ok(())
    }

    /// Dark mode is on only when the stored value is exactly `"true"`.
    pub fn load_theme_flag(&self) -> bool {
        match self.store.get(THEME_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                log::warn!("could not read {THEME_KEY}: {err}");
                false
            }
        }
    }

    pub fn save_theme_flag(&self, dark: bool) -> Result<(), AppError> {
        self.store.set(THEME_KEY, &dark.to_string())
    }
}
