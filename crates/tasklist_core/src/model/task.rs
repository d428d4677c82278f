use serde::{Deserialize, Serialize};

/// A single to-do record as persisted under the `todoList` key.
///
/// Field names follow the persisted JSON layout (`createdAt`, `completedAt`).
/// `completed_at` is always written, as `null` while the task is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub deadline: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Task {
    /// A completed task only accepts deletion.
    pub fn is_editable(&self) -> bool {
        !self.completed
    }

    /// Case-insensitive substring match on title or description.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}
