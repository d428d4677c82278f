use crate::clock::{self, Clock, local_offset};
use crate::error::AppError;
use crate::model::Task;
use crate::storage::Storage;
use std::cmp::Ordering;
use time::UtcOffset;

/// The session's task collection, written through to storage on every
/// mutation.
///
/// A mutation only replaces the in-memory collection after the write
/// succeeded, so a storage error leaves both sides unchanged.
pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Storage,
    clock: Box<dyn Clock>,
}

impl TaskStore {
    pub fn open(storage: Storage, clock: Box<dyn Clock>) -> Self {
        let tasks = storage.load();
        Self {
            tasks,
            storage,
            clock,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn now(&self) -> time::OffsetDateTime {
        self.clock.now()
    }

    /// Appends a new open task. Input must already have passed validation.
    pub fn create(
        &mut self,
        title: &str,
        description: &str,
        deadline: &str,
    ) -> Result<Task, AppError> {
        let now = self.clock.now();
        let task = Task {
            id: self.next_id(clock::unix_millis(now))?,
            title: title.to_string(),
            description: description.to_string(),
            deadline: deadline.to_string(),
            completed: false,
            created_at: clock::iso_timestamp(now)?,
            completed_at: None,
        };

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;
        log::debug!("created task {}", task.id);

        Ok(task)
    }

    /// Overwrites title, description and deadline of an open task.
    ///
    /// Returns `false` without touching anything when the task is missing or
    /// completed.
    pub fn update(
        &mut self,
        id: u64,
        title: &str,
        description: &str,
        deadline: &str,
    ) -> Result<bool, AppError> {
        let Some(index) = self.editable_index(id) else {
            log::debug!("update skipped for task {id}");
            return Ok(false);
        };

        let mut next = self.tasks.clone();
        let task = &mut next[index];
        task.title = title.to_string();
        task.description = description.to_string();
        task.deadline = deadline.to_string();
        self.commit(next)?;
        log::debug!("updated task {id}");

        Ok(true)
    }

    /// Marks an open task completed. Completing twice is a no-op.
    pub fn complete(&mut self, id: u64) -> Result<bool, AppError> {
        let Some(index) = self.editable_index(id) else {
            log::debug!("complete skipped for task {id}");
            return Ok(false);
        };

        let completed_at = clock::iso_timestamp(self.clock.now())?;
        let mut next = self.tasks.clone();
        next[index].completed = true;
        next[index].completed_at = Some(completed_at);
        self.commit(next)?;
        log::debug!("completed task {id}");

        Ok(true)
    }

    /// Removes the task if present. The collection is persisted either way.
    pub fn delete(&mut self, id: u64) -> Result<(), AppError> {
        let next: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect();
        let removed = next.len() != self.tasks.len();
        self.commit(next)?;
        if removed {
            log::debug!("deleted task {id}");
        }

        Ok(())
    }

    /// Tasks whose title or description contains `search_term`, ignoring
    /// case, ordered by deadline. An empty term matches everything.
    pub fn list(&self, search_term: &str) -> Vec<Task> {
        self.list_at(search_term, local_offset())
    }

    /// Same as [`list`](Self::list) with naive deadlines read in `offset`.
    pub fn list_at(&self, search_term: &str, offset: UtcOffset) -> Vec<Task> {
        select(&self.tasks, search_term, offset)
    }

    fn editable_index(&self, id: u64) -> Option<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id && task.is_editable())
    }

    // Millisecond ids, bumped past the newest one so rapid creation never
    // collides.
    fn next_id(&self, now_millis: i128) -> Result<u64, AppError> {
        let candidate = u64::try_from(now_millis).unwrap_or(0);
        match self.tasks.iter().map(|task| task.id).max() {
            Some(latest) if latest >= candidate => latest
                .checked_add(1)
                .ok_or_else(|| AppError::invalid_data("task ids exhausted")),
            _ => Ok(candidate),
        }
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<(), AppError> {
        self.storage.save(&next)?;
        self.tasks = next;
        Ok(())
    }
}

/// Filters `tasks` by `search_term` and orders the matches by deadline.
pub fn select(tasks: &[Task], search_term: &str, offset: UtcOffset) -> Vec<Task> {
    let needle = search_term.to_lowercase();
    let mut filtered: Vec<Task> = tasks
        .iter()
        .filter(|task| task.matches(&needle))
        .cloned()
        .collect();
    sort_by_deadline(&mut filtered, offset);
    filtered
}

// Stable; unparseable deadlines go last.
fn sort_by_deadline(tasks: &mut [Task], offset: UtcOffset) {
    tasks.sort_by_cached_key(|task| DeadlineKey(clock::parse_timestamp(&task.deadline, offset)));
}

#[derive(PartialEq, Eq)]
struct DeadlineKey(Option<time::OffsetDateTime>);

impl PartialOrd for DeadlineKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeadlineKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}
