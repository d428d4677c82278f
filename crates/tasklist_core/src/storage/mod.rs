use crate::error::AppError;

mod adapter;
pub mod file_store;
pub mod memory_store;

pub use adapter::{Storage, TASKS_KEY, THEME_KEY};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// Origin-scoped string key-value storage that survives restarts.
///
/// Every `set` fully replaces the previous value. Keys are independent:
/// there is no transaction spanning two keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}
