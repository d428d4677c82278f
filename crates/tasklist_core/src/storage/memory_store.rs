use crate::error::AppError;
use crate::storage::KeyValueStore;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// In-process store. Clones share the same entries, which lets a caller keep
/// a handle after moving the store into a [`Storage`](super::Storage).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
