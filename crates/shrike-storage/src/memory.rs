use crate::{DeviceStore, Result, StorageError};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory store for tests and environments without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail, for exercising degraded
    /// storage paths.
    pub fn fail_operations(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    fn check_available(&self) -> Result<()> {
        if *self.fail.lock().unwrap() {
            Err(StorageError::Unavailable {
                message: "simulated storage failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl DeviceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}
