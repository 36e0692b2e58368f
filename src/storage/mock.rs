//! In-memory fix store for testing

use super::{FixStore, StoreValue};
use crate::platform::error::PlatformError;
use crate::platform::Result;
use heapless::{FnvIndexMap, String};

const KEY_LEN: usize = 16;
const NAMESPACE_LEN: usize = 16;
const MAX_ENTRIES: usize = 16;

/// In-memory [`FixStore`] double
///
/// Entries survive close/reopen within the same instance, which is enough
/// to simulate a restart by moving the store between manager instances.
#[derive(Debug, Default)]
pub struct MockStore {
    namespace: String<NAMESPACE_LEN>,
    entries: FnvIndexMap<String<KEY_LEN>, StoreValue, MAX_ENTRIES>,
    opened: bool,
}

impl MockStore {
    /// Create an empty, closed store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `open` has been called (for test assertions)
    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Namespace passed to the last `open` (for test assertions)
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &str) -> Option<StoreValue> {
        if !self.opened {
            return None;
        }
        let key = String::<KEY_LEN>::try_from(key).ok()?;
        self.entries.get(&key).copied()
    }

    fn put(&mut self, key: &str, value: StoreValue) -> Result<()> {
        if !self.opened {
            return Err(PlatformError::InvalidConfig);
        }
        let key = String::<KEY_LEN>::try_from(key).map_err(|_| PlatformError::InvalidConfig)?;
        self.entries
            .insert(key, value)
            .map_err(|_| PlatformError::InvalidConfig)?;
        Ok(())
    }
}

impl FixStore for MockStore {
    fn open(&mut self, namespace: &str) -> Result<()> {
        self.namespace =
            String::try_from(namespace).map_err(|_| PlatformError::InvalidConfig)?;
        self.opened = true;
        Ok(())
    }

    fn close(&mut self) {
        self.opened = false;
    }

    fn get_f64(&mut self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(StoreValue::F64(value)) => value,
            _ => default,
        }
    }

    fn get_u32(&mut self, key: &str, default: u32) -> u32 {
        match self.get(key) {
            Some(StoreValue::U32(value)) => value,
            _ => default,
        }
    }

    fn get_bool(&mut self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(StoreValue::Bool(value)) => value,
            _ => default,
        }
    }

    fn put_f64(&mut self, key: &str, value: f64) -> Result<()> {
        self.put(key, StoreValue::F64(value))
    }

    fn put_u32(&mut self, key: &str, value: u32) -> Result<()> {
        self.put(key, StoreValue::U32(value))
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.put(key, StoreValue::Bool(value))
    }
}
