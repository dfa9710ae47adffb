//! Key/value side channel for sharing arbitrary data between components
//!
//! The store is unrelated to the relational schema: any `'static` value can be
//! put under a string key (an imported spreadsheet, a selected tab, a cached
//! lookup) and later borrowed back by its concrete type.

use crate::error::{Result, VaultError};
use std::any::{type_name, Any};
use std::collections::HashMap;

type Payload = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ScratchStore {
    entries: HashMap<String, Payload>,
}

impl ScratchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`.
    ///
    /// With `allow_overwrite` false an existing entry is left untouched.
    /// Returns whether the value was stored.
    pub fn put<T>(&mut self, key: impl Into<String>, value: T, allow_overwrite: bool) -> bool
    where
        T: Any + Send + Sync,
    {
        self.put_boxed(key, Box::new(value), allow_overwrite)
    }

    pub(crate) fn put_boxed(
        &mut self,
        key: impl Into<String>,
        value: Payload,
        allow_overwrite: bool,
    ) -> bool {
        let key = key.into();
        if !allow_overwrite && self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value);
        true
    }

    /// Borrow the value stored under `key`
    pub fn get<T: Any>(&self, key: &str) -> Result<&T> {
        self.entries
            .get(key)
            .ok_or_else(|| VaultError::MissingDataKey(key.to_string()))?
            .downcast_ref::<T>()
            .ok_or_else(|| mismatch::<T>(key))
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Result<&mut T> {
        self.entries
            .get_mut(key)
            .ok_or_else(|| VaultError::MissingDataKey(key.to_string()))?
            .downcast_mut::<T>()
            .ok_or_else(|| mismatch::<T>(key))
    }

    /// Take the value out of the store.
    ///
    /// On a type mismatch the entry stays in place.
    pub fn remove<T: Any>(&mut self, key: &str) -> Result<T> {
        match self.entries.get(key) {
            None => return Err(VaultError::MissingDataKey(key.to_string())),
            Some(value) if !value.is::<T>() => return Err(mismatch::<T>(key)),
            Some(_) => {}
        }
        self.entries
            .remove(key)
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
            .ok_or_else(|| VaultError::MissingDataKey(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn mismatch<T>(key: &str) -> VaultError {
    VaultError::DataTypeMismatch {
        key: key.to_string(),
        expected: type_name::<T>(),
    }
}

impl std::fmt::Debug for ScratchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("ScratchStore").field("keys", &keys).finish()
    }
}
