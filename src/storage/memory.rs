//! In-memory storage
//!
//! Nothing here survives a restart.

use std::cell::RefCell;

use crate::error::Result;

use super::{Mapping, Storage};

/// Process-memory storage for sequential use
///
/// The map sits in a `RefCell`, which makes the type `!Sync`: it can move to
/// another thread but never be shared by two at once.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RefCell<Mapping>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> String {
        self.data.borrow().get(key).cloned().unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.data.borrow().contains_key(key)
    }

    fn len(&self) -> usize {
        self.data.borrow().len()
    }
}
