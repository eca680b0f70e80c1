//! Registry mapping test addresses to instantiation instructions
//!
//! Populated during registration, consulted when an address is dispatched
//! into a container. Entries are append-only for the duration of a run;
//! `clear` is reserved for the run-wide reactor reset.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use shared::{TestAddress, TestInstantiationInstruction};

use crate::error::{ReactorError, ReactorResult};

#[derive(Debug, Default)]
pub struct TestDirectory {
    entries: RwLock<HashMap<TestAddress, TestInstantiationInstruction>>,
}

impl TestDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the instruction for an address
    ///
    /// Re-adding an already-known address is a caller error; duplicate
    /// registrations are rejected rather than silently overwritten.
    pub fn add(
        &self,
        address: TestAddress,
        instruction: TestInstantiationInstruction,
    ) -> ReactorResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&address) {
            return Err(ReactorError::config(format!(
                "duplicate directory entry for {address}"
            )));
        }
        entries.insert(address, instruction);
        Ok(())
    }

    /// Resolve the instruction previously recorded for `address`
    pub fn lookup(&self, address: &TestAddress) -> ReactorResult<TestInstantiationInstruction> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(address)
            .cloned()
            .ok_or_else(|| ReactorError::DirectoryLookup {
                address: address.to_string(),
            })
    }

    /// Drop all entries; only called at run-wide reactor reset
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
