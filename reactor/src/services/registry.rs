//! Container-side runner registry
//!
//! Maps an instantiation instruction (the plain `"Type;method"` pair) to an
//! executable test body. This is the piece that reconstructs an invocable
//! unit from the instruction a container receives.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use shared::{BoxedFailure, TestInstantiationInstruction};

/// Executable test body; arguments are the address's bound parameters
pub type TestFn = dyn Fn(&[String]) -> Result<(), BoxedFailure> + Send + Sync;

#[derive(Default)]
pub struct RunnerRegistry {
    runners: RwLock<HashMap<TestInstantiationInstruction, Arc<TestFn>>>,
}

impl RunnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the body executed for `Type::method`; re-registering
    /// replaces the previous body
    pub fn register<F>(&self, type_name: &str, method_name: &str, body: F)
    where
        F: Fn(&[String]) -> Result<(), BoxedFailure> + Send + Sync + 'static,
    {
        let instruction = TestInstantiationInstruction::new(type_name, method_name);
        self.runners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(instruction, Arc::new(body));
    }

    /// Reconstruct the executable unit for an instruction
    pub fn resolve(&self, instruction: &TestInstantiationInstruction) -> Option<Arc<TestFn>> {
        self.runners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(instruction)
            .cloned()
    }

    pub fn contains(&self, instruction: &TestInstantiationInstruction) -> bool {
        self.runners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(instruction)
    }

    pub fn len(&self) -> usize {
        self.runners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
