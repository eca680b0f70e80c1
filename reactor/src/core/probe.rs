//! Probe accumulation: test registrations for one container deployment unit

use shared::{ProbeId, ProvisionOption, TestAddress, TestInstantiationInstruction};
use tracing::debug;

use crate::error::{ReactorError, ReactorResult};

/// One registered test within a probe
#[derive(Clone, Debug)]
pub struct ProbeEntry {
    address: TestAddress,
    instruction: TestInstantiationInstruction,
    options: Vec<ProvisionOption>,
}

impl ProbeEntry {
    pub fn address(&self) -> &TestAddress {
        &self.address
    }

    pub fn instruction(&self) -> &TestInstantiationInstruction {
        &self.instruction
    }

    pub fn options(&self) -> &[ProvisionOption] {
        &self.options
    }
}

/// Accumulates test registrations and produces a frozen [`TestProbe`]
///
/// Every `add_test` call yields a distinct address, even for repeated
/// (type, method) pairs; registration order fixes the later target ordering.
/// Freezing happens by value (`build` consumes the builder), so a finalized
/// probe cannot be mutated.
pub struct TestProbeBuilder {
    id: ProbeId,
    entries: Vec<ProbeEntry>,
}

impl TestProbeBuilder {
    pub fn new() -> Self {
        Self {
            id: ProbeId::new(),
            entries: Vec::new(),
        }
    }

    /// Register a test method, yielding its top-level address
    pub fn add_test(&mut self, type_name: &str, method_name: &str) -> TestAddress {
        self.add_test_with_options(type_name, method_name, Vec::new())
    }

    /// Register a test method with extra provisioning instructions
    pub fn add_test_with_options(
        &mut self,
        type_name: &str,
        method_name: &str,
        options: Vec<ProvisionOption>,
    ) -> TestAddress {
        let address = TestAddress::root_address(format!("{type_name}.{method_name}"));
        debug!("registered {} in probe {}", address, self.id);
        self.entries.push(ProbeEntry {
            address: address.clone(),
            instruction: TestInstantiationInstruction::new(type_name, method_name),
            options,
        });
        address
    }

    /// Register a parameterized invocation under an already-registered root
    pub fn add_test_case(
        &mut self,
        parent: &TestAddress,
        arguments: Vec<String>,
    ) -> ReactorResult<TestAddress> {
        let root = parent.root();
        let instruction = self
            .entries
            .iter()
            .find(|entry| *entry.address() == root)
            .map(|entry| entry.instruction().clone())
            .ok_or_else(|| {
                ReactorError::config(format!("unknown parent address {root} in probe {}", self.id))
            })?;

        let address = TestAddress::child_address(&root, arguments);
        debug!("registered case {} in probe {}", address, self.id);
        self.entries.push(ProbeEntry {
            address: address.clone(),
            instruction,
            options: Vec::new(),
        });
        Ok(address)
    }

    /// Freeze the accumulated registrations into a deployable probe
    pub fn build(self) -> TestProbe {
        TestProbe {
            id: self.id,
            entries: self.entries,
        }
    }
}

impl Default for TestProbeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen deployable unit bundling the tests for one container
#[derive(Clone, Debug)]
pub struct TestProbe {
    id: ProbeId,
    entries: Vec<ProbeEntry>,
}

impl TestProbe {
    pub fn id(&self) -> &ProbeId {
        &self.id
    }

    pub fn entries(&self) -> &[ProbeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extra provisioning instructions attached at registration time
    pub fn options(&self) -> Vec<ProvisionOption> {
        self.entries
            .iter()
            .flat_map(|entry| entry.options().iter().cloned())
            .collect()
    }
}
