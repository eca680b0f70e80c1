//! Common test utilities and fixtures
//!
//! Drives the same flow a runner integration would: prepare a reactor for a
//! class, register methods into a probe (populating the directory and the
//! method correlation map alongside), then stage.

#![allow(dead_code)]

use std::sync::Arc;

use reactor::{
    EmbeddedContainerFactory, PrepareOutcome, ReactorManager, ReactorResult, RunnerRegistry,
    StagedExamReactor, StagingStrategy,
};
use shared::{TestAddress, TestClassDescriptor, TestFailure, TestInstantiationInstruction,
    TransportFault};

pub const SAMPLE_CLASS: &str = "regression::Sample";

/// Stand-in for a runner framework's own method descriptor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
}

impl MethodDescriptor {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Registry with the regression sample: `test_alpha` passes, `test_beta`
/// fails with "boom" wrapped once in a transport fault inside the container
pub fn sample_registry() -> Arc<RunnerRegistry> {
    let registry = Arc::new(RunnerRegistry::new());
    registry.register(SAMPLE_CLASS, "test_alpha", |_| Ok(()));
    registry.register(SAMPLE_CLASS, "test_beta", |_| {
        Err(TransportFault::boxed(Box::new(TestFailure::new("boom"))))
    });
    registry
}

/// Register a passing test body for any (class, method) pair
pub fn register_passing(registry: &RunnerRegistry, class_name: &str, method: &str) {
    registry.register(class_name, method, |_| Ok(()));
}

pub fn manager(
    strategy: StagingStrategy,
    registry: Arc<RunnerRegistry>,
) -> ReactorManager<MethodDescriptor> {
    shared::logging::init("info");
    ReactorManager::new(strategy, Arc::new(EmbeddedContainerFactory::new(registry)))
}

/// Prepare, register `methods` on `class_name`, and stage
pub async fn stage_class(
    manager: &ReactorManager<MethodDescriptor>,
    class_name: &str,
    methods: &[&str],
) -> ReactorResult<Arc<StagedExamReactor>> {
    let class = TestClassDescriptor::new(class_name);
    let outcome = manager.prepare_reactor(&class).await?;
    assert_eq!(outcome, PrepareOutcome::Created);

    let mut probe = manager.create_probe_builder();
    for method in methods {
        let address = probe.add_test(class_name, method);
        manager
            .store_test_method(&address, MethodDescriptor::named(method))
            .await;
        manager
            .directory()
            .add(
                address,
                TestInstantiationInstruction::new(class_name, *method),
            )?;
    }
    manager.add_probe(probe.build()).await?;
    manager.stage_reactor().await
}

/// The staged target whose caption names `method`
pub fn target_for(staged: &StagedExamReactor, method: &str) -> TestAddress {
    staged
        .get_targets()
        .iter()
        .find(|address| address.caption().ends_with(method))
        .cloned()
        .expect("method is staged")
}
