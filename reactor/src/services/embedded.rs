//! Embedded in-process container
//!
//! Reference implementation of the container seam. Test bodies run on the
//! blocking pool with panic capture, and every in-container failure is
//! relayed back wrapped in a transport fault, exactly as a remote container
//! boundary would wrap it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use shared::{
    BoxedFailure, ProvisionOption, TestFailure, TestInstantiationInstruction, TransportFault,
};

use crate::core::TestProbe;
use crate::error::{ReactorError, ReactorResult};
use crate::services::registry::RunnerRegistry;
use crate::traits::{ContainerFactory, TestContainer};

pub struct EmbeddedContainer {
    label: String,
    registry: Arc<RunnerRegistry>,
    properties: HashMap<String, String>,
    running: bool,
}

impl EmbeddedContainer {
    /// Property applied from the provisioning options, if any
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

#[async_trait]
impl TestContainer for EmbeddedContainer {
    async fn call(
        &self,
        instruction: TestInstantiationInstruction,
        arguments: Vec<String>,
    ) -> Result<(), BoxedFailure> {
        if !self.running {
            return Err(TransportFault::boxed(Box::new(TestFailure::new(format!(
                "container {} is stopped",
                self.label
            )))));
        }

        let runner = self.registry.resolve(&instruction).ok_or_else(|| {
            TransportFault::boxed(Box::new(TestFailure::new(format!(
                "no runner registered for {instruction}"
            ))))
        })?;

        let outcome = tokio::task::spawn_blocking(move || (*runner)(&arguments)).await;
        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(failure)) => Err(TransportFault::boxed(failure)),
            Err(join_error) => {
                let message = if join_error.is_panic() {
                    panic_message(join_error.into_panic())
                } else {
                    "test body was cancelled".to_string()
                };
                Err(TransportFault::boxed(Box::new(TestFailure::new(message))))
            }
        }
    }

    async fn stop(&mut self) -> ReactorResult<()> {
        debug!("stopping embedded container {}", self.label);
        self.running = false;
        Ok(())
    }

    fn label(&self) -> String {
        self.label.clone()
    }
}

/// Extract the message carried by a panic payload
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "test body panicked".to_string()
    }
}

/// Factory realizing embedded containers over a shared runner registry
pub struct EmbeddedContainerFactory {
    registry: Arc<RunnerRegistry>,
}

impl EmbeddedContainerFactory {
    pub fn new(registry: Arc<RunnerRegistry>) -> Self {
        Self { registry }
    }

    /// Provision an embedded container for `probe`
    pub fn build(
        &self,
        probe: &TestProbe,
        options: &[ProvisionOption],
    ) -> ReactorResult<EmbeddedContainer> {
        // Provisioning fails fast: every registered test must have a runner
        // before the container counts as realized.
        for entry in probe.entries() {
            if !self.registry.contains(entry.instruction()) {
                return Err(ReactorError::preparation(format!(
                    "no runner registered for {}",
                    entry.instruction()
                )));
            }
        }

        let mut properties = HashMap::new();
        for option in options {
            match option {
                ProvisionOption::SystemProperty { key, value } => {
                    properties.insert(key.clone(), value.clone());
                }
                other => debug!("provisioning {other}"),
            }
        }

        let label = format!("embedded-{}", probe.id());
        debug!(
            "created container {label} with {} tests and {} properties",
            probe.entries().len(),
            properties.len()
        );

        Ok(EmbeddedContainer {
            label,
            registry: Arc::clone(&self.registry),
            properties,
            running: true,
        })
    }
}

#[async_trait]
impl ContainerFactory for EmbeddedContainerFactory {
    async fn create(
        &self,
        probe: Arc<TestProbe>,
        options: Vec<ProvisionOption>,
    ) -> ReactorResult<Box<dyn TestContainer>> {
        Ok(Box::new(self.build(&probe, &options)?))
    }
}
