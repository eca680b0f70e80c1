//! Trait definitions with mockall annotations for testing
//!
//! These are the seams between the reactor core and the concrete container
//! runtime. The reactor never talks to a runtime directly; it stages
//! containers through a [`ContainerFactory`] and dispatches invocations
//! through [`TestContainer`], so the runtime (embedded, forked, remote) is
//! swappable and mockable.

use std::sync::Arc;

use shared::{BoxedFailure, ProvisionOption, TestInstantiationInstruction};

use crate::core::TestProbe;
use crate::error::ReactorResult;

/// One isolated runtime environment executing provisioned test code
#[mockall::automock]
#[async_trait::async_trait]
pub trait TestContainer: Send + Sync {
    /// Execute the member named by `instruction` and wait for its outcome
    ///
    /// A failure inside the container is relayed back wrapped in at least
    /// one `TransportFault` layer; the reactor unwinds the wrapping before
    /// surfacing it.
    async fn call(
        &self,
        instruction: TestInstantiationInstruction,
        arguments: Vec<String>,
    ) -> Result<(), BoxedFailure>;

    /// Release all resources held by the container
    async fn stop(&mut self) -> ReactorResult<()>;

    /// Human-readable label for log lines
    fn label(&self) -> String;
}

impl std::fmt::Debug for dyn TestContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestContainer")
            .field("label", &self.label())
            .finish()
    }
}

/// Factory realizing containers from a probe plus provisioning options
#[mockall::automock]
#[async_trait::async_trait]
pub trait ContainerFactory: Send + Sync {
    /// Provision and start one container for `probe`
    ///
    /// Any provisioning failure must surface here, with nothing left
    /// running, so the caller can roll back the rest of the staging attempt.
    async fn create(
        &self,
        probe: Arc<TestProbe>,
        options: Vec<ProvisionOption>,
    ) -> ReactorResult<Box<dyn TestContainer>>;
}
