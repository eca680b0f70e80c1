//! Per-run reactor: probe accumulation and container staging

use std::sync::Arc;

use shared::ProvisionOption;
use tracing::{debug, error, info, warn};

use crate::core::{StagedExamReactor, StagingMode, TestDirectory, TestProbe};
use crate::error::{ReactorError, ReactorResult};
use crate::traits::{ContainerFactory, TestContainer};

/// Accumulator of probes and provisioning options for one staging scope
///
/// Consumed exactly once by [`ExamReactor::stage`]; the move makes a second
/// staging of the same reactor unrepresentable.
pub struct ExamReactor {
    factory: Arc<dyn ContainerFactory>,
    options: Vec<ProvisionOption>,
    probes: Vec<TestProbe>,
}

impl ExamReactor {
    pub fn new(factory: Arc<dyn ContainerFactory>, options: Vec<ProvisionOption>) -> Self {
        Self {
            factory,
            options,
            probes: Vec::new(),
        }
    }

    /// Merge additional provisioning options (e.g. from a second class
    /// joining the same container boundary)
    pub fn add_options(&mut self, options: Vec<ProvisionOption>) {
        self.options.extend(options);
    }

    /// Merge a frozen probe's registered addresses into this reactor
    pub fn add_probe(&mut self, probe: TestProbe) -> ReactorResult<()> {
        if self.probes.iter().any(|known| known.id() == probe.id()) {
            return Err(ReactorError::config(format!(
                "probe {} is already registered",
                probe.id()
            )));
        }
        debug!("added probe {} with {} tests", probe.id(), probe.entries().len());
        self.probes.push(probe);
        Ok(())
    }

    pub fn probes(&self) -> &[TestProbe] {
        &self.probes
    }

    /// Realize the configured containers and freeze the target set
    ///
    /// Under eager staging one container is started per probe; a failure
    /// part-way through stops every container already started before the
    /// error surfaces. Confined staging defers container creation to each
    /// invocation and starts nothing here.
    pub async fn stage(
        self,
        mode: StagingMode,
        directory: Arc<TestDirectory>,
    ) -> ReactorResult<StagedExamReactor> {
        if self.probes.is_empty() {
            warn!("staging a reactor without probes; target set will be empty");
        }

        let probes: Vec<Arc<TestProbe>> = self.probes.into_iter().map(Arc::new).collect();

        let containers = match mode {
            StagingMode::Confined => Vec::new(),
            StagingMode::Eager => {
                let mut started: Vec<Option<Box<dyn TestContainer>>> = Vec::new();
                for probe in &probes {
                    let mut options = self.options.clone();
                    options.extend(probe.options());

                    match self.factory.create(Arc::clone(probe), options).await {
                        Ok(container) => {
                            info!("started container {} for probe {}", container.label(), probe.id());
                            started.push(Some(container));
                        }
                        Err(e) => {
                            error!("staging failed for probe {}: {e}", probe.id());
                            roll_back(&mut started).await;
                            return Err(e);
                        }
                    }
                }
                started
            }
        };

        Ok(StagedExamReactor::new(
            mode,
            self.factory,
            self.options,
            probes,
            containers,
            directory,
        ))
    }
}

/// Stop every container started by a failed staging attempt
async fn roll_back(started: &mut Vec<Option<Box<dyn TestContainer>>>) {
    for slot in started.iter_mut() {
        if let Some(mut container) = slot.take() {
            if let Err(e) = container.stop().await {
                error!("rollback failed to stop container {}: {e}", container.label());
            }
        }
    }
}
