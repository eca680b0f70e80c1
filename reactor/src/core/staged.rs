//! Staged reactor: frozen targets and synchronous invocation relay

use std::collections::HashMap;
use std::sync::Arc;

use shared::{unwind, ProvisionOption, TestAddress};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::core::{StagingMode, TestDirectory, TestProbe};
use crate::error::{ReactorError, ReactorResult};
use crate::traits::{ContainerFactory, TestContainer};

/// Frozen, invocable view of a staged reactor
///
/// Owns the realized container set and the ordered target list. Targets
/// sharing a root are grouped contiguously, siblings in declaration order;
/// the ordering is deterministic for a given registration sequence.
pub struct StagedExamReactor {
    mode: StagingMode,
    factory: Arc<dyn ContainerFactory>,
    options: Vec<ProvisionOption>,
    probes: Vec<Arc<TestProbe>>,
    targets: Vec<TestAddress>,
    /// Root signature to probe index; one container per probe
    root_probe: HashMap<String, usize>,
    /// Running containers, parallel to `probes` under eager staging;
    /// empty under confined staging. Slots are taken at teardown.
    containers: Mutex<Vec<Option<Box<dyn TestContainer>>>>,
    directory: Arc<TestDirectory>,
}

impl std::fmt::Debug for StagedExamReactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedExamReactor")
            .field("mode", &self.mode)
            .field("options", &self.options)
            .field("targets", &self.targets)
            .field("root_probe", &self.root_probe)
            .finish_non_exhaustive()
    }
}

impl StagedExamReactor {
    pub(crate) fn new(
        mode: StagingMode,
        factory: Arc<dyn ContainerFactory>,
        options: Vec<ProvisionOption>,
        probes: Vec<Arc<TestProbe>>,
        containers: Vec<Option<Box<dyn TestContainer>>>,
        directory: Arc<TestDirectory>,
    ) -> Self {
        let mut targets = Vec::new();
        let mut root_probe = HashMap::new();

        for (probe_index, probe) in probes.iter().enumerate() {
            // Group addresses by root in first-registration order, keeping
            // sibling declaration order inside each group.
            let mut groups: Vec<(String, Vec<TestAddress>)> = Vec::new();
            for entry in probe.entries() {
                let root_signature = entry.address().root().signature().to_string();
                root_probe.insert(root_signature.clone(), probe_index);
                match groups.iter_mut().find(|(sig, _)| *sig == root_signature) {
                    Some((_, group)) => group.push(entry.address().clone()),
                    None => groups.push((root_signature, vec![entry.address().clone()])),
                }
            }
            for (_, group) in groups {
                targets.extend(group);
            }
        }

        Self {
            mode,
            factory,
            options,
            probes,
            targets,
            root_probe,
            containers: Mutex::new(containers),
            directory,
        }
    }

    /// Every address invocable on this reactor, in execution order
    pub fn get_targets(&self) -> &[TestAddress] {
        &self.targets
    }

    pub fn directory(&self) -> Arc<TestDirectory> {
        Arc::clone(&self.directory)
    }

    /// Dispatch one test invocation into its container and wait for the
    /// outcome
    ///
    /// The target container is resolved from the address root; the member
    /// to execute comes from the directory. A failure relayed out of the
    /// container is unwound to its innermost cause before being surfaced.
    pub async fn invoke(&self, address: &TestAddress) -> ReactorResult<()> {
        let root = address.root();
        let instruction = self.directory.lookup(address)?;
        let probe_index = *self.root_probe.get(root.signature()).ok_or_else(|| {
            ReactorError::DirectoryLookup {
                address: address.to_string(),
            }
        })?;

        debug!(
            "invoking {} @ {} arguments {:?}",
            instruction,
            address,
            address.arguments()
        );

        let outcome = match self.mode {
            StagingMode::Eager => {
                let containers = self.containers.lock().await;
                let container = containers
                    .get(probe_index)
                    .and_then(|slot| slot.as_ref())
                    .ok_or_else(|| {
                        ReactorError::preparation(format!(
                            "no running container for {}",
                            root.caption()
                        ))
                    })?;
                container
                    .call(instruction, address.arguments().to_vec())
                    .await
            }
            StagingMode::Confined => {
                let probe = self.probes.get(probe_index).cloned().ok_or_else(|| {
                    ReactorError::preparation(format!("no probe staged for {}", root.caption()))
                })?;
                let mut options = self.options.clone();
                options.extend(probe.options());

                let mut container = self.factory.create(probe, options).await?;
                let result = container
                    .call(instruction, address.arguments().to_vec())
                    .await;
                if let Err(stop_error) = container.stop().await {
                    if result.is_ok() {
                        return Err(stop_error);
                    }
                    error!("failed to stop confined container: {stop_error}");
                }
                result
            }
        };

        outcome.map_err(|failure| ReactorError::Invocation(unwind(failure)))
    }

    /// Release every container owned by this reactor
    ///
    /// All containers are stopped even if some stops fail; the first
    /// failure is reported after the sweep completes.
    pub async fn tear_down(&self) -> ReactorResult<()> {
        let mut containers = self.containers.lock().await;
        let mut first_error = None;

        for slot in containers.iter_mut() {
            if let Some(mut container) = slot.take() {
                debug!("stopping container {}", container.label());
                if let Err(e) = container.stop().await {
                    error!("container teardown failed: {e}");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
