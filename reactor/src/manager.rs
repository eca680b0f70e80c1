//! Run-wide reactor coordination
//!
//! [`ReactorManager`] is the run context the external test-runner
//! integration talks to: it owns the active reactor for the current scope,
//! drives the IDLE → PREPARING → STAGED → IDLE state machine under the
//! configured staging strategy, and correlates addresses back to the
//! runner's own method descriptors.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use shared::{TestAddress, TestClassDescriptor};

use crate::core::{
    ExamReactor, StagedExamReactor, StagingStrategy, TestDirectory, TestProbe, TestProbeBuilder,
};
use crate::error::{ReactorError, ReactorResult};
use crate::traits::ContainerFactory;

/// Lifecycle state of the managed reactor scope
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Preparing,
    Staged,
}

/// Whether `prepare_reactor` opened a fresh container boundary
///
/// The integration layer registers probes only after `Created`; `Reused`
/// means the existing reactor (and its probes) stays in effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrepareOutcome {
    Created,
    Reused,
}

struct ManagerInner<M> {
    state: RunState,
    reactor: Option<ExamReactor>,
    staged: Option<Arc<StagedExamReactor>>,
    current_class: Option<String>,
    suite_active: bool,
    /// Root-address signature to runner method descriptor
    methods: HashMap<String, M>,
}

/// Coordinator for one test run
///
/// All lifecycle hooks are serialized through one internal lock, so
/// concurrent runner threads cannot interleave state transitions.
pub struct ReactorManager<M> {
    strategy: StagingStrategy,
    factory: Arc<dyn ContainerFactory>,
    directory: Arc<TestDirectory>,
    inner: Mutex<ManagerInner<M>>,
}

impl<M: Clone + Send> ReactorManager<M> {
    pub fn new(strategy: StagingStrategy, factory: Arc<dyn ContainerFactory>) -> Self {
        info!("reactor manager created with {strategy} staging");
        Self {
            strategy,
            factory,
            directory: Arc::new(TestDirectory::new()),
            inner: Mutex::new(ManagerInner {
                state: RunState::Idle,
                reactor: None,
                staged: None,
                current_class: None,
                suite_active: false,
                methods: HashMap::new(),
            }),
        }
    }

    pub fn strategy(&self) -> StagingStrategy {
        self.strategy
    }

    /// The run-wide directory consulted by the container-side dispatcher
    pub fn directory(&self) -> Arc<TestDirectory> {
        Arc::clone(&self.directory)
    }

    pub async fn state(&self) -> RunState {
        self.inner.lock().await.state
    }

    /// Open (or reuse) the reactor boundary for a test class
    ///
    /// Under reuse strategies an already-staged reactor is returned
    /// unchanged; under per-class staging a class change releases the
    /// previous container set and opens a fresh boundary.
    pub async fn prepare_reactor(
        &self,
        class: &TestClassDescriptor,
    ) -> ReactorResult<PrepareOutcome> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;
        match inner.state {
            RunState::Preparing => {
                if let Some(reactor) = inner.reactor.as_mut() {
                    reactor.add_options(class.options.clone());
                }
                inner.current_class = Some(class.type_name.clone());
                debug!("reactor already preparing; joined by {}", class.type_name);
                Ok(PrepareOutcome::Reused)
            }
            RunState::Staged => {
                let same_class =
                    inner.current_class.as_deref() == Some(class.type_name.as_str());
                if self.strategy.reuses_across_classes() || same_class {
                    debug!("reusing staged reactor for {}", class.type_name);
                    Ok(PrepareOutcome::Reused)
                } else {
                    self.release(&mut *inner).await?;
                    self.open(&mut *inner, class);
                    Ok(PrepareOutcome::Created)
                }
            }
            RunState::Idle => {
                self.open(&mut *inner, class);
                Ok(PrepareOutcome::Created)
            }
        }
    }

    /// Fresh probe builder for the class under preparation
    pub fn create_probe_builder(&self) -> TestProbeBuilder {
        TestProbeBuilder::new()
    }

    /// Merge a frozen probe into the reactor under preparation
    pub async fn add_probe(&self, probe: TestProbe) -> ReactorResult<()> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;
        match (inner.state, inner.reactor.as_mut()) {
            (RunState::Preparing, Some(reactor)) => reactor.add_probe(probe),
            _ => Err(ReactorError::config(
                "add_probe is only valid while a reactor is being prepared",
            )),
        }
    }

    /// Stage the prepared reactor, freezing its target set
    ///
    /// Returns the existing staged reactor when the strategy reuses it;
    /// never produces a second container set for the same preparation. A
    /// staging failure rolls the manager back to idle with no container
    /// left running.
    pub async fn stage_reactor(&self) -> ReactorResult<Arc<StagedExamReactor>> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            RunState::Staged => inner.staged.clone().ok_or_else(|| {
                ReactorError::config("staged state without a staged reactor")
            }),
            RunState::Preparing => {
                let reactor = inner.reactor.take().ok_or_else(|| {
                    ReactorError::config("preparing state without a reactor")
                })?;
                match reactor
                    .stage(self.strategy.mode(), Arc::clone(&self.directory))
                    .await
                {
                    Ok(staged) => {
                        let staged = Arc::new(staged);
                        info!("reactor staged with {} targets", staged.get_targets().len());
                        inner.staged = Some(Arc::clone(&staged));
                        inner.state = RunState::Staged;
                        Ok(staged)
                    }
                    Err(e) => {
                        inner.state = RunState::Idle;
                        inner.current_class = None;
                        Err(e)
                    }
                }
            }
            RunState::Idle => Err(ReactorError::config("no reactor prepared for staging")),
        }
    }

    /// Correlate an address root with the runner's method descriptor
    pub async fn store_test_method(&self, address: &TestAddress, descriptor: M) {
        let mut inner = self.inner.lock().await;
        inner
            .methods
            .insert(address.root().signature().to_string(), descriptor);
    }

    /// Resolve the runner descriptor stored for an address root
    pub async fn lookup_test_method(&self, address: &TestAddress) -> Option<M> {
        let inner = self.inner.lock().await;
        inner.methods.get(address.root().signature()).cloned()
    }

    /// Record the staged reactor as current for the suite scope
    pub async fn before_suite(&self, staged: &Arc<StagedExamReactor>) -> ReactorResult<()> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;
        match &inner.staged {
            Some(current) if Arc::ptr_eq(current, staged) => {
                inner.suite_active = true;
                info!("suite started on staged reactor");
                Ok(())
            }
            None => {
                debug!("no staged reactor at suite start; staging is deferred");
                Ok(())
            }
            Some(_) => Err(ReactorError::config(
                "before_suite called with a reactor that is not current",
            )),
        }
    }

    /// Close the suite scope, releasing containers unless the strategy
    /// keeps them alive for the whole run
    pub async fn after_suite(&self) -> ReactorResult<()> {
        let mut inner = self.inner.lock().await;
        inner.suite_active = false;
        if self.strategy.tears_down_after_suite() {
            info!("suite finished; releasing container set");
            self.release(&mut inner).await
        } else {
            debug!("suite finished; container set kept for the run");
            Ok(())
        }
    }

    /// Strategy hook on entering a test class
    pub async fn before_class(
        &self,
        staged: &Arc<StagedExamReactor>,
        class: &TestClassDescriptor,
    ) -> ReactorResult<()> {
        let inner = self.inner.lock().await;
        match &inner.staged {
            Some(current) if Arc::ptr_eq(current, staged) => {
                debug!("entering class {}", class.type_name);
                Ok(())
            }
            _ => Err(ReactorError::config(
                "before_class called with a reactor that is not current",
            )),
        }
    }

    /// Strategy hook on leaving a test class; per-class staging releases
    /// the container set here
    pub async fn after_class(&self, class_name: &str) -> ReactorResult<()> {
        let mut inner = self.inner.lock().await;
        if self.strategy == StagingStrategy::PerClass {
            info!("releasing container set after class {class_name}");
            self.release(&mut inner).await
        } else {
            debug!("leaving class {class_name}");
            Ok(())
        }
    }

    /// Run-wide reset: tear down whatever is staged and clear the
    /// directory and method correlation map
    pub async fn shutdown(&self) -> ReactorResult<()> {
        let mut inner = self.inner.lock().await;
        let result = self.release(&mut inner).await;
        inner.methods.clear();
        inner.suite_active = false;
        self.directory.clear();
        info!("reactor manager shut down");
        result
    }

    fn open(&self, inner: &mut ManagerInner<M>, class: &TestClassDescriptor) {
        info!("preparing reactor for {}", class.type_name);
        inner.reactor = Some(ExamReactor::new(
            Arc::clone(&self.factory),
            class.options.clone(),
        ));
        inner.state = RunState::Preparing;
        inner.current_class = Some(class.type_name.clone());
    }

    /// Unconditionally return to idle; containers are torn down even when
    /// earlier invocations failed
    async fn release(&self, inner: &mut ManagerInner<M>) -> ReactorResult<()> {
        inner.reactor = None;
        inner.state = RunState::Idle;
        inner.current_class = None;
        match inner.staged.take() {
            Some(staged) => staged.tear_down().await,
            None => Ok(()),
        }
    }
}
