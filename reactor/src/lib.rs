//! Reactor core for containerized test execution
//!
//! Turns registered test probes into staged, invocable containers: probes
//! accumulate test registrations as addresses, the reactor realizes one
//! container per probe according to the configured staging strategy, and
//! `invoke` dispatches a single address into its container and relays the
//! outcome back with transport wrapping stripped.

pub mod core;
pub mod error;
pub mod manager;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use self::core::{
    ExamReactor, StagedExamReactor, StagingMode, StagingStrategy, TestDirectory, TestProbe,
    TestProbeBuilder,
};
pub use error::{ReactorError, ReactorResult};
pub use manager::{PrepareOutcome, ReactorManager, RunState};
pub use services::{EmbeddedContainer, EmbeddedContainerFactory, RunnerRegistry};
pub use traits::{ContainerFactory, MockContainerFactory, MockTestContainer, TestContainer};
