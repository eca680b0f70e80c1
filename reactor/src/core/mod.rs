//! Core reactor data model and staging machinery

pub mod directory;
pub mod probe;
pub mod reactor;
pub mod staged;
pub mod strategy;

pub use directory::TestDirectory;
pub use probe::{ProbeEntry, TestProbe, TestProbeBuilder};
pub use reactor::ExamReactor;
pub use staged::StagedExamReactor;
pub use strategy::{StagingMode, StagingStrategy};
