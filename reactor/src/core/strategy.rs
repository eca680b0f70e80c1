//! Container staging strategies

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ReactorError;

/// Environment variable selecting the staging strategy
pub const STRATEGY_ENV: &str = "EXAM_REACTOR_STRATEGY";

/// Closed set of container staging strategies
///
/// Selected by configuration and dispatched by explicit matching; the
/// strategy decides where container boundaries fall and which staging mode
/// the reactor uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagingStrategy {
    /// One container set per suite, torn down after the suite
    PerSuite,
    /// Fresh container set for every test class
    PerClass,
    /// Fresh container around every single invocation
    PerMethod,
    /// One container set reused across all suites of the run
    PerTestRun,
}

/// How staged containers relate to invocations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StagingMode {
    /// Containers are started at staging time and reused for every invoke
    Eager,
    /// A container is created and stopped around each invoke
    Confined,
}

impl StagingStrategy {
    pub fn mode(self) -> StagingMode {
        match self {
            StagingStrategy::PerMethod => StagingMode::Confined,
            StagingStrategy::PerSuite | StagingStrategy::PerClass | StagingStrategy::PerTestRun => {
                StagingMode::Eager
            }
        }
    }

    /// Whether an already-staged reactor is reused when a new class enters
    pub fn reuses_across_classes(self) -> bool {
        !matches!(self, StagingStrategy::PerClass)
    }

    /// Whether `after_suite` releases the container set
    pub fn tears_down_after_suite(self) -> bool {
        !matches!(self, StagingStrategy::PerTestRun)
    }

    /// Read the strategy from `EXAM_REACTOR_STRATEGY`, defaulting to
    /// per-suite staging on absent or unrecognized values
    pub fn from_env() -> Self {
        match std::env::var(STRATEGY_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                warn!("unrecognized {STRATEGY_ENV}='{value}', using per-suite staging");
                StagingStrategy::PerSuite
            }),
            Err(_) => StagingStrategy::PerSuite,
        }
    }
}

impl fmt::Display for StagingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StagingStrategy::PerSuite => "suite",
            StagingStrategy::PerClass => "class",
            StagingStrategy::PerMethod => "method",
            StagingStrategy::PerTestRun => "run",
        };
        write!(f, "{name}")
    }
}

impl FromStr for StagingStrategy {
    type Err = ReactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "suite" => Ok(StagingStrategy::PerSuite),
            "class" => Ok(StagingStrategy::PerClass),
            "method" => Ok(StagingStrategy::PerMethod),
            "run" => Ok(StagingStrategy::PerTestRun),
            other => Err(ReactorError::config(format!(
                "unknown staging strategy '{other}'"
            ))),
        }
    }
}
