//! Shared types for the exam reactor
//!
//! Contains only the types that cross the reactor/container boundary:
//! test addresses, instantiation instructions, provisioning options and
//! the failure types relayed back from a container. Reactor-internal
//! types live in the `reactor` crate.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
