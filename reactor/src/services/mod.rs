//! Container runtime services
//!
//! The embedded container is the in-process reference implementation of the
//! [`crate::traits::TestContainer`] seam; the runner registry plays the role
//! the container runtime's classloading plays for a remote container.

pub mod embedded;
pub mod registry;

pub use embedded::{EmbeddedContainer, EmbeddedContainerFactory};
pub use registry::RunnerRegistry;
