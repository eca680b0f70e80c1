//! Shared error types for the exam reactor
//!
//! Failures relayed out of a container travel as a boxed error chain; the
//! transport boundary wraps them in [`TransportFault`] and [`unwind`] strips
//! that wrapping back off on the reactor side.

use thiserror::Error;

/// Dynamic failure crossing the container boundary
pub type BoxedFailure = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Serialization failed: {message}")]
    SerializationError { message: String },

    #[error("Message protocol error: {message}")]
    ProtocolError { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;

/// Failure of a test body inside a container
///
/// Carries the original assertion/panic message so it can be reported as an
/// ordinary failed test, never as an infrastructure fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TestFailure {
    pub message: String,
}

impl TestFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Transport-level wrapper around a failure relayed out of a container
#[derive(Error, Debug)]
#[error("remote invocation fault")]
pub struct TransportFault {
    #[source]
    cause: BoxedFailure,
}

impl TransportFault {
    pub fn new(cause: BoxedFailure) -> Self {
        Self { cause }
    }

    /// Convenience for wrapping straight into a boxed chain
    pub fn boxed(cause: BoxedFailure) -> BoxedFailure {
        Box::new(Self::new(cause))
    }

    pub fn into_cause(self) -> BoxedFailure {
        self.cause
    }
}

/// Strip transport wrapping, recursively, until a non-transport failure
/// (the innermost cause) remains
pub fn unwind(failure: BoxedFailure) -> BoxedFailure {
    let mut failure = failure;
    loop {
        failure = match failure.downcast::<TransportFault>() {
            Ok(fault) => (*fault).into_cause(),
            Err(other) => return other,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwind_strips_nested_transport_wrapping() {
        let original = TestFailure::new("boom");
        let wrapped = TransportFault::boxed(TransportFault::boxed(Box::new(original.clone())));

        let innermost = unwind(wrapped);
        let failure = innermost.downcast::<TestFailure>().expect("innermost cause");
        assert_eq!(*failure, original);
    }

    #[test]
    fn unwind_leaves_plain_failures_alone() {
        let plain: BoxedFailure = Box::new(TestFailure::new("plain"));
        let unwound = unwind(plain);
        assert_eq!(unwound.to_string(), "plain");
    }
}
