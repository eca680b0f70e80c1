//! Reactor-specific error types

use shared::{BoxedFailure, SharedError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReactorError {
    #[error("Reactor configuration error: {message}")]
    Configuration { message: String },

    #[error("Container preparation failed: {message}")]
    ContainerPreparation { message: String },

    #[error("Test invocation failed: {0}")]
    Invocation(#[source] BoxedFailure),

    #[error("No directory entry for address {address}")]
    DirectoryLookup { address: String },

    #[error("Shared component error")]
    Shared(#[from] SharedError),
}

impl ReactorError {
    pub fn config(message: impl Into<String>) -> Self {
        ReactorError::Configuration {
            message: message.into(),
        }
    }

    pub fn preparation(message: impl Into<String>) -> Self {
        ReactorError::ContainerPreparation {
            message: message.into(),
        }
    }
}

pub type ReactorResult<T> = Result<T, ReactorError>;
