//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{CodecError, DomainError};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("cannot load tree from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("cannot save tree to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("input ended before the round was finished")]
    InputClosed,

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
