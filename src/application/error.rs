//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::application::serializer::Group;
use crate::domain::WalkerError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] WalkerError),

    #[error("serialization groups '{0}' and '{1}' cannot be combined")]
    ConflictingGroups(Group, Group),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
