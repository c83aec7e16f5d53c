//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Errors raised by the walker engine.
///
/// `DefinitionNotFound` and `NullItem` are recoverable: the engine swallows
/// them while materializing children or counting. They surface only from a
/// direct `definition_for` call.
#[derive(Error, Debug)]
pub enum WalkerError {
    #[error("no definition was found for {type_name}")]
    DefinitionNotFound { type_name: String },

    #[error("cannot walk an absent item")]
    NullItem,

    #[error("type chain cache entry {key} is corrupted: {reason}")]
    CacheCorrupted { key: String, reason: String },

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
}

impl WalkerError {
    /// True for the conditions the engine treats as "no children".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WalkerError::DefinitionNotFound { .. } | WalkerError::NullItem
        )
    }
}

/// Result type for walker operations.
pub type WalkerResult<T> = Result<T, WalkerError>;
