//! Infrastructure layer: concrete hosts performing real I/O
//!
//! The engine never touches the disk; the filesystem host does, inside its
//! definitions.

pub mod error;
pub mod fs;

pub use error::{InfraError, InfraResult};
pub use fs::{EntryKind, FsContext, FsEntry, FsWalker};
