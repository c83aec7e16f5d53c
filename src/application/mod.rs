//! Application layer: consumers of the walker's public surface
//!
//! Output adapters read items, children, counts, levels and metadata; they
//! never reach into the engine's internals.

pub mod display;
pub mod error;
pub mod error_ext;
pub mod serializer;

pub use display::{build_tree, TreeNodeConvert};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use serializer::{Group, WalkerNormalizer};
