//! Lazily materialized trees over arbitrary object graphs.
//!
//! A [`domain::Walker`] wraps a root item and expands children on demand
//! through handlers registered per type or capability. Depth bounds, stoppable
//! handlers and a root-owned cycle guard keep expansion finite; navigation,
//! search, metadata and JSON/termtree output work on the realized nodes.
//!
//! ```ignore
//! let mut walker = Walker::<FsWalker>::builder()
//!     .item(FsEntry::from_path(Path::new("."))?)
//!     .max_level(MaxLevel::Bounded(2))
//!     .build();
//! let root = walker.root();
//! for child in walker.iter_children(root)? {
//!     println!("{}", walker.item(child)?.map(ToString::to_string).unwrap_or_default());
//! }
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{ApplicationError, Group, TreeNodeConvert, WalkerNormalizer};
pub use domain::{
    Definition, MaxLevel, NodeId, NodeScope, Registry, TypeInfo, Walkable, Walker, WalkerError,
    WalkerKind, WalkerResult,
};
