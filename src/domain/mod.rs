//! Domain layer: the lazy walker engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod cache;
pub mod cycle;
pub mod error;
pub mod item;
pub mod kind;
pub mod metadata;
pub mod navigation;
pub mod registry;
pub mod resolver;
pub mod walker;

pub use arena::{Expansion, MaxLevel, NodeArena, NodeId, WalkerNode};
pub use cache::{MemoryCache, SharedCache, TypeChainCache};
pub use cycle::{CycleGuard, DEFAULT_REVISIT_BUDGET};
pub use error::{WalkerError, WalkerResult};
pub use item::{same_identity, ItemKey, TypeInfo, Walkable};
pub use kind::WalkerKind;
pub use metadata::Metadata;
pub use registry::{CountDefinition, Definition, Registry, ZeroChildrenDefinition};
pub use walker::{NodeScope, Walker, WalkerBuilder};
