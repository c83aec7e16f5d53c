//! The concrete tree type: what a walker wraps and how it dispatches.

use crate::domain::item::{same_identity, Walkable};
use crate::domain::registry::Registry;

/// Describes one family of walkers.
///
/// Two kinds may dispatch the same item type differently, so the kind name
/// is part of every type chain cache key.
pub trait WalkerKind: Sized + 'static {
    type Item: Walkable + Clone + 'static;
    type Context: Default + 'static;

    /// Name distinguishing this kind in cache keys.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Register the kind's handlers. Called once when a root is built.
    fn initialize_definitions(registry: &mut Registry<Self>, context: &Self::Context) {
        let _ = (registry, context);
    }

    /// Equality used by navigation and search. Override when distinct values
    /// may stand for the same logical entity.
    fn items_equal(a: &Self::Item, b: &Self::Item) -> bool {
        same_identity(a, b)
    }
}
