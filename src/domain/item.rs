//! Host-side item description: type descriptors and identity keys.

use std::fmt;

/// Static description of a host item type.
///
/// Hosts declare one `TypeInfo` per concrete item type, listing the capability
/// tags the type carries and, optionally, the type it derives from. The
/// resolver walks this chain to build the ordered dispatch list.
#[derive(Debug, PartialEq, Eq)]
pub struct TypeInfo {
    /// Concrete type identifier
    pub name: &'static str,
    /// Capability tags (interfaces/traits) declared directly on this type
    pub capabilities: &'static [&'static str],
    /// Ancestor type, None for a root type
    pub parent: Option<&'static TypeInfo>,
}

impl TypeInfo {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            capabilities: &[],
            parent: None,
        }
    }

    pub const fn with_capabilities(mut self, capabilities: &'static [&'static str]) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub const fn with_parent(mut self, parent: &'static TypeInfo) -> Self {
        self.parent = Some(parent);
        self
    }

    /// This type followed by each ancestor, innermost first.
    pub fn lineage(&'static self) -> impl Iterator<Item = &'static TypeInfo> {
        std::iter::successors(Some(self), |info| info.parent)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Stable identity of a host item (pointer address, arena index, database id...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(pub u64);

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Implemented by every item a walker can wrap.
pub trait Walkable {
    /// Runtime type descriptor used for dispatch.
    fn type_info(&self) -> &'static TypeInfo;

    /// Identity used for equality and cycle detection. Two distinct values
    /// representing the same logical entity may share a key.
    fn item_key(&self) -> ItemKey;
}

/// Default item equality: same concrete type and same identity.
pub fn same_identity<I: Walkable + ?Sized>(a: &I, b: &I) -> bool {
    a.type_info().name == b.type_info().name && a.item_key() == b.item_key()
}
