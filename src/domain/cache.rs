//! Key-value collaborator backing the type chain resolver.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

/// Get/set store for resolved type chains.
///
/// On a hit, `get` must return exactly what was last `set` for that key.
/// Payload validation is the resolver's job.
pub trait TypeChainCache {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, payload: Value);
}

/// Cache handle shared by every node of a tree, and possibly by several trees.
pub type SharedCache = Rc<RefCell<dyn TypeChainCache>>;

/// In-process cache, the default collaborator when none is supplied.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: HashMap<String, Value>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh cache into a shareable handle.
    pub fn shared() -> SharedCache {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl TypeChainCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, payload: Value) {
        self.entries.insert(key.to_string(), payload);
    }
}
