//! Expansion and counting handlers keyed by type identifier.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::domain::kind::WalkerKind;
use crate::domain::walker::NodeScope;

/// Produces the candidate children of an item.
///
/// `node` is the handle of the node being expanded; handlers use it to attach
/// metadata while computing children. Absent entries in the returned list are
/// dropped by the engine.
pub trait Definition<K: WalkerKind> {
    fn children(&self, item: &K::Item, node: &mut NodeScope<'_, K>) -> Vec<Option<K::Item>>;

    /// Consulted once right after each `children` call. When true, the
    /// produced children are shown but never expand themselves.
    fn should_stop_expansion(&self) -> bool {
        false
    }
}

/// Cheap child counter, used instead of materializing children when registered.
pub type CountDefinition<I> = Rc<dyn Fn(&I) -> usize>;

struct FnDefinition<F>(F);

impl<K, F> Definition<K> for FnDefinition<F>
where
    K: WalkerKind,
    F: Fn(&K::Item, &mut NodeScope<'_, K>) -> Vec<Option<K::Item>>,
{
    fn children(&self, item: &K::Item, node: &mut NodeScope<'_, K>) -> Vec<Option<K::Item>> {
        (self.0)(item, node)
    }
}

/// Explicit leaf handler: the item never has children.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroChildrenDefinition;

impl<K: WalkerKind> Definition<K> for ZeroChildrenDefinition {
    fn children(&self, _item: &K::Item, _node: &mut NodeScope<'_, K>) -> Vec<Option<K::Item>> {
        Vec::new()
    }
}

/// Handler tables of one walker. Last registration for a type id wins.
pub struct Registry<K: WalkerKind> {
    definitions: HashMap<String, Rc<dyn Definition<K>>>,
    count_definitions: HashMap<String, CountDefinition<K::Item>>,
}

impl<K: WalkerKind> Default for Registry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: WalkerKind> fmt::Debug for Registry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut definitions: Vec<_> = self.definitions.keys().collect();
        let mut count_definitions: Vec<_> = self.count_definitions.keys().collect();
        definitions.sort();
        count_definitions.sort();
        f.debug_struct("Registry")
            .field("definitions", &definitions)
            .field("count_definitions", &count_definitions)
            .finish()
    }
}

impl<K: WalkerKind> Registry<K> {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            count_definitions: HashMap::new(),
        }
    }

    pub fn add_definition<F>(&mut self, type_id: impl Into<String>, definition: F) -> &mut Self
    where
        F: Fn(&K::Item, &mut NodeScope<'_, K>) -> Vec<Option<K::Item>> + 'static,
    {
        self.add_custom_definition(type_id, FnDefinition(definition))
    }

    /// Register a handler object, e.g. one that can stop expansion.
    pub fn add_custom_definition<D>(&mut self, type_id: impl Into<String>, definition: D) -> &mut Self
    where
        D: Definition<K> + 'static,
    {
        self.add_shared_definition(type_id, Rc::new(definition))
    }

    /// Register one handler instance under several type ids.
    pub fn add_shared_definition(
        &mut self,
        type_id: impl Into<String>,
        definition: Rc<dyn Definition<K>>,
    ) -> &mut Self {
        self.definitions.insert(type_id.into(), definition);
        self
    }

    pub fn add_count_definition<F>(&mut self, type_id: impl Into<String>, count: F) -> &mut Self
    where
        F: Fn(&K::Item) -> usize + 'static,
    {
        self.count_definitions.insert(type_id.into(), Rc::new(count));
        self
    }

    /// First handler matching the chain, in chain order.
    pub fn definition_for_chain(&self, chain: &[String]) -> Option<Rc<dyn Definition<K>>> {
        chain
            .iter()
            .find_map(|type_id| self.definitions.get(type_id))
            .cloned()
    }

    pub fn count_definition_for_chain(&self, chain: &[String]) -> Option<CountDefinition<K::Item>> {
        chain
            .iter()
            .find_map(|type_id| self.count_definitions.get(type_id))
            .cloned()
    }

    pub fn has_definition(&self, type_id: &str) -> bool {
        self.definitions.contains_key(type_id)
    }

    pub fn has_count_definition(&self, type_id: &str) -> bool {
        self.count_definitions.contains_key(type_id)
    }
}
