//! Lazy tree engine.
//!
//! A `Walker` owns every node of one tree in an arena together with the
//! handler registry, the context, the type chain cache handle and the cycle
//! guard. Nodes only hold indices, so parent and root links never own anything.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{Expansion, MaxLevel, NodeArena, NodeId, WalkerNode};
use crate::domain::cache::{MemoryCache, SharedCache};
use crate::domain::cycle::CycleGuard;
use crate::domain::error::{WalkerError, WalkerResult};
use crate::domain::item::Walkable;
use crate::domain::kind::WalkerKind;
use crate::domain::metadata::Metadata;
use crate::domain::registry::{CountDefinition, Definition, Registry};
use crate::domain::resolver::resolve_type_chain;

pub struct Walker<K: WalkerKind> {
    nodes: NodeArena<K::Item>,
    root: NodeId,
    registry: Registry<K>,
    context: K::Context,
    cache: SharedCache,
    guard: Option<CycleGuard>,
}

/// Configures and builds a root walker.
pub struct WalkerBuilder<K: WalkerKind> {
    item: Option<K::Item>,
    context: Option<K::Context>,
    max_level: MaxLevel,
    cache: Option<SharedCache>,
    guard: Option<CycleGuard>,
}

impl<K: WalkerKind> Default for WalkerBuilder<K> {
    fn default() -> Self {
        Self {
            item: None,
            context: None,
            max_level: MaxLevel::Unbounded,
            cache: None,
            guard: Some(CycleGuard::default()),
        }
    }
}

impl<K: WalkerKind> WalkerBuilder<K> {
    pub fn item(mut self, item: K::Item) -> Self {
        self.item = Some(item);
        self
    }

    pub fn context(mut self, context: K::Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn max_level(mut self, max_level: MaxLevel) -> Self {
        self.max_level = max_level;
        self
    }

    /// Share a type chain cache, e.g. between several walkers.
    pub fn cache(mut self, cache: SharedCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn revisit_budget(mut self, budget: usize) -> Self {
        self.guard = Some(CycleGuard::new(budget));
        self
    }

    /// Expand every node regardless of repeated items. Only safe on acyclic graphs
    /// or with a bounded depth.
    pub fn without_cycle_guard(mut self) -> Self {
        self.guard = None;
        self
    }

    #[instrument(level = "debug", skip(self), fields(kind = K::name(), max_level = %self.max_level))]
    pub fn build(self) -> Walker<K> {
        let mut nodes = NodeArena::new();
        let root = nodes.insert_root(self.item, self.max_level);
        let context = self.context.unwrap_or_default();
        let mut registry = Registry::new();
        K::initialize_definitions(&mut registry, &context);
        debug!(?registry, "walker built");

        Walker {
            nodes,
            root,
            registry,
            context,
            cache: self.cache.unwrap_or_else(MemoryCache::shared),
            guard: self.guard,
        }
    }
}

/// Handle given to a definition while it computes a node's children.
pub struct NodeScope<'a, K: WalkerKind> {
    id: NodeId,
    level: usize,
    max_level: MaxLevel,
    metadata: &'a mut Metadata,
    context: &'a K::Context,
    registry: &'a mut Registry<K>,
}

impl<K: WalkerKind> NodeScope<'_, K> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn max_level(&self) -> MaxLevel {
        self.max_level
    }

    pub fn context(&self) -> &K::Context {
        self.context
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn metadata(&self) -> &Metadata {
        &*self.metadata
    }

    /// Tree-wide registration, visible to every node including this one's children.
    pub fn registry(&mut self) -> &mut Registry<K> {
        &mut *self.registry
    }
}

impl<K: WalkerKind> fmt::Debug for Walker<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Walker")
            .field("kind", &K::name())
            .field("root", &self.root)
            .field("realized", &self.nodes.len())
            .field("registry", &self.registry)
            .field("guard", &self.guard)
            .finish()
    }
}

impl<K: WalkerKind> Walker<K> {
    pub fn builder() -> WalkerBuilder<K> {
        WalkerBuilder::default()
    }

    /// Build a root walker. Omitted context and cache fall back to the
    /// context's default and a fresh in-memory cache.
    pub fn build(
        item: Option<K::Item>,
        context: Option<K::Context>,
        max_level: MaxLevel,
        cache: Option<SharedCache>,
    ) -> Self {
        WalkerBuilder {
            item,
            context,
            max_level,
            cache,
            ..WalkerBuilder::default()
        }
        .build()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> WalkerResult<&WalkerNode<K::Item>> {
        self.nodes.get(id)
    }

    /// Nodes realized so far.
    pub fn nodes(&self) -> &NodeArena<K::Item> {
        &self.nodes
    }

    pub fn item(&self, id: NodeId) -> WalkerResult<Option<&K::Item>> {
        Ok(self.node(id)?.item())
    }

    pub fn parent(&self, id: NodeId) -> WalkerResult<Option<NodeId>> {
        Ok(self.node(id)?.parent())
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.node(id).map(|node| node.root() == id).unwrap_or(false)
    }

    pub fn context(&self) -> &K::Context {
        &self.context
    }

    pub fn cycle_guard(&self) -> Option<&CycleGuard> {
        self.guard.as_ref()
    }

    pub fn registry(&self) -> &Registry<K> {
        &self.registry
    }

    pub fn add_definition<F>(&mut self, type_id: impl Into<String>, definition: F) -> &mut Self
    where
        F: Fn(&K::Item, &mut NodeScope<'_, K>) -> Vec<Option<K::Item>> + 'static,
    {
        self.registry.add_definition(type_id, definition);
        self
    }

    pub fn add_custom_definition<D>(&mut self, type_id: impl Into<String>, definition: D) -> &mut Self
    where
        D: Definition<K> + 'static,
    {
        self.registry.add_custom_definition(type_id, definition);
        self
    }

    pub fn add_count_definition<F>(&mut self, type_id: impl Into<String>, count: F) -> &mut Self
    where
        F: Fn(&K::Item) -> usize + 'static,
    {
        self.registry.add_count_definition(type_id, count);
        self
    }

    /// Ordered dispatch list for `item`, read through the shared cache.
    pub fn type_chain(&self, item: Option<&K::Item>) -> WalkerResult<Vec<String>> {
        let mut cache = self.cache.borrow_mut();
        resolve_type_chain(K::name(), item, &mut *cache)
    }

    /// Handler for `item`, or `DefinitionNotFound` / `NullItem`.
    pub fn definition_for(&self, item: Option<&K::Item>) -> WalkerResult<Rc<dyn Definition<K>>> {
        let item = item.ok_or(WalkerError::NullItem)?;
        let chain = self.type_chain(Some(item))?;
        self.registry
            .definition_for_chain(&chain)
            .ok_or_else(|| WalkerError::DefinitionNotFound {
                type_name: item.type_info().name.to_string(),
            })
    }

    pub fn count_definition_for(
        &self,
        item: Option<&K::Item>,
    ) -> WalkerResult<Option<CountDefinition<K::Item>>> {
        let chain = self.type_chain(item)?;
        Ok(self.registry.count_definition_for_chain(&chain))
    }

    /// Children of `id`, materialized on first call and memoized.
    #[instrument(level = "trace", skip(self))]
    pub fn children(&mut self, id: NodeId) -> WalkerResult<&[NodeId]> {
        if !self.nodes.get(id)?.is_expanded() {
            let children = self.expand(id)?;
            self.nodes.get_mut(id)?.children = Expansion::Expanded(children);
        }
        Ok(self.nodes.get(id)?.realized_children().unwrap_or_default())
    }

    /// Child at `position`, materializing children if needed.
    pub fn child(&mut self, id: NodeId, position: usize) -> WalkerResult<Option<NodeId>> {
        Ok(self.children(id)?.get(position).copied())
    }

    /// Children guarded by `count()`: a zero count yields nothing without
    /// materializing children.
    pub fn iter_children(&mut self, id: NodeId) -> WalkerResult<std::vec::IntoIter<NodeId>> {
        if self.count(id)? == 0 {
            return Ok(Vec::new().into_iter());
        }
        Ok(self.children(id)?.to_vec().into_iter())
    }

    fn expand(&mut self, id: NodeId) -> WalkerResult<Vec<NodeId>> {
        let node = self.nodes.get(id)?;
        let (level, max_level) = (node.level, node.max_level);
        if max_level.is_reached_at(level) {
            trace!(%id, level, %max_level, "depth bound reached");
            return Ok(Vec::new());
        }
        let Some(item) = node.item.clone() else {
            trace!(%id, "absent item never expands");
            return Ok(Vec::new());
        };

        // Visits only count once a handler is known, so a failed lookup can be retried
        let definition = match self.definition_for(Some(&item)) {
            Ok(definition) => definition,
            Err(e) if e.is_not_found() => {
                trace!(%id, "{e}");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        if let Some(guard) = self.guard.as_mut() {
            if !guard.register(&item) {
                debug!(%id, key = %item.item_key(), "cycle guard refused expansion");
                return Ok(Vec::new());
            }
        }
        debug!(%id, type_name = item.type_info().name, level, "expanding");

        let produced = {
            let node = self.nodes.get_mut(id)?;
            let mut scope = NodeScope {
                id,
                level,
                max_level,
                metadata: &mut node.metadata,
                context: &self.context,
                registry: &mut self.registry,
            };
            definition.children(&item, &mut scope)
        };

        // Stopping shows the produced children but bounds them at this level
        let child_max_level = if definition.should_stop_expansion() {
            debug!(%id, level, "definition stopped expansion");
            MaxLevel::Bounded(level)
        } else {
            max_level
        };

        produced
            .into_iter()
            .flatten()
            .map(|child| self.nodes.insert_child(id, child, child_max_level))
            .collect()
    }

    /// Number of children, memoized independently of `children`.
    ///
    /// A registered count definition answers without materializing children.
    #[instrument(level = "trace", skip(self))]
    pub fn count(&mut self, id: NodeId) -> WalkerResult<usize> {
        let node = self.nodes.get(id)?;
        if let Some(count) = node.count.as_expanded() {
            return Ok(*count);
        }

        let count = if node.max_level.is_reached_at(node.level) {
            0
        } else {
            let item = node.item.clone();
            match (self.count_definition_for(item.as_ref())?, item) {
                (Some(counter), Some(item)) => counter(&item),
                _ => self.children(id)?.len(),
            }
        };

        self.nodes.get_mut(id)?.count = Expansion::Expanded(count);
        Ok(count)
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.node(id).map(WalkerNode::is_expanded).unwrap_or(false)
    }

    pub fn is_counted(&self, id: NodeId) -> bool {
        self.node(id).map(WalkerNode::is_counted).unwrap_or(false)
    }

    pub fn add_metadata(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> WalkerResult<&mut Self> {
        self.nodes.get_mut(id)?.metadata.insert(key, value);
        Ok(self)
    }

    /// Whole metadata map of `id`.
    pub fn metadata(&self, id: NodeId) -> WalkerResult<&Metadata> {
        Ok(self.node(id)?.metadata())
    }

    /// Metadata value for `key`, or `default` when unset.
    pub fn metadata_or(&self, id: NodeId, key: &str, default: Value) -> WalkerResult<Value> {
        Ok(self.node(id)?.metadata().get_or(key, default))
    }

    /// Whether the item of `id` equals `item` under the kind's equality.
    pub fn is_item_equal_to(&self, id: NodeId, item: Option<&K::Item>) -> WalkerResult<bool> {
        Ok(Self::items_match(self.node(id)?.item(), item))
    }

    pub(crate) fn items_match(a: Option<&K::Item>, b: Option<&K::Item>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => K::items_equal(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::{ItemKey, TypeInfo};
    use crate::domain::registry::ZeroChildrenDefinition;
    use serde_json::json;
    use std::cell::Cell;

    static FOLDER: TypeInfo = TypeInfo::new("Folder").with_capabilities(&["Container"]);
    static ARCHIVE: TypeInfo = TypeInfo::new("Archive").with_parent(&FOLDER);

    #[derive(Debug, Clone)]
    struct Entry {
        id: u64,
        info: &'static TypeInfo,
    }

    impl Walkable for Entry {
        fn type_info(&self) -> &'static TypeInfo {
            self.info
        }

        fn item_key(&self) -> ItemKey {
            ItemKey(self.id)
        }
    }

    fn folder(id: u64) -> Entry {
        Entry { id, info: &FOLDER }
    }

    struct Folders;

    impl WalkerKind for Folders {
        type Item = Entry;
        type Context = ();

        fn initialize_definitions(registry: &mut Registry<Self>, _context: &()) {
            registry.add_definition("Container", |item: &Entry, _node: &mut NodeScope<'_, Folders>| {
                (1..=2).map(|n| Some(folder(item.id * 10 + n))).collect()
            });
        }
    }

    struct StopOnce {
        stopped: Cell<bool>,
    }

    impl Definition<Folders> for StopOnce {
        fn children(&self, item: &Entry, _node: &mut NodeScope<'_, Folders>) -> Vec<Option<Entry>> {
            self.stopped.set(true);
            vec![Some(folder(item.id * 10 + 1)), None, Some(folder(item.id * 10 + 2))]
        }

        fn should_stop_expansion(&self) -> bool {
            self.stopped.get()
        }
    }

    #[test]
    fn given_capability_handler_when_expanding_then_dispatches_through_tag() {
        let mut walker = Walker::<Folders>::build(Some(folder(1)), None, MaxLevel::Unbounded, None);
        let root = walker.root();

        let children = walker.children(root).unwrap().to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(walker.item(children[1]).unwrap().map(|e| e.id), Some(12));
    }

    #[test]
    fn given_concrete_and_ancestor_handlers_when_resolving_then_concrete_wins() {
        let mut walker = Walker::<Folders>::build(
            Some(Entry { id: 1, info: &ARCHIVE }),
            None,
            MaxLevel::Unbounded,
            None,
        );
        walker.add_custom_definition("Archive", ZeroChildrenDefinition);
        let root = walker.root();

        assert!(walker.children(root).unwrap().is_empty());
        assert!(walker.is_expanded(root));
    }

    #[test]
    fn given_stopping_definition_when_expanding_then_children_bounded_at_parent_level() {
        let mut walker = Walker::<Folders>::build(Some(folder(1)), None, MaxLevel::Bounded(5), None);
        let root = walker.root();
        let first = walker.children(root).unwrap()[0];

        walker.add_custom_definition(
            "Folder",
            StopOnce {
                stopped: Cell::new(false),
            },
        );
        let grandchildren = walker.children(first).unwrap().to_vec();

        assert_eq!(grandchildren.len(), 2, "absent entries are dropped");
        for grandchild in grandchildren {
            let node = walker.node(grandchild).unwrap();
            assert_eq!(node.level(), 2);
            assert_eq!(node.max_level(), MaxLevel::Bounded(1));
            assert_eq!(walker.count(grandchild).unwrap(), 0);
            assert!(walker.children(grandchild).unwrap().is_empty());
        }
        let sibling = walker.children(root).unwrap()[1];
        assert_eq!(walker.node(sibling).unwrap().max_level(), MaxLevel::Bounded(5));
    }

    #[test]
    fn given_no_definition_when_resolving_directly_then_not_found_error() {
        let walker = Walker::<Folders>::build(None, None, MaxLevel::Unbounded, None);
        let orphan = Entry {
            id: 3,
            info: &ZERO_TYPE,
        };

        assert!(matches!(
            walker.definition_for(Some(&orphan)),
            Err(WalkerError::DefinitionNotFound { .. })
        ));
        assert!(matches!(walker.definition_for(None), Err(WalkerError::NullItem)));
    }

    static ZERO_TYPE: TypeInfo = TypeInfo::new("Unregistered");

    #[test]
    fn given_absent_root_when_expanding_then_empty_without_error() {
        let mut walker = Walker::<Folders>::build(None, None, MaxLevel::Unbounded, None);
        let root = walker.root();

        assert!(walker.children(root).unwrap().is_empty());
        assert_eq!(walker.count(root).unwrap(), 0);
    }

    #[test]
    fn given_handler_metadata_when_expanding_then_stored_on_owning_node() {
        let mut walker = Walker::<Folders>::build(Some(folder(1)), None, MaxLevel::Unbounded, None);
        walker.add_definition("Folder", |_item: &Entry, node: &mut NodeScope<'_, Folders>| {
            node.add_metadata("rank", node.level() + 1);
            vec![]
        });
        let root = walker.root();
        walker.children(root).unwrap();

        assert_eq!(walker.metadata(root).unwrap().get("rank"), Some(&json!(1)));
        assert_eq!(
            walker.metadata_or(root, "missing", json!(false)).unwrap(),
            json!(false)
        );
    }
}
