use std::cmp::Ordering;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{WalkerError, WalkerResult};
use crate::domain::metadata::Metadata;

/// Handle of a node inside its walker's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "{slot}v{generation}")
    }
}

/// Memoization state of a lazily computed field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Expansion<T> {
    #[default]
    Unexpanded,
    Expanded(T),
}

impl<T> Expansion<T> {
    pub fn is_expanded(&self) -> bool {
        matches!(self, Expansion::Expanded(_))
    }

    pub fn as_expanded(&self) -> Option<&T> {
        match self {
            Expansion::Expanded(value) => Some(value),
            Expansion::Unexpanded => None,
        }
    }
}

/// Depth bound of a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum MaxLevel {
    Bounded(usize),
    #[default]
    Unbounded,
}

impl MaxLevel {
    /// True when a node at `level` must not expand any further.
    pub fn is_reached_at(self, level: usize) -> bool {
        MaxLevel::Bounded(level) >= self
    }

    pub fn as_option(self) -> Option<usize> {
        match self {
            MaxLevel::Bounded(level) => Some(level),
            MaxLevel::Unbounded => None,
        }
    }
}

impl From<usize> for MaxLevel {
    fn from(level: usize) -> Self {
        MaxLevel::Bounded(level)
    }
}

impl From<Option<usize>> for MaxLevel {
    fn from(level: Option<usize>) -> Self {
        level.map_or(MaxLevel::Unbounded, MaxLevel::Bounded)
    }
}

impl PartialEq<usize> for MaxLevel {
    fn eq(&self, other: &usize) -> bool {
        *self == MaxLevel::Bounded(*other)
    }
}

impl PartialOrd<usize> for MaxLevel {
    fn partial_cmp(&self, other: &usize) -> Option<Ordering> {
        Some(self.cmp(&MaxLevel::Bounded(*other)))
    }
}

impl fmt::Display for MaxLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxLevel::Bounded(level) => write!(f, "{level}"),
            MaxLevel::Unbounded => write!(f, "inf"),
        }
    }
}

/// One node of the lazily built tree.
#[derive(Debug)]
pub struct WalkerNode<I> {
    pub(crate) item: Option<I>,
    pub(crate) level: usize,
    pub(crate) max_level: MaxLevel,
    pub(crate) parent: Option<NodeId>,
    pub(crate) root: NodeId,
    pub(crate) children: Expansion<Vec<NodeId>>,
    pub(crate) count: Expansion<usize>,
    pub(crate) metadata: Metadata,
}

impl<I> WalkerNode<I> {
    pub fn item(&self) -> Option<&I> {
        self.item.as_ref()
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn max_level(&self) -> MaxLevel {
        self.max_level
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Children materialized so far, None while unexpanded.
    pub fn realized_children(&self) -> Option<&[NodeId]> {
        self.children.as_expanded().map(Vec::as_slice)
    }

    pub fn is_expanded(&self) -> bool {
        self.children.is_expanded()
    }

    pub fn is_counted(&self) -> bool {
        self.count.is_expanded()
    }
}

/// Arena storage for every node of one walker.
///
/// Nodes are only ever inserted; a node's id stays valid for the walker's lifetime.
#[derive(Debug)]
pub struct NodeArena<I> {
    arena: Arena<WalkerNode<I>>,
    root: Option<NodeId>,
}

impl<I> Default for NodeArena<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> NodeArena<I> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert the root node. Its `root` points to itself.
    #[instrument(level = "trace", skip(self, item))]
    pub fn insert_root(&mut self, item: Option<I>, max_level: MaxLevel) -> NodeId {
        let idx = self.arena.insert_with(|idx| WalkerNode {
            item,
            level: 0,
            max_level,
            parent: None,
            root: NodeId(idx),
            children: Expansion::Unexpanded,
            count: Expansion::Unexpanded,
            metadata: Metadata::default(),
        });
        let id = NodeId(idx);
        self.root = Some(id);
        id
    }

    /// Insert a child of `parent`, one level deeper and sharing its root.
    ///
    /// Does not touch the parent's children list; the engine sets it in one
    /// step once the whole expansion is built.
    #[instrument(level = "trace", skip(self, item))]
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        item: I,
        max_level: MaxLevel,
    ) -> WalkerResult<NodeId> {
        let (level, root) = {
            let parent_node = self.get(parent)?;
            (parent_node.level + 1, parent_node.root)
        };
        let idx = self.arena.insert(WalkerNode {
            item: Some(item),
            level,
            max_level,
            parent: Some(parent),
            root,
            children: Expansion::Unexpanded,
            count: Expansion::Unexpanded,
            metadata: Metadata::default(),
        });
        Ok(NodeId(idx))
    }

    pub fn get(&self, id: NodeId) -> WalkerResult<&WalkerNode<I>> {
        self.arena.get(id.0).ok_or(WalkerError::UnknownNode(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> WalkerResult<&mut WalkerNode<I>> {
        self.arena.get_mut(id.0).ok_or(WalkerError::UnknownNode(id))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of realized nodes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Preorder traversal over the nodes realized so far. Never expands.
    pub fn iter(&self) -> RealizedIter<'_, I> {
        RealizedIter::new(self)
    }

    /// Depth of the realized part of the tree (a lone root has depth 1).
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter()
            .map(|(_, node)| node.level + 1)
            .max()
            .unwrap_or(0)
    }
}

pub struct RealizedIter<'a, I> {
    arena: &'a NodeArena<I>,
    stack: Vec<NodeId>,
}

impl<'a, I> RealizedIter<'a, I> {
    fn new(arena: &'a NodeArena<I>) -> Self {
        let stack = arena.root().into_iter().collect();
        Self { arena, stack }
    }
}

impl<'a, I> Iterator for RealizedIter<'a, I> {
    type Item = (NodeId, &'a WalkerNode<I>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Ok(node) = self.arena.get(current) {
                // Push children in reverse order for left-to-right traversal
                if let Some(children) = node.realized_children() {
                    self.stack.extend(children.iter().rev().copied());
                }
                return Some((current, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_bounded_levels_when_comparing_then_unbounded_is_greatest() {
        assert!(MaxLevel::Unbounded > MaxLevel::Bounded(usize::MAX));
        assert!(MaxLevel::Bounded(3) > 2);
        assert!(MaxLevel::Bounded(3).is_reached_at(3));
        assert!(!MaxLevel::Bounded(3).is_reached_at(2));
        assert!(!MaxLevel::Unbounded.is_reached_at(1_000_000));
    }

    #[test]
    fn given_root_when_inserted_then_points_to_itself() {
        let mut arena = NodeArena::new();
        let root = arena.insert_root(Some("root"), MaxLevel::Unbounded);
        let node = arena.get(root).unwrap();

        assert_eq!(node.root(), root);
        assert_eq!(node.level(), 0);
        assert!(node.parent().is_none());
        assert_eq!(arena.root(), Some(root));
    }

    #[test]
    fn given_child_when_inserted_then_level_increments_and_root_is_shared() {
        let mut arena = NodeArena::new();
        let root = arena.insert_root(Some("root"), MaxLevel::Bounded(4));
        let child = arena.insert_child(root, "child", MaxLevel::Bounded(4)).unwrap();
        let grandchild = arena.insert_child(child, "grandchild", MaxLevel::Bounded(1)).unwrap();

        let node = arena.get(grandchild).unwrap();
        assert_eq!(node.level(), 2);
        assert_eq!(node.root(), root);
        assert_eq!(node.parent(), Some(child));
        assert_eq!(node.max_level(), MaxLevel::Bounded(1));
    }

    #[test]
    fn given_partially_expanded_tree_when_iterating_then_preorder_over_realized_nodes() {
        let mut arena = NodeArena::new();
        let root = arena.insert_root(Some("root"), MaxLevel::Unbounded);
        let a = arena.insert_child(root, "a", MaxLevel::Unbounded).unwrap();
        let b = arena.insert_child(root, "b", MaxLevel::Unbounded).unwrap();
        let a1 = arena.insert_child(a, "a1", MaxLevel::Unbounded).unwrap();
        arena.get_mut(root).unwrap().children = Expansion::Expanded(vec![a, b]);
        arena.get_mut(a).unwrap().children = Expansion::Expanded(vec![a1]);

        let items: Vec<_> = arena
            .iter()
            .filter_map(|(_, node)| node.item().copied())
            .collect();
        assert_eq!(items, vec!["root", "a", "a1", "b"]);
        assert_eq!(arena.depth(), 3);
        assert_eq!(arena.len(), 4);
    }
}
