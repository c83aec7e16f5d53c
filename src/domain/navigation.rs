//! Sibling navigation and whole-tree search.
//!
//! Every operation here pulls children through the lazy path, so searching
//! materializes the tree down to each node's depth bound.

use tracing::instrument;

use crate::domain::arena::NodeId;
use crate::domain::error::WalkerResult;
use crate::domain::kind::WalkerKind;
use crate::domain::walker::Walker;

impl<K: WalkerKind> Walker<K> {
    /// Position of `id` among its parent's children, None for the root.
    ///
    /// Siblings are matched by item equality, so the first sibling holding an
    /// equal item wins.
    pub fn index(&mut self, id: NodeId) -> WalkerResult<Option<usize>> {
        Ok(self.sibling_position(id)?.map(|(_, position)| position))
    }

    pub fn next(&mut self, id: NodeId) -> WalkerResult<Option<NodeId>> {
        Ok(self
            .sibling_position(id)?
            .and_then(|(siblings, position)| siblings.get(position + 1).copied()))
    }

    pub fn previous(&mut self, id: NodeId) -> WalkerResult<Option<NodeId>> {
        Ok(self.sibling_position(id)?.and_then(|(siblings, position)| {
            position
                .checked_sub(1)
                .and_then(|previous| siblings.get(previous).copied())
        }))
    }

    fn sibling_position(&mut self, id: NodeId) -> WalkerResult<Option<(Vec<NodeId>, usize)>> {
        let node = self.node(id)?;
        let Some(parent) = node.parent() else {
            return Ok(None);
        };
        let item = node.item().cloned();

        let siblings = self.children(parent)?.to_vec();
        let position = siblings.iter().position(|&sibling| {
            self.node(sibling)
                .map(|node| Self::items_match(node.item(), item.as_ref()))
                .unwrap_or(false)
        });
        Ok(position.map(|position| (siblings, position)))
    }

    /// Depth-first search from the root for the node wrapping `item`.
    #[instrument(level = "debug", skip(self, item))]
    pub fn walker_at_item(&mut self, item: &K::Item) -> WalkerResult<Option<NodeId>> {
        let mut stack = vec![self.root()];
        while let Some(current) = stack.pop() {
            if self.is_item_equal_to(current, Some(item))? {
                return Ok(Some(current));
            }
            // Push children in reverse order for left-to-right traversal
            stack.extend(self.children(current)?.iter().rev().copied());
        }
        Ok(None)
    }

    /// Every node, in depth-first order from the root, whose item's type chain
    /// contains `type_id`.
    #[instrument(level = "debug", skip(self))]
    pub fn nodes_of_type(&mut self, type_id: &str) -> WalkerResult<Vec<NodeId>> {
        let mut found = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(current) = stack.pop() {
            let chain = self.type_chain(self.node(current)?.item())?;
            if chain.iter().any(|candidate| candidate == type_id) {
                found.push(current);
            }
            stack.extend(self.children(current)?.iter().rev().copied());
        }
        Ok(found)
    }
}
