//! termtree rendering of a walker.
//!
//! Rendering pulls children lazily, so the printed tree is exactly what the
//! walker materializes under its depth bound and cycle guard.

use std::fmt;

use termtree::Tree;
use tracing::instrument;

use crate::domain::{NodeId, Walker, WalkerKind, WalkerNode, WalkerResult};

pub trait TreeNodeConvert {
    fn to_tree_string(&mut self) -> WalkerResult<Tree<String>>;
}

impl<K> TreeNodeConvert for Walker<K>
where
    K: WalkerKind,
    K::Item: fmt::Display,
{
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&mut self) -> WalkerResult<Tree<String>> {
        let root = self.root();
        build_tree(self, root, &|node: &WalkerNode<K::Item>| match node.item() {
            Some(item) => item.to_string(),
            None => "(none)".to_string(),
        })
    }
}

/// Render the subtree under `id` with a custom label per node.
pub fn build_tree<K, F>(walker: &mut Walker<K>, id: NodeId, label: &F) -> WalkerResult<Tree<String>>
where
    K: WalkerKind,
    F: Fn(&WalkerNode<K::Item>) -> String,
{
    let mut tree = Tree::new(label(walker.node(id)?));
    for child in walker.children(id)?.to_vec() {
        tree.push(build_tree(walker, child, label)?);
    }
    Ok(tree)
}
