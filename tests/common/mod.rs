//! Test hosts shared by the integration tests.
#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use treewalk::domain::{ItemKey, NodeScope, Registry, TypeInfo, Walkable, WalkerKind};

pub static DUMMY: TypeInfo = TypeInfo::new("test::Dummy").with_capabilities(&["test::Named"]);
pub static SPECIAL: TypeInfo = TypeInfo::new("test::Special")
    .with_capabilities(&["test::Marked"])
    .with_parent(&DUMMY);

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Named item with a fresh identity per construction.
#[derive(Debug, Clone, Serialize)]
pub struct Dummy {
    pub name: String,
    #[serde(skip)]
    pub key: u64,
    #[serde(skip)]
    pub info: &'static TypeInfo,
}

impl Dummy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: NEXT_KEY.fetch_add(1, Ordering::Relaxed),
            info: &DUMMY,
        }
    }

    pub fn special(name: impl Into<String>) -> Self {
        Self {
            info: &SPECIAL,
            ..Self::new(name)
        }
    }
}

impl fmt::Display for Dummy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Walkable for Dummy {
    fn type_info(&self) -> &'static TypeInfo {
        self.info
    }

    fn item_key(&self) -> ItemKey {
        ItemKey(self.key)
    }
}

/// `"<name> - child 1"` .. `"<name> - child 3"`
pub fn numbered_children(item: &Dummy) -> Vec<Option<Dummy>> {
    (1..=3)
        .map(|n| Some(Dummy::new(format!("{} - child {n}", item.name))))
        .collect()
}

/// Every named item expands into three numbered children.
pub struct DummyWalker;

impl WalkerKind for DummyWalker {
    type Item = Dummy;
    type Context = ();

    fn initialize_definitions(registry: &mut Registry<Self>, _context: &()) {
        registry.add_definition("test::Named", |item: &Dummy, _node: &mut NodeScope<'_, DummyWalker>| {
            numbered_children(item)
        });
    }
}

/// Like `DummyWalker`, but items with the same name are the same entity.
pub struct ByNameWalker;

impl WalkerKind for ByNameWalker {
    type Item = Dummy;
    type Context = ();

    fn initialize_definitions(registry: &mut Registry<Self>, _context: &()) {
        registry.add_definition("test::Named", |item: &Dummy, _node: &mut NodeScope<'_, ByNameWalker>| {
            numbered_children(item)
        });
    }

    fn items_equal(a: &Dummy, b: &Dummy) -> bool {
        a.name == b.name
    }
}

pub static RING_NODE: TypeInfo = TypeInfo::new("test::RingNode");

/// Node of a ring `0 -> 1 -> .. -> size-1 -> 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RingNode {
    pub id: u64,
    pub size: u64,
}

impl Walkable for RingNode {
    fn type_info(&self) -> &'static TypeInfo {
        &RING_NODE
    }

    fn item_key(&self) -> ItemKey {
        ItemKey(self.id)
    }
}

pub struct RingWalker;

impl WalkerKind for RingWalker {
    type Item = RingNode;
    type Context = ();

    fn initialize_definitions(registry: &mut Registry<Self>, _context: &()) {
        registry.add_definition(RING_NODE.name, |node: &RingNode, _scope: &mut NodeScope<'_, RingWalker>| {
            vec![Some(RingNode {
                id: (node.id + 1) % node.size,
                size: node.size,
            })]
        });
    }
}
