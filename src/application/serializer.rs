//! Group-selected JSON output of a walker tree.
//!
//! Each group switches on a slice of the node surface:
//!
//! | Group | Fields |
//! |---|---|
//! | `walker` | `item` |
//! | `children` | `children` (recursive) |
//! | `children_count` | `childrenCount` |
//! | `parent` | `parent` (recursive up to the root) |
//! | `walker_level` | `level`, `maxLevel` |
//! | `walker_metadata` | `metadata` |
//! | `walker_index` | `index` |
//!
//! `children` and `parent` together would describe every edge twice and
//! loop forever, so that request is rejected up front.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{NodeId, Walker, WalkerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Walker,
    Children,
    ChildrenCount,
    Parent,
    WalkerLevel,
    WalkerMetadata,
    WalkerIndex,
}

impl Group {
    pub const ALL: [Group; 7] = [
        Group::Walker,
        Group::Children,
        Group::ChildrenCount,
        Group::Parent,
        Group::WalkerLevel,
        Group::WalkerMetadata,
        Group::WalkerIndex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Group::Walker => "walker",
            Group::Children => "children",
            Group::ChildrenCount => "children_count",
            Group::Parent => "parent",
            Group::WalkerLevel => "walker_level",
            Group::WalkerMetadata => "walker_metadata",
            Group::WalkerIndex => "walker_index",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Group::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Group::ALL.iter().map(|g| g.as_str()).collect();
                format!("unknown group '{s}', expected one of: {}", known.join(", "))
            })
    }
}

/// Normalizes walker nodes into JSON values for a fixed set of groups.
#[derive(Debug, Clone)]
pub struct WalkerNormalizer {
    groups: BTreeSet<Group>,
}

impl WalkerNormalizer {
    pub fn new(groups: impl IntoIterator<Item = Group>) -> ApplicationResult<Self> {
        let groups: BTreeSet<Group> = groups.into_iter().collect();
        if groups.contains(&Group::Children) && groups.contains(&Group::Parent) {
            return Err(ApplicationError::ConflictingGroups(
                Group::Children,
                Group::Parent,
            ));
        }
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &BTreeSet<Group> {
        &self.groups
    }

    fn has(&self, group: Group) -> bool {
        self.groups.contains(&group)
    }

    /// Normalize the node `id`, pulling children and counts lazily as the
    /// selected groups require.
    #[instrument(level = "trace", skip(self, walker))]
    pub fn normalize<K>(&self, walker: &mut Walker<K>, id: NodeId) -> ApplicationResult<Value>
    where
        K: WalkerKind,
        K::Item: Serialize,
    {
        let mut out = Map::new();

        if self.has(Group::Walker) {
            out.insert("item".into(), serde_json::to_value(walker.item(id)?)?);
        }
        if self.has(Group::WalkerLevel) {
            let node = walker.node(id)?;
            out.insert("level".into(), Value::from(node.level()));
            out.insert("maxLevel".into(), serde_json::to_value(node.max_level().as_option())?);
        }
        if self.has(Group::WalkerIndex) {
            out.insert("index".into(), serde_json::to_value(walker.index(id)?)?);
        }
        if self.has(Group::ChildrenCount) {
            out.insert("childrenCount".into(), Value::from(walker.count(id)?));
        }
        if self.has(Group::WalkerMetadata) {
            out.insert("metadata".into(), serde_json::to_value(walker.metadata(id)?)?);
        }
        if self.has(Group::Parent) {
            let parent = match walker.parent(id)? {
                Some(parent) => self.normalize(walker, parent)?,
                None => Value::Null,
            };
            out.insert("parent".into(), parent);
        }
        if self.has(Group::Children) {
            let children = walker
                .children(id)?
                .to_vec()
                .into_iter()
                .map(|child| self.normalize(walker, child))
                .collect::<ApplicationResult<Vec<_>>>()?;
            out.insert("children".into(), Value::Array(children));
        }

        Ok(Value::Object(out))
    }

    /// Normalize the whole tree from the root into a pretty JSON string.
    pub fn to_json_string<K>(&self, walker: &mut Walker<K>) -> ApplicationResult<String>
    where
        K: WalkerKind,
        K::Item: Serialize,
    {
        let root = walker.root();
        let value = self.normalize(walker, root)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
