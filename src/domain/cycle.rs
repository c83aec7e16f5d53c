//! Root-owned guard against cyclic object graphs.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::item::{ItemKey, Walkable};

/// Revisits tolerated per item identity before expansion is refused.
pub const DEFAULT_REVISIT_BUDGET: usize = 2;

/// Counts how often each item identity asked to expand anywhere in the tree.
///
/// The first visit is always allowed. Every later visit of the same identity
/// increments its counter; once the counter exceeds the budget the node gets
/// no children.
#[derive(Debug, Clone)]
pub struct CycleGuard {
    budget: usize,
    revisits: HashMap<(&'static str, ItemKey), usize>,
}

impl Default for CycleGuard {
    fn default() -> Self {
        Self::new(DEFAULT_REVISIT_BUDGET)
    }
}

impl CycleGuard {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            revisits: HashMap::new(),
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Record a visit of `item`, returning whether it may expand.
    pub fn register<I: Walkable>(&mut self, item: &I) -> bool {
        let key = (item.type_info().name, item.item_key());
        match self.revisits.get_mut(&key) {
            None => {
                self.revisits.insert(key, 0);
                true
            }
            Some(count) => {
                *count += 1;
                let allowed = *count <= self.budget;
                if !allowed {
                    debug!(type_name = key.0, key = %key.1, revisits = *count, "revisit budget exceeded");
                }
                allowed
            }
        }
    }

    /// Revisits recorded so far for `item`, None if never seen.
    pub fn revisits<I: Walkable>(&self, item: &I) -> Option<usize> {
        self.revisits
            .get(&(item.type_info().name, item.item_key()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::TypeInfo;

    static ITEM: TypeInfo = TypeInfo::new("Item");

    struct Item(u64);

    impl Walkable for Item {
        fn type_info(&self) -> &'static TypeInfo {
            &ITEM
        }

        fn item_key(&self) -> ItemKey {
            ItemKey(self.0)
        }
    }

    #[test]
    fn given_zero_budget_when_revisiting_then_only_first_visit_allowed() {
        let mut guard = CycleGuard::new(0);
        assert!(guard.register(&Item(1)));
        assert!(!guard.register(&Item(1)));
        assert!(guard.register(&Item(2)));
    }

    #[test]
    fn given_budget_when_revisiting_then_allows_budget_revisits() {
        let mut guard = CycleGuard::new(2);
        let allowed: Vec<bool> = (0..5).map(|_| guard.register(&Item(7))).collect();

        assert_eq!(allowed, vec![true, true, true, false, false]);
        assert_eq!(guard.revisits(&Item(7)), Some(4));
        assert_eq!(guard.revisits(&Item(8)), None);
    }
}
