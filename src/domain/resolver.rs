//! Type chain resolution with cache integration.

use itertools::Itertools;
use serde_json::Value;
use tracing::{instrument, trace};

use crate::domain::cache::TypeChainCache;
use crate::domain::error::{WalkerError, WalkerResult};
use crate::domain::item::{TypeInfo, Walkable};

const KEY_RESERVED_CHARS: [char; 9] = ['{', '}', '(', ')', '/', '\\', '@', ':', '"'];

/// Cache key for a (walker kind, item type) pair.
///
/// Reserved characters are replaced by `-` so keys stay valid for stores
/// with restricted key alphabets.
pub fn cache_key(kind_name: &str, type_name: &str) -> String {
    format!("{kind_name}_{type_name}").replace(KEY_RESERVED_CHARS, "-")
}

/// Ordered dispatch list: the concrete type, its capability tags, then the
/// same pair for each ancestor. Repeated tags keep their first position.
pub fn compute_type_chain(info: &'static TypeInfo) -> Vec<String> {
    info.lineage()
        .flat_map(|t| std::iter::once(t.name).chain(t.capabilities.iter().copied()))
        .unique()
        .map(str::to_string)
        .collect()
}

/// Resolve the type chain of `item`, reading through `cache`.
///
/// Absent items resolve to an empty chain. A cache hit that does not hold a
/// sequence of strings is reported as corruption.
#[instrument(level = "trace", skip(item, cache))]
pub fn resolve_type_chain<I: Walkable>(
    kind_name: &str,
    item: Option<&I>,
    cache: &mut dyn TypeChainCache,
) -> WalkerResult<Vec<String>> {
    let Some(item) = item else {
        return Ok(Vec::new());
    };
    let info = item.type_info();
    let key = cache_key(kind_name, info.name);

    if let Some(payload) = cache.get(&key) {
        trace!(%key, "type chain cache hit");
        return decode_chain(&key, payload);
    }

    trace!(%key, "type chain cache miss");
    let chain = compute_type_chain(info);
    cache.set(&key, Value::from(chain.clone()));
    Ok(chain)
}

fn decode_chain(key: &str, payload: Value) -> WalkerResult<Vec<String>> {
    serde_json::from_value(payload).map_err(|e| WalkerError::CacheCorrupted {
        key: key.to_string(),
        reason: format!("item class list should be an array of string ({e})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MemoryCache;
    use crate::domain::item::ItemKey;
    use serde_json::json;

    static NODE: TypeInfo = TypeInfo::new("Node").with_capabilities(&["Persistable", "Leaf"]);
    static PAGE: TypeInfo = TypeInfo::new("app/Page")
        .with_capabilities(&["Publishable", "Persistable"])
        .with_parent(&NODE);

    struct Page;

    impl Walkable for Page {
        fn type_info(&self) -> &'static TypeInfo {
            &PAGE
        }

        fn item_key(&self) -> ItemKey {
            ItemKey(1)
        }
    }

    #[test]
    fn given_derived_type_when_computing_chain_then_concrete_first_and_tags_deduplicated() {
        assert_eq!(
            compute_type_chain(&PAGE),
            vec!["app/Page", "Publishable", "Persistable", "Node", "Leaf"]
        );
    }

    #[test]
    fn given_reserved_characters_when_building_key_then_replaced() {
        assert_eq!(cache_key("web::Tree", "app/Page"), "web--Tree_app-Page");
    }

    #[test]
    fn given_absent_item_when_resolving_then_empty_and_cache_untouched() {
        let mut cache = MemoryCache::new();
        let chain = resolve_type_chain::<Page>("kind", None, &mut cache).unwrap();
        assert!(chain.is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn given_miss_when_resolving_then_stores_chain_under_kind_and_type() {
        let mut cache = MemoryCache::new();
        resolve_type_chain("kind", Some(&Page), &mut cache).unwrap();
        assert!(cache.contains_key("kind_app-Page"));
    }

    #[test]
    fn given_hit_when_resolving_then_returns_stored_chain() {
        let mut cache = MemoryCache::new();
        cache.set("kind_app-Page", json!(["Custom"]));

        let chain = resolve_type_chain("kind", Some(&Page), &mut cache).unwrap();
        assert_eq!(chain, vec!["Custom"]);
    }

    #[test]
    fn given_corrupted_hit_when_resolving_then_fails() {
        let mut cache = MemoryCache::new();
        cache.set("kind_app-Page", json!({"not": "a list"}));

        let result = resolve_type_chain("kind", Some(&Page), &mut cache);
        assert!(matches!(result, Err(WalkerError::CacheCorrupted { .. })));
    }
}
