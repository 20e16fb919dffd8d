//! Hash index implementation.

use crate::index::traits::{IndexKey, IndexKind, ValueIndex};
use crate::types::{NullPolicy, SlotId};
use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

type KeyFn<T, K> = Box<dyn Fn(&T) -> Option<K>>;

/// Hash-based index for O(1) equality lookups.
///
/// `HashIndex` maps each derived key to the set of slot ids that produced
/// it. Buckets are removed as soon as they empty, so memory follows live
/// cardinality rather than history. `None` keys land in a separate bucket,
/// and only when the index was built with [`NullPolicy::IncludeNulls`].
///
/// # Example
///
/// ```rust,ignore
/// let mut index = HashIndex::direct("name", |p: &Person| p.name.clone(), NullPolicy::ExcludeNulls);
///
/// index.insert(&alice, SlotId::new(0));
///
/// let ids = index.find(Some(&"Alice" as &dyn Any), None);
/// ```
pub struct HashIndex<T, K: IndexKey> {
    /// Registered name.
    access_key: String,
    /// Direct or normalized.
    kind: IndexKind,
    /// Whether `None` keys are kept.
    null_policy: NullPolicy,
    /// Item to key, normalizer already applied.
    key_fn: KeyFn<T, K>,
    /// Key to slot ids.
    postings: HashMap<K, BTreeSet<SlotId>>,
    /// Slot ids whose key was `None`.
    nulls: BTreeSet<SlotId>,
    /// Slot id to the key it was filed under, for removal.
    assigned: HashMap<SlotId, Option<K>>,
}

impl<T, K: IndexKey> HashIndex<T, K> {
    /// Creates an index keyed directly by `accessor`.
    pub fn direct<F>(access_key: impl Into<String>, accessor: F, null_policy: NullPolicy) -> Self
    where
        F: Fn(&T) -> Option<K> + 'static,
    {
        Self::with_key_fn(access_key, IndexKind::Direct, Box::new(accessor), null_policy)
    }

    /// Creates an index keyed by `normalizer(accessor(item))`.
    pub fn normalized<R, F, N>(
        access_key: impl Into<String>,
        accessor: F,
        normalizer: N,
        null_policy: NullPolicy,
    ) -> Self
    where
        F: Fn(&T) -> Option<R> + 'static,
        N: Fn(Option<R>) -> Option<K> + 'static,
    {
        let key_fn = move |item: &T| normalizer(accessor(item));
        Self::with_key_fn(access_key, IndexKind::Normalized, Box::new(key_fn), null_policy)
    }

    fn with_key_fn(
        access_key: impl Into<String>,
        kind: IndexKind,
        key_fn: KeyFn<T, K>,
        null_policy: NullPolicy,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            kind,
            null_policy,
            key_fn,
            postings: HashMap::new(),
            nulls: BTreeSet::new(),
            assigned: HashMap::new(),
        }
    }

    /// Returns the distinct non-null keys, typed.
    pub fn keys(&self) -> Vec<K> {
        self.postings.keys().cloned().collect()
    }
}

/// Intersects a bucket with an ascending filter, keeping ascending order.
fn intersect(bucket: &BTreeSet<SlotId>, filter: Option<&[SlotId]>) -> Vec<SlotId> {
    match filter {
        None => bucket.iter().copied().collect(),
        Some(filter) if bucket.len() < filter.len() => bucket
            .iter()
            .filter(|id| filter.binary_search(*id).is_ok())
            .copied()
            .collect(),
        Some(filter) => filter
            .iter()
            .filter(|id| bucket.contains(*id))
            .copied()
            .collect(),
    }
}

impl<T, K: IndexKey> ValueIndex<T> for HashIndex<T, K> {
    fn access_key(&self) -> &str {
        &self.access_key
    }

    fn kind(&self) -> IndexKind {
        self.kind
    }

    fn null_policy(&self) -> NullPolicy {
        self.null_policy
    }

    fn insert(&mut self, item: &T, id: SlotId) {
        // Re-filing an id replaces its previous posting
        if self.assigned.contains_key(&id) {
            self.remove(id);
        }

        match (self.key_fn)(item) {
            Some(key) => {
                self.postings.entry(key.clone()).or_default().insert(id);
                self.assigned.insert(id, Some(key));
            }
            None if self.null_policy.includes_nulls() => {
                self.nulls.insert(id);
                self.assigned.insert(id, None);
            }
            None => {}
        }
    }

    fn remove(&mut self, id: SlotId) -> bool {
        match self.assigned.remove(&id) {
            None => false,
            Some(None) => self.nulls.remove(&id),
            Some(Some(key)) => {
                let Some(bucket) = self.postings.get_mut(&key) else {
                    return false;
                };
                let removed = bucket.remove(&id);
                if bucket.is_empty() {
                    self.postings.remove(&key);
                }
                removed
            }
        }
    }

    fn find(&self, probe: Option<&dyn Any>, filter: Option<&[SlotId]>) -> Vec<SlotId> {
        let Some(probe) = probe else {
            return intersect(&self.nulls, filter);
        };
        let Some(key) = K::from_probe(probe) else {
            return Vec::new();
        };
        match self.postings.get(&*key) {
            Some(bucket) => intersect(bucket, filter),
            None => Vec::new(),
        }
    }

    fn keys_any(&self) -> Vec<&dyn Any> {
        self.postings.keys().map(|key| key as &dyn Any).collect()
    }

    fn key_count(&self) -> usize {
        self.postings.len()
    }

    fn len(&self) -> usize {
        self.assigned.len()
    }

    fn clear(&mut self) {
        self.postings.clear();
        self.nulls.clear();
        self.assigned.clear();
    }
}

impl<T, K: IndexKey> fmt::Debug for HashIndex<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashIndex")
            .field("access_key", &self.access_key)
            .field("kind", &self.kind)
            .field("null_policy", &self.null_policy)
            .field("keys", &self.postings.len())
            .field("nulls", &self.nulls.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        name: Option<String>,
        size: u32,
    }

    fn item(name: Option<&str>, size: u32) -> Item {
        Item {
            name: name.map(str::to_owned),
            size,
        }
    }

    fn name_index(policy: NullPolicy) -> HashIndex<Item, String> {
        HashIndex::direct("name", |i: &Item| i.name.clone(), policy)
    }

    fn ids(raw: &[u64]) -> Vec<SlotId> {
        raw.iter().copied().map(SlotId::new).collect()
    }

    #[test]
    fn insert_and_find() {
        let mut index = name_index(NullPolicy::ExcludeNulls);
        index.insert(&item(Some("a"), 1), SlotId::new(0));
        index.insert(&item(Some("b"), 1), SlotId::new(1));
        index.insert(&item(Some("a"), 1), SlotId::new(2));

        assert_eq!(index.find(Some(&"a"), None), ids(&[0, 2]));
        assert_eq!(index.find(Some(&"b".to_string()), None), ids(&[1]));
        assert_eq!(index.key_count(), 2);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn find_missing_is_empty() {
        let mut index = name_index(NullPolicy::ExcludeNulls);
        index.insert(&item(Some("a"), 1), SlotId::new(0));

        assert!(index.find(Some(&"zzz"), None).is_empty());
    }

    #[test]
    fn wrong_probe_type_is_miss() {
        let mut index = name_index(NullPolicy::ExcludeNulls);
        index.insert(&item(Some("7"), 1), SlotId::new(0));

        assert!(index.find(Some(&7i32), None).is_empty());
    }

    #[test]
    fn nulls_excluded_by_default() {
        let mut index = name_index(NullPolicy::ExcludeNulls);
        index.insert(&item(None, 1), SlotId::new(0));

        assert!(index.find(None, None).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn nulls_included_when_requested() {
        let mut index = name_index(NullPolicy::IncludeNulls);
        index.insert(&item(None, 1), SlotId::new(0));
        index.insert(&item(Some("a"), 1), SlotId::new(1));
        index.insert(&item(None, 1), SlotId::new(2));

        assert_eq!(index.find(None, None), ids(&[0, 2]));
        assert_eq!(index.find(None, Some(&ids(&[2, 5]))), ids(&[2]));
        assert_eq!(index.keys(), vec!["a".to_string()]);
    }

    #[test]
    fn filter_intersects() {
        let mut index = name_index(NullPolicy::ExcludeNulls);
        for n in 0..6 {
            index.insert(&item(Some("x"), n), SlotId::new(u64::from(n)));
        }

        assert_eq!(index.find(Some(&"x"), Some(&ids(&[1, 3, 9]))), ids(&[1, 3]));
        assert!(index.find(Some(&"x"), Some(&[])).is_empty());
    }

    #[test]
    fn remove_drops_empty_bucket() {
        let mut index = name_index(NullPolicy::IncludeNulls);
        index.insert(&item(Some("a"), 1), SlotId::new(0));
        index.insert(&item(Some("a"), 1), SlotId::new(1));
        index.insert(&item(None, 1), SlotId::new(2));

        assert!(index.remove(SlotId::new(0)));
        assert_eq!(index.keys(), vec!["a".to_string()]);
        assert!(index.remove(SlotId::new(1)));
        assert!(index.keys().is_empty());
        assert!(index.remove(SlotId::new(2)));
        assert!(index.find(None, None).is_empty());

        assert!(!index.remove(SlotId::new(1)));
        assert!(index.is_empty());
    }

    #[test]
    fn reinsert_moves_posting() {
        let mut index = name_index(NullPolicy::ExcludeNulls);
        index.insert(&item(Some("a"), 1), SlotId::new(0));
        index.insert(&item(Some("b"), 1), SlotId::new(0));

        assert!(index.find(Some(&"a"), None).is_empty());
        assert_eq!(index.find(Some(&"b"), None), ids(&[0]));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn normalized_collapses_equivalent_values() {
        let mut index: HashIndex<Item, String> = HashIndex::normalized(
            "name",
            |i: &Item| i.name.clone(),
            |n: Option<String>| n.map(|n| n.to_uppercase()),
            NullPolicy::ExcludeNulls,
        );
        index.insert(&item(Some("ada"), 1), SlotId::new(0));
        index.insert(&item(Some("Ada"), 1), SlotId::new(1));
        index.insert(&item(Some("ADA"), 1), SlotId::new(2));

        assert_eq!(index.kind(), IndexKind::Normalized);
        assert_eq!(index.find(Some(&"ADA"), None), ids(&[0, 1, 2]));
        assert!(index.find(Some(&"ada"), None).is_empty());
        assert_eq!(index.key_count(), 1);
    }

    #[test]
    fn normalizer_may_change_key_type() {
        let mut index: HashIndex<Item, bool> = HashIndex::normalized(
            "small",
            |i: &Item| Some(i.size),
            |s: Option<u32>| s.map(|s| s < 10),
            NullPolicy::ExcludeNulls,
        );
        index.insert(&item(None, 3), SlotId::new(0));
        index.insert(&item(None, 30), SlotId::new(1));

        assert_eq!(index.find(Some(&true), None), ids(&[0]));
        assert_eq!(index.find(Some(&false), None), ids(&[1]));
    }

    #[test]
    fn keys_any_downcasts() {
        let mut index = name_index(NullPolicy::ExcludeNulls);
        index.insert(&item(Some("a"), 1), SlotId::new(0));

        let keys = index.keys_any();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].downcast_ref::<String>().map(String::as_str), Some("a"));
        assert!(keys[0].downcast_ref::<i32>().is_none());
    }
}
