//! The catalog: a slot registry plus the indices built over it.
//!
//! The catalog owns two registries. The slot registry is an append-only
//! list binding each tracked object to a [`SlotId`]; the index registry maps
//! an access key to a [`ValueIndex`]. Every add and remove fans out to all
//! registered indices, and every new index is backfilled over the live slots
//! before it is registered.
//!
//! # Invariants
//!
//! - Slot ids are dense, append-only, and never reused (not even by `reset`)
//! - An access key names at most one index; the first registration wins
//! - A disposed catalog answers every call with a no-op or an empty result

use crate::change_feed::{Change, ChangeFeed, ChangeListener, ObservableVec, SubscriptionId};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::index::{HashIndex, IndexKey, ValueIndex};
use crate::query::QueryResult;
use crate::slot::Slot;
use crate::stats::{CatalogStats, StatsRecorder};
use crate::types::{NullPolicy, SlotId};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// A named key extractor.
///
/// Accessor-based queries need a stable name to find (or lazily build) their
/// index. The name is supplied explicitly; two accessors with the same name
/// are treated as the same index, and the first one registered wins.
///
/// ```rust,ignore
/// let child_type = Accessor::new("child.type_name", |p: &Parent| {
///     p.child.as_ref().and_then(|c| c.type_name.clone())
/// });
///
/// let hits = catalog.find_by(&child_type, Some(&"CommonType"))?;
/// ```
pub struct Accessor<T, K> {
    name: String,
    extract: Rc<dyn Fn(&T) -> Option<K>>,
}

impl<T, K> Accessor<T, K> {
    /// Creates an accessor named `name`.
    pub fn new<F>(name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&T) -> Option<K> + 'static,
    {
        Self {
            name: name.into(),
            extract: Rc::new(extract),
        }
    }

    /// Returns the accessor's stable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the accessor to an item.
    pub fn extract(&self, item: &T) -> Option<K> {
        (self.extract)(item)
    }
}

impl<T, K> Clone for Accessor<T, K> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            extract: Rc::clone(&self.extract),
        }
    }
}

impl<T, K> fmt::Debug for Accessor<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor").field("name", &self.name).finish()
    }
}

/// Shared catalog state. Query cursors reach it through a `Weak`.
pub(crate) struct CatalogState<T> {
    /// Tracked objects; `slots[i]` has id `base + i`.
    slots: Vec<Slot<T>>,
    /// Id of `slots[0]`. Advances on reset so ids are never reused.
    base: u64,
    /// Access key to index.
    indices: HashMap<String, Box<dyn ValueIndex<T>>>,
    config: CatalogConfig,
    disposed: bool,
    stats: StatsRecorder,
}

impl<T: 'static> CatalogState<T> {
    fn new(config: CatalogConfig) -> Self {
        Self {
            slots: Vec::new(),
            base: 0,
            indices: HashMap::new(),
            config,
            disposed: false,
            stats: StatsRecorder::default(),
        }
    }

    fn next_id(&self) -> SlotId {
        SlotId::new(self.base + self.slots.len() as u64)
    }

    fn slot(&self, id: SlotId) -> Option<&Slot<T>> {
        let offset = id.as_u64().checked_sub(self.base)?;
        self.slots.get(usize::try_from(offset).ok()?)
    }

    /// Returns the object behind `id`, or `None` for tombstones and
    /// ids this catalog never issued.
    pub(crate) fn materialize(&self, id: SlotId) -> Option<Rc<T>> {
        self.slot(id).and_then(Slot::materialize)
    }

    /// Materializes `ids`, one entry per id; `None` means every slot.
    pub(crate) fn materialize_all(&self, ids: Option<&[SlotId]>) -> Vec<Option<Rc<T>>> {
        let items: Vec<Option<Rc<T>>> = match ids {
            Some(ids) => ids.iter().map(|id| self.materialize(*id)).collect(),
            None => self.slots.iter().map(Slot::materialize).collect(),
        };
        let stale = items.iter().filter(|item| item.is_none()).count();
        if stale > 0 {
            self.stats.record_stale(stale as u64);
        }
        items
    }

    /// Returns the first id in `ids` that still materializes. Ids skipped
    /// on the way count as stale reads.
    pub(crate) fn first_live(&self, ids: &[SlotId]) -> Option<Rc<T>> {
        let mut skipped = 0u64;
        let found = ids.iter().find_map(|id| {
            let item = self.materialize(*id);
            if item.is_none() {
                skipped += 1;
            }
            item
        });
        if skipped > 0 {
            self.stats.record_stale(skipped);
        }
        found
    }

    pub(crate) fn slot_ids(&self) -> Vec<SlotId> {
        self.slots.iter().map(Slot::id).collect()
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Looks up `probe` in the index named `access_key`.
    ///
    /// An unregistered key is a miss, not an error.
    pub(crate) fn lookup(
        &self,
        access_key: &str,
        probe: Option<&dyn Any>,
        filter: Option<&[SlotId]>,
    ) -> Vec<SlotId> {
        if self.disposed {
            return Vec::new();
        }
        self.stats.record_lookup();
        match self.indices.get(access_key) {
            Some(index) => index.find(probe, filter),
            None => Vec::new(),
        }
    }

    /// Builds the accessor's index on first use.
    pub(crate) fn ensure_index<K: IndexKey>(&mut self, accessor: &Accessor<T, K>) {
        if self.disposed || self.indices.contains_key(accessor.name()) {
            return;
        }
        let extract = Rc::clone(&accessor.extract);
        let index = HashIndex::direct(
            accessor.name(),
            move |item: &T| extract(item),
            self.config.null_policy,
        );
        self.stats.record_lazy_build();
        debug!(access_key = accessor.name(), "building index on first query");
        self.register(Box::new(index));
    }

    fn add(&mut self, item: &Rc<T>) -> Option<SlotId> {
        if self.disposed {
            return None;
        }
        let id = self.next_id();
        self.slots.push(Slot::new(id, item, self.config.custody));
        for index in self.indices.values_mut() {
            index.insert(item, id);
        }
        trace!(%id, "added");
        Some(id)
    }

    fn remove(&mut self, item: &Rc<T>) -> bool {
        if self.disposed {
            return false;
        }
        let Some(slot) = self.slots.iter_mut().find(|slot| slot.holds(item)) else {
            trace!("remove: item not tracked");
            return false;
        };
        let id = slot.id();
        slot.dispose();
        for index in self.indices.values_mut() {
            index.remove(id);
        }
        trace!(%id, "removed");
        true
    }

    fn has_index(&self, access_key: &str) -> bool {
        self.indices.contains_key(access_key)
    }

    /// Backfills `index` over every live slot and registers it.
    fn register(&mut self, mut index: Box<dyn ValueIndex<T>>) {
        if self.disposed || self.has_index(index.access_key()) {
            return;
        }
        let mut filled = 0u64;
        for slot in &self.slots {
            if let Some(item) = slot.materialize() {
                index.insert(&item, slot.id());
                filled += 1;
            }
        }
        self.stats.record_backfill(filled);
        debug!(
            access_key = index.access_key(),
            kind = ?index.kind(),
            null_policy = ?index.null_policy(),
            backfilled = filled,
            "index registered"
        );
        self.indices.insert(index.access_key().to_owned(), index);
    }

    fn reset(&mut self) {
        for index in self.indices.values_mut() {
            index.clear();
        }
        self.indices.clear();
        for slot in &mut self.slots {
            slot.dispose();
        }
        self.base = self.next_id().as_u64();
        self.slots.clear();
        debug!(next_id = self.base, "catalog reset");
    }
}

impl<T: 'static> ChangeListener<T> for RefCell<CatalogState<T>> {
    fn on_change(&self, change: &Change<T>) {
        let Ok(mut state) = self.try_borrow_mut() else {
            warn!("catalog busy while its source changed; change not mirrored");
            return;
        };
        match change {
            Change::Added(items) => {
                for item in items {
                    state.add(item);
                }
            }
            Change::Removed(items) => {
                for item in items {
                    state.remove(item);
                }
            }
            Change::Reset => state.reset(),
        }
    }
}

/// Subscription to a change feed, held without keeping the feed alive.
struct FeedLink<T> {
    feed: Weak<dyn ChangeFeed<T>>,
    subscription: SubscriptionId,
}

/// An in-memory secondary index over a collection of shared objects.
///
/// Objects are tracked as `Rc<T>` under the configured
/// [`Custody`](crate::Custody). Indices map derived keys to slot ids and are kept in
/// step with [`add`](Self::add) and [`remove`](Self::remove). Queries return
/// a [`QueryResult`] that can be narrowed further and then materialized.
///
/// The catalog is single-threaded (`!Send`, `!Sync`). Mutating an object's
/// indexed field after it was added does not re-index it.
///
/// # Example
///
/// ```rust,ignore
/// let catalog = Catalog::new(parents.iter().cloned());
/// catalog
///     .add_index("name", |p: &Parent| p.name.clone())?
///     .add_index("child_type", |p: &Parent| {
///         p.child.as_ref().and_then(|c| c.type_name.clone())
///     })?;
///
/// let common = catalog
///     .find("name", Some(&"ChildNotNull"))?
///     .find("child_type", Some(&"CommonType"))?
///     .get_non_null();
/// ```
pub struct Catalog<T: 'static> {
    state: Rc<RefCell<CatalogState<T>>>,
    feed: RefCell<Option<FeedLink<T>>>,
}

impl<T: 'static> Catalog<T> {
    /// Creates a catalog over `source` with the default configuration.
    pub fn new(source: impl IntoIterator<Item = Rc<T>>) -> Self {
        Self::with_config(source, CatalogConfig::default())
    }

    /// Creates a catalog over `source`.
    pub fn with_config(source: impl IntoIterator<Item = Rc<T>>, config: CatalogConfig) -> Self {
        let mut state = CatalogState::new(config);
        for item in source {
            state.add(&item);
        }
        debug!(
            items = state.slot_count(),
            custody = %config.custody,
            "catalog created"
        );
        Self {
            state: Rc::new(RefCell::new(state)),
            feed: RefCell::new(None),
        }
    }

    /// Creates a catalog over a source that may contain gaps.
    ///
    /// `None` entries are skipped and consume no slot id.
    pub fn from_nullable(
        source: impl IntoIterator<Item = Option<Rc<T>>>,
        config: CatalogConfig,
    ) -> Self {
        Self::with_config(source.into_iter().flatten(), config)
    }

    /// Creates a catalog that mirrors an observable vector.
    ///
    /// The current items are tracked immediately; later pushes, removals,
    /// and clears are replayed as they happen. See [`attach`](Self::attach)
    /// for changes that arrive while the catalog is busy.
    pub fn observe(source: &Rc<ObservableVec<T>>, config: CatalogConfig) -> Self {
        let catalog = Self::with_config(source.snapshot(), config);
        catalog.attach(source);
        catalog
    }

    /// Subscribes to `feed`, replacing any previous subscription.
    ///
    /// Does nothing on a disposed catalog.
    ///
    /// A change delivered while the catalog is already borrowed, for example
    /// from an accessor that mutates the source during indexing, is logged
    /// and dropped. The catalog then no longer matches its source; call
    /// [`reset`](Self::reset) and re-add to resynchronize.
    pub fn attach<F>(&self, feed: &Rc<F>)
    where
        F: ChangeFeed<T> + 'static,
    {
        if self.is_disposed() {
            return;
        }
        self.detach();
        let listener: Weak<RefCell<CatalogState<T>>> = Rc::downgrade(&self.state);
        let subscription = feed.subscribe(listener);
        let feed: Weak<F> = Rc::downgrade(feed);
        debug!(subscription = subscription.0, "subscribed to change feed");
        *self.feed.borrow_mut() = Some(FeedLink { feed, subscription });
    }

    /// Drops the change feed subscription. Returns false if there was none.
    pub fn detach(&self) -> bool {
        let Some(link) = self.feed.borrow_mut().take() else {
            return false;
        };
        if let Some(feed) = link.feed.upgrade() {
            feed.unsubscribe(link.subscription);
        }
        debug!(subscription = link.subscription.0, "unsubscribed from change feed");
        true
    }

    /// Tracks `item` and indexes it in every registered index.
    ///
    /// Returns the new slot id, or `None` if the catalog is disposed.
    pub fn add(&self, item: &Rc<T>) -> Option<SlotId> {
        self.state.borrow_mut().add(item)
    }

    /// Stops tracking `item`, matched by identity.
    ///
    /// The item's slot becomes a tombstone and its id leaves every index.
    /// Returns false if the item was not tracked. Linear in the slot count.
    ///
    /// An `Rc` added more than once holds one slot per add. Each call drops
    /// only the earliest live one, so the item stays findable until every
    /// slot is removed.
    pub fn remove(&self, item: &Rc<T>) -> bool {
        self.state.borrow_mut().remove(item)
    }

    /// Drops every slot and index. The catalog stays usable.
    pub fn reset(&self) {
        self.state.borrow_mut().reset();
    }

    /// Tears the catalog down. Idempotent.
    ///
    /// Unsubscribes from any change feed, drops every slot and index, and
    /// turns every later call into a no-op or empty result.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        self.detach();
        let mut state = self.state.borrow_mut();
        state.reset();
        state.disposed = true;
        debug!("catalog disposed");
    }

    /// Returns true once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Registers a direct index using the catalog's default null policy.
    ///
    /// Re-registering an existing access key is a no-op.
    pub fn add_index<K, F>(&self, access_key: impl AsRef<str>, accessor: F) -> CatalogResult<&Self>
    where
        K: IndexKey,
        F: Fn(&T) -> Option<K> + 'static,
    {
        let policy = self.config().null_policy;
        self.add_index_with(access_key, accessor, policy)
    }

    /// Registers a direct index with its own null policy.
    pub fn add_index_with<K, F>(
        &self,
        access_key: impl AsRef<str>,
        accessor: F,
        null_policy: NullPolicy,
    ) -> CatalogResult<&Self>
    where
        K: IndexKey,
        F: Fn(&T) -> Option<K> + 'static,
    {
        let access_key = CatalogError::check_access_key(access_key.as_ref())?;
        if self.has_index(access_key) {
            return Ok(self);
        }
        let index = HashIndex::direct(access_key, accessor, null_policy);
        self.state.borrow_mut().register(Box::new(index));
        Ok(self)
    }

    /// Registers a normalized index using the catalog's default null policy.
    ///
    /// Items are filed under `normalizer(accessor(item))`; queries must
    /// probe with already-normalized values.
    pub fn add_normalized_index<R, K, F, N>(
        &self,
        access_key: impl AsRef<str>,
        accessor: F,
        normalizer: N,
    ) -> CatalogResult<&Self>
    where
        K: IndexKey,
        F: Fn(&T) -> Option<R> + 'static,
        N: Fn(Option<R>) -> Option<K> + 'static,
    {
        let policy = self.config().null_policy;
        self.add_normalized_index_with(access_key, accessor, normalizer, policy)
    }

    /// Registers a normalized index with its own null policy.
    pub fn add_normalized_index_with<R, K, F, N>(
        &self,
        access_key: impl AsRef<str>,
        accessor: F,
        normalizer: N,
        null_policy: NullPolicy,
    ) -> CatalogResult<&Self>
    where
        K: IndexKey,
        F: Fn(&T) -> Option<R> + 'static,
        N: Fn(Option<R>) -> Option<K> + 'static,
    {
        let access_key = CatalogError::check_access_key(access_key.as_ref())?;
        if self.has_index(access_key) {
            return Ok(self);
        }
        let index = HashIndex::normalized(access_key, accessor, normalizer, null_policy);
        self.state.borrow_mut().register(Box::new(index));
        Ok(self)
    }

    /// Registers a direct index under the accessor's name.
    pub fn add_accessor<K: IndexKey>(&self, accessor: &Accessor<T, K>) -> CatalogResult<&Self> {
        let extract = Rc::clone(&accessor.extract);
        self.add_index(accessor.name(), move |item: &T| extract(item))
    }

    /// Returns an unconstrained cursor over every slot.
    pub fn query(&self) -> QueryResult<T> {
        QueryResult::unconstrained(Rc::downgrade(&self.state))
    }

    /// Finds the objects whose key under `access_key` equals `value`.
    ///
    /// `None` reads the null bucket. An unregistered key, a value of the
    /// wrong type, or a value with no postings all give an empty result.
    pub fn find<V: Any>(
        &self,
        access_key: impl AsRef<str>,
        value: Option<&V>,
    ) -> CatalogResult<QueryResult<T>> {
        self.query().find(access_key, value)
    }

    /// Finds the objects whose key under `access_key` is `None`.
    pub fn find_null(&self, access_key: impl AsRef<str>) -> CatalogResult<QueryResult<T>> {
        self.query().find_null(access_key)
    }

    /// Finds by accessor, building its index on first use.
    pub fn find_by<K: IndexKey, V: Any>(
        &self,
        accessor: &Accessor<T, K>,
        value: Option<&V>,
    ) -> CatalogResult<QueryResult<T>> {
        self.query().find_by(accessor, value)
    }

    /// Returns the first live object whose key equals `value`.
    pub fn first<V: Any>(
        &self,
        access_key: impl AsRef<str>,
        value: Option<&V>,
    ) -> CatalogResult<Option<Rc<T>>> {
        self.query().first(access_key, value)
    }

    /// Returns the first live object by accessor, building its index on
    /// first use.
    pub fn first_by<K: IndexKey, V: Any>(
        &self,
        accessor: &Accessor<T, K>,
        value: Option<&V>,
    ) -> CatalogResult<Option<Rc<T>>> {
        self.query().first_by(accessor, value)
    }

    /// Returns the distinct non-null keys of type `K` in an index.
    ///
    /// Empty if the index is not registered. Never builds an index.
    pub fn keys<K: IndexKey>(&self, access_key: impl AsRef<str>) -> CatalogResult<Vec<K>> {
        let access_key = CatalogError::check_access_key(access_key.as_ref())?;
        let state = self.state.borrow();
        let keys = match state.indices.get(access_key) {
            Some(index) => index
                .keys_any()
                .into_iter()
                .filter_map(|key| key.downcast_ref::<K>().cloned())
                .collect(),
            None => Vec::new(),
        };
        Ok(keys)
    }

    /// Returns the keys of the accessor's index, if registered.
    pub fn keys_by<K: IndexKey>(&self, accessor: &Accessor<T, K>) -> CatalogResult<Vec<K>> {
        self.keys(accessor.name())
    }

    /// Materializes every slot, `None` for tombstones.
    pub fn items(&self) -> Vec<Option<Rc<T>>> {
        self.query().get()
    }

    /// Materializes every live slot.
    pub fn items_non_null(&self) -> Vec<Rc<T>> {
        self.query().get_non_null()
    }

    /// Returns the number of slots, tombstones included.
    pub fn len(&self) -> usize {
        self.state.borrow().slot_count()
    }

    /// Returns true if no slots exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if an index is registered under `access_key`.
    pub fn has_index(&self, access_key: impl AsRef<str>) -> bool {
        self.state.borrow().has_index(access_key.as_ref())
    }

    /// Returns the registered access keys, sorted.
    pub fn access_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.state.borrow().indices.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns the number of registered indices.
    pub fn index_count(&self) -> usize {
        self.state.borrow().indices.len()
    }

    /// Returns the catalog configuration.
    pub fn config(&self) -> CatalogConfig {
        self.state.borrow().config
    }

    /// Returns a snapshot of the catalog counters.
    pub fn stats(&self) -> CatalogStats {
        self.state.borrow().stats.snapshot()
    }
}

impl<T: 'static> Drop for Catalog<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T: 'static> fmt::Debug for Catalog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Catalog")
            .field("slots", &state.slots.len())
            .field(
                "tombstones",
                &state.slots.iter().filter(|slot| slot.is_tombstone()).count(),
            )
            .field("next_id", &state.next_id())
            .field("indices", &state.indices.len())
            .field("config", &state.config)
            .field("disposed", &state.disposed)
            .finish()
    }
}
