//! Index traits and key types.

use crate::types::{NullPolicy, SlotId};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;

/// A key that can be indexed.
///
/// Index keys must be hashable, comparable, and `'static` so that a probe
/// of unknown type can be checked against the index key type at runtime.
/// Implement it for your own key types with an empty impl block:
///
/// ```rust,ignore
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// struct SizeBand { min: u32, max: u32 }
///
/// impl IndexKey for SizeBand {}
/// ```
pub trait IndexKey: Clone + Eq + Hash + fmt::Debug + 'static {
    /// Interprets a lookup probe as a key of this type.
    ///
    /// Returns `None` when the probe has a different type, which callers
    /// treat as a miss.
    fn from_probe(probe: &dyn Any) -> Option<Cow<'_, Self>> {
        probe.downcast_ref::<Self>().map(Cow::Borrowed)
    }
}

impl IndexKey for String {
    fn from_probe(probe: &dyn Any) -> Option<Cow<'_, Self>> {
        if let Some(key) = probe.downcast_ref::<String>() {
            return Some(Cow::Borrowed(key));
        }
        probe
            .downcast_ref::<&'static str>()
            .map(|key| Cow::Owned((*key).to_owned()))
    }
}

macro_rules! impl_index_key {
    ($($ty:ty),* $(,)?) => {
        $(impl IndexKey for $ty {})*
    };
}

impl_index_key!(
    &'static str,
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    Vec<u8>,
);

/// How an index derives its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// The accessor output is the key.
    Direct,
    /// The accessor output is passed through a normalizer first.
    Normalized,
}

/// Core index trait, erased over the key type.
///
/// The catalog stores indices of different key types side by side through
/// this trait. Probes arrive as `&dyn Any` and are matched against the key
/// type with [`IndexKey::from_probe`].
pub trait ValueIndex<T> {
    /// Returns the name the index is registered under.
    fn access_key(&self) -> &str;

    /// Returns how the index derives keys.
    fn kind(&self) -> IndexKind;

    /// Returns the index's null policy.
    fn null_policy(&self) -> NullPolicy;

    /// Indexes `item` under `id`.
    fn insert(&mut self, item: &T, id: SlotId);

    /// Drops `id` from the index. Returns true if it was present.
    fn remove(&mut self, id: SlotId) -> bool;

    /// Looks up the ids stored under `probe`.
    ///
    /// A `None` probe reads the null bucket. When `filter` is given the
    /// result is its intersection with the bucket. `filter` must be sorted
    /// ascending; results are always ascending.
    fn find(&self, probe: Option<&dyn Any>, filter: Option<&[SlotId]>) -> Vec<SlotId>;

    /// Returns every distinct non-null key currently present.
    fn keys_any(&self) -> Vec<&dyn Any>;

    /// Returns the number of distinct non-null keys.
    fn key_count(&self) -> usize;

    /// Returns the number of indexed ids, null bucket included.
    fn len(&self) -> usize;

    /// Returns true if no ids are indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every posting.
    fn clear(&mut self);
}
