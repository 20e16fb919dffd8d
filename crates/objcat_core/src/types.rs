//! Core type definitions for objcat.

use std::fmt;

/// Stable identifier for a catalog slot.
///
/// Slot IDs are assigned densely in insertion order, are immutable, and are
/// never reused: a removed slot keeps its ID and materializes to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u64);

impl SlotId {
    /// Creates a new slot ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot:{}", self.0)
    }
}

/// Whether the catalog's hold on an object keeps it alive.
///
/// `Weak` is the default and is recommended unless the catalog is the only
/// owner of the data. Under `Weak` custody an object dropped by every other
/// owner simply materializes to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Custody {
    /// The catalog holds an `Rc`, preventing reclamation.
    Strong,
    /// The catalog holds an `rc::Weak`, allowing reclamation.
    #[default]
    Weak,
}

impl fmt::Display for Custody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong => f.write_str("strong"),
            Self::Weak => f.write_str("weak"),
        }
    }
}

/// Whether a `None` derived key is indexed.
///
/// `ExcludeNulls` is right for most indices. `IncludeNulls` collects the
/// objects whose key resolved to `None` into a dedicated bucket that can be
/// queried with a `None` probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NullPolicy {
    /// `None` keys are skipped.
    #[default]
    ExcludeNulls,
    /// `None` keys go to the null bucket.
    IncludeNulls,
}

impl NullPolicy {
    /// Returns true if `None` keys are indexed.
    #[must_use]
    pub const fn includes_nulls(self) -> bool {
        matches!(self, Self::IncludeNulls)
    }
}
