//! Catalog configuration.

use crate::types::{Custody, NullPolicy};

/// Configuration for building a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    /// How the catalog holds tracked objects.
    pub custody: Custody,

    /// Null policy for indices registered without an explicit one,
    /// including indices built lazily by accessor queries.
    pub null_policy: NullPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            custody: Custody::Weak,
            null_policy: NullPolicy::ExcludeNulls,
        }
    }
}

impl CatalogConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the custody mode.
    #[must_use]
    pub const fn custody(mut self, custody: Custody) -> Self {
        self.custody = custody;
        self
    }

    /// Sets the default null policy.
    #[must_use]
    pub const fn null_policy(mut self, policy: NullPolicy) -> Self {
        self.null_policy = policy;
        self
    }

    /// Holds objects strongly.
    #[must_use]
    pub const fn strong(self) -> Self {
        self.custody(Custody::Strong)
    }

    /// Indexes `None` keys by default.
    #[must_use]
    pub const fn include_nulls(self) -> Self {
        self.null_policy(NullPolicy::IncludeNulls)
    }
}
