//! Catalog statistics.
//!
//! Counters are bumped as the catalog works and read back as a
//! [`CatalogStats`] snapshot:
//!
//! ```rust,ignore
//! let stats = catalog.stats();
//! println!("Lookups: {}", stats.lookups);
//! println!("Lazy builds: {}", stats.lazy_builds);
//! ```

use std::cell::Cell;

/// Snapshot of catalog counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    /// Index lookups performed, including narrowing steps.
    pub lookups: u64,
    /// Indices created on first accessor query.
    pub lazy_builds: u64,
    /// Items indexed while backfilling new indices.
    pub backfilled: u64,
    /// Ids that materialized to nothing during a read, including ids
    /// skipped by `first` lookups.
    pub stale_reads: u64,
}

/// Live counters owned by a catalog.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    lookups: Cell<u64>,
    lazy_builds: Cell<u64>,
    backfilled: Cell<u64>,
    stale_reads: Cell<u64>,
}

fn bump(counter: &Cell<u64>, by: u64) {
    counter.set(counter.get().saturating_add(by));
}

impl StatsRecorder {
    pub(crate) fn record_lookup(&self) {
        bump(&self.lookups, 1);
    }

    pub(crate) fn record_lazy_build(&self) {
        bump(&self.lazy_builds, 1);
    }

    pub(crate) fn record_backfill(&self, items: u64) {
        bump(&self.backfilled, items);
    }

    pub(crate) fn record_stale(&self, ids: u64) {
        bump(&self.stale_reads, ids);
    }

    pub(crate) fn snapshot(&self) -> CatalogStats {
        CatalogStats {
            lookups: self.lookups.get(),
            lazy_builds: self.lazy_builds.get(),
            backfilled: self.backfilled.get(),
            stale_reads: self.stale_reads.get(),
        }
    }
}
