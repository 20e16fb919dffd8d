//! Property-based test generators using proptest.
//!
//! Keys are drawn from small domains with a share of `None`, so generated
//! collections always contain collisions and null keys worth indexing.

use proptest::prelude::*;

/// A generated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Position in the generated batch. Unique within a batch.
    pub serial: usize,
    /// Small-domain integer key, sometimes absent.
    pub group: Option<u8>,
    /// Mixed-case label, sometimes absent.
    pub label: Option<String>,
    /// Boolean key, sometimes absent.
    pub flag: Option<bool>,
}

impl Record {
    /// Returns the group key.
    pub fn group(&self) -> Option<u8> {
        self.group
    }

    /// Returns the label key.
    pub fn label(&self) -> Option<String> {
        self.label.clone()
    }

    /// Returns the flag key.
    pub fn flag(&self) -> Option<bool> {
        self.flag
    }
}

/// A step in a generated mutation sequence.
#[derive(Debug, Clone)]
pub enum CatalogOp {
    /// Add the record at this position of the batch.
    Add(usize),
    /// Remove the record at this position of the batch.
    Remove(usize),
}

/// Strategy for group keys in `0..6`, absent one time in five.
pub fn group_strategy() -> impl Strategy<Value = Option<u8>> {
    prop::option::weighted(0.8, 0u8..6)
}

/// Strategy for short labels whose case varies.
pub fn label_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::weighted(
        0.8,
        prop::string::string_regex("[abAB]{1,2}").expect("Invalid regex"),
    )
}

/// Strategy for flag keys.
pub fn flag_strategy() -> impl Strategy<Value = Option<bool>> {
    prop::option::weighted(0.9, any::<bool>())
}

/// Strategy for a batch of up to `max` records.
pub fn records_strategy(max: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((group_strategy(), label_strategy(), flag_strategy()), 0..=max).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(serial, (group, label, flag))| Record {
                    serial,
                    group,
                    label,
                    flag,
                })
                .collect()
        },
    )
}

/// Strategy for a batch plus a mutation sequence over it.
pub fn ops_strategy(max: usize) -> impl Strategy<Value = (Vec<Record>, Vec<CatalogOp>)> {
    records_strategy(max)
        .prop_filter("Need at least one record", |records| !records.is_empty())
        .prop_flat_map(|records| {
            let len = records.len();
            let op = prop_oneof![
                (0..len).prop_map(CatalogOp::Add),
                (0..len).prop_map(CatalogOp::Remove),
            ];
            (Just(records), prop::collection::vec(op, 0..(len * 3)))
        })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
