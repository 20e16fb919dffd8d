//! Benchmark utilities.

#![warn(missing_docs)]

use objcat_core::{Catalog, CatalogConfig, Custody};
use objcat_testkit::{add_parent_indices, shared, ParentItem};
use rand::seq::SliceRandom;
use rand::Rng;
use std::rc::Rc;

/// Data set sizes used across benches.
pub const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// Generate the shared performance data set.
pub fn parents(count: usize) -> Vec<Rc<ParentItem>> {
    shared(objcat_testkit::performance(count))
}

/// Build a catalog over `items` with the four parent/child indices.
pub fn indexed_catalog(items: &[Rc<ParentItem>], custody: Custody) -> Catalog<ParentItem> {
    let catalog = Catalog::with_config(items.iter().cloned(), CatalogConfig::new().custody(custody));
    add_parent_indices(&catalog).expect("Bench access keys are valid");
    catalog
}

/// Pick `count` random unique child type names from the data set.
pub fn random_type_names(items: &[Rc<ParentItem>], count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    items
        .choose_multiple(&mut rng, count)
        .filter_map(|p| p.child_type_name())
        .collect()
}

/// Generate `count` fresh parents with random ids above the data set.
pub fn fresh_parents(base: usize, count: usize) -> Vec<Rc<ParentItem>> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let id = (base + rng.gen_range(0..1_000_000)) as i64;
            Rc::new(ParentItem::new(id, Some("Uniform"), Some("SemiUniform:Fresh"), None))
        })
        .collect()
}
