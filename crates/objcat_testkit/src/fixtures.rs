//! Parent/child fixtures.
//!
//! Two data sets are provided: an eight-item [`scenario`] with hand-picked
//! nulls and collisions, and a [`performance`] set of any size with uniform,
//! semi-uniform, and unique fields. [`apply_chaos`] punches seeded holes
//! into either.

use objcat_core::{Catalog, CatalogConfig, CatalogResult, IndexKey};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

/// Access key of the parent name index in [`scenario_catalog`].
pub const NAME: &str = "name";
/// Access key of the parent description index in [`scenario_catalog`].
pub const DESCRIPTION: &str = "description";
/// Access key of the child type name index in [`scenario_catalog`].
pub const CHILD_TYPE_NAME: &str = "child_type_name";
/// Access key of the child description index in [`scenario_catalog`].
pub const CHILD_DESCRIPTION: &str = "child_description";

/// A child record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildItem {
    /// Child id.
    pub unique_id: i64,
    /// Type name; deliberately nullable.
    pub type_name: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl IndexKey for ChildItem {}

impl ChildItem {
    /// Creates a child.
    pub fn new(unique_id: i64, type_name: Option<&str>, description: Option<&str>) -> Self {
        Self {
            unique_id,
            type_name: type_name.map(str::to_owned),
            description: description.map(str::to_owned),
        }
    }

    /// Renders the child as a composite key string.
    pub fn key_string(&self) -> String {
        format!(
            "Key: {} | Name: {}",
            self.unique_id,
            self.type_name.as_deref().unwrap_or("")
        )
    }
}

/// A parent record with an optional child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentItem {
    /// Parent id.
    pub unique_id: i64,
    /// Name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Id of the child, or -1 without one.
    pub child_id: i64,
    /// The child, if any.
    pub child: Option<ChildItem>,
}

impl ParentItem {
    /// Creates a parent. `child_id` is derived from `child`.
    pub fn new(
        unique_id: i64,
        name: Option<&str>,
        description: Option<&str>,
        child: Option<ChildItem>,
    ) -> Self {
        Self {
            unique_id,
            name: name.map(str::to_owned),
            description: description.map(str::to_owned),
            child_id: child.as_ref().map_or(-1, |c| c.unique_id),
            child,
        }
    }

    /// Returns the parent's name.
    pub fn name(&self) -> Option<String> {
        self.name.clone()
    }

    /// Returns the parent's description.
    pub fn description(&self) -> Option<String> {
        self.description.clone()
    }

    /// Returns the child's type name, if there is a child.
    pub fn child_type_name(&self) -> Option<String> {
        self.child.as_ref().and_then(|c| c.type_name.clone())
    }

    /// Returns the child's description, if there is a child.
    pub fn child_description(&self) -> Option<String> {
        self.child.as_ref().and_then(|c| c.description.clone())
    }
}

/// The eight-item scenario.
///
/// | id | name           | child type name |
/// |----|----------------|-----------------|
/// | 1  | `ChildIsNull`  | (no child)      |
/// | 2  | `ChildNotNull` | `None`          |
/// | 3  | `ChildIsNull`  | (no child)      |
/// | 4  | `ChildNotNull` | `CommonType`    |
/// | 5  | `ChildNotNull` | `None`          |
/// | 6  | `ChildNotNull` | `CommonType`    |
/// | 7  | `ChildNotNull` | `UniqueType1`   |
/// | 8  | `ChildNotNull` | `UniqueType2`   |
pub fn scenario() -> Vec<ParentItem> {
    let child = |id, type_name, description| Some(ChildItem::new(id, type_name, Some(description)));
    vec![
        ParentItem::new(1, Some("ChildIsNull"), Some("Parent1"), None),
        ParentItem::new(2, Some("ChildNotNull"), Some("Parent2"), child(22, None, "NullChildTypeName")),
        ParentItem::new(3, Some("ChildIsNull"), Some("Parent3"), None),
        ParentItem::new(4, Some("ChildNotNull"), Some("Parent4"), child(44, Some("CommonType"), "HasCommonType")),
        ParentItem::new(5, Some("ChildNotNull"), Some("Parent5"), child(55, None, "NullChildTypeName")),
        ParentItem::new(6, Some("ChildNotNull"), Some("Parent6"), child(66, Some("CommonType"), "HasCommonType")),
        ParentItem::new(7, Some("ChildNotNull"), Some("Parent7"), child(77, Some("UniqueType1"), "HasUniqueType")),
        ParentItem::new(8, Some("ChildNotNull"), Some("Parent8"), child(88, Some("UniqueType2"), "HasUniqueType")),
    ]
}

/// A performance data set of `quantity` parents.
///
/// Every parent is named `Uniform`. Even parents are described
/// `SemiUniform:Even` and have a child with no description; odd parents are
/// `SemiUniform:Odd` with child description `Things{i}`. Child type names
/// (`Stuff{i}`) are unique.
pub fn performance(quantity: usize) -> Vec<ParentItem> {
    (0..quantity)
        .map(|i| {
            let id = i as i64;
            let type_name = format!("Stuff{i}");
            if i % 2 == 0 {
                let child = ChildItem::new(-id, Some(&type_name), None);
                ParentItem::new(id, Some("Uniform"), Some("SemiUniform:Even"), Some(child))
            } else {
                let things = format!("Things{i}");
                let child = ChildItem::new(-id, Some(&type_name), Some(&things));
                ParentItem::new(id, Some("Uniform"), Some("SemiUniform:Odd"), Some(child))
            }
        })
        .collect()
}

/// Applies `agent` `rounds` times to items picked by a seeded generator.
///
/// Picks fall in the first `rounds` items, so the same seed always damages
/// the same records.
pub fn apply_chaos<T>(items: &mut [T], rounds: usize, seed: u64, mut agent: impl FnMut(&mut T)) {
    let bound = rounds.min(items.len());
    if bound == 0 {
        return;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..rounds {
        let pick = rng.gen_range(0..bound);
        agent(&mut items[pick]);
    }
}

/// A performance data set with seeded nulls in every indexed field.
pub fn chaotic_performance(quantity: usize) -> Vec<ParentItem> {
    let mut items = performance(quantity);
    apply_chaos(&mut items, quantity / 50, 50, |p| p.description = None);
    apply_chaos(&mut items, quantity / 50, 2, |p| p.name = None);
    apply_chaos(&mut items, quantity / 25, 25, |p| {
        if let Some(child) = p.child.as_mut() {
            child.description = None;
        }
    });
    apply_chaos(&mut items, quantity / 50, 3, |p| {
        p.child = None;
        p.child_id = -1;
    });
    items
}

/// Wraps every item in an `Rc`.
pub fn shared<T>(items: impl IntoIterator<Item = T>) -> Vec<Rc<T>> {
    items.into_iter().map(Rc::new).collect()
}

/// Adds the four parent/child string indices to `catalog`.
pub fn add_parent_indices(catalog: &Catalog<ParentItem>) -> CatalogResult<()> {
    catalog
        .add_index(NAME, ParentItem::name)?
        .add_index(DESCRIPTION, ParentItem::description)?
        .add_index(CHILD_TYPE_NAME, ParentItem::child_type_name)?
        .add_index(CHILD_DESCRIPTION, ParentItem::child_description)?;
    Ok(())
}

/// A strongly-held catalog over `items` with the four parent/child indices.
pub fn scenario_catalog(items: &[Rc<ParentItem>]) -> Catalog<ParentItem> {
    let catalog = Catalog::with_config(items.iter().cloned(), CatalogConfig::new().strong());
    add_parent_indices(&catalog).expect("Fixture access keys are valid");
    catalog
}

/// Returns the unique ids of `items`, in order.
pub fn unique_ids(items: &[Rc<ParentItem>]) -> Vec<i64> {
    items.iter().map(|p| p.unique_id).collect()
}
