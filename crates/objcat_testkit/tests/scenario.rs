//! Scenario tests over the eight-item parent/child data set.

use objcat_core::{Accessor, Catalog, CatalogConfig, NullPolicy};
use objcat_testkit::prelude::*;
use std::rc::Rc;

#[test]
fn find_by_name() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);

    let result = catalog.find(NAME, Some(&"ChildIsNull")).unwrap().get_non_null();
    assert_eq!(unique_ids(&result), vec![1, 3]);
}

#[test]
fn find_by_child_type_name() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);

    let result = catalog
        .find(CHILD_TYPE_NAME, Some(&"CommonType"))
        .unwrap()
        .get_non_null();
    assert_eq!(unique_ids(&result), vec![4, 6]);
}

#[test]
fn chained_find_narrows() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);

    let result = catalog
        .find(NAME, Some(&"ChildNotNull"))
        .unwrap()
        .then()
        .find(CHILD_TYPE_NAME, Some(&"CommonType"))
        .unwrap()
        .get_non_null();
    assert_eq!(unique_ids(&result), vec![4, 6]);
}

#[test]
fn missing_value_is_empty_not_error() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);

    let result = catalog.find(CHILD_TYPE_NAME, Some(&"DoesNotExist")).unwrap();
    assert_eq!(result.count(), 0);
    assert!(result.get().is_empty());
    assert!(catalog.first(CHILD_TYPE_NAME, Some(&"DoesNotExist")).unwrap().is_none());
}

#[test]
fn wrong_key_type_is_a_miss() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);

    assert_eq!(catalog.find(NAME, Some(&44i64)).unwrap().count(), 0);
}

#[test]
fn null_child_type_names_need_include_nulls() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);
    assert_eq!(catalog.find_null(CHILD_TYPE_NAME).unwrap().count(), 0);

    catalog
        .add_index_with("child_type_or_null", ParentItem::child_type_name, NullPolicy::IncludeNulls)
        .unwrap();
    let nulls = catalog.find_null("child_type_or_null").unwrap().get_non_null();

    // Parents without a child and children without a type name both land here
    assert_eq!(unique_ids(&nulls), vec![1, 2, 3, 5]);
}

#[test]
fn first_returns_lowest_id() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);

    let hit = catalog.first(CHILD_TYPE_NAME, Some(&"CommonType")).unwrap();
    assert_eq!(hit.map(|p| p.unique_id), Some(4));
}

#[test]
fn child_object_as_key() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);
    catalog.add_index("child", |p: &ParentItem| p.child.clone()).unwrap();

    let target = items[6].child.clone();
    let hits = catalog.find("child", target.as_ref()).unwrap().get_non_null();
    assert_eq!(unique_ids(&hits), vec![7]);
}

#[test]
fn composite_key_from_child() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);
    let child_key = Accessor::new("child_key", |p: &ParentItem| {
        p.child.as_ref().map(ChildItem::key_string)
    });

    let hit = catalog
        .first_by(&child_key, Some(&"Key: 66 | Name: CommonType"))
        .unwrap();
    assert_eq!(hit.map(|p| p.unique_id), Some(6));
    assert_eq!(catalog.keys_by(&child_key).unwrap().len(), 6);
}

#[test]
fn normalized_description() {
    let items = shared(scenario());
    let catalog = Catalog::with_config(items.iter().cloned(), CatalogConfig::new().strong());
    catalog
        .add_normalized_index(
            DESCRIPTION,
            ParentItem::child_description,
            |d: Option<String>| d.map(|d| d.to_uppercase()),
        )
        .unwrap();

    let hits = catalog.find(DESCRIPTION, Some(&"HASUNIQUETYPE")).unwrap().get_non_null();
    assert_eq!(unique_ids(&hits), vec![7, 8]);
    assert_eq!(catalog.find(DESCRIPTION, Some(&"HasUniqueType")).unwrap().count(), 0);
}

#[test]
fn keys_lists_distinct_values() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);

    let mut names: Vec<String> = catalog.keys(NAME).unwrap();
    names.sort();
    assert_eq!(names, vec!["ChildIsNull".to_string(), "ChildNotNull".to_string()]);

    let mut types: Vec<String> = catalog.keys(CHILD_TYPE_NAME).unwrap();
    types.sort();
    assert_eq!(types, vec!["CommonType", "UniqueType1", "UniqueType2"]);
}

#[test]
fn removal_leaves_other_matches() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);

    assert!(catalog.remove(&items[3]));
    let hits = catalog.find(CHILD_TYPE_NAME, Some(&"CommonType")).unwrap().get_non_null();
    assert_eq!(unique_ids(&hits), vec![6]);
    assert_eq!(catalog.items_non_null().len(), 7);
    assert_eq!(catalog.items().len(), 8);
}

#[test]
fn chaotic_performance_matches_scan() {
    let items = shared(chaotic_performance(2_000));
    let catalog = Catalog::new(items.iter().cloned());
    add_parent_indices(&catalog).unwrap();

    let found = catalog.find(DESCRIPTION, Some(&"SemiUniform:Even")).unwrap().get_non_null();
    let scanned: Vec<Rc<ParentItem>> = items
        .iter()
        .filter(|p| p.description.as_deref() == Some("SemiUniform:Even"))
        .cloned()
        .collect();
    assert_eq!(unique_ids(&found), unique_ids(&scanned));

    let unique = catalog.first(CHILD_TYPE_NAME, Some(&"Stuff1999")).unwrap();
    assert_eq!(unique.map(|p| p.unique_id), Some(1999));
}

#[derive(Clone, Copy)]
enum ParentKey {
    Name,
    ChildType,
}

impl AsRef<str> for ParentKey {
    fn as_ref(&self) -> &str {
        match self {
            Self::Name => NAME,
            Self::ChildType => CHILD_TYPE_NAME,
        }
    }
}

#[test]
fn enum_access_keys() {
    let items = shared(scenario());
    let catalog = scenario_catalog(&items);

    let hits = catalog
        .find(ParentKey::Name, Some(&"ChildNotNull"))
        .unwrap()
        .find(ParentKey::ChildType, Some(&"UniqueType2"))
        .unwrap()
        .get_non_null();
    assert_eq!(unique_ids(&hits), vec![8]);
    assert!(catalog.has_index(ParentKey::ChildType));
}
