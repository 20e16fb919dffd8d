//! Property tests for catalog invariants.

use objcat_core::{Catalog, CatalogConfig, NullPolicy, SlotId};
use objcat_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::rc::Rc;

const GROUPS: std::ops::Range<u8> = 0..6;
const LABELS: [&str; 6] = ["A", "B", "AA", "AB", "BA", "BB"];

fn serials(items: &[Rc<Record>]) -> Vec<usize> {
    items.iter().map(|r| r.serial).collect()
}

fn strong_catalog(items: &[Rc<Record>]) -> Catalog<Record> {
    Catalog::with_config(items.iter().cloned(), CatalogConfig::new().strong())
}

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn add_index_is_idempotent(records in records_strategy(40)) {
        let items = shared(records);
        let catalog = strong_catalog(&items);
        catalog
            .add_index("group", Record::group)
            .unwrap()
            .add_index("group", |r: &Record| r.group.map(|g| g + 1))
            .unwrap();

        prop_assert_eq!(catalog.index_count(), 1);
        for g in GROUPS {
            let found = catalog.find("group", Some(&g)).unwrap().get_non_null();
            let expected: Vec<usize> = items
                .iter()
                .filter(|r| r.group == Some(g))
                .map(|r| r.serial)
                .collect();
            prop_assert_eq!(serials(&found), expected);
        }
    }

    #[test]
    fn adds_and_removes_track_a_model((records, ops) in ops_strategy(20)) {
        let items = shared(records);
        let catalog = strong_catalog(&[]);
        catalog.add_index("group", Record::group).unwrap();
        let mut model: Vec<Rc<Record>> = Vec::new();

        for op in ops {
            match op {
                CatalogOp::Add(i) => {
                    catalog.add(&items[i]);
                    model.push(Rc::clone(&items[i]));
                }
                CatalogOp::Remove(i) => {
                    let pos = model.iter().position(|held| Rc::ptr_eq(held, &items[i]));
                    prop_assert_eq!(catalog.remove(&items[i]), pos.is_some());
                    if let Some(pos) = pos {
                        model.remove(pos);
                    }
                }
            }
        }

        for g in GROUPS {
            let found = catalog.find("group", Some(&g)).unwrap().get_non_null();
            let expected: Vec<Rc<Record>> = model
                .iter()
                .filter(|r| r.group == Some(g))
                .cloned()
                .collect();
            prop_assert_eq!(found.len(), expected.len());
            for (a, b) in found.iter().zip(&expected) {
                prop_assert!(Rc::ptr_eq(a, b));
            }
        }
        prop_assert_eq!(catalog.items_non_null().len(), model.len());
    }

    #[test]
    fn removed_ids_leave_every_index((records, ops) in ops_strategy(15)) {
        let items = shared(records);
        let catalog = strong_catalog(&items);
        catalog
            .add_index_with("group", Record::group, NullPolicy::IncludeNulls)
            .unwrap()
            .add_index_with("flag", Record::flag, NullPolicy::IncludeNulls)
            .unwrap();

        let mut removed: BTreeSet<SlotId> = BTreeSet::new();
        for op in ops {
            if let CatalogOp::Remove(i) = op {
                if catalog.remove(&items[i]) {
                    removed.insert(SlotId::new(i as u64));
                }
            }
        }

        let mut seen: BTreeSet<SlotId> = BTreeSet::new();
        for g in GROUPS {
            seen.extend(catalog.find("group", Some(&g)).unwrap().ids());
        }
        seen.extend(catalog.find_null("group").unwrap().ids());
        for flag in [true, false] {
            seen.extend(catalog.find("flag", Some(&flag)).unwrap().ids());
        }
        seen.extend(catalog.find_null("flag").unwrap().ids());

        prop_assert!(seen.is_disjoint(&removed));
        for (i, item) in items.iter().enumerate() {
            let tracked = catalog.items_non_null().iter().any(|held| Rc::ptr_eq(held, item));
            prop_assert_eq!(tracked, !removed.contains(&SlotId::new(i as u64)));
        }
    }

    #[test]
    fn null_policy_governs_null_bucket(records in records_strategy(40)) {
        let items = shared(records);
        let catalog = strong_catalog(&items);
        catalog
            .add_index_with("excluded", Record::group, NullPolicy::ExcludeNulls)
            .unwrap()
            .add_index_with("included", Record::group, NullPolicy::IncludeNulls)
            .unwrap();

        prop_assert_eq!(catalog.find_null("excluded").unwrap().count(), 0);
        prop_assert_eq!(catalog.find("excluded", None::<&u8>).unwrap().count(), 0);

        let nulls = catalog.find_null("included").unwrap().get_non_null();
        let expected: Vec<usize> = items
            .iter()
            .filter(|r| r.group.is_none())
            .map(|r| r.serial)
            .collect();
        prop_assert_eq!(serials(&nulls), expected);
    }

    #[test]
    fn narrowing_equals_intersection(
        records in records_strategy(40),
        g in 0u8..6,
        flag in any::<bool>(),
    ) {
        let items = shared(records);
        let catalog = strong_catalog(&items);
        catalog
            .add_index("group", Record::group)
            .unwrap()
            .add_index("flag", Record::flag)
            .unwrap();

        let by_group: BTreeSet<SlotId> = catalog.find("group", Some(&g)).unwrap().ids().into_iter().collect();
        let by_flag: BTreeSet<SlotId> = catalog.find("flag", Some(&flag)).unwrap().ids().into_iter().collect();
        let expected: Vec<SlotId> = by_group.intersection(&by_flag).copied().collect();

        let forward = catalog.find("group", Some(&g)).unwrap().find("flag", Some(&flag)).unwrap();
        let backward = catalog.find("flag", Some(&flag)).unwrap().find("group", Some(&g)).unwrap();
        prop_assert_eq!(forward.ids(), expected.clone());
        prop_assert_eq!(backward.ids(), expected);
    }

    #[test]
    fn normalized_find_matches_filter(records in records_strategy(40)) {
        let items = shared(records);
        let catalog = strong_catalog(&items);
        catalog
            .add_normalized_index("label", Record::label, |l: Option<String>| {
                l.map(|l| l.to_uppercase())
            })
            .unwrap();

        for key in LABELS {
            let found = catalog.find("label", Some(&key)).unwrap().get_non_null();
            let expected: Vec<usize> = items
                .iter()
                .filter(|r| r.label.as_ref().map(|l| l.to_uppercase()).as_deref() == Some(key))
                .map(|r| r.serial)
                .collect();
            prop_assert_eq!(serials(&found), expected);
        }
    }

    #[test]
    fn weak_custody_never_fails(
        records in records_strategy(40),
        keep in prop::collection::vec(any::<bool>(), 40),
    ) {
        let items = shared(records);
        let catalog = Catalog::new(items.iter().cloned());
        catalog.add_index("group", Record::group).unwrap();

        let survivors: Vec<Rc<Record>> = items
            .into_iter()
            .zip(&keep)
            .filter(|(_, keep)| **keep)
            .map(|(item, _)| item)
            .collect();

        for g in GROUPS {
            let result = catalog.find("group", Some(&g)).unwrap();
            let all = result.get();
            prop_assert_eq!(all.len(), result.count());
            let live: Vec<usize> = all.into_iter().flatten().map(|r| r.serial).collect();
            let expected: Vec<usize> = survivors
                .iter()
                .filter(|r| r.group == Some(g))
                .map(|r| r.serial)
                .collect();
            prop_assert_eq!(live, expected);
        }
    }
}

proptest! {
    #![proptest_config(PropTestConfig::thorough().to_proptest_config())]

    #[test]
    fn normalized_index_keeps_first_normalizer(records in records_strategy(24)) {
        let items = shared(records);
        let catalog = strong_catalog(&items);
        catalog
            .add_normalized_index("label", Record::label, |l: Option<String>| {
                l.map(|l| l.to_lowercase())
            })
            .unwrap()
            .add_normalized_index("label", Record::label, |l: Option<String>| {
                l.map(|l| format!("#{l}"))
            })
            .unwrap();

        prop_assert_eq!(catalog.index_count(), 1);
        for label in LABELS {
            let lowered = label.to_lowercase();
            let found = catalog.find("label", Some(&lowered)).unwrap().get_non_null();
            let expected: Vec<usize> = items
                .iter()
                .filter(|r| r.label.as_deref().map(str::to_lowercase) == Some(lowered.clone()))
                .map(|r| r.serial)
                .collect();
            prop_assert_eq!(serials(&found), expected);

            let marked = format!("#{label}");
            prop_assert_eq!(catalog.find("label", Some(&marked)).unwrap().count(), 0);
        }
    }
}
