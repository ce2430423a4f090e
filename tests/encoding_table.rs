use std::collections::BTreeMap;

use car_eval::{default_labels, EncodingTable, Feature, LabelMap};

fn labels(pairs: &[(&str, u32)]) -> LabelMap {
    pairs.iter().map(|(l, c)| (l.to_string(), *c)).collect()
}

#[test]
fn empty_mapping_gets_every_default() {
    let table = EncodingTable::build(BTreeMap::new());
    assert!(table.is_complete());
    assert_eq!(table.get(Feature::Doors), Some(&labels(&[("2", 2), ("3", 3), ("4", 4), ("5more", 5)])));
    assert_eq!(table.get(Feature::Persons), Some(&labels(&[("2", 2), ("4", 4), ("more", 5)])));
    assert_eq!(
        table.get(Feature::Buying),
        Some(&labels(&[("low", 1), ("med", 2), ("high", 3), ("vhigh", 4)]))
    );
    assert_eq!(table.get(Feature::Maint), table.get(Feature::Buying));
    assert_eq!(table.get(Feature::LugBoot), Some(&labels(&[("small", 1), ("med", 2), ("big", 3)])));
    assert_eq!(table.get(Feature::Safety), Some(&labels(&[("low", 1), ("med", 2), ("high", 3)])));
}

#[test]
fn present_features_are_left_alone() {
    let mut partial = BTreeMap::new();
    partial.insert(Feature::Buying, labels(&[("cheap", 1), ("pricey", 2)]));
    partial.insert(Feature::Doors, labels(&[("two", 2), ("four", 4)]));

    let mut table = EncodingTable::from_partial(partial);
    let patched = table.fill_defaults();

    assert_eq!(
        patched,
        vec![Feature::Maint, Feature::Persons, Feature::LugBoot, Feature::Safety]
    );
    assert_eq!(table.labels(Feature::Buying), vec!["cheap", "pricey"]);
    assert_eq!(table.labels(Feature::Doors), vec!["two", "four"]);
    let maint: Vec<&str> = default_labels(Feature::Maint).iter().map(|(l, _)| *l).collect();
    assert_eq!(table.labels(Feature::Maint), maint);
}

#[test]
fn fill_is_idempotent() {
    let mut table = EncodingTable::build(BTreeMap::new());
    let before = table.clone();
    assert!(table.fill_defaults().is_empty());
    assert_eq!(table, before);
}
