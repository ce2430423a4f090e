//! Per-feature label → ordinal code tables.
//!
//! The artifact may ship a partial mapping (or none at all). `EncodingTable`
//! patches whatever is missing with the fixed defaults below so that every
//! feature has a non-empty label set before the first lookup.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::feature::Feature;

/// Label → code map for a single feature.
pub type LabelMap = BTreeMap<String, u32>;

const PRICE_LEVELS: &[(&str, u32)] = &[("low", 1), ("med", 2), ("high", 3), ("vhigh", 4)];
const DOOR_COUNTS: &[(&str, u32)] = &[("2", 2), ("3", 3), ("4", 4), ("5more", 5)];
const PERSON_COUNTS: &[(&str, u32)] = &[("2", 2), ("4", 4), ("more", 5)];
const BOOT_SIZES: &[(&str, u32)] = &[("small", 1), ("med", 2), ("big", 3)];
const SAFETY_LEVELS: &[(&str, u32)] = &[("low", 1), ("med", 2), ("high", 3)];

/// Fallback label set used when the artifact does not provide one.
pub fn default_labels(feature: Feature) -> &'static [(&'static str, u32)] {
    match feature {
        Feature::Buying | Feature::Maint => PRICE_LEVELS,
        Feature::Doors => DOOR_COUNTS,
        Feature::Persons => PERSON_COUNTS,
        Feature::LugBoot => BOOT_SIZES,
        Feature::Safety => SAFETY_LEVELS,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodingTable {
    maps: BTreeMap<Feature, LabelMap>,
}

impl EncodingTable {
    /// Wrap a partial mapping without applying defaults. Labels are trimmed and
    /// lowercased so exact lookups are case-insensitive.
    pub fn from_partial(partial: BTreeMap<Feature, LabelMap>) -> Self {
        let maps = partial
            .into_iter()
            .map(|(feature, labels)| {
                let labels = labels
                    .into_iter()
                    .map(|(label, code)| (label.trim().to_lowercase(), code))
                    .collect();
                (feature, labels)
            })
            .collect();
        Self { maps }
    }

    /// Build a complete table from a partial mapping.
    pub fn build(partial: BTreeMap<Feature, LabelMap>) -> Self {
        let mut table = Self::from_partial(partial);
        table.fill_defaults();
        table
    }

    /// Insert the default label set for every feature that is absent or has
    /// an empty map. Returns the features that were patched.
    pub fn fill_defaults(&mut self) -> Vec<Feature> {
        let mut patched = Vec::new();
        for feature in Feature::ALL {
            let entry = self.maps.entry(feature).or_default();
            if entry.is_empty() {
                entry.extend(
                    default_labels(feature)
                        .iter()
                        .map(|(label, code)| (label.to_string(), *code)),
                );
                patched.push(feature);
            }
        }
        if !patched.is_empty() {
            let names: Vec<&str> = patched.iter().map(|f| f.as_str()).collect();
            info!(features = ?names, "applied default encodings");
        }
        patched
    }

    pub fn get(&self, feature: Feature) -> Option<&LabelMap> {
        self.maps.get(&feature)
    }

    /// Exact lookup of an already normalized label.
    pub fn code(&self, feature: Feature, label: &str) -> Option<u32> {
        let code = self.maps.get(&feature)?.get(label).copied();
        debug!(%feature, label, ?code, "exact lookup");
        code
    }

    /// Labels of a feature ordered by code, ties broken alphabetically.
    pub fn labels(&self, feature: Feature) -> Vec<&str> {
        let mut pairs: Vec<(&str, u32)> = self
            .maps
            .get(&feature)
            .map(|m| m.iter().map(|(l, c)| (l.as_str(), *c)).collect())
            .unwrap_or_default();
        pairs.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        pairs.into_iter().map(|(l, _)| l).collect()
    }

    /// True when every feature has at least one label.
    pub fn is_complete(&self) -> bool {
        Feature::ALL
            .iter()
            .all(|f| self.maps.get(f).is_some_and(|m| !m.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_sorted_by_code() {
        let table = EncodingTable::build(BTreeMap::new());
        assert_eq!(table.labels(Feature::Buying), vec!["low", "med", "high", "vhigh"]);
        assert_eq!(table.labels(Feature::Doors), vec!["2", "3", "4", "5more"]);
    }

    #[test]
    fn artifact_labels_are_lowercased() {
        let mut partial = BTreeMap::new();
        partial.insert(
            Feature::Safety,
            LabelMap::from([(" LOW ".to_string(), 1), ("High".to_string(), 3)]),
        );
        let table = EncodingTable::build(partial);
        assert_eq!(table.code(Feature::Safety, "low"), Some(1));
        assert_eq!(table.code(Feature::Safety, "high"), Some(3));
        assert_eq!(table.code(Feature::Safety, "med"), None);
    }

    #[test]
    fn empty_map_counts_as_absent() {
        let mut partial = BTreeMap::new();
        partial.insert(Feature::LugBoot, LabelMap::new());
        let mut table = EncodingTable::from_partial(partial);
        assert!(!table.is_complete());
        let patched = table.fill_defaults();
        assert_eq!(patched.len(), 6);
        assert!(table.is_complete());
    }
}
