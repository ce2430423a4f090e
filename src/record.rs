use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::feature::{Feature, FEATURE_COUNT};

/// One row of user input before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    values: [String; FEATURE_COUNT],
    /// Optional ground-truth `class` column, carried through untouched.
    pub class: Option<String>,
}

impl RawRecord {
    pub fn new(values: [String; FEATURE_COUNT]) -> Self {
        Self { values, class: None }
    }

    /// Build from CSV cells in canonical column order. The caller has already
    /// checked that there are six or seven cells.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Option<Self> {
        if cells.len() < FEATURE_COUNT {
            return None;
        }
        let mut values: [String; FEATURE_COUNT] = Default::default();
        for (slot, cell) in values.iter_mut().zip(cells.iter()) {
            *slot = cell.as_ref().to_string();
        }
        let class = cells.get(FEATURE_COUNT).map(|c| c.as_ref().to_string());
        Some(Self { values, class })
    }

    pub fn get(&self, feature: Feature) -> &str {
        &self.values[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: impl Into<String>) {
        self.values[feature.index()] = value.into();
    }

    /// Cells in output order: the six features, then `class` when present.
    pub fn cells(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.values.iter().map(String::as_str).collect();
        if let Some(class) = &self.class {
            out.push(class);
        }
        out
    }
}

/// Resolved ordinal codes in canonical feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericRecord {
    codes: [u32; FEATURE_COUNT],
}

impl NumericRecord {
    pub fn new(codes: [u32; FEATURE_COUNT]) -> Self {
        Self { codes }
    }

    pub fn get(&self, feature: Feature) -> u32 {
        self.codes[feature.index()]
    }

    pub fn codes(&self) -> [u32; FEATURE_COUNT] {
        self.codes
    }

    /// Model input vector.
    pub fn to_features(&self) -> [f64; FEATURE_COUNT] {
        self.codes.map(f64::from)
    }
}

impl Serialize for NumericRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for feature in Feature::ALL {
            map.serialize_entry(feature.as_str(), &self.get(feature))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cells_keeps_class_column() {
        let rec = RawRecord::from_cells(&["low", "low", "2", "2", "small", "low", "unacc"]).unwrap();
        assert_eq!(rec.get(Feature::LugBoot), "small");
        assert_eq!(rec.class.as_deref(), Some("unacc"));
        assert_eq!(rec.cells().len(), 7);

        assert!(RawRecord::from_cells(&["low", "low"]).is_none());
    }

    #[test]
    fn numeric_record_serializes_in_column_order() {
        let rec = NumericRecord::new([4, 3, 2, 5, 1, 3]);
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(
            json,
            r#"{"buying":4,"maint":3,"doors":2,"persons":5,"lug_boot":1,"safety":3}"#
        );
    }
}
