//! Resolve free-text attribute values to ordinal codes.
//!
//! Categorical features (buying, maint, lug_boot, safety) go through an exact
//! lookup and then an approximate match bounded by the similarity cutoff.
//! Count features (doors, persons) accept their "more" alias or the first run
//! of digits in the value.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::encoding::EncodingTable;
use crate::feature::{Feature, FEATURE_COUNT};
use crate::record::{NumericRecord, RawRecord};
use crate::similarity::{best_match, DEFAULT_CUTOFF};
use crate::{CarEvalError, Result};

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid digit pattern"));

/// Code reported for the open-ended top bucket of doors and persons.
const MORE_CODE: u32 = 5;

pub struct Normalizer<'a> {
    table: &'a EncodingTable,
    cutoff: f64,
}

impl<'a> Normalizer<'a> {
    pub fn new(table: &'a EncodingTable) -> Self {
        Self::with_cutoff(table, DEFAULT_CUTOFF)
    }

    pub fn with_cutoff(table: &'a EncodingTable, cutoff: f64) -> Self {
        Self { table, cutoff }
    }

    /// Resolve `raw` for a feature given by name.
    ///
    /// An unknown name is a caller bug and yields
    /// [`CarEvalError::UnknownFeature`].
    pub fn resolve_named(&self, feature: &str, raw: &str) -> Result<u32> {
        let feature: Feature = feature.parse()?;
        self.resolve(feature, raw)
    }

    pub fn resolve(&self, feature: Feature, raw: &str) -> Result<u32> {
        let value = raw.trim().to_lowercase();
        if feature.is_categorical() {
            return self.categorical(feature, raw, &value);
        }
        match (feature, value.as_str()) {
            (Feature::Doors, "5more") | (Feature::Persons, "more") => Ok(MORE_CODE),
            _ => self.leading_count(feature, raw, &value),
        }
    }

    /// Resolve all six fields, stopping at the first failure.
    pub fn resolve_record(&self, record: &RawRecord) -> Result<NumericRecord> {
        let mut codes = [0u32; FEATURE_COUNT];
        for feature in Feature::ALL {
            codes[feature.index()] = self.resolve(feature, record.get(feature))?;
        }
        Ok(NumericRecord::new(codes))
    }

    fn categorical(&self, feature: Feature, raw: &str, value: &str) -> Result<u32> {
        if let Some(code) = self.table.code(feature, value) {
            return Ok(code);
        }
        let labels = self.table.labels(feature);
        match best_match(value, labels.iter().copied(), self.cutoff) {
            Some((label, score)) => {
                debug!(%feature, raw, label, score, "fuzzy match");
                self.table
                    .code(feature, label)
                    .ok_or_else(|| self.unrecognized(feature, raw))
            }
            None => Err(self.unrecognized(feature, raw)),
        }
    }

    fn leading_count(&self, feature: Feature, raw: &str, value: &str) -> Result<u32> {
        DIGIT_RUN
            .find(value)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or_else(|| self.unrecognized(feature, raw))
    }

    fn unrecognized(&self, feature: Feature, raw: &str) -> CarEvalError {
        CarEvalError::UnrecognizedValue {
            feature: feature.to_string(),
            value: raw.to_string(),
            candidates: self
                .table
                .labels(feature)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}
