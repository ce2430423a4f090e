use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CarEvalError;

/// Number of model input attributes.
pub const FEATURE_COUNT: usize = 6;

/// One of the six fixed vehicle attributes.
///
/// Variant order is the canonical column order used for CSV files and for the
/// model input vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Buying,
    Maint,
    Doors,
    Persons,
    LugBoot,
    Safety,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Buying,
        Feature::Maint,
        Feature::Doors,
        Feature::Persons,
        Feature::LugBoot,
        Feature::Safety,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Buying => "buying",
            Feature::Maint => "maint",
            Feature::Doors => "doors",
            Feature::Persons => "persons",
            Feature::LugBoot => "lug_boot",
            Feature::Safety => "safety",
        }
    }

    /// Position of this feature in the model input vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Features with a closed label domain resolved by exact or fuzzy match.
    pub fn is_categorical(self) -> bool {
        !matches!(self, Feature::Doors | Feature::Persons)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = CarEvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| CarEvalError::UnknownFeature(s.to_string()))
    }
}
