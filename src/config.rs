use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::csv_io::HeaderMode;
use crate::similarity::DEFAULT_CUTOFF;
use crate::{CarEvalError, Result};

/// Runtime configuration for the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Model bundle to load at startup.
    pub artifact_path: PathBuf,
    /// Minimum similarity for accepting an approximate label match.
    pub similarity_cutoff: f64,
    /// Number of rejected rows reported in full after a batch.
    pub rejection_preview: usize,
    /// How the first CSV row is interpreted.
    pub header: HeaderMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("car_bundle.json"),
            similarity_cutoff: DEFAULT_CUTOFF,
            rejection_preview: 10,
            header: HeaderMode::Auto,
        }
    }
}

impl Config {
    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            CarEvalError::Config(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.similarity_cutoff > 0.0 && self.similarity_cutoff <= 1.0) {
            return Err(CarEvalError::Config(format!(
                "similarity_cutoff must be in (0, 1], got {}",
                self.similarity_cutoff
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("car-eval.json");
        fs::write(&path, r#"{"similarity_cutoff": 0.75, "header": "no"}"#).unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.similarity_cutoff, 0.75);
        assert_eq!(cfg.header, HeaderMode::No);
        assert_eq!(cfg.rejection_preview, 10);
        assert_eq!(cfg.artifact_path, PathBuf::from("car_bundle.json"));
    }

    #[test]
    fn cutoff_out_of_range() {
        let cfg = Config {
            similarity_cutoff: 1.5,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(CarEvalError::Config(_))));
    }
}
