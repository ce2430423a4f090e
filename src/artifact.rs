//! Model bundle loading and schema validation.
//!
//! An artifact holds the trained classifier plus its auxiliary objects: an
//! optional feature scaler, an optional class-label decoder and a (possibly
//! partial) feature → label → code mapping. Artifacts are stored either as
//! JSON (`.json`) or in packed bincode form (any other extension).
//!
//! Everything is checked once at load time; a file that decodes but does not
//! match the schema is rejected with [`CarEvalError::IncompatibleArtifact`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::encoding::LabelMap;
use crate::feature::Feature;
use crate::model::{LabelDecoder, Model, Predictor, Scaler};
use crate::{CarEvalError, Result};

/// Schema version understood by this build.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk layout of an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactFile {
    pub format_version: u32,
    pub model: Model,
    #[serde(default)]
    pub ordinal_mapping: BTreeMap<String, BTreeMap<String, i64>>,
    #[serde(default)]
    pub label_classes: Option<Vec<String>>,
    #[serde(default)]
    pub scaler: Option<Scaler>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Bincode,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ArtifactFormat::Json,
            _ => ArtifactFormat::Bincode,
        }
    }
}

/// Optional capabilities, decided once at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtifactCapabilities {
    pub has_scaler: bool,
    pub has_label_decoder: bool,
}

/// A validated artifact.
#[derive(Debug, Clone)]
pub struct Artifact {
    model: Model,
    mapping: BTreeMap<Feature, LabelMap>,
    decoder: Option<LabelDecoder>,
    scaler: Option<Scaler>,
    fingerprint: String,
}

impl Artifact {
    /// Read, decode and validate an artifact file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| CarEvalError::MissingArtifact {
            path: path.display().to_string(),
            source,
        })?;
        let artifact = Self::from_bytes(&bytes, ArtifactFormat::from_path(path))?;
        info!(
            path = %path.display(),
            model = artifact.model.kind(),
            fingerprint = %artifact.fingerprint,
            has_scaler = artifact.capabilities().has_scaler,
            has_label_decoder = artifact.capabilities().has_label_decoder,
            "loaded artifact"
        );
        Ok(artifact)
    }

    pub fn from_bytes(bytes: &[u8], format: ArtifactFormat) -> Result<Self> {
        let file: ArtifactFile = match format {
            ArtifactFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| CarEvalError::IncompatibleArtifact(format!("invalid JSON artifact: {e}")))?,
            ArtifactFormat::Bincode => bincode::deserialize(bytes)
                .map_err(|e| CarEvalError::IncompatibleArtifact(format!("invalid packed artifact: {e}")))?,
        };
        Self::from_file(file, hex::encode(Sha256::digest(bytes)))
    }

    /// Validate a decoded artifact.
    pub fn from_file(file: ArtifactFile, fingerprint: String) -> Result<Self> {
        if file.format_version != FORMAT_VERSION {
            return Err(CarEvalError::IncompatibleArtifact(format!(
                "format_version {} is not supported (expected {FORMAT_VERSION})",
                file.format_version
            )));
        }
        file.model.validate()?;
        if let Some(scaler) = &file.scaler {
            scaler.validate()?;
        }

        let decoder = match file.label_classes {
            Some(classes) => {
                if classes.len() < file.model.n_classes() {
                    return Err(CarEvalError::IncompatibleArtifact(format!(
                        "label_classes has {} entries but the model emits {} classes",
                        classes.len(),
                        file.model.n_classes()
                    )));
                }
                Some(LabelDecoder::new(classes))
            }
            None => None,
        };

        let mut mapping = BTreeMap::new();
        for (name, labels) in file.ordinal_mapping {
            let feature: Feature = name.parse().map_err(|_| {
                CarEvalError::IncompatibleArtifact(format!("ordinal_mapping has unknown feature '{name}'"))
            })?;
            let mut checked = LabelMap::new();
            let mut seen = BTreeSet::new();
            for (label, code) in labels {
                // lookups are case-insensitive, so these labels would shadow each other
                if !seen.insert(label.trim().to_lowercase()) {
                    return Err(CarEvalError::IncompatibleArtifact(format!(
                        "ordinal_mapping for {feature} has labels that differ only in case or padding ('{label}')"
                    )));
                }
                let code = u32::try_from(code).ok().filter(|c| *c > 0).ok_or_else(|| {
                    CarEvalError::IncompatibleArtifact(format!(
                        "code {code} for {feature}/{label} is not a positive integer"
                    ))
                })?;
                checked.insert(label, code);
            }
            mapping.insert(feature, checked);
        }

        Ok(Self {
            model: file.model,
            mapping,
            decoder,
            scaler: file.scaler,
            fingerprint,
        })
    }

    /// Back to the on-disk layout.
    pub fn to_file(&self) -> ArtifactFile {
        ArtifactFile {
            format_version: FORMAT_VERSION,
            model: self.model.clone(),
            ordinal_mapping: self
                .mapping
                .iter()
                .map(|(f, labels)| {
                    let labels = labels.iter().map(|(l, c)| (l.clone(), i64::from(*c))).collect();
                    (f.as_str().to_string(), labels)
                })
                .collect(),
            label_classes: self.decoder.as_ref().map(|d| {
                (0..d.len())
                    .filter_map(|i| d.decode(i).ok().map(str::to_string))
                    .collect()
            }),
            scaler: self.scaler.clone(),
        }
    }

    pub fn capabilities(&self) -> ArtifactCapabilities {
        ArtifactCapabilities {
            has_scaler: self.scaler.is_some(),
            has_label_decoder: self.decoder.is_some(),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn predictor(&self) -> &dyn Predictor {
        &self.model
    }

    /// Partial mapping as shipped, before defaults.
    pub fn mapping(&self) -> &BTreeMap<Feature, LabelMap> {
        &self.mapping
    }

    pub fn decoder(&self) -> Option<&LabelDecoder> {
        self.decoder.as_ref()
    }

    pub fn scaler(&self) -> Option<&Scaler> {
        self.scaler.as_ref()
    }

    /// Hex SHA-256 of the artifact bytes.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Validate a JSON artifact and write it in packed bincode form.
pub fn pack_artifact<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<Artifact> {
    let artifact = Artifact::load(input)?;
    let bytes = bincode::serialize(&artifact.to_file())?;
    fs::write(output.as_ref(), &bytes)?;
    info!(
        path = %output.as_ref().display(),
        bytes = bytes.len(),
        "packed artifact"
    );
    Ok(artifact)
}
