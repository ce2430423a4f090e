//! Application-scoped state: the loaded artifact and the encoding table
//! derived from it. Built once at startup and handed out by reference.

use serde::Serialize;
use tracing::{debug, info};

use crate::artifact::Artifact;
use crate::batch::{resolve_batch, RejectedRow, ResolvedRow};
use crate::config::Config;
use crate::encoding::EncodingTable;
use crate::feature::FEATURE_COUNT;
use crate::normalizer::Normalizer;
use crate::presentation::{explain, Explanation};
use crate::record::{NumericRecord, RawRecord};
use crate::{CarEvalError, Result};

/// Predicted class index and its label.
///
/// Without a label decoder the label is the index rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub code: usize,
    pub label: String,
}

/// Result of evaluating a single record.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub input: NumericRecord,
    pub prediction: Prediction,
    pub explanation: Explanation,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub rows: Vec<(ResolvedRow, Prediction)>,
    pub rejected: Vec<RejectedRow>,
}

pub struct Session {
    artifact: Artifact,
    table: EncodingTable,
    cutoff: f64,
}

impl Session {
    pub fn new(artifact: Artifact, cutoff: f64) -> Self {
        let table = EncodingTable::build(artifact.mapping().clone());
        Self {
            artifact,
            table,
            cutoff,
        }
    }

    /// Load the configured artifact and build the session around it.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        let artifact = Artifact::load(&config.artifact_path)?;
        Ok(Self::new(artifact, config.similarity_cutoff))
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn table(&self) -> &EncodingTable {
        &self.table
    }

    pub fn normalizer(&self) -> Normalizer<'_> {
        Normalizer::with_cutoff(&self.table, self.cutoff)
    }

    /// Scale (when the artifact has a scaler), predict and decode.
    pub fn predict(&self, records: &[NumericRecord]) -> Result<Vec<Prediction>> {
        let inputs: Vec<[f64; FEATURE_COUNT]> = records
            .iter()
            .map(|r| {
                let x = r.to_features();
                match self.artifact.scaler() {
                    Some(scaler) => scaler.transform(&x),
                    None => x,
                }
            })
            .collect();

        let predictor = self.artifact.predictor();
        let codes = predictor.predict(&inputs)?;
        if codes.len() != inputs.len() {
            return Err(CarEvalError::Prediction(format!(
                "predictor returned {} results for {} rows",
                codes.len(),
                inputs.len()
            )));
        }
        debug!(rows = codes.len(), "predicted");

        codes
            .into_iter()
            .map(|code| {
                let label = match self.artifact.decoder() {
                    Some(decoder) => decoder.decode(code)?.to_string(),
                    None if code < predictor.n_classes() => code.to_string(),
                    None => {
                        return Err(CarEvalError::Prediction(format!(
                            "class index {code} outside model range 0..{}",
                            predictor.n_classes()
                        )))
                    }
                };
                Ok(Prediction { code, label })
            })
            .collect()
    }

    /// Resolve, predict and explain one record.
    pub fn evaluate(&self, raw: &RawRecord) -> Result<Evaluation> {
        let input = self.normalizer().resolve_record(raw)?;
        let prediction = self
            .predict(&[input])?
            .pop()
            .ok_or_else(|| CarEvalError::Prediction("empty prediction".into()))?;
        let explanation = explain(&prediction.label);
        info!(label = %prediction.label, recognized = explanation.recognized, "evaluated record");
        Ok(Evaluation {
            input,
            prediction,
            explanation,
        })
    }

    /// Resolve every record, then predict all resolved rows in one call.
    pub fn evaluate_batch(&self, records: Vec<RawRecord>) -> Result<BatchReport> {
        let outcome = resolve_batch(&self.normalizer(), records)?;
        let numeric: Vec<NumericRecord> = outcome.resolved.iter().map(|r| r.numeric).collect();
        let predictions = self.predict(&numeric)?;
        Ok(BatchReport {
            rows: outcome.resolved.into_iter().zip(predictions).collect(),
            rejected: outcome.rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactFormat;

    #[test]
    fn undecoded_label_falls_back() {
        let json = r#"{
            "format_version": 1,
            "model": {"tree": {"nodes": [{"leaf": {"class": 2}}]}}
        }"#;
        let artifact = Artifact::from_bytes(json.as_bytes(), ArtifactFormat::Json).unwrap();
        let session = Session::new(artifact, 0.6);
        let raw = RawRecord::new(["low", "low", "2", "2", "small", "low"].map(str::to_string));
        let eval = session.evaluate(&raw).unwrap();
        assert_eq!(eval.prediction.code, 2);
        assert_eq!(eval.prediction.label, "2");
        assert!(!eval.explanation.recognized);
    }
}
