use thiserror::Error;

use crate::batch::RejectedRow;

#[derive(Error, Debug)]
pub enum CarEvalError {
    /// Artifact file is absent or unreadable.
    #[error("artifact not found at '{path}': {source}")]
    MissingArtifact {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Artifact decoded but does not match the expected schema.
    #[error("incompatible artifact: {0}")]
    IncompatibleArtifact(String),

    /// A raw value could not be mapped to an ordinal code.
    #[error("invalid value '{value}' for {feature}; candidates: [{}]", .candidates.join(", "))]
    UnrecognizedValue {
        feature: String,
        value: String,
        candidates: Vec<String>,
    },

    /// Feature name outside the six known attributes.
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    /// Submission has the wrong shape (column count, header).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Every row of a batch was rejected. Carries the rejections so callers
    /// can still report them.
    #[error("no valid rows to process ({} rejected)", .rejected.len())]
    NoValidRows { rejected: Vec<RejectedRow> },

    /// Predictor produced output the session cannot interpret.
    #[error("prediction error: {0}")]
    Prediction(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CarEvalError>;
