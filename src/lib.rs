//! Car acceptability evaluator.
//!
//! Turns free-text vehicle attributes into the ordinal encoding a trained
//! classifier expects, runs the classifier from a validated artifact and maps
//! its output to a fixed explanation.
//!
//! Layout:
//! - `feature.rs`: the six attributes in canonical column order
//! - `encoding.rs`: label → code tables with built-in defaults
//! - `similarity.rs`: gestalt ratio used for typo tolerance
//! - `normalizer.rs`: raw value → ordinal code
//! - `batch.rs`: per-row resolution with failure isolation
//! - `csv_io.rs`: CSV intake and prediction output
//! - `model.rs` / `artifact.rs`: classifier shapes and bundle loading
//! - `session.rs`: startup-built state shared by every command
//! - `presentation.rs`: category explanations and FAQ text

pub mod artifact;
pub mod batch;
pub mod config;
pub mod csv_io;
pub mod encoding;
pub mod error;
pub mod feature;
pub mod io_utils;
pub mod model;
pub mod normalizer;
pub mod presentation;
pub mod record;
pub mod session;
pub mod similarity;

pub use artifact::{pack_artifact, Artifact, ArtifactCapabilities, ArtifactFile, ArtifactFormat};
pub use batch::{resolve_batch, BatchOutcome, RejectedRow, ResolvedRow};
pub use config::Config;
pub use csv_io::{read_records, write_predictions, CsvInput, HeaderMode, PREDICTION_COLUMN};
pub use encoding::{default_labels, EncodingTable, LabelMap};
pub use error::{CarEvalError, Result};
pub use feature::{Feature, FEATURE_COUNT};
pub use model::{LabelDecoder, LinearModel, Model, Predictor, Scaler, TreeModel, TreeNode};
pub use normalizer::Normalizer;
pub use presentation::{explain, Explanation, FAQ, UNRECOGNIZED_MESSAGE};
pub use record::{NumericRecord, RawRecord};
pub use session::{BatchReport, Evaluation, Prediction, Session};
pub use similarity::{best_match, ratio, DEFAULT_CUTOFF};
