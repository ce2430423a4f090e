use std::fmt;
use std::io;
use std::path::Path;

use crate::CarEvalError;

#[derive(Debug)]
pub struct CliError {
    pub msg: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.msg.fmt(f)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Format a user friendly I/O error message with suggestions.
pub fn format_io_error(operation: &str, path: &Path, err: &io::Error) -> String {
    use io::ErrorKind::*;
    let suggestion = match err.kind() {
        NotFound => "Check that the file exists and the path is correct.",
        PermissionDenied => "Check permissions or run as a different user.",
        InvalidData => "The file is not valid UTF-8 text.",
        _ => "Check the path and try again.",
    };
    format!(
        "Error {} '{}': {}. {}",
        operation,
        path.display(),
        err,
        suggestion
    )
}

/// Convert an I/O error into a CLI error with context.
pub fn io_cli_error(operation: &str, path: &Path, err: io::Error) -> CliError {
    CliError {
        msg: format_io_error(operation, path, &err),
        source: Some(Box::new(err)),
    }
}

/// Simple CLI error from string.
pub fn simple_cli_error(msg: &str) -> CliError {
    CliError {
        msg: msg.to_string(),
        source: None,
    }
}

/// Convert a library error into a CLI error with a hint.
pub fn car_eval_cli_error(context: &str, err: CarEvalError) -> CliError {
    CliError {
        msg: format!("{}: {}", context, cli_hint(&err)),
        source: Some(Box::new(err)),
    }
}

/// Return an actionable hint for an error variant.
pub fn cli_hint(err: &CarEvalError) -> String {
    use CarEvalError::*;
    match err {
        MissingArtifact { .. } => {
            format!("{err}. Pass --artifact with the path to the model bundle.")
        }
        IncompatibleArtifact(msg) => {
            format!("incompatible artifact: {msg}. Re-export the bundle with format_version 1.")
        }
        UnrecognizedValue { .. } => format!("{err}. Use one of the listed values."),
        UnknownFeature(_) => format!("{err}. This is a bug."),
        MalformedInput(msg) => format!(
            "{msg}. Columns must be buying,maint,doors,persons,lug_boot,safety[,class]; fix the file and resubmit."
        ),
        NoValidRows { .. } => format!("{err}. Every row was rejected; check the values listed above."),
        Prediction(msg) => format!("{msg}. The model bundle may be inconsistent."),
        Config(msg) => format!("{msg}. Invalid configuration."),
        Csv(e) => format!("{e}. Check that the file is valid CSV."),
        Json(e) => format!("{e}. Check the JSON syntax."),
        Bincode(e) => format!("{e}."),
        Io(e) => format!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_mentions_artifact_flag() {
        let err = CarEvalError::MissingArtifact {
            path: "car_bundle.json".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let cli = car_eval_cli_error("loading model", err);
        assert!(cli.to_string().starts_with("loading model: artifact not found"));
        assert!(cli.to_string().contains("--artifact"));
        assert!(std::error::Error::source(&cli).is_some());
    }
}
