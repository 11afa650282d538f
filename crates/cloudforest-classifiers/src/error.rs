use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::math::ShapeError;

/// Result alias used by the model and relation-file APIs.
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Failures raised while exchanging data with the forest backends.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Model not fitted; call fit before predict")]
    NotFitted,

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    ProcessFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Expected output file {0} was not produced")]
    MissingOutput(PathBuf),

    #[error("Malformed output in {path} at line {line}: {reason}")]
    OutputMalformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{path} has {found} {what}, expected one per input sample ({expected})")]
    OutputCount {
        path: PathBuf,
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid truth value '{0}'")]
    InvalidTruthValue(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<ShapeError> for ClassifierError {
    fn from(err: ShapeError) -> Self {
        ClassifierError::Shape(err.to_string())
    }
}

impl ClassifierError {
    /// True for failures of the external process itself, as opposed to
    /// problems reading what it wrote.
    pub fn is_process_failure(&self) -> bool {
        matches!(
            self,
            ClassifierError::Spawn { .. } | ClassifierError::ProcessFailed { .. }
        )
    }

    /// True when the external tool ran but its output could not be used.
    pub fn is_output_failure(&self) -> bool {
        matches!(
            self,
            ClassifierError::MissingOutput(_)
                | ClassifierError::OutputMalformed { .. }
                | ClassifierError::OutputCount { .. }
                | ClassifierError::InvalidTruthValue(_)
        )
    }
}
