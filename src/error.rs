use std::path::PathBuf;

use thiserror::Error;

/// Every way a pipeline stage can fail.
///
/// Each variant names the thing that failed (path, source location, column)
/// so the error alone is enough to diagnose a broken run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("config file {path} not found")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is malformed: {reason}")]
    ConfigMalformed { path: PathBuf, reason: String },

    #[error("config file {path} has no '{key}' entry")]
    ConfigKeyMissing { path: PathBuf, key: String },

    #[error("no data found at {location}")]
    SourceEmpty { location: String },

    #[error("could not parse tabular data from {location}: {reason}")]
    SourceUnparseable { location: String, reason: String },

    #[error("could not read {location}: {reason}")]
    SourceUnreachable { location: String, reason: String },

    #[error("column '{column}' is missing from the table")]
    SchemaMissingColumn { column: String },

    #[error("test fraction {0} is outside the open interval (0, 1)")]
    InvalidSplitFraction(f64),

    #[error(
        "splitting {rows} rows with test fraction {test_fraction} leaves \
         {train} train and {test} test rows; both sides must be non-empty"
    )]
    EmptyPartition {
        rows: usize,
        test_fraction: f64,
        train: usize,
        test: usize,
    },

    #[error("could not write to {path}")]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected failure during {stage}: {reason}")]
    UnexpectedStageFailure { stage: String, reason: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
