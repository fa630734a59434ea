//! Data-ingestion stage of the sentiment pipeline.
//!
//! Loads a labelled tweet dataset, keeps the happiness/sadness rows with a
//! 1/0 label, splits them into train/test with a fixed seed and saves both
//! halves as CSV. See [`pipeline::PipelineRunner`] for the run sequence.

pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use data::model::{Cell, ColumnNames, Sentiment, Split, Table};
pub use error::{IngestError, Result};
pub use logging::RunLog;
pub use pipeline::{PipelineRunner, PipelineSettings, PipelineState, RunSummary};
