//! Linear ingestion run: params → load → filter/recode → split → save.
//!
//! ```text
//!  Init ─► ConfigLoaded ─► DataLoaded ─► DataFiltered ─► DataSplit ─► DataSaved ─► Done
//!    │           │              │              │              │            │
//!    └───────────┴──────────────┴──── Failed ──┴──────────────┴────────────┘
//! ```
//!
//! Each arrow is exactly one stage call. The first failing stage moves the
//! runner to `Failed` and nothing after it runs. A failed runner cannot be
//! resumed; build a new one.

use std::fmt;
use std::path::PathBuf;

use log::Log;
use serde::Serialize;

use crate::config::{self, DEFAULT_PARAMS_PATH};
use crate::data::model::{ColumnNames, Split, Table};
use crate::data::reader::{self, DEFAULT_SOURCE_URL};
use crate::data::splitter::{self, DEFAULT_SEED};
use crate::data::{filter, writer};
use crate::error::{IngestError, Result};

/// Where the pipeline is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    ConfigLoaded,
    DataLoaded,
    DataFiltered,
    DataSplit,
    DataSaved,
    Done,
    /// Terminal failure; holds the last state reached successfully.
    Failed { after: Stage },
}

/// The non-terminal states a failure can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    ConfigLoaded,
    DataLoaded,
    DataFiltered,
    DataSplit,
}

impl Stage {
    /// What the pipeline was attempting when it left this state.
    pub fn next_step(self) -> &'static str {
        match self {
            Stage::Init => "loading parameters",
            Stage::ConfigLoaded => "reading data",
            Stage::DataLoaded => "filtering data",
            Stage::DataFiltered => "splitting data",
            Stage::DataSplit => "saving data",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Failed { after } => write!(f, "Failed({})", after.next_step()),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Everything a run needs to know, resolved before it starts.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// YAML file holding `data_ingestion.test_size`.
    pub params_path: PathBuf,
    /// Local path or HTTP(S) URL of the labelled dataset.
    pub source: String,
    /// Directory receiving `train.csv` / `test.csv`.
    pub destination: PathBuf,
    /// Shuffle seed for the split.
    pub seed: u64,
    pub columns: ColumnNames,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            params_path: PathBuf::from(DEFAULT_PARAMS_PATH),
            source: DEFAULT_SOURCE_URL.to_string(),
            destination: PathBuf::from("data").join("raw"),
            seed: DEFAULT_SEED,
            columns: ColumnNames::default(),
        }
    }
}

/// Row counts of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub test_fraction: f64,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub destination: PathBuf,
}

/// Drives one run through the stages, logging to the logger it was given.
pub struct PipelineRunner<'a> {
    settings: PipelineSettings,
    logger: &'a dyn Log,
    state: PipelineState,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(settings: PipelineSettings, logger: &'a dyn Log) -> Self {
        Self {
            settings,
            logger,
            state: PipelineState::Init,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run every stage in order. Only a runner in `Init` can run.
    pub fn run(&mut self) -> Result<RunSummary> {
        if self.state != PipelineState::Init {
            return Err(IngestError::UnexpectedStageFailure {
                stage: "start".to_string(),
                reason: format!("runner is in state {}, expected Init", self.state),
            });
        }

        log::info!(logger: self.logger, "ML pipeline started.");
        let outcome = self.run_stages();
        match &outcome {
            Ok(summary) => {
                self.state = PipelineState::Done;
                log::info!(
                    logger: self.logger,
                    "ML pipeline finished: {} of {} rows kept, train={}, test={}, saved to {}",
                    summary.rows_kept,
                    summary.rows_read,
                    summary.train_rows,
                    summary.test_rows,
                    summary.destination.display()
                );
            }
            Err(err) => {
                let after = self.failed_after();
                self.state = PipelineState::Failed { after };
                log::error!(
                    logger: self.logger,
                    "An error occurred during the ML pipeline while {}: {err}",
                    after.next_step()
                );
                log::info!(logger: self.logger, "ML pipeline finished with errors.");
            }
        }
        self.logger.flush();
        outcome
    }

    fn run_stages(&mut self) -> Result<RunSummary> {
        let logger = self.logger;

        let test_fraction = config::load_test_fraction(&self.settings.params_path, logger)?;
        self.advance(PipelineState::ConfigLoaded);

        let raw: Table = reader::read_table(&self.settings.source, logger)?;
        self.advance(PipelineState::DataLoaded);

        let filtered = filter::filter_and_recode(&raw, &self.settings.columns, logger)?;
        self.advance(PipelineState::DataFiltered);

        let split: Split = splitter::split(&filtered, test_fraction, self.settings.seed)
            .inspect_err(|e| log::error!(logger: logger, "Error splitting data: {e}"))?;
        log::info!(
            logger: logger,
            "Data split into train and test sets with test_size={test_fraction} (train={}, test={})",
            split.train.len(),
            split.test.len()
        );
        self.advance(PipelineState::DataSplit);

        writer::write_split(&self.settings.destination, &split, logger)?;
        self.advance(PipelineState::DataSaved);

        Ok(RunSummary {
            test_fraction,
            rows_read: raw.len(),
            rows_kept: filtered.len(),
            train_rows: split.train.len(),
            test_rows: split.test.len(),
            destination: self.settings.destination.clone(),
        })
    }

    fn advance(&mut self, next: PipelineState) {
        log::debug!(logger: self.logger, "pipeline state {} -> {next}", self.state);
        self.state = next;
    }

    fn failed_after(&self) -> Stage {
        match self.state {
            PipelineState::ConfigLoaded => Stage::ConfigLoaded,
            PipelineState::DataLoaded => Stage::DataLoaded,
            PipelineState::DataFiltered => Stage::DataFiltered,
            PipelineState::DataSplit => Stage::DataSplit,
            _ => Stage::Init,
        }
    }
}
