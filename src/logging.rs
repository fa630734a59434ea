//! Per-run log sink.
//!
//! The pipeline never installs a global logger. A [`RunLog`] is built for
//! one run and handed to every stage as `&dyn log::Log`; stages write to it
//! with `log::info!(logger: logger, ...)`.
//!
//! The `log` macros still check the process-wide `log::max_level()` before
//! asking any logger, so building a `RunLog` raises that ceiling to its own
//! level. It never lowers it; the per-instance filter does the real work.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use env_logger::{Builder, Target, WriteStyle};
use log::{LevelFilter, Log, Metadata, Record};

/// Default file the pipeline appends to.
pub const DEFAULT_LOG_FILE: &str = "ml_pipeline.log";

/// An explicitly owned, timestamped, leveled logger.
pub struct RunLog {
    inner: env_logger::Logger,
}

impl RunLog {
    /// Append to `path`, creating it if needed.
    pub fn to_file(path: &Path, level: LevelFilter) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::to_writer(Box::new(file), level))
    }

    /// Log to standard error.
    pub fn to_stderr(level: LevelFilter) -> Self {
        Self::build(Target::Stderr, WriteStyle::Auto, level)
    }

    /// Log into any writer.
    pub fn to_writer(writer: Box<dyn Write + Send + 'static>, level: LevelFilter) -> Self {
        Self::build(Target::Pipe(writer), WriteStyle::Never, level)
    }

    /// Swallow everything. Handy where a stage needs a logger but nobody reads it.
    pub fn discard() -> Self {
        Self::to_writer(Box::new(io::sink()), LevelFilter::Off)
    }

    fn build(target: Target, style: WriteStyle, level: LevelFilter) -> Self {
        log::set_max_level(log::max_level().max(level));
        let inner = Builder::new()
            .filter_level(level)
            .target(target)
            .write_style(style)
            .format_timestamp_millis()
            .format_module_path(false)
            .build();
        Self { inner }
    }
}

impl Log for RunLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.inner.log(record)
    }

    fn flush(&self) {
        self.inner.flush()
    }
}
