use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::LevelFilter;

use sentiment_ingest::config::DEFAULT_PARAMS_PATH;
use sentiment_ingest::data::reader::DEFAULT_SOURCE_URL;
use sentiment_ingest::data::splitter::DEFAULT_SEED;
use sentiment_ingest::data::writer;
use sentiment_ingest::logging::DEFAULT_LOG_FILE;
use sentiment_ingest::{ColumnNames, PipelineRunner, PipelineSettings, RunLog};

#[derive(Debug, Parser)]
#[command(name = "sentiment-ingest", version, about)]
struct Cli {
    /// YAML parameters file holding `data_ingestion.test_size`.
    #[arg(long, default_value = DEFAULT_PARAMS_PATH)]
    params: PathBuf,

    /// Dataset location: local path or http(s) URL.
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    source: String,

    /// Directory receiving train.csv and test.csv.
    #[arg(long, default_value = "data/raw")]
    output_dir: PathBuf,

    /// Seed for the train/test shuffle.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Name of the identifier column (dropped).
    #[arg(long, default_value = "id")]
    id_column: String,

    /// Name of the free-text column.
    #[arg(long, default_value = "text")]
    text_column: String,

    /// Name of the label column.
    #[arg(long, default_value = "sentiment")]
    label_column: String,

    /// Log file, appended to on every run.
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Log to stderr instead of the log file.
    #[arg(long)]
    log_stderr: bool,

    /// Minimum level written to the log.
    #[arg(
        long,
        default_value = "info",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,

    /// Print the run summary as JSON instead of key=value lines.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            params_path: self.params.clone(),
            source: self.source.clone(),
            destination: self.output_dir.clone(),
            seed: self.seed,
            columns: ColumnNames {
                id: self.id_column.clone(),
                text: self.text_column.clone(),
                label: self.label_column.clone(),
            },
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level: LevelFilter = cli
        .log_level
        .parse()
        .map_err(|e| anyhow!("invalid log level '{}': {e}", cli.log_level))?;
    let logger = if cli.log_stderr {
        RunLog::to_stderr(level)
    } else {
        RunLog::to_file(&cli.log_file, level)
            .with_context(|| format!("opening log file {}", cli.log_file.display()))?
    };

    let mut runner = PipelineRunner::new(cli.settings(), &logger);
    match runner.run() {
        Ok(summary) if cli.json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(summary) => {
            let (train, test) = writer::artifact_paths(&summary.destination);
            println!("rows_read={}", summary.rows_read);
            println!("rows_kept={}", summary.rows_kept);
            println!("train_csv={} ({} rows)", train.display(), summary.train_rows);
            println!("test_csv={} ({} rows)", test.display(), summary.test_rows);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("sentiment-ingest failed ({}): {err}", runner.state());
            Ok(ExitCode::FAILURE)
        }
    }
}
