use std::path::{Path, PathBuf};

use log::Log;

use super::model::{Split, Table};
use crate::error::{IngestError, Result};

/// File name of the training artifact inside the destination directory.
pub const TRAIN_FILE: &str = "train.csv";
/// File name of the evaluation artifact inside the destination directory.
pub const TEST_FILE: &str = "test.csv";

/// Write both halves of a split as `train.csv` / `test.csv` under `dir`.
///
/// `dir` and its parents are created if needed. Files are written in order
/// train then test; if the second write fails the first file is left in
/// place.
pub fn write_split(dir: &Path, split: &Split, logger: &dyn Log) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        log::error!(logger: logger, "Error creating {}: {e}", dir.display());
        IngestError::DestinationUnwritable {
            path: dir.to_path_buf(),
            source: e,
        }
    })?;

    for (name, table) in [(TRAIN_FILE, &split.train), (TEST_FILE, &split.test)] {
        let path = dir.join(name);
        write_table(&path, table).map_err(|e| {
            log::error!(logger: logger, "Error saving data to {}: {e}", path.display());
            IngestError::DestinationUnwritable {
                path: path.clone(),
                source: e,
            }
        })?;
        log::debug!(logger: logger, "Wrote {} rows to {}", table.len(), path.display());
    }

    log::info!(
        logger: logger,
        "Data saved successfully to {} (train={}, test={})",
        dir.display(),
        split.train.len(),
        split.test.len()
    );
    Ok(())
}

/// Paths of the two artifacts `write_split` produces under `dir`.
pub fn artifact_paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join(TRAIN_FILE), dir.join(TEST_FILE))
}

/// Header row, then one comma-delimited record per row. No index column.
fn write_table(path: &Path, table: &Table) -> std::io::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;
    use crate::logging::RunLog;

    fn sample(rows: &[(&str, i64)]) -> Table {
        Table::new(
            vec!["text".into(), "sentiment".into()],
            rows.iter()
                .map(|(t, s)| vec![Cell::from_field(t), Cell::Integer(*s)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn creates_nested_dir_and_both_files() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("data").join("raw");
        let split = Split {
            train: sample(&[("good day", 1), ("bad, sad day", 0)]),
            test: sample(&[("\"quoted\"", 1)]),
        };

        write_split(&dir, &split, &RunLog::discard()).unwrap();
        // a second run into the existing directory is fine
        write_split(&dir, &split, &RunLog::discard()).unwrap();

        let (train, test) = artifact_paths(&dir);
        let train = std::fs::read_to_string(train).unwrap();
        assert_eq!(train, "text,sentiment\ngood day,1\n\"bad, sad day\",0\n");
        let test = std::fs::read_to_string(test).unwrap();
        assert_eq!(test, "text,sentiment\n\"\"\"quoted\"\"\",1\n");
    }

    #[test]
    fn empty_table_writes_header_only() {
        let root = tempfile::tempdir().unwrap();
        let split = Split {
            train: sample(&[("x", 1)]),
            test: Table::empty(vec!["text".into(), "sentiment".into()]),
        };
        write_split(root.path(), &split, &RunLog::discard()).unwrap();
        let test = std::fs::read_to_string(root.path().join(TEST_FILE)).unwrap();
        assert_eq!(test, "text,sentiment\n");
    }

    #[test]
    fn file_in_the_way_is_unwritable() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("taken");
        std::fs::write(&blocker, "not a dir").unwrap();
        let split = Split {
            train: sample(&[("x", 1)]),
            test: sample(&[("y", 0)]),
        };

        let err = write_split(&blocker.join("raw"), &split, &RunLog::discard()).unwrap_err();
        assert!(matches!(err, IngestError::DestinationUnwritable { .. }));
    }
}
