use log::Log;

use super::model::{Cell, ColumnNames, Sentiment, Table};
use crate::error::{IngestError, Result};

/// Return `(row index, sentiment)` for every row whose label is one of the
/// two kept classes. Labels are matched exactly; nulls and any other label
/// never pass.
pub fn binary_label_rows(table: &Table, label_idx: usize) -> Vec<(usize, Sentiment)> {
    table
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            row.get(label_idx)
                .and_then(Cell::as_str)
                .and_then(Sentiment::from_label)
                .map(|s| (i, s))
        })
        .collect()
}

/// Reduce `table` to the happiness/sadness rows, drop the id column and
/// recode the label column to `1` (happiness) / `0` (sadness).
///
/// The input is left untouched. All other columns, `text` included, pass
/// through unchanged and in their original order, as do the kept rows.
/// Zero matching rows yields an empty table with the output header.
pub fn filter_and_recode(table: &Table, columns: &ColumnNames, logger: &dyn Log) -> Result<Table> {
    let mut indices = [0usize; 3];
    for (slot, name) in indices
        .iter_mut()
        .zip([&columns.id, &columns.text, &columns.label])
    {
        *slot = table.column_index(name).ok_or_else(|| {
            log::error!(logger: logger, "Column missing in table: '{name}'");
            IngestError::SchemaMissingColumn {
                column: name.clone(),
            }
        })?;
    }
    let [id_idx, _, label_idx] = indices;

    let out_columns: Vec<String> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != id_idx)
        .map(|(_, c)| c.clone())
        .collect();

    let matches = binary_label_rows(table, label_idx);
    let rows: Vec<Vec<Cell>> = matches
        .iter()
        .map(|&(row_idx, sentiment)| {
            table.rows()[row_idx]
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != id_idx)
                .map(|(i, cell)| {
                    if i == label_idx {
                        Cell::Integer(sentiment.code())
                    } else {
                        cell.clone()
                    }
                })
                .collect()
        })
        .collect();

    let filtered = Table::new(out_columns, rows).map_err(|(row, width)| {
        IngestError::UnexpectedStageFailure {
            stage: "filter".to_string(),
            reason: format!("recoded row {row} has {width} cells"),
        }
    })?;

    let per_class = filtered.value_counts(&columns.label);
    let class_summary: Vec<String> = Sentiment::ALL
        .iter()
        .map(|s| {
            let n = per_class.get(&Cell::Integer(s.code())).copied().unwrap_or(0);
            format!("{s}={n}")
        })
        .collect();
    log::info!(
        logger: logger,
        "Data processing complete. Kept {} of {} rows ({}), dropped {} with other labels; '{}' removed.",
        filtered.len(),
        table.len(),
        class_summary.join(", "),
        table.len() - filtered.len(),
        columns.id
    );
    if filtered.is_empty() {
        log::warn!(logger: logger, "No happiness or sadness rows found; filtered table is empty");
    }

    Ok(filtered)
}
