use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use log::Log;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;

use super::model::{Cell, Table};
use crate::error::{IngestError, Result};

/// Public tweet-emotions dataset the pipeline reads by default.
pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/campusx-official/jupyter-masterclass/main/tweet_emotions.csv";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a local path or an HTTP(S) URL.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` (and anything unrecognised) – comma-delimited with a header row
/// * `.tsv` / `.tab` – tab-delimited with a header row
/// * `.json` – `[{ "id": 1, "text": "...", "sentiment": "..." }, ...]`
/// * `.parquet` / `.pq` – flat Parquet file
///
/// Column names come verbatim from the source header. A source without
/// columns or rows is an error, never an empty table.
pub fn read_table(location: &str, logger: &dyn Log) -> Result<Table> {
    let format = SourceFormat::from_location(location);
    log::info!(logger: logger, "Reading {format:?} data from {location}");

    let result = if is_remote(location) {
        read_remote(location, format)
    } else {
        read_local(Path::new(location), format, location)
    };

    match result {
        Ok(table) => {
            log::info!(
                logger: logger,
                "Data loaded successfully from {location}: {} rows, columns {:?}",
                table.len(),
                table.columns()
            );
            Ok(table)
        }
        Err(err) => {
            match &err {
                IngestError::SourceEmpty { .. } => {
                    log::error!(logger: logger, "No data found at {location}.")
                }
                IngestError::SourceUnparseable { reason, .. } => {
                    log::error!(logger: logger, "Error parsing data from {location}: {reason}")
                }
                other => log::error!(
                    logger: logger,
                    "Unexpected error reading data from {location}: {other}"
                ),
            }
            Err(err)
        }
    }
}

/// Whether `location` should be fetched over HTTP rather than opened locally.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// On-disk / on-wire layout of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text with the given field separator.
    Delimited(u8),
    Json,
    Parquet,
}

impl SourceFormat {
    /// Pick a format from the extension of a path or URL path.
    pub fn from_location(location: &str) -> Self {
        let path = location
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or(location);
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "tsv" | "tab" => SourceFormat::Delimited(b'\t'),
            "json" => SourceFormat::Json,
            "parquet" | "pq" => SourceFormat::Parquet,
            _ => SourceFormat::Delimited(b','),
        }
    }
}

fn read_local(path: &Path, format: SourceFormat, location: &str) -> Result<Table> {
    let file = File::open(path).map_err(|e| unreachable_source(location, e))?;
    match format {
        SourceFormat::Delimited(delimiter) => parse_delimited(file, delimiter, location),
        SourceFormat::Json => parse_json(file, location),
        SourceFormat::Parquet => parse_parquet(file, location),
    }
}

fn read_remote(url: &str, format: SourceFormat) -> Result<Table> {
    let body = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .map_err(|e| unreachable_source(url, e))?;

    match format {
        SourceFormat::Delimited(delimiter) => parse_delimited(&body[..], delimiter, url),
        SourceFormat::Json => parse_json(&body[..], url),
        SourceFormat::Parquet => parse_parquet(body, url),
    }
}

fn unreachable_source(location: &str, reason: impl ToString) -> IngestError {
    IngestError::SourceUnreachable {
        location: location.to_string(),
        reason: reason.to_string(),
    }
}

fn unparseable(location: &str, reason: impl ToString) -> IngestError {
    IngestError::SourceUnparseable {
        location: location.to_string(),
        reason: reason.to_string(),
    }
}

fn empty(location: &str) -> IngestError {
    IngestError::SourceEmpty {
        location: location.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Delimited loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line. Every field is kept
/// as text; empty fields become nulls. Rows of the wrong width are rejected.
fn parse_delimited<R: Read>(reader: R, delimiter: u8, location: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| classify_csv_error(e, location))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if columns.is_empty() {
        return Err(empty(location));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| classify_csv_error(e, location))?;
        rows.push(record.iter().map(Cell::from_field).collect::<Vec<_>>());
    }
    if rows.is_empty() {
        return Err(empty(location));
    }

    let width = columns.len();
    Table::new(columns, rows).map_err(|(row, got)| {
        unparseable(
            location,
            format!("row {row} has {got} fields, header has {width}"),
        )
    })
}

fn classify_csv_error(err: csv::Error, location: &str) -> IngestError {
    if matches!(err.kind(), csv::ErrorKind::Io(_)) {
        unreachable_source(location, err)
    } else {
        unparseable(location, err)
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id": 1, "text": "what a day", "sentiment": "happiness" },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen order; keys missing from a record are null.
fn parse_json<R: Read>(mut reader: R, location: &str) -> Result<Table> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| unreachable_source(location, e))?;
    if buf.iter().all(u8::is_ascii_whitespace) {
        return Err(empty(location));
    }

    let root: JsonValue = serde_json::from_slice(&buf).map_err(|e| unparseable(location, e))?;
    let records = root
        .as_array()
        .ok_or_else(|| unparseable(location, "expected top-level JSON array"))?;

    let mut objects = Vec::with_capacity(records.len());
    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| unparseable(location, format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }
    if objects.is_empty() || columns.is_empty() {
        return Err(empty(location));
    }

    let rows = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();

    Table::new(columns, rows).map_err(|(row, _)| unparseable(location, format!("row {row}")))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::from_field(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file. String, integer, float and boolean columns map
/// onto the matching [`Cell`] variant; anything else is rendered as text.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn parse_parquet<R: ChunkReader + 'static>(input: R, location: &str) -> Result<Table> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(input).map_err(|e| unparseable(location, e))?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    if columns.is_empty() {
        return Err(empty(location));
    }
    let reader = builder.build().map_err(|e| unparseable(location, e))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| unparseable(location, e))?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect::<Vec<_>>(),
            );
        }
    }
    if rows.is_empty() {
        return Err(empty(location));
    }

    Table::new(columns, rows).map_err(|(row, _)| unparseable(location, format!("row {row}")))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Cell::from_field(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => Cell::from_field(col.as_string::<i64>().value(row)),
        DataType::Int32 => Cell::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Cell::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Cell::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Cell::Bool(col.as_boolean().value(row)),
        _ => arrow::util::display::array_value_to_string(col.as_ref(), row)
            .map(Cell::Text)
            .unwrap_or(Cell::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::RunLog;
    use std::io::Write;
    use std::net::TcpListener;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn read(path: &Path) -> Result<Table> {
        read_table(path.to_str().unwrap(), &RunLog::discard())
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(SourceFormat::from_location("a/b.csv"), SourceFormat::Delimited(b','));
        assert_eq!(SourceFormat::from_location("a/b.TSV"), SourceFormat::Delimited(b'\t'));
        assert_eq!(SourceFormat::from_location("b.json"), SourceFormat::Json);
        assert_eq!(SourceFormat::from_location("b.parquet"), SourceFormat::Parquet);
        assert_eq!(SourceFormat::from_location("noext"), SourceFormat::Delimited(b','));
        assert_eq!(
            SourceFormat::from_location("https://host/data.json?raw=true"),
            SourceFormat::Json
        );
    }

    #[test]
    fn detects_remote_locations() {
        assert!(is_remote(DEFAULT_SOURCE_URL));
        assert!(is_remote("HTTP://example.org/x.csv"));
        assert!(!is_remote("data/raw/x.csv"));
        assert!(!is_remote("httpdocs/x.csv"));
    }

    #[test]
    fn csv_columns_and_text_are_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "tweets.csv",
            "id,sentiment,text\n1,happiness,\"hello, world\"\n2,sadness,007\n3,neutral,\n",
        );
        let table = read(&path).unwrap();
        assert_eq!(table.columns(), ["id", "sentiment", "text"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0][2], Cell::Text("hello, world".into()));
        assert_eq!(table.rows()[1][2], Cell::Text("007".into()));
        assert_eq!(table.rows()[2][2], Cell::Null);
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "t.tsv", "id\ttext\n1\ta,b\n");
        let table = read(&path).unwrap();
        assert_eq!(table.rows()[0][1], Cell::Text("a,b".into()));
    }

    #[test]
    fn empty_and_header_only_sources_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [("a.csv", ""), ("b.csv", "id,text,sentiment\n"), ("c.json", "[]")] {
            let path = write(dir.path(), name, body);
            assert!(
                matches!(read(&path), Err(IngestError::SourceEmpty { .. })),
                "{name} should be empty"
            );
        }
    }

    #[test]
    fn ragged_rows_are_unparseable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "r.csv", "id,text\n1,a\n2,b,extra\n");
        assert!(matches!(read(&path), Err(IngestError::SourceUnparseable { .. })));
    }

    #[test]
    fn invalid_utf8_is_unparseable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, b"id,text\n1,\xff\xfe\n").unwrap();
        assert!(matches!(read(&path), Err(IngestError::SourceUnparseable { .. })));
    }

    #[test]
    fn missing_file_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(&dir.path().join("absent.csv")).unwrap_err();
        match err {
            IngestError::SourceUnreachable { location, .. } => {
                assert!(location.ends_with("absent.csv"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Answer exactly one HTTP request with `status` and `body`, then close.
    /// Returns the server's base URL.
    fn serve_once(status: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}")
    }

    fn read_url(url: &str) -> Result<Table> {
        read_table(url, &RunLog::discard())
    }

    #[test]
    fn refused_connection_is_unreachable() {
        let url = "http://127.0.0.1:1/x.csv";
        match read_url(url).unwrap_err() {
            IngestError::SourceUnreachable { location, .. } => assert_eq!(location, url),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn http_error_status_is_unreachable() {
        let url = format!("{}/tweet_emotions.csv", serve_once("404 Not Found", "nope"));
        match read_url(&url).unwrap_err() {
            IngestError::SourceUnreachable { location, reason } => {
                assert_eq!(location, url);
                assert!(reason.contains("404"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn http_body_is_parsed_as_csv() {
        let body = "id,text,sentiment\n1,\"hi, there\",happiness\n2,meh,neutral\n";
        let url = format!("{}/tweet_emotions.csv", serve_once("200 OK", body));
        let table = read_url(&url).unwrap();
        assert_eq!(table.columns(), ["id", "text", "sentiment"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][1], Cell::Text("hi, there".into()));
    }

    #[test]
    fn http_format_ignores_query_string() {
        let url = format!("{}/tweets.tsv?raw=true", serve_once("200 OK", "id\ttext\n7\ta,b\n"));
        let table = read_url(&url).unwrap();
        assert_eq!(table.columns(), ["id", "text"]);
        assert_eq!(table.rows()[0][1], Cell::Text("a,b".into()));
    }

    #[test]
    fn empty_http_body_is_empty() {
        let url = format!("{}/tweets.csv", serve_once("200 OK", ""));
        match read_url(&url).unwrap_err() {
            IngestError::SourceEmpty { location } => assert_eq!(location, url),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "t.json",
            r#"[{"id": 1, "sentiment": "sadness", "text": "meh"}, {"id": 2, "text": "ok"}]"#,
        );
        let table = read(&path).unwrap();
        assert_eq!(table.len(), 2);
        let idx = table.column_index("sentiment").unwrap();
        assert_eq!(table.rows()[1][idx], Cell::Null);
        assert_eq!(table.rows()[0][table.column_index("id").unwrap()], Cell::Integer(1));
    }

    #[test]
    fn json_that_is_not_records_is_unparseable() {
        let dir = tempfile::tempdir().unwrap();
        for body in [r#"{"id": 1}"#, "[1, 2]", "[{"] {
            let path = write(dir.path(), "x.json", body);
            assert!(matches!(read(&path), Err(IngestError::SourceUnparseable { .. })));
        }
    }

    #[test]
    fn parquet_columns_map_to_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("text", DataType::Utf8, true),
            Field::new("sentiment", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![10, 11])),
                Arc::new(StringArray::from(vec![Some("sunny"), None])),
                Arc::new(StringArray::from(vec!["happiness", "sadness"])),
            ],
        )
        .unwrap();
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = read(&path).unwrap();
        assert_eq!(table.columns(), ["id", "text", "sentiment"]);
        assert_eq!(table.rows()[0][0], Cell::Integer(10));
        assert_eq!(table.rows()[0][1], Cell::Text("sunny".into()));
        assert_eq!(table.rows()[1][1], Cell::Null);
        assert_eq!(table.rows()[1][2], Cell::Text("sadness".into()));
    }
}
