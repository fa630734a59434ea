use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Cell – a single value in a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the few dtypes the pipeline sees.
///
/// Delimited sources only ever produce `Text` and `Null`; `Integer`, `Float`
/// and `Bool` come from JSON / Parquet sources or from label recoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so cells can key the BTreeMap behind value_counts --

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Cell::*;
        fn discriminant(v: &Cell) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for Cell {
    /// Renders the cell the way it is written to a delimited file.
    /// `Null` renders as the empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => Ok(()),
        }
    }
}

impl Cell {
    /// Build a cell from a raw delimited field. Empty fields are null,
    /// everything else is kept verbatim as text.
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Cell::Null
        } else {
            Cell::Text(field.to_string())
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sentiment – the binary label scheme
// ---------------------------------------------------------------------------

/// The two label classes kept by the pipeline and their binary codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sentiment {
    Sadness,
    Happiness,
}

impl Sentiment {
    pub const ALL: [Sentiment; 2] = [Sentiment::Happiness, Sentiment::Sadness];

    /// Exact, case-sensitive match on the source label. Any other label
    /// (e.g. "neutral", "worry") is outside the binary scheme.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Happiness => "happiness",
            Sentiment::Sadness => "sadness",
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Sentiment::Happiness => 1,
            Sentiment::Sadness => 0,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// ColumnNames – which source columns play which role
// ---------------------------------------------------------------------------

/// Names of the three columns the filter stage relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    /// Opaque row identifier, dropped before output.
    pub id: String,
    /// Free text, passed through unchanged.
    pub text: String,
    /// Category label, recoded to 0/1.
    pub label: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            text: "text".to_string(),
            label: "sentiment".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – ordered rows sharing one column schema
// ---------------------------------------------------------------------------

/// An in-memory table. Every row has exactly `columns.len()` cells.
///
/// Tables are values: transformations build a new `Table` rather than
/// editing one another stage still holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, checking every row against the header width.
    /// Returns the index and width of the first offending row on mismatch.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, (usize, usize)> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err((i, row.len()));
        }
        Ok(Self { columns, rows })
    }

    /// A table with a header and no rows.
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column, in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// A new table holding the rows at `indices`, in that order.
    /// Indices past the end are skipped.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// How many rows hold each distinct value of a column.
    pub fn value_counts(&self, name: &str) -> BTreeMap<Cell, usize> {
        let mut counts = BTreeMap::new();
        if let Some(cells) = self.column(name) {
            for cell in cells {
                *counts.entry(cell.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

// ---------------------------------------------------------------------------
// Split – disjoint train/test partition
// ---------------------------------------------------------------------------

/// Train and test tables that together hold every row of the split input.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Table,
    pub test: Table,
}
