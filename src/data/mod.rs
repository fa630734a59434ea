/// Data layer: core types and the four table stages.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet  (local or http)
///        │
///        ▼
///   ┌──────────┐
///   │  reader   │  parse source → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  keep happiness/sadness, drop id, recode 1/0
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ splitter  │  seeded shuffle → Split { train, test }
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  train.csv / test.csv
///   └──────────┘
/// ```

pub mod filter;
pub mod model;
pub mod reader;
pub mod splitter;
pub mod writer;
