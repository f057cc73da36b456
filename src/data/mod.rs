/// Data layer: core types, parsing, loading, and row filtering.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  dispatch by extension → parser / json / arrow
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  headers + ragged string rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  row predicates → surviving row indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod parser;
