/// Data layer: core types, loading, and window filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RunSet (one DatasetTable per run)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ DatasetTable  │  Vec<Sample>, source row order
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  voltage window + positive current → FilteredTable
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
