/// Data layer: core types, loading, caching and queries.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (normalized columns, coerced year/value)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  load once, share Arc<Dataset> until invalidated
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐   ┌──────────┐   ┌──────────┐
///   │  query    │──▶│ summary  │   │ category │  window, metrics, comparisons
///   └──────────┘   └──────────┘   └──────────┘
/// ```

pub mod cache;
pub mod category;
pub mod export;
pub mod loader;
pub mod model;
pub mod query;
pub mod summary;
