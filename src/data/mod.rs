/// Data layer: core types, loading, derivation, filtering, aggregation.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + clean → SchoolDataset, SchemaReport
///   └──────────┘      (memoized per source by cache)
///        │
///        ▼
///   ┌──────────┐
///   │  derive   │  append composite indicator columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  state/district/area criteria → passing indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group-and-reduce, trend differencing
///   └───────────┘
/// ```
pub mod aggregate;
pub mod cache;
pub mod derive;
pub mod filter;
pub mod loader;
pub mod model;
