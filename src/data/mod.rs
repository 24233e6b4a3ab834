/// Data layer: record types, loading, caching, filtering and aggregation.
///
/// Architecture:
/// ```text
///   bev353od3530.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → derive fields → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  path → Arc<Dataset>, read once
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range + label sets → FilteredSet
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group by key, sum counts → views
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
