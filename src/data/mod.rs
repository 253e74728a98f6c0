/// Data layer: core types, loading, filtering and derived views.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐      ┌────────────┐
///   │  loader   │ ◄─── │   cache     │  keyed by (path, mtime)
///   └──────────┘      └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ UserTable │  Vec<UserRecord>, observed categories
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  device type AND game mode
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │ metrics   │   │  churn    │
///   └──────────┘   └──────────┘
///        └──────┬───────┘
///               ▼
///        ┌──────────────┐
///        │ DashboardView │
///        └──────────────┘
/// ```

pub mod cache;
pub mod churn;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod view;
