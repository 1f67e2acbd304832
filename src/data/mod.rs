/// Data layer: core types, loading, and structural inspection.
///
/// Architecture:
/// ```text
///   raw CSV bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  UTF-8 → detected charset → latin1/cp1252, parse + infer kinds
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  named columns of `Value`, kind fixed at load time
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ inspect   │  shape, dtypes, preview, numeric / non-numeric split
///   └──────────┘
/// ```

pub mod inspect;
pub mod loader;
pub mod model;
