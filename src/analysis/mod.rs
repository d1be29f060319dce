/// Per-run signal processing and cross-run aggregation.
///
/// ```text
///   FilteredTable
///        │
///        ▼
///   ┌──────────┐
///   │ baseline  │  nearest sample to the target voltage → baseline current
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ residual  │  current − baseline, clipped at 0 → AdjustedCurve
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ integrate  │  composite Simpson over voltage → area
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   run     │  RunOutcome per run;  trend: ordered areas across runs
///   └──────────┘
/// ```

pub mod baseline;
pub mod integrate;
pub mod residual;
pub mod run;
pub mod trend;
