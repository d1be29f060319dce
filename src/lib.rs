//! ECSA area analysis for cyclic-voltammetry runs.
//!
//! Each run (one sheet of voltage/current pairs) is windowed, baseline
//! corrected at a reference voltage, clipped and integrated with Simpson's
//! rule. The per-run areas are then collected into an ordered [`Trend`].
//!
//! [`Trend`]: analysis::trend::Trend

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;

pub use analysis::run::{process, process_runs, process_runs_parallel, RunOutcome, RunResult, SkipReason};
pub use analysis::trend::{aggregate, Trend, TrendPoint};
pub use config::{AnalysisConfig, AnalysisParams, ColumnNames};
pub use data::model::{DatasetTable, Run, RunSet, Sample};
pub use error::AnalysisError;
