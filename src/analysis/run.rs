use std::fmt;

use rayon::prelude::*;
use serde::Serialize;

use super::baseline::locate;
use super::integrate::integrate;
use super::residual::{clip, AdjustedCurve};
use crate::config::AnalysisParams;
use crate::data::filter::filter;
use crate::data::model::Run;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Per-run result types
// ---------------------------------------------------------------------------

/// Everything the presentation layer needs about one processed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub run_name: String,
    /// Position of the run in the source order.
    pub run_index: usize,
    pub area: f64,
    pub baseline: f64,
    /// Original row index of the sample the baseline was read from.
    pub anchor_index: usize,
    pub filtered_voltages: Vec<f64>,
    pub adjusted_curve: AdjustedCurve,
}

impl RunResult {
    /// Residuals shifted back up by the baseline, i.e. the clipped curve in
    /// measured-current units.
    pub fn baseline_restored(&self) -> Vec<f64> {
        self.adjusted_curve
            .points()
            .iter()
            .map(|p| p.residual + self.baseline)
            .collect()
    }
}

/// Why a run produced no area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No sample satisfied the voltage window and positive-current filter.
    NoDataInWindow,
    /// The pipeline rejected the run's data.
    Failed(AnalysisError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoDataInWindow => write!(f, "no data in window"),
            SkipReason::Failed(err) => write!(f, "processing failed: {err}"),
        }
    }
}

impl Serialize for SkipReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of one run: an area, or a reason it has none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Success(RunResult),
    Skipped {
        run_name: String,
        run_index: usize,
        reason: SkipReason,
    },
}

impl RunOutcome {
    pub fn run_name(&self) -> &str {
        match self {
            RunOutcome::Success(r) => &r.run_name,
            RunOutcome::Skipped { run_name, .. } => run_name,
        }
    }

    pub fn run_index(&self) -> usize {
        match self {
            RunOutcome::Success(r) => r.run_index,
            RunOutcome::Skipped { run_index, .. } => *run_index,
        }
    }

    pub fn result(&self) -> Option<&RunResult> {
        match self {
            RunOutcome::Success(r) => Some(r),
            RunOutcome::Skipped { .. } => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            RunOutcome::Success(_) => None,
            RunOutcome::Skipped { reason, .. } => Some(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }
}

// ---------------------------------------------------------------------------
// Run processor
// ---------------------------------------------------------------------------

/// Window → baseline → clip → integrate for a single run.
///
/// An empty window is a normal outcome and returns
/// [`SkipReason::NoDataInWindow`] without touching the later stages. Errors
/// from those stages are turned into [`SkipReason::Failed`] so a bad run
/// never aborts a batch.
pub fn process(run: &Run, params: &AnalysisParams) -> RunOutcome {
    match try_process(run, params) {
        Ok(Some(result)) => RunOutcome::Success(result),
        Ok(None) => skipped(run, SkipReason::NoDataInWindow),
        Err(err) => skipped(run, SkipReason::Failed(err)),
    }
}

fn skipped(run: &Run, reason: SkipReason) -> RunOutcome {
    RunOutcome::Skipped {
        run_name: run.name.clone(),
        run_index: run.index,
        reason,
    }
}

fn try_process(run: &Run, params: &AnalysisParams) -> Result<Option<RunResult>, AnalysisError> {
    let filtered = filter(&run.table, params.voltage_limit);
    if filtered.is_empty() {
        return Ok(None);
    }

    let baseline = locate(&filtered, params.target_voltage)?;
    let adjusted_curve = clip(&filtered, baseline.current);
    let filtered_voltages = filtered.voltages();
    let area = integrate(&filtered_voltages, &adjusted_curve.residuals())?;

    Ok(Some(RunResult {
        run_name: run.name.clone(),
        run_index: run.index,
        area,
        baseline: baseline.current,
        anchor_index: baseline.anchor_index,
        filtered_voltages,
        adjusted_curve,
    }))
}

/// Process runs one after another in source order.
pub fn process_runs(runs: &[Run], params: &AnalysisParams) -> Vec<RunOutcome> {
    runs.iter().map(|run| process(run, params)).collect()
}

/// Process runs on the rayon thread pool. Runs share no state; the returned
/// outcomes are in source order.
pub fn process_runs_parallel(runs: &[Run], params: &AnalysisParams) -> Vec<RunOutcome> {
    let mut outcomes: Vec<RunOutcome> = runs.par_iter().map(|run| process(run, params)).collect();
    outcomes.sort_by_key(RunOutcome::run_index);
    outcomes
}
