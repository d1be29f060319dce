use crate::analysis::run::{process_runs, process_runs_parallel, RunOutcome};
use crate::analysis::trend::{aggregate, Trend};
use crate::config::AnalysisParams;
use crate::data::model::RunSet;

// ---------------------------------------------------------------------------
// Analysis state
// ---------------------------------------------------------------------------

/// Loaded runs, current parameters and the latest results, independent of
/// any front end. Every mutation recomputes the outcomes and the trend.
#[derive(Debug, Default)]
pub struct AnalysisState {
    /// Loaded runs (None until a source has been read).
    pub runs: Option<RunSet>,

    pub params: AnalysisParams,

    /// Spread per-run work over the rayon pool.
    pub parallel: bool,

    /// One outcome per loaded run, in run order.
    pub outcomes: Vec<RunOutcome>,

    /// Areas of the successful runs.
    pub trend: Trend,

    /// One `"<run>: <reason>"` line per skipped run.
    pub warnings: Vec<String>,
}

impl AnalysisState {
    pub fn new(params: AnalysisParams, parallel: bool) -> Self {
        Self {
            params,
            parallel,
            ..Default::default()
        }
    }

    /// Ingest newly loaded runs and analyse them.
    pub fn set_runs(&mut self, runs: RunSet) {
        self.runs = Some(runs);
        self.recompute();
    }

    /// Change the window limit and re-run the analysis.
    pub fn set_voltage_limit(&mut self, voltage_limit: f64) {
        self.params.voltage_limit = voltage_limit;
        self.recompute();
    }

    /// Change the baseline reference voltage and re-run the analysis.
    pub fn set_target_voltage(&mut self, target_voltage: f64) {
        self.params.target_voltage = target_voltage;
        self.recompute();
    }

    /// Recompute outcomes, trend and skipped-run warnings from the loaded runs.
    pub fn recompute(&mut self) {
        let Some(runs) = &self.runs else {
            return;
        };

        self.outcomes = if self.parallel {
            process_runs_parallel(&runs.runs, &self.params)
        } else {
            process_runs(&runs.runs, &self.params)
        };
        self.trend = aggregate(&self.outcomes);

        self.warnings = self
            .outcomes
            .iter()
            .filter_map(|o| {
                o.skip_reason()
                    .map(|reason| format!("{}: {reason}", o.run_name()))
            })
            .collect();

        for warning in &self.warnings {
            log::warn!("Skipped run {warning}");
        }
        log::debug!(
            "Analysed {} run(s) at limit {} V, target {} V: {} area(s)",
            self.outcomes.len(),
            self.params.voltage_limit,
            self.params.target_voltage,
            self.trend.len()
        );
    }

    /// Number of runs that produced no area.
    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.trend.len()
    }
}
