use serde::Serialize;

use super::run::RunOutcome;

/// Area of one successfully processed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub run_name: String,
    pub run_index: usize,
    pub area: f64,
}

/// Areas of the successful runs, in run order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trend {
    points: Vec<TrendPoint>,
}

impl Trend {
    pub fn points(&self) -> &[TrendPoint] {
        &self.points
    }

    pub fn areas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.area).collect()
    }

    pub fn run_names(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.run_name.as_str()).collect()
    }

    /// Each area relative to the first point's area.
    ///
    /// `None` when the trend is empty or the first area is zero.
    pub fn retention(&self) -> Option<Vec<f64>> {
        let first = self.points.first()?.area;
        if first == 0.0 {
            return None;
        }
        Some(self.points.iter().map(|p| p.area / first).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Collect `(run, area)` from every successful outcome. Skipped runs are
/// left out, not zero-filled. Points are ordered by run position, so the
/// outcomes may arrive in any order.
pub fn aggregate(outcomes: &[RunOutcome]) -> Trend {
    let mut points: Vec<TrendPoint> = outcomes
        .iter()
        .filter_map(RunOutcome::result)
        .map(|r| TrendPoint {
            run_name: r.run_name.clone(),
            run_index: r.run_index,
            area: r.area,
        })
        .collect();
    points.sort_by_key(|p| p.run_index);
    Trend { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::residual::AdjustedCurve;
    use crate::analysis::run::{RunResult, SkipReason};

    fn success(name: &str, index: usize, area: f64) -> RunOutcome {
        RunOutcome::Success(RunResult {
            run_name: name.to_string(),
            run_index: index,
            area,
            baseline: 0.0,
            anchor_index: 0,
            filtered_voltages: Vec::new(),
            adjusted_curve: AdjustedCurve::default(),
        })
    }

    fn skipped(name: &str, index: usize) -> RunOutcome {
        RunOutcome::Skipped {
            run_name: name.to_string(),
            run_index: index,
            reason: SkipReason::NoDataInWindow,
        }
    }

    #[test]
    fn skipped_runs_are_omitted() {
        let outcomes = vec![
            success("a", 0, 1.0),
            skipped("b", 1),
            success("c", 2, 0.8),
            skipped("d", 3),
        ];
        let trend = aggregate(&outcomes);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend.run_names(), vec!["a", "c"]);
        assert_eq!(trend.areas(), vec![1.0, 0.8]);
    }

    #[test]
    fn out_of_order_outcomes_are_reordered() {
        let outcomes = vec![success("c", 2, 3.0), success("a", 0, 1.0), success("b", 1, 2.0)];
        assert_eq!(aggregate(&outcomes).run_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_and_all_skipped() {
        assert!(aggregate(&[]).is_empty());
        assert!(aggregate(&[skipped("x", 0)]).is_empty());
    }

    #[test]
    fn retention_relative_to_first() {
        let trend = aggregate(&[success("a", 0, 2.0), success("b", 1, 1.5), success("c", 2, 1.0)]);
        assert_eq!(trend.retention(), Some(vec![1.0, 0.75, 0.5]));

        let flat = aggregate(&[success("a", 0, 0.0), success("b", 1, 1.0)]);
        assert_eq!(flat.retention(), None);
        assert_eq!(Trend::default().retention(), None);
    }
}
