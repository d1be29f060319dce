use serde::Serialize;

use crate::data::filter::FilteredTable;

/// One point of the baseline-corrected curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdjustedPoint {
    pub voltage: f64,
    /// `max(0, current - baseline)`.
    pub residual: f64,
}

/// Baseline-corrected curve: same voltages and length as the filtered table,
/// residuals never negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AdjustedCurve {
    points: Vec<AdjustedPoint>,
}

impl AdjustedCurve {
    pub fn points(&self) -> &[AdjustedPoint] {
        &self.points
    }

    pub fn voltages(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.voltage).collect()
    }

    pub fn residuals(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.residual).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Subtract `baseline` from every current and clip negative results to zero.
pub fn clip(filtered: &FilteredTable, baseline: f64) -> AdjustedCurve {
    let points = filtered
        .samples()
        .iter()
        .map(|sp| AdjustedPoint {
            voltage: sp.voltage,
            residual: (sp.current - baseline).max(0.0),
        })
        .collect();
    AdjustedCurve { points }
}
