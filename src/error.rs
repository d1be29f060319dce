use thiserror::Error;

/// Failures of the numeric core. Every variant is scoped to a single run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Baseline lookup on an empty filtered table.
    #[error("cannot locate a baseline in an empty table")]
    EmptyInput,

    /// Integration requested over zero samples.
    #[error("insufficient data for integration, need at least 1 sample")]
    InsufficientData,

    #[error("length mismatch: {voltages} voltages but {residuals} residuals")]
    LengthMismatch { voltages: usize, residuals: usize },
}
