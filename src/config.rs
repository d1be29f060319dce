use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column names looked up by the loaders
// ---------------------------------------------------------------------------

/// Named fields the ingestion layer reads. Column order in the source is
/// irrelevant; only these names are looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub voltage: String,
    pub current: String,
    /// Column holding the run (sheet) name. Optional in CSV sources.
    pub run: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            voltage: "Ewe/V vs. SCE".to_string(),
            current: "<I>/mA".to_string(),
            run: "sheet".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline parameters
// ---------------------------------------------------------------------------

/// The two scalars shared by every run of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Upper bound of the voltage window `[0, voltage_limit]`.
    pub voltage_limit: f64,
    /// Voltage whose nearest sample sets the baseline current.
    pub target_voltage: f64,
}

impl AnalysisParams {
    pub fn new(voltage_limit: f64, target_voltage: f64) -> Self {
        Self {
            voltage_limit,
            target_voltage,
        }
    }
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self::new(DEFAULT_VOLTAGE, DEFAULT_VOLTAGE)
    }
}

/// Default window limit and reference voltage (V vs. SCE).
pub const DEFAULT_VOLTAGE: f64 = 0.4;

// ---------------------------------------------------------------------------
// File configuration
// ---------------------------------------------------------------------------

/// Configuration file layout:
///
/// ```json
/// {
///   "voltage_limit": 0.4,
///   "target_voltage": 0.35,
///   "columns": { "voltage": "Ewe/V vs. SCE", "current": "<I>/mA", "run": "sheet" },
///   "parallel": false
/// }
/// ```
///
/// Every field is optional. When `target_voltage` is absent the window limit
/// doubles as the reference voltage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub voltage_limit: f64,
    pub target_voltage: Option<f64>,
    pub columns: ColumnNames,
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            voltage_limit: DEFAULT_VOLTAGE,
            target_voltage: None,
            columns: ColumnNames::default(),
            parallel: false,
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(text).context("parsing JSON config")?;
        Ok(config)
    }

    /// Resolved pipeline parameters.
    pub fn params(&self) -> AnalysisParams {
        AnalysisParams::new(
            self.voltage_limit,
            self.target_voltage.unwrap_or(self.voltage_limit),
        )
    }

    /// Reject values the pipeline cannot interpret. Limits outside `[0, 1]`
    /// are legal but unusual and only reported.
    pub fn validate(&self) -> Result<()> {
        let params = self.params();
        if !params.voltage_limit.is_finite() {
            bail!("voltage_limit must be finite, got {}", params.voltage_limit);
        }
        if !params.target_voltage.is_finite() {
            bail!("target_voltage must be finite, got {}", params.target_voltage);
        }
        if !(0.0..=1.0).contains(&params.voltage_limit) {
            log::warn!(
                "voltage_limit {} is outside the usual [0, 1] V range",
                params.voltage_limit
            );
        }
        for (field, name) in [
            ("voltage", &self.columns.voltage),
            ("current", &self.columns.current),
        ] {
            if name.trim().is_empty() {
                bail!("column name for '{field}' must not be empty");
            }
        }
        Ok(())
    }
}
