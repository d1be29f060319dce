use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::run::RunOutcome;
use crate::analysis::trend::Trend;

// ---------------------------------------------------------------------------
// Trend export (CSV)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TrendRow<'a> {
    run: &'a str,
    area: f64,
    /// Empty when retention is undefined.
    retention: Option<f64>,
}

/// Write the trend as CSV with columns `run,area,retention`.
pub fn write_trend_csv<W: Write>(trend: &Trend, writer: W) -> Result<()> {
    let retention = trend.retention();
    let mut wtr = csv::Writer::from_writer(writer);

    for (i, point) in trend.points().iter().enumerate() {
        wtr.serialize(TrendRow {
            run: &point.run_name,
            area: point.area,
            retention: retention.as_ref().map(|r| r[i]),
        })
        .with_context(|| format!("writing trend row for '{}'", point.run_name))?;
    }
    // An empty trend still gets a header line.
    if trend.is_empty() {
        wtr.write_record(["run", "area", "retention"])
            .context("writing trend header")?;
    }
    wtr.flush().context("flushing trend CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Per-run export (JSON)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ResultsDocument<'a> {
    runs: &'a [RunOutcome],
    trend: &'a Trend,
}

/// Write every outcome (curves for successes, reasons for skipped runs) and
/// the trend as one pretty-printed JSON document.
pub fn write_results_json<W: Write>(outcomes: &[RunOutcome], trend: &Trend, writer: W) -> Result<()> {
    let doc = ResultsDocument {
        runs: outcomes,
        trend,
    };
    serde_json::to_writer_pretty(writer, &doc).context("writing results JSON")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Console summary
// ---------------------------------------------------------------------------

/// Plain-text table of the trend for terminal output.
pub fn format_trend_table(trend: &Trend) -> String {
    let retention = trend.retention();
    let width = trend
        .points()
        .iter()
        .map(|p| p.run_name.len())
        .max()
        .unwrap_or(0)
        .max("run".len());

    let mut out = format!("{:<width$}  {:>14}  {:>9}\n", "run", "area", "retention");
    for (i, p) in trend.points().iter().enumerate() {
        let ret = match &retention {
            Some(r) => format!("{:.1}%", r[i] * 100.0),
            None => "-".to_string(),
        };
        out.push_str(&format!("{:<width$}  {:>14.6e}  {:>9}\n", p.run_name, p.area, ret));
    }
    out
}
