use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, LargeListArray, ListArray, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{DatasetTable, RunSet, Sample};
use crate::config::ColumnNames;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every run stored in a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – one row per sample, optional run column groups rows into runs
/// * `.json`    – `[{ "<run>": "cycle 1", "<voltage>": [...], "<current>": [...] }, ...]`
/// * `.parquet` – one row per run with list columns for voltage and current
pub fn load_file(path: &Path, columns: &ColumnNames) -> Result<RunSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let runs = match ext.as_str() {
        "csv" => load_csv(path, columns),
        "json" => load_json(path, columns),
        "parquet" | "pq" => load_parquet(path, columns),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} run(s), {} sample(s) from {}",
        runs.len(),
        runs.total_samples(),
        path.display()
    );
    Ok(runs)
}

/// Load several files and concatenate their runs in argument order.
pub fn load_files<P: AsRef<Path>>(paths: &[P], columns: &ColumnNames) -> Result<RunSet> {
    let mut all = RunSet::default();
    for path in paths {
        all.extend(load_file(path.as_ref(), columns)?);
    }
    Ok(all)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("run")
        .to_string()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one sample per row.
///
/// ```text
/// sheet,Ewe/V vs. SCE,<I>/mA
/// cycle 1,0.00,0.012
/// cycle 1,0.01,0.013
/// cycle 2,0.00,0.011
/// ```
///
/// Rows are grouped by the run column in first-appearance order. Without a
/// run column the whole file is a single run named after the file stem.
/// Any other column is ignored.
fn load_csv(path: &Path, columns: &ColumnNames) -> Result<RunSet> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader, columns, &file_stem(path))
}

pub(crate) fn read_csv<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    columns: &ColumnNames,
    default_name: &str,
) -> Result<RunSet> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let v_idx = headers
        .iter()
        .position(|h| *h == columns.voltage)
        .with_context(|| format!("CSV missing '{}' column", columns.voltage))?;
    let i_idx = headers
        .iter()
        .position(|h| *h == columns.current)
        .with_context(|| format!("CSV missing '{}' column", columns.current))?;
    let run_idx = headers.iter().position(|h| *h == columns.run);
    if run_idx.is_none() {
        log::debug!("CSV has no '{}' column, reading a single run", columns.run);
    }

    // Run name → samples, in first-appearance order.
    let mut groups: Vec<(String, Vec<Sample>)> = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let voltage = parse_cell(record.get(v_idx), row_no, &columns.voltage)?;
        let current = parse_cell(record.get(i_idx), row_no, &columns.current)?;

        let name = match run_idx {
            Some(idx) => record.get(idx).unwrap_or("").trim().to_string(),
            None => default_name.to_string(),
        };

        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, samples)) => samples.push(Sample::new(voltage, current)),
            None => groups.push((name, vec![Sample::new(voltage, current)])),
        }
    }

    Ok(RunSet::from_tables(
        groups
            .into_iter()
            .map(|(name, samples)| (name, DatasetTable::new(samples))),
    ))
}

fn parse_cell(cell: Option<&str>, row: usize, col: &str) -> Result<f64> {
    let tok = cell.unwrap_or("").trim();
    if tok.is_empty() {
        bail!("Row {row}, '{col}': empty cell");
    }
    let value = tok
        .parse::<f64>()
        .with_context(|| format!("Row {row}, '{col}': '{tok}' is not a number"))?;
    if !value.is_finite() {
        bail!("Row {row}, '{col}': '{tok}' is not a finite number");
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (one record per run, in run order):
///
/// ```json
/// [
///   {
///     "sheet": "cycle 1",
///     "Ewe/V vs. SCE": [0.0, 0.01, ...],
///     "<I>/mA":        [0.012, 0.013, ...]
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path, columns: &ColumnNames) -> Result<RunSet> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text, columns)
}

pub(crate) fn parse_json(text: &str, columns: &ColumnNames) -> Result<RunSet> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut tables = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Run {i} is not a JSON object"))?;

        let voltages = json_array_to_f64(obj.get(&columns.voltage), i, &columns.voltage)?;
        let currents = json_array_to_f64(obj.get(&columns.current), i, &columns.current)?;

        let table = DatasetTable::from_columns(&voltages, &currents).with_context(|| {
            format!(
                "Run {i}: {} voltages but {} currents",
                voltages.len(),
                currents.len()
            )
        })?;

        let name = match obj.get(&columns.run) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => format!("run {i}"),
            Some(other) => other.to_string(),
        };

        tables.push((name, table));
    }

    Ok(RunSet::from_tables(tables))
}

fn json_array_to_f64(val: Option<&JsonValue>, run: usize, col: &str) -> Result<Vec<f64>> {
    let arr = val
        .and_then(|v| v.as_array())
        .with_context(|| format!("Run {run}: missing or invalid '{col}' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .with_context(|| format!("Run {run}, {col}[{j}]: not a number"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one run per row.
///
/// Expected schema:
/// - voltage column: List<Float64|Float32> or LargeList<...>
/// - current column: same shape as voltage
/// - run column (optional): Utf8 / LargeUtf8 run name
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, columns: &ColumnNames) -> Result<RunSet> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut tables = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        read_batch(&batch, columns, &mut tables)?;
    }

    Ok(RunSet::from_tables(tables))
}

/// Append one run per row of `batch` to `tables`.
fn read_batch(
    batch: &RecordBatch,
    columns: &ColumnNames,
    tables: &mut Vec<(String, DatasetTable)>,
) -> Result<()> {
    let schema = batch.schema();

    let v_idx = schema
        .index_of(&columns.voltage)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{}' column", columns.voltage))?;
    let i_idx = schema
        .index_of(&columns.current)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{}' column", columns.current))?;
    let run_idx = schema.index_of(&columns.run).ok();

    let v_col = batch.column(v_idx);
    let i_col = batch.column(i_idx);

    for row in 0..batch.num_rows() {
        // `row` restarts in every batch; errors name the run across the file.
        let run_no = tables.len();
        let voltages = extract_f64_list(v_col, row)
            .with_context(|| format!("Run {run_no}: failed to read '{}'", columns.voltage))?;
        let currents = extract_f64_list(i_col, row)
            .with_context(|| format!("Run {run_no}: failed to read '{}'", columns.current))?;

        let table = DatasetTable::from_columns(&voltages, &currents).with_context(|| {
            format!(
                "Run {run_no}: {} voltages but {} currents",
                voltages.len(),
                currents.len()
            )
        })?;

        let name = run_idx
            .and_then(|idx| extract_string(batch.column(idx), row))
            .unwrap_or_else(|| format!("run {run_no}"));

        tables.push((name, table));
    }
    Ok(())
}

// -- Parquet / Arrow helpers --

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    // Nulls become NaN, which the window filter never admits.
    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        )
    }
}

/// Run name from a string column; `None` for nulls and non-string columns.
fn extract_string(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => None,
    }
}
