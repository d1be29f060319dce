use std::path::PathBuf;
use std::sync::Arc;

use approx::assert_relative_eq;
use arrow::array::{Float64Builder, ListBuilder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use ecsa_trend::data::loader::{load_file, load_files};
use ecsa_trend::{aggregate, process_runs, process_runs_parallel, AnalysisParams, ColumnNames, RunOutcome};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ecsa-trend-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Rows of a sweep 0.0..=0.5 V in 0.05 V steps with current `scale * (1 + 10 v)`.
fn ramp_rows(sheet: &str, scale: f64) -> Vec<String> {
    (0..=10)
        .map(|k| {
            let v = k as f64 * 0.05;
            format!("{sheet},{v},{}", scale * (1.0 + 10.0 * v))
        })
        .collect()
}

#[test]
fn csv_runs_flow_into_an_ordered_trend() {
    let dir = scratch_dir("csv");
    let path = dir.join("cycles.csv");

    let mut lines = vec!["sheet,Ewe/V vs. SCE,<I>/mA".to_string()];
    lines.extend(ramp_rows("cycle 1", 1.0));
    lines.extend(ramp_rows("cycle 2", 0.5));
    // Entirely cathodic: nothing survives the positive-current filter.
    lines.extend(ramp_rows("cycle 3", -1.0));
    lines.extend(ramp_rows("cycle 4", 0.25));
    std::fs::write(&path, lines.join("\n")).unwrap();

    let runs = load_file(&path, &ColumnNames::default()).unwrap();
    assert_eq!(runs.len(), 4);

    // Window [0, 0.4], baseline at 0 V → residual 10 * scale * v.
    let outcomes = process_runs(&runs.runs, &AnalysisParams::new(0.4, 0.0));
    let trend = aggregate(&outcomes);

    assert_eq!(trend.run_names(), vec!["cycle 1", "cycle 2", "cycle 4"]);
    let areas = trend.areas();
    assert_relative_eq!(areas[0], 0.8, epsilon = 1e-9);
    assert_relative_eq!(areas[1], 0.4, epsilon = 1e-9);
    assert_relative_eq!(areas[2], 0.2, epsilon = 1e-9);

    match &outcomes[2] {
        RunOutcome::Skipped { run_name, reason, .. } => {
            assert_eq!(run_name, "cycle 3");
            assert_eq!(reason.to_string(), "no data in window");
        }
        other => panic!("expected cycle 3 to be skipped, got {other:?}"),
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn every_success_is_non_negative_with_zero_at_the_anchor() {
    let dir = scratch_dir("json");
    let path = dir.join("runs.json");
    std::fs::write(
        &path,
        r#"[
            { "sheet": "a", "Ewe/V vs. SCE": [0.0, 0.1, 0.2, 0.3, 0.4], "<I>/mA": [0.9, 0.3, 0.5, 1.4, 0.2] },
            { "sheet": "b", "Ewe/V vs. SCE": [0.4, 0.3, 0.2, 0.1, 0.0], "<I>/mA": [0.1, 0.2, 0.8, 0.2, 0.1] },
            { "sheet": "c", "Ewe/V vs. SCE": [0.2], "<I>/mA": [3.0] }
        ]"#,
    )
    .unwrap();

    let runs = load_file(&path, &ColumnNames::default()).unwrap();
    let outcomes = process_runs(&runs.runs, &AnalysisParams::new(0.4, 0.25));

    for (outcome, run) in outcomes.iter().zip(&runs.runs) {
        let result = outcome.result().expect("all runs have data in window");
        assert!(result.adjusted_curve.residuals().iter().all(|&r| r >= 0.0));

        let anchor = run.table.get(result.anchor_index).unwrap();
        assert_eq!(anchor.current, result.baseline);
        let pos = result
            .filtered_voltages
            .iter()
            .position(|&v| v == anchor.voltage)
            .unwrap();
        assert_eq!(result.adjusted_curve.points()[pos].residual, 0.0);
    }

    // Single-sample run integrates to zero.
    assert_eq!(outcomes[2].result().unwrap().area, 0.0);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn parquet_rows_are_runs() {
    let dir = scratch_dir("parquet");
    let path = dir.join("runs.parquet");
    let columns = ColumnNames::default();

    let mut v_builder = ListBuilder::new(Float64Builder::new());
    let mut i_builder = ListBuilder::new(Float64Builder::new());
    for scale in [1.0, 0.5] {
        v_builder.values().append_slice(&[0.0, 0.1, 0.2]);
        v_builder.append(true);
        i_builder.values().append_slice(&[scale, scale * 2.0, scale * 3.0]);
        i_builder.append(true);
    }
    let item = || Arc::new(Field::new("item", DataType::Float64, true));
    let schema = Arc::new(Schema::new(vec![
        Field::new(&columns.voltage, DataType::List(item()), false),
        Field::new(&columns.current, DataType::List(item()), false),
        Field::new(&columns.run, DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(v_builder.finish()),
            Arc::new(i_builder.finish()),
            Arc::new(StringArray::from(vec!["first", "second"])),
        ],
    )
    .unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let runs = load_file(&path, &columns).unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs.runs[1].name, "second");
    assert_eq!(runs.runs[1].table.len(), 3);

    let trend = aggregate(&process_runs(&runs.runs, &AnalysisParams::new(0.4, 0.0)));
    // Linear residual scale * 10 v over [0, 0.2] → scale * 0.2.
    assert_relative_eq!(trend.areas()[0], 0.2, epsilon = 1e-9);
    assert_relative_eq!(trend.retention().unwrap()[1], 0.5, epsilon = 1e-9);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn multiple_files_keep_argument_order_and_parallel_agrees() {
    let dir = scratch_dir("multi");
    let header = "Ewe/V vs. SCE,<I>/mA";
    let body = |scale: f64| {
        (0..=8)
            .map(|k| {
                let v = k as f64 * 0.05;
                format!("{v},{}", scale * (0.5 + v * v))
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut paths = Vec::new();
    for (name, scale) in [("c03", 0.8), ("c01", 1.0), ("c02", 0.9)] {
        let path = dir.join(format!("{name}.csv"));
        std::fs::write(&path, format!("{header}\n{}", body(scale))).unwrap();
        paths.push(path);
    }

    let runs = load_files(&paths, &ColumnNames::default()).unwrap();
    let names: Vec<&str> = runs.runs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["c03", "c01", "c02"]);
    let indices: Vec<usize> = runs.runs.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    let params = AnalysisParams::new(0.4, 0.0);
    let sequential = aggregate(&process_runs(&runs.runs, &params));
    let parallel = aggregate(&process_runs_parallel(&runs.runs, &params));
    assert_eq!(sequential, parallel);
    assert_eq!(sequential.run_names(), vec!["c03", "c01", "c02"]);

    std::fs::remove_dir_all(&dir).ok();
}
