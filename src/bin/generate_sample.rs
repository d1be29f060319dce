//! Writes a synthetic multi-cycle cyclic-voltammetry dataset to
//! `sample_cv.parquet` (one row per cycle) and `sample_cv.csv` (one row per
//! sample). The hydrogen-desorption peak shrinks from cycle to cycle, so the
//! integrated area shows a degradation trend.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Builder, ListBuilder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use ecsa_trend::config::ColumnNames;

const CYCLES: usize = 12;
const POINTS_PER_SWEEP: usize = 500;
const UPPER_VERTEX: f64 = 1.0;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// One closed sweep 0 V → vertex → 0 V.
fn sweep_voltages() -> Vec<f64> {
    let step = UPPER_VERTEX / POINTS_PER_SWEEP as f64;
    let up = (0..=POINTS_PER_SWEEP).map(|i| i as f64 * step);
    let down = (0..POINTS_PER_SWEEP).rev().map(|i| i as f64 * step);
    up.chain(down).collect()
}

/// Anodic branch: double-layer plateau plus two desorption peaks scaled by
/// `activity`. Cathodic branch mirrors it below zero.
fn cycle_currents(voltages: &[f64], activity: f64, noise_level: f64, rng: &mut SimpleRng) -> Vec<f64> {
    let mut anodic = true;
    let mut prev = f64::NEG_INFINITY;
    voltages
        .iter()
        .map(|&v| {
            if v < prev {
                anodic = false;
            }
            prev = v;
            let faradaic = gaussian(v, 0.12, 0.04, 0.9 * activity) + gaussian(v, 0.26, 0.05, 0.6 * activity);
            let double_layer = 0.15 * activity + 0.05;
            let signal = if anodic {
                double_layer + faradaic
            } else {
                -(double_layer + 0.8 * faradaic)
            };
            signal + rng.gauss(0.0, noise_level)
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn write_parquet(path: &str, columns: &ColumnNames, cycles: &[(String, Vec<f64>, Vec<f64>)]) -> Result<()> {
    let mut v_builder = ListBuilder::new(Float64Builder::new());
    let mut i_builder = ListBuilder::new(Float64Builder::new());
    for (_, voltages, currents) in cycles {
        v_builder.values().append_slice(voltages);
        v_builder.append(true);
        i_builder.values().append_slice(currents);
        i_builder.append(true);
    }
    let names = StringArray::from(cycles.iter().map(|(n, _, _)| n.as_str()).collect::<Vec<_>>());

    let item = || Arc::new(Field::new("item", DataType::Float64, true));
    let schema = Arc::new(Schema::new(vec![
        Field::new(&columns.run, DataType::Utf8, false),
        Field::new(&columns.voltage, DataType::List(item()), false),
        Field::new(&columns.current, DataType::List(item()), false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(names),
            Arc::new(v_builder.finish()),
            Arc::new(i_builder.finish()),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(path: &str, columns: &ColumnNames, cycles: &[(String, Vec<f64>, Vec<f64>)]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    wtr.write_record([&columns.run, &columns.voltage, &columns.current])?;
    for (name, voltages, currents) in cycles {
        for (v, i) in voltages.iter().zip(currents) {
            wtr.write_record([name.clone(), format!("{v:.6}"), format!("{i:.6e}")])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let columns = ColumnNames::default();
    let voltages = sweep_voltages();

    let cycles: Vec<(String, Vec<f64>, Vec<f64>)> = (0..CYCLES)
        .map(|c| {
            // 4 % activity loss per cycle.
            let activity = 0.96f64.powi(c as i32);
            let currents = cycle_currents(&voltages, activity, 0.004, &mut rng);
            (format!("cycle {:02}", c + 1), voltages.clone(), currents)
        })
        .collect();

    write_parquet("sample_cv.parquet", &columns, &cycles)?;
    write_csv("sample_cv.csv", &columns, &cycles)?;

    println!(
        "Wrote {CYCLES} cycles ({} samples each) to sample_cv.parquet and sample_cv.csv",
        voltages.len()
    );
    Ok(())
}
