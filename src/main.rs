use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ecsa_trend::config::AnalysisConfig;
use ecsa_trend::data::loader::load_files;
use ecsa_trend::report::{format_trend_table, write_results_json, write_trend_csv};
use ecsa_trend::state::AnalysisState;

#[derive(Parser, Debug)]
#[command(name = "ecsa-trend")]
#[command(version)]
#[command(about = "ECSA area analysis across cyclic-voltammetry runs", long_about = None)]
struct Cli {
    /// Run data files (.csv, .json, .parquet), read in the given order
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Upper bound of the voltage window (V vs. SCE)
    #[arg(short = 'l', long)]
    voltage_limit: Option<f64>,

    /// Reference voltage for the baseline (defaults to the window limit)
    #[arg(short, long)]
    target_voltage: Option<f64>,

    /// Voltage column name
    #[arg(long)]
    voltage_column: Option<String>,

    /// Current column name
    #[arg(long)]
    current_column: Option<String>,

    /// Run (sheet) name column
    #[arg(long)]
    run_column: Option<String>,

    /// Process runs in parallel
    #[arg(long)]
    parallel: bool,

    /// Write the trend as CSV
    #[arg(long, value_name = "TREND_CSV")]
    trend_out: Option<PathBuf>,

    /// Write per-run curves and skipped-run reasons as JSON
    #[arg(long, value_name = "RESULTS_JSON")]
    results_out: Option<PathBuf>,
}

impl Cli {
    /// File configuration (or defaults) with command-line overrides applied.
    fn resolve_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(v) = self.voltage_limit {
            config.voltage_limit = v;
        }
        if let Some(v) = self.target_voltage {
            config.target_voltage = Some(v);
        }
        if let Some(c) = &self.voltage_column {
            config.columns.voltage = c.clone();
        }
        if let Some(c) = &self.current_column {
            config.columns.current = c.clone();
        }
        if let Some(c) = &self.run_column {
            config.columns.run = c.clone();
        }
        config.parallel |= self.parallel;

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let params = config.params();
    log::info!(
        "Voltage window [0, {}] V, baseline at {} V",
        params.voltage_limit,
        params.target_voltage
    );

    let runs = load_files(&cli.inputs, &config.columns)?;
    if runs.is_empty() {
        bail!("No runs found in the input files");
    }

    let mut state = AnalysisState::new(params, config.parallel);
    state.set_runs(runs);

    print!("{}", format_trend_table(&state.trend));
    if state.skipped_count() > 0 {
        println!("{} run(s) skipped:", state.skipped_count());
        for warning in &state.warnings {
            println!("  {warning}");
        }
    }

    if let Some(path) = &cli.trend_out {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_trend_csv(&state.trend, BufWriter::new(file))?;
        log::info!("Wrote trend to {}", path.display());
    }

    if let Some(path) = &cli.results_out {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_results_json(&state.outcomes, &state.trend, BufWriter::new(file))?;
        log::info!("Wrote run results to {}", path.display());
    }

    Ok(())
}
