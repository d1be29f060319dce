// ---------------------------------------------------------------------------
// Sample – one measured (voltage, current) pair
// ---------------------------------------------------------------------------

/// A single measurement row of a cyclic-voltammetry sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Working electrode potential (V vs. reference).
    pub voltage: f64,
    /// Measured current (mA).
    pub current: f64,
}

impl Sample {
    pub fn new(voltage: f64, current: f64) -> Self {
        Self { voltage, current }
    }
}

impl From<(f64, f64)> for Sample {
    fn from((voltage, current): (f64, f64)) -> Self {
        Self { voltage, current }
    }
}

// ---------------------------------------------------------------------------
// DatasetTable – all samples of one run, in source row order
// ---------------------------------------------------------------------------

/// Samples of one run in source row order. Voltage is not assumed sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetTable {
    samples: Vec<Sample>,
}

impl DatasetTable {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Build a table from parallel voltage / current columns.
    ///
    /// Returns `None` when the columns differ in length.
    pub fn from_columns(voltages: &[f64], currents: &[f64]) -> Option<Self> {
        if voltages.len() != currents.len() {
            return None;
        }
        let samples = voltages
            .iter()
            .zip(currents)
            .map(|(&v, &i)| Sample::new(v, i))
            .collect();
        Some(Self { samples })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Sample at original row `index`.
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl FromIterator<Sample> for DatasetTable {
    fn from_iter<T: IntoIterator<Item = Sample>>(iter: T) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run – one named sheet
// ---------------------------------------------------------------------------

/// One experimental run (e.g. one cycle of a degradation test).
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Human-readable identifier (sheet name, cycle label, ...).
    pub name: String,
    /// Position of the run in the source order.
    pub index: usize,
    pub table: DatasetTable,
}

impl Run {
    pub fn new(name: impl Into<String>, index: usize, table: DatasetTable) -> Self {
        Self {
            name: name.into(),
            index,
            table,
        }
    }
}

// ---------------------------------------------------------------------------
// RunSet – the ordered collection of runs from one or more sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSet {
    pub runs: Vec<Run>,
}

impl RunSet {
    /// Build a run set from `(name, table)` pairs; positions follow the input order.
    pub fn from_tables<S: Into<String>>(tables: impl IntoIterator<Item = (S, DatasetTable)>) -> Self {
        let runs = tables
            .into_iter()
            .enumerate()
            .map(|(i, (name, table))| Run::new(name, i, table))
            .collect();
        RunSet { runs }
    }

    /// Append all runs of `other`, renumbering their positions after ours.
    pub fn extend(&mut self, other: RunSet) {
        let offset = self.runs.len();
        self.runs.extend(other.runs.into_iter().map(|mut run| {
            run.index += offset;
            run
        }));
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether the set has no runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total sample count over all runs.
    pub fn total_samples(&self) -> usize {
        self.runs.iter().map(|r| r.table.len()).sum()
    }
}
