use super::model::{DatasetTable, Sample};

// ---------------------------------------------------------------------------
// Window filter: voltage range + positive current
// ---------------------------------------------------------------------------

/// The samples of a [`DatasetTable`] that fall inside the analysis window.
///
/// Relative order is preserved and each sample keeps its original row index,
/// so downstream lookups can refer back to the source table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredTable {
    indices: Vec<usize>,
    samples: Vec<Sample>,
}

impl FilteredTable {
    /// Original row index of every retained sample.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn voltages(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.voltage).collect()
    }

    pub fn currents(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.current).collect()
    }

    /// Iterate `(original_index, sample)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Sample)> {
        self.indices.iter().copied().zip(self.samples.iter())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Whether a sample passes the window: `0 <= voltage <= voltage_limit` and
/// `current > 0`. NaN in either field never passes.
pub fn in_window(sample: &Sample, voltage_limit: f64) -> bool {
    sample.voltage >= 0.0 && sample.voltage <= voltage_limit && sample.current > 0.0
}

/// Keep every sample inside the window. An empty result is a normal outcome.
pub fn filter(table: &DatasetTable, voltage_limit: f64) -> FilteredTable {
    let (indices, samples): (Vec<usize>, Vec<Sample>) = table
        .samples()
        .iter()
        .enumerate()
        .filter(|(_, sp)| in_window(sp, voltage_limit))
        .map(|(i, sp)| (i, *sp))
        .unzip();
    FilteredTable { indices, samples }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(f64, f64)]) -> DatasetTable {
        rows.iter().map(|&r| Sample::from(r)).collect()
    }

    #[test]
    fn keeps_window_and_positive_current() {
        let t = table(&[(-0.1, 1.0), (0.0, 1.0), (0.2, -3.0), (0.3, 0.0), (0.4, 2.0), (0.5, 4.0)]);
        let f = filter(&t, 0.4);
        assert_eq!(f.indices(), &[1, 4]);
        assert_eq!(f.voltages(), vec![0.0, 0.4]);
        assert_eq!(f.currents(), vec![1.0, 2.0]);
    }

    #[test]
    fn preserves_order_for_non_monotonic_voltage() {
        let t = table(&[(0.3, 1.0), (0.1, 2.0), (0.2, 3.0), (0.1, 4.0)]);
        let f = filter(&t, 1.0);
        assert_eq!(f.indices(), &[0, 1, 2, 3]);
        assert_eq!(f.voltages(), vec![0.3, 0.1, 0.2, 0.1]);
    }

    #[test]
    fn empty_window_is_not_an_error() {
        let t = table(&[(0.5, 1.0), (0.6, 2.0)]);
        assert!(filter(&t, 0.4).is_empty());
        assert!(filter(&DatasetTable::default(), 0.4).is_empty());
        // Negative limit admits nothing.
        assert!(filter(&table(&[(0.0, 1.0)]), -0.1).is_empty());
    }

    #[test]
    fn iter_pairs_samples_with_source_rows() {
        let t = table(&[(0.9, 1.0), (0.1, 2.0), (0.2, -1.0), (0.3, 3.0)]);
        let f = filter(&t, 0.5);
        let pairs: Vec<(usize, f64)> = f.iter().map(|(i, sp)| (i, sp.current)).collect();
        assert_eq!(pairs, vec![(1, 2.0), (3, 3.0)]);
    }

    #[test]
    fn nan_samples_never_pass() {
        let t = table(&[(f64::NAN, 1.0), (0.1, f64::NAN), (0.2, 1.0)]);
        let f = filter(&t, 0.4);
        assert_eq!(f.indices(), &[2]);
    }
}
