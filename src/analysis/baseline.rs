use crate::data::filter::FilteredTable;
use crate::error::AnalysisError;

/// The baseline current of a run and the sample it was read from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    /// Current of the anchor sample.
    pub current: f64,
    /// Original row index of the anchor sample in the run's table.
    pub anchor_index: usize,
}

/// Find the sample whose voltage is closest to `target` and return its current.
///
/// Linear scan over `|voltage - target|` in table order; voltage need not be
/// sorted. Ties resolve to the first sample scanned, i.e. the smallest
/// original row index. A NaN distance never wins over a finite one.
pub fn locate(filtered: &FilteredTable, target: f64) -> Result<Baseline, AnalysisError> {
    // (original index, current, distance) of the closest sample so far.
    let mut best: Option<(usize, f64, f64)> = None;

    for (index, sample) in filtered.iter() {
        let dist = (sample.voltage - target).abs();
        // Strict `<` keeps the earliest of equally close samples.
        let better = match best {
            None => true,
            Some((_, _, best_dist)) => dist < best_dist || (best_dist.is_nan() && !dist.is_nan()),
        };
        if better {
            best = Some((index, sample.current, dist));
        }
    }

    let (anchor_index, current, _) = best.ok_or(AnalysisError::EmptyInput)?;
    Ok(Baseline {
        current,
        anchor_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::filter;
    use crate::data::model::{DatasetTable, Sample};

    fn filtered(rows: &[(f64, f64)]) -> FilteredTable {
        let table: DatasetTable = rows.iter().map(|&r| Sample::from(r)).collect();
        filter(&table, f64::INFINITY)
    }

    #[test]
    fn exact_match_wins() {
        let f = filtered(&[(0.0, 1.0), (0.2, 2.0), (0.4, 5.0)]);
        let b = locate(&f, 0.4).unwrap();
        assert_eq!(b.current, 5.0);
        assert_eq!(b.anchor_index, 2);
    }

    #[test]
    fn works_on_non_monotonic_voltage() {
        let f = filtered(&[(0.5, 1.0), (0.1, 2.0), (0.31, 3.0), (0.2, 4.0)]);
        let b = locate(&f, 0.3).unwrap();
        assert_eq!(b.current, 3.0);
        assert_eq!(b.anchor_index, 2);
    }

    #[test]
    fn ties_pick_the_smallest_original_index() {
        // 0.25 and 0.75 are both exactly 0.25 away from 0.5.
        let f = filtered(&[(0.9, 9.0), (0.75, 7.0), (0.25, 2.0)]);
        for _ in 0..3 {
            let b = locate(&f, 0.5).unwrap();
            assert_eq!(b.anchor_index, 1);
            assert_eq!(b.current, 7.0);
        }

        // Duplicate voltages: first occurrence.
        let f = filtered(&[(0.1, 1.0), (0.3, 3.0), (0.3, 4.0)]);
        assert_eq!(locate(&f, 0.3).unwrap().anchor_index, 1);
    }

    #[test]
    fn anchor_index_refers_to_the_unfiltered_table() {
        let table: DatasetTable = [(0.9, 1.0), (0.1, -1.0), (0.2, 2.0), (0.3, 3.0)]
            .iter()
            .map(|&r| Sample::from(r))
            .collect();
        let f = filter(&table, 0.5);
        let b = locate(&f, 0.3).unwrap();
        assert_eq!(b.anchor_index, 3);
        assert_eq!(table.get(b.anchor_index).unwrap().current, b.current);
    }

    #[test]
    fn empty_table_is_an_error() {
        assert_eq!(locate(&FilteredTable::default(), 0.4), Err(AnalysisError::EmptyInput));
    }

    #[test]
    fn nan_target_falls_back_to_first_sample() {
        let f = filtered(&[(0.1, 1.0), (0.2, 2.0)]);
        assert_eq!(locate(&f, f64::NAN).unwrap().anchor_index, 0);
    }
}
