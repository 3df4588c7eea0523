pub mod roots;
pub mod special;

pub use roots::{NonConvergence, RefineOutcome, SecantInput, refine_secant};

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

/// Kahan accumulator for sums produced one term at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StableAccumulator {
    sum: f64,
    correction: f64,
}

impl StableAccumulator {
    pub fn add(&mut self, value: f64) {
        kahan_add(&mut self.sum, &mut self.correction, value);
    }

    pub fn total(&self) -> f64 {
        self.sum
    }
}

/// Uniform grid with both endpoints included; the last sample is exactly `end`.
pub fn linear_grid(start: f64, end: f64, count: usize) -> Option<Vec<f64>> {
    if count < 2 {
        return None;
    }

    let step = (end - start) / ((count - 1) as f64);
    let mut grid = Vec::with_capacity(count);
    for index in 0..count {
        grid.push(start + step * (index as f64));
    }

    if let Some(last) = grid.last_mut() {
        *last = end;
    }

    Some(grid)
}

/// Index of the smallest value, first occurrence on ties. NaN entries are skipped.
pub fn argmin_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some(current) if values[current] <= value => {}
            _ => best = Some(index),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::{StableAccumulator, argmin_first, linear_grid};

    #[test]
    fn stable_accumulator_recovers_small_terms() {
        let mut values = vec![1.0e16];
        values.extend(std::iter::repeat_n(1.0, 1000));
        values.push(-1.0e16);

        let mut accumulator = StableAccumulator::default();
        for value in &values {
            accumulator.add(*value);
        }
        assert_eq!(accumulator.total(), 1000.0);
    }

    #[test]
    fn linear_grid_is_inclusive_and_rejects_invalid_counts() {
        assert_eq!(linear_grid(0.0, 1.0, 1), None);
        let grid = linear_grid(0.0, 2.0, 5).expect("grid");
        assert_eq!(grid, vec![0.0, 0.5, 1.0, 1.5, 2.0]);

        let grid = linear_grid(-0.3, 0.7, 7).expect("grid");
        assert_eq!(grid.last().copied(), Some(0.7));
    }

    #[test]
    fn argmin_prefers_first_occurrence() {
        assert_eq!(argmin_first(&[]), None);
        assert_eq!(argmin_first(&[3.0, 1.0, 2.0, 1.0]), Some(1));
        assert_eq!(argmin_first(&[f64::NAN, 2.0, 2.0]), Some(1));
    }
}
