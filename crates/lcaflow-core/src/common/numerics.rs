//! Small numeric helpers: compensated sums and evenly spaced grids.

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut correction = 0.0;

    for value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

/// `count` evenly spaced points from `start` to `end` inclusive.
///
/// A single point collapses to `start`; zero points yields an empty grid.
pub fn linear_grid(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / ((count - 1) as f64);
            let mut grid: Vec<f64> = (0..count)
                .map(|index| start + step * (index as f64))
                .collect();
            if let Some(last) = grid.last_mut() {
                *last = end;
            }
            grid
        }
    }
}
