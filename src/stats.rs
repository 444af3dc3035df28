use ndarray::ArrayView1;
use crate::error::{RmstError, Result};

/// sorted copy of the values (total order, so NaN can't panic the sort)
fn sorted(values: ArrayView1<f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// sample median - mean of the two middle values when n is even
pub fn median(values: ArrayView1<f64>) -> Result<f64> {
    if values.is_empty() {
        return Err(RmstError::invalid_dimensions("can't take the median of nothing"));
    }

    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid])
    } else {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// q-th percentile (0..=100) w/ linear interpolation between closest ranks
pub fn percentile(values: ArrayView1<f64>, q: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(RmstError::invalid_dimensions("can't take a percentile of nothing"));
    }
    if !(0.0..=100.0).contains(&q) {
        return Err(RmstError::invalid_parameter("percentile", q));
    }

    let sorted = sorted(values);
    let rank = (sorted.len() - 1) as f64 * q / 100.0;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = rank - lo as f64;

    Ok(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// round to 4 decimals, halves away from zero. only used when writing output
pub fn round4(value: f64) -> f64 {
    (value * 1e4).round() / 1e4 + 0.0 // + 0.0 folds -0.0 into 0.0
}
