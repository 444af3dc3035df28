use ndarray::ArrayView1;
use crate::error::{RmstError, Result};
use crate::km::KaplanMeierCurve;

/// widths of the grid steps, measured from time zero
pub fn time_deltas(grid: &[f64]) -> Vec<f64> {
    let mut prev = 0.0;
    grid.iter()
        .map(|&t| {
            let dt = t - prev;
            prev = t;
            dt
        })
        .collect()
}

/// area under a step curve up to the last grid point.
/// point `i` of the curve covers the step ending at `grid[i]`
pub fn restricted_mean(survival: ArrayView1<f64>, grid: &[f64]) -> f64 {
    survival
        .iter()
        .zip(time_deltas(grid))
        .map(|(s, dt)| s * dt)
        .sum()
}

/// |RMST(a) - RMST(b)| over a shared ascending time grid ending at the horizon
pub fn rmst_difference(
    a: &KaplanMeierCurve,
    b: &KaplanMeierCurve,
    grid: &[f64],
) -> Result<f64> {
    if grid.is_empty() {
        return Err(RmstError::invalid_dimensions("time grid is empty"));
    }

    if grid.len() > a.len() || grid.len() > b.len() {
        return Err(RmstError::invalid_dimensions(format!(
            "time grid ({} points) longer than curves ({} / {})",
            grid.len(),
            a.len(),
            b.len()
        )));
    }

    if grid.windows(2).any(|w| w[1] < w[0]) {
        return Err(RmstError::invalid_parameter("time grid", "not ascending"));
    }

    let rmst_a = restricted_mean(a.survival(), grid);
    let rmst_b = restricted_mean(b.survival(), grid);

    Ok((rmst_a - rmst_b).abs())
}
