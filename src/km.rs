use ndarray::{Array1, ArrayView1};
use crate::error::{RmstError, Result};

/// kaplan-meier curve for one cohort, one step per sample
///
/// `survival[0]` is time zero (always 1.0) and `survival[i + 1]` is the
/// survival after sample `i`. samples must be in ascending time order: the
/// risk set at `i` is just the cohort members at index `i` or later.
///
/// if a cohort runs out of members while a step is still needed the factor
/// is 0/0 and the curve goes NaN from there on. that's left in on purpose so
/// callers can see exactly where it broke - see [`KaplanMeierCurve::exhausted_step`].
#[derive(Debug, Clone, PartialEq)]
pub struct KaplanMeierCurve {
    survival: Array1<f64>,
}

impl KaplanMeierCurve {
    /// fit from cohort membership + event flags (same length, time-ordered)
    pub fn fit(indicator: &[bool], events: &[bool]) -> Result<Self> {
        if indicator.len() != events.len() {
            return Err(RmstError::invalid_dimensions(format!(
                "cohort indicator len ({}) != events len ({})",
                indicator.len(),
                events.len()
            )));
        }

        let n = indicator.len();

        // reverse running count of members = who's still at risk at i
        let mut at_risk = vec![0usize; n];
        let mut remaining = 0;
        for i in (0..n).rev() {
            if indicator[i] {
                remaining += 1;
            }
            at_risk[i] = remaining;
        }

        let mut survival = Vec::with_capacity(n + 1);
        let mut current = 1.0;
        survival.push(current);

        for i in 0..n {
            let risk = at_risk[i] as f64;
            let died = if indicator[i] && events[i] { 1.0 } else { 0.0 };
            current *= (risk - died) / risk; // 0/0 -> NaN once exhausted
            survival.push(current);
        }

        Ok(Self {
            survival: Array1::from(survival),
        })
    }

    /// survival probabilities, len = n_samples + 1
    pub fn survival(&self) -> ArrayView1<'_, f64> {
        self.survival.view()
    }

    pub fn len(&self) -> usize {
        self.survival.len()
    }

    pub fn is_empty(&self) -> bool {
        self.survival.is_empty()
    }

    /// sample index whose risk set was empty, if the first `prefix` curve
    /// points contain one
    pub fn exhausted_step(&self, prefix: usize) -> Option<usize> {
        self.survival
            .iter()
            .take(prefix)
            .position(|s| s.is_nan())
            .map(|idx| idx - 1) // idx 0 is the fixed 1.0
    }

    /// finite everywhere?
    pub fn is_well_posed(&self) -> bool {
        self.exhausted_step(self.len()).is_none()
    }
}
