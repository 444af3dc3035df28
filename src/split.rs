use ndarray::ArrayView1;
use crate::error::{Cohort, RmstError, Result};
use crate::km::KaplanMeierCurve;
use crate::rmst::rmst_difference;
use crate::stats;

/// a feature dichotomized at its sample median
#[derive(Debug, Clone, PartialEq)]
pub struct MedianSplit {
    cutoff: f64,
    above: Vec<bool>, // true = value > median
}

impl MedianSplit {
    /// split on the median; ties go to the at-or-below cohort.
    /// errors if either cohort ends up empty
    pub fn new(feature: ArrayView1<f64>) -> Result<Self> {
        let cutoff = stats::median(feature)?;
        let above: Vec<bool> = feature.iter().map(|&v| v > cutoff).collect();

        let split = Self { cutoff, above };
        let (n_above, n_below) = (split.count(Cohort::Above), split.count(Cohort::AtOrBelow));
        if n_above == 0 || n_below == 0 {
            return Err(RmstError::DegenerateSplit {
                above: n_above,
                at_or_below: n_below,
            });
        }

        Ok(split)
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// membership flags for one cohort
    pub fn indicator(&self, cohort: Cohort) -> Vec<bool> {
        match cohort {
            Cohort::Above => self.above.clone(),
            Cohort::AtOrBelow => self.above.iter().map(|&a| !a).collect(),
        }
    }

    pub fn count(&self, cohort: Cohort) -> usize {
        let above = self.above.iter().filter(|&&a| a).count();
        match cohort {
            Cohort::Above => above,
            Cohort::AtOrBelow => self.above.len() - above,
        }
    }

    /// latest follow-up time seen in a cohort
    fn max_time(&self, cohort: Cohort, times: ArrayView1<f64>) -> f64 {
        let wanted = cohort == Cohort::Above;
        times
            .iter()
            .zip(&self.above)
            .filter(|&(_, &a)| a == wanted)
            .map(|(&t, _)| t)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// where to stop integrating: the earlier of the two cohorts' last
    /// follow-up, capped at the global time limit
    pub fn truncation_horizon(&self, times: ArrayView1<f64>, time_limit: f64) -> f64 {
        let horizon = self
            .max_time(Cohort::Above, times)
            .min(self.max_time(Cohort::AtOrBelow, times));

        if time_limit <= horizon { time_limit } else { horizon }
    }
}

/// observed times up to the horizon, then the horizon itself
pub fn evaluation_grid(times: ArrayView1<f64>, horizon: f64) -> Vec<f64> {
    times
        .iter()
        .copied()
        .filter(|&t| t <= horizon)
        .chain(std::iter::once(horizon))
        .collect()
}

/// rmst gap between the two median-split cohorts of one feature
///
/// `times`/`events` must be in ascending time order (as held by
/// [`crate::SurvivalData`]). full precision, no rounding.
pub fn median_split_rmst(
    feature: ArrayView1<f64>,
    times: ArrayView1<f64>,
    events: &[bool],
    time_limit: f64,
) -> Result<f64> {
    if feature.len() != times.len() || times.len() != events.len() {
        return Err(RmstError::invalid_dimensions(format!(
            "feature ({}), times ({}) and events ({}) must have same length",
            feature.len(),
            times.len(),
            events.len()
        )));
    }

    if !time_limit.is_finite() {
        return Err(RmstError::invalid_parameter("time_limit", time_limit));
    }

    let split = MedianSplit::new(feature)?;
    let horizon = split.truncation_horizon(times, time_limit);

    let above = KaplanMeierCurve::fit(&split.indicator(Cohort::Above), events)?;
    let below = KaplanMeierCurve::fit(&split.indicator(Cohort::AtOrBelow), events)?;

    let grid = evaluation_grid(times, horizon);
    let difference = rmst_difference(&above, &below, &grid)?;

    if difference.is_nan() {
        let exhausted = [(Cohort::Above, &above), (Cohort::AtOrBelow, &below)]
            .into_iter()
            .find_map(|(cohort, curve)| {
                curve
                    .exhausted_step(grid.len())
                    .map(|step| RmstError::ExhaustedRiskSet { cohort, step })
            });
        return Err(exhausted.unwrap_or_else(|| {
            RmstError::numerical_error("rmst difference is NaN w/ finite curves")
        }));
    }

    Ok(difference)
}
