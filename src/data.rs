use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use crate::error::{RmstError, Result};
use crate::stats;

/// survival data - follow-up times, events, and named feature columns
///
/// rows are kept in ascending time order. the kaplan-meier risk sets are
/// read straight off the row order, so `new` sorts once here instead of
/// trusting callers to do it.
#[derive(Debug, Clone)]
pub struct SurvivalData {
    times: Array1<f64>,         // time to event/censoring, ascending
    events: Vec<bool>,          // true = event, false = censored
    features: Array2<f64>,      // n_samples x n_features
    feature_names: Vec<String>, // one label per feature column
}

impl SurvivalData {
    /// make new survival data from raw vecs + a feature matrix
    pub fn new(
        times: Vec<f64>,
        events: Vec<bool>,
        features: Array2<f64>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        let n_samples = times.len();

        if n_samples == 0 {
            return Err(RmstError::invalid_survival_data("no samples"));
        }

        if events.len() != n_samples {
            return Err(RmstError::invalid_dimensions(format!(
                "times len ({}) != events len ({})",
                n_samples,
                events.len()
            )));
        }

        if features.nrows() != n_samples {
            return Err(RmstError::invalid_dimensions(format!(
                "feature rows ({}) != n_samples ({})",
                features.nrows(),
                n_samples
            )));
        }

        if feature_names.len() != features.ncols() {
            return Err(RmstError::invalid_dimensions(format!(
                "{} feature names for {} feature columns",
                feature_names.len(),
                features.ncols()
            )));
        }

        for (i, name) in feature_names.iter().enumerate() {
            if feature_names[..i].contains(name) {
                return Err(RmstError::invalid_survival_data(format!(
                    "feature '{}' appears twice",
                    name
                )));
            }
        }

        if times.iter().any(|&t| t < 0.0 || !t.is_finite()) {
            return Err(RmstError::invalid_survival_data(
                "survival times must be non-negative & finite",
            ));
        }

        if let Some((_, col)) = features
            .indexed_iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(idx, _)| idx)
        {
            return Err(RmstError::invalid_survival_data(format!(
                "feature '{}' has non-finite values",
                feature_names[col]
            )));
        }

        let data = Self {
            times: Array1::from(times),
            events,
            features,
            feature_names,
        };

        Ok(data.sorted_by_time())
    }

    /// build from (name, values) columns - handy for readers and tests
    pub fn from_columns(
        times: Vec<f64>,
        events: Vec<bool>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self> {
        let n_samples = times.len();
        let mut features = Array2::zeros((n_samples, columns.len()));
        let mut names = Vec::with_capacity(columns.len());

        for (j, (name, values)) in columns.into_iter().enumerate() {
            if values.len() != n_samples {
                return Err(RmstError::invalid_dimensions(format!(
                    "feature '{}' has {} values, expected {}",
                    name,
                    values.len(),
                    n_samples
                )));
            }
            features.column_mut(j).assign(&Array1::from(values));
            names.push(name);
        }

        Self::new(times, events, features, names)
    }

    /// stable reorder of every row by ascending time
    fn sorted_by_time(self) -> Self {
        if self.times.iter().zip(self.times.iter().skip(1)).all(|(a, b)| a <= b) {
            return self;
        }

        let mut order: Vec<usize> = (0..self.n_samples()).collect();
        order.sort_by(|&a, &b| self.times[a].total_cmp(&self.times[b]));

        Self {
            times: self.times.select(Axis(0), &order),
            events: order.iter().map(|&i| self.events[i]).collect(),
            features: self.features.select(Axis(0), &order),
            feature_names: self.feature_names,
        }
    }

    /// how many samples
    pub fn n_samples(&self) -> usize {
        self.times.len()
    }

    /// how many feature columns
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// follow-up times, ascending
    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    /// event indicators (true = event, false = censored)
    pub fn events(&self) -> &[bool] {
        &self.events
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// one feature column, aligned w/ times()
    pub fn feature(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        self.feature_names
            .iter()
            .position(|n| n == name)
            .map(|j| self.features.column(j))
            .ok_or_else(|| RmstError::feature_not_found(name))
    }

    /// time horizon shared by every split: the given percentile of all times
    pub fn time_limit(&self, percentile: f64) -> Result<f64> {
        stats::percentile(self.times(), percentile)
    }

    /// shuffle feature rows against the fixed (time, event) pairs.
    /// same seed -> same permutation
    pub fn permute_features(&self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..self.n_samples()).collect();
        order.shuffle(&mut rng);

        Self {
            times: self.times.clone(),
            events: self.events.clone(),
            features: self.features.select(Axis(0), &order),
            feature_names: self.feature_names.clone(),
        }
    }
}
