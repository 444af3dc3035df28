use ndarray::ArrayView1;
use crate::error::{RmstError, Result, Term};
use crate::split::median_split_rmst;
use crate::stats;

/// percentile of all follow-up times used as the shared time limit
pub const DEFAULT_TIME_PERCENTILE: f64 = 75.0;

/// rmst separations for a feature pair and its three composites
///
/// values are full precision; call [`InteractionResult::rounded`] when
/// writing them out. each `*_interaction_score` is the composite's
/// separation minus the better of the two single features - positive means
/// the combination splits survival better than either feature alone.
///
/// a term whose split fails is `NaN` and its error is kept in `failures`.
/// the other terms keep their values, except that every score is `NaN`
/// once either single feature has failed.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionResult {
    pub feature1_rmst: f64,
    pub feature2_rmst: f64,
    pub additive_rmst: f64,
    pub additive_interaction_score: f64,
    pub competing_rmst: f64,
    pub competing_interaction_score: f64,
    pub xor_rmst: f64,
    pub xor_interaction_score: f64,
    /// failed terms in evaluation order, each tagged with its [`Term`]
    pub failures: Vec<RmstError>,
}

impl InteractionResult {
    /// assemble from the five separations, deriving the scores.
    ///
    /// scores use the full-precision separations, so a rounded score can
    /// differ in the 4th decimal from one taken between rounded separations
    /// when a value sits exactly on a half.
    pub fn from_separations(
        feature1_rmst: f64,
        feature2_rmst: f64,
        additive_rmst: f64,
        competing_rmst: f64,
        xor_rmst: f64,
    ) -> Self {
        let best_single = best_of(feature1_rmst, feature2_rmst);
        Self {
            feature1_rmst,
            feature2_rmst,
            additive_rmst,
            additive_interaction_score: additive_rmst - best_single,
            competing_rmst,
            competing_interaction_score: competing_rmst - best_single,
            xor_rmst,
            xor_interaction_score: xor_rmst - best_single,
            failures: Vec::new(),
        }
    }

    /// larger of the two single-feature separations, `NaN` if either is
    pub fn best_single(&self) -> f64 {
        best_of(self.feature1_rmst, self.feature2_rmst)
    }

    /// true when all five splits succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn first_failure(&self) -> Option<&RmstError> {
        self.failures.first()
    }

    /// every field rounded to 4 decimals
    pub fn rounded(&self) -> Self {
        Self {
            feature1_rmst: stats::round4(self.feature1_rmst),
            feature2_rmst: stats::round4(self.feature2_rmst),
            additive_rmst: stats::round4(self.additive_rmst),
            additive_interaction_score: stats::round4(self.additive_interaction_score),
            competing_rmst: stats::round4(self.competing_rmst),
            competing_interaction_score: stats::round4(self.competing_interaction_score),
            xor_rmst: stats::round4(self.xor_rmst),
            xor_interaction_score: stats::round4(self.xor_interaction_score),
            failures: self.failures.clone(),
        }
    }

    /// the eight values in output-table column order
    pub fn values(&self) -> [f64; 8] {
        [
            self.feature1_rmst,
            self.feature2_rmst,
            self.additive_rmst,
            self.additive_interaction_score,
            self.competing_rmst,
            self.competing_interaction_score,
            self.xor_rmst,
            self.xor_interaction_score,
        ]
    }
}

// f64::max would drop a NaN operand
fn best_of(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// score the interaction of two features, time limit from
/// [`DEFAULT_TIME_PERCENTILE`] of `times`
pub fn compute_interactions(
    feature1: ArrayView1<f64>,
    feature2: ArrayView1<f64>,
    times: ArrayView1<f64>,
    events: &[bool],
) -> Result<InteractionResult> {
    let time_limit = stats::percentile(times, DEFAULT_TIME_PERCENTILE)?;
    compute_interactions_with_limit(feature1, feature2, times, events, time_limit)
}

/// score the interaction of two features against a precomputed time limit.
///
/// the same limit is used for all five splits, composites included.
/// mismatched input lengths fail the whole call; a failing split only
/// blanks its own term (see [`InteractionResult`]).
pub fn compute_interactions_with_limit(
    feature1: ArrayView1<f64>,
    feature2: ArrayView1<f64>,
    times: ArrayView1<f64>,
    events: &[bool],
    time_limit: f64,
) -> Result<InteractionResult> {
    if feature1.len() != feature2.len() {
        return Err(RmstError::invalid_dimensions(format!(
            "feature lengths differ ({} vs {})",
            feature1.len(),
            feature2.len()
        )));
    }

    if feature1.len() != times.len() || events.len() != times.len() {
        return Err(RmstError::invalid_dimensions(format!(
            "{} feature values, {} times, {} events",
            feature1.len(),
            times.len(),
            events.len()
        )));
    }

    let mut failures = Vec::new();
    let mut separation = |feature: ArrayView1<f64>, term: Term| {
        match median_split_rmst(feature, times, events, time_limit) {
            Ok(value) => value,
            Err(e) => {
                failures.push(e.in_term(term));
                f64::NAN
            }
        }
    };

    let feature1_rmst = separation(feature1, Term::Feature1);
    let feature2_rmst = separation(feature2, Term::Feature2);

    let xor = &feature1 * &feature2;
    let additive = &feature1 + &feature2;
    let competing = &feature1 - &feature2;

    let xor_rmst = separation(xor.view(), Term::Xor);
    let additive_rmst = separation(additive.view(), Term::Additive);
    let competing_rmst = separation(competing.view(), Term::Competing);

    let mut result = InteractionResult::from_separations(
        feature1_rmst,
        feature2_rmst,
        additive_rmst,
        competing_rmst,
        xor_rmst,
    );
    result.failures = failures;
    Ok(result)
}
