use std::ops::Range;
use rayon::prelude::*;
use crate::data::SurvivalData;
use crate::error::{PipelineError, RmstError, Result};
use crate::interaction::{DEFAULT_TIME_PERCENTILE, InteractionResult, compute_interactions_with_limit};

/// replicate index that keeps the data in its original row order
pub const REFERENCE_REPLICATE: u64 = 1;

/// how this worker fits into the overall job
#[derive(Debug, Clone, PartialEq)]
pub struct DistributorConfig {
    worker_index: usize,     // which share of the pair list is ours
    worker_count: usize,     // how many shares there are
    threads: usize,          // parallel pair evaluations on this worker
    replicate: Option<u64>,  // null-distribution replicate, None = real data
    time_percentile: f64,    // percentile of times used as the time limit
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            worker_index: 0,
            worker_count: 1,
            threads: 1,
            replicate: None,
            time_percentile: DEFAULT_TIME_PERCENTILE,
        }
    }
}

impl DistributorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worker(mut self, index: usize, count: usize) -> Self {
        self.worker_index = index;
        self.worker_count = count;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_replicate(mut self, replicate: Option<u64>) -> Self {
        self.replicate = replicate;
        self
    }

    pub fn with_time_percentile(mut self, percentile: f64) -> Self {
        self.time_percentile = percentile;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(RmstError::invalid_parameter("worker_count", self.worker_count));
        }
        if self.worker_index >= self.worker_count {
            return Err(RmstError::invalid_parameter(
                "worker_index",
                format!("{} (only {} workers)", self.worker_index, self.worker_count),
            ));
        }
        if self.threads == 0 {
            return Err(RmstError::invalid_parameter("threads", self.threads));
        }
        if !(0.0..=100.0).contains(&self.time_percentile) {
            return Err(RmstError::invalid_parameter("time_percentile", self.time_percentile));
        }
        Ok(())
    }

    pub fn worker_index(&self) -> usize {
        self.worker_index
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn replicate(&self) -> Option<u64> {
        self.replicate
    }

    pub fn time_percentile(&self) -> f64 {
        self.time_percentile
    }

    /// seed for shuffling feature rows, if this replicate is a permuted one
    pub fn permutation_seed(&self) -> Option<u64> {
        self.replicate.filter(|&r| r != REFERENCE_REPLICATE)
    }
}

/// contiguous share `index` of `total` items split into `parts`;
/// the first `total % parts` shares get one extra item
pub fn partition_range(total: usize, parts: usize, index: usize) -> Range<usize> {
    if parts == 0 || index >= parts {
        return 0..0;
    }
    let base = total / parts;
    let extra = total % parts;
    let start = index * base + index.min(extra);
    let len = base + usize::from(index < extra);
    start..start + len
}

/// two feature labels to score together
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeaturePair {
    pub feature1: String,
    pub feature2: String,
}

impl FeaturePair {
    pub fn new(feature1: impl Into<String>, feature2: impl Into<String>) -> Self {
        Self {
            feature1: feature1.into(),
            feature2: feature2.into(),
        }
    }
}

/// result for one pair - failures stay local to the pair.
///
/// `result` is `Err` only when the pair could not be scored at all (unknown
/// label, mismatched lengths); a failed term shows up in the result's
/// `failures` instead
#[derive(Debug, Clone, PartialEq)]
pub struct PairOutcome {
    pub feature1: String,
    pub feature2: String,
    pub result: std::result::Result<InteractionResult, RmstError>,
}

impl PairOutcome {
    /// true when every term was scored
    pub fn is_ok(&self) -> bool {
        self.failure().is_none()
    }

    /// the error behind the pair's status, if any
    pub fn failure(&self) -> Option<&RmstError> {
        match &self.result {
            Ok(result) => result.first_failure(),
            Err(e) => Some(e),
        }
    }

    /// `ok`, or the label of the first failure
    pub fn status(&self) -> &'static str {
        self.failure().map_or("ok", RmstError::status)
    }
}

/// runs this worker's share of the pair list
#[derive(Debug, Clone)]
pub struct Distributor {
    config: DistributorConfig,
}

impl Distributor {
    pub fn new(config: DistributorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DistributorConfig {
        &self.config
    }

    /// the slice of `pairs` this worker is responsible for
    pub fn assigned<'a>(&self, pairs: &'a [FeaturePair]) -> &'a [FeaturePair] {
        &pairs[partition_range(pairs.len(), self.config.worker_count, self.config.worker_index)]
    }

    /// score every pair given (already partitioned) on a pool of
    /// `threads` workers. output order matches `pairs`
    pub fn run(
        &self,
        data: &SurvivalData,
        pairs: &[FeaturePair],
    ) -> std::result::Result<Vec<PairOutcome>, PipelineError> {
        let permuted;
        let data = match self.config.permutation_seed() {
            Some(seed) => {
                log::info!("replicate {}: permuting feature rows against (time, event)", seed);
                permuted = data.permute_features(seed);
                &permuted
            }
            None => data,
        };

        let time_limit = data.time_limit(self.config.time_percentile)?;
        log::info!(
            "scoring {} pairs over {} samples on {} thread(s), time limit {:.4}",
            pairs.len(),
            data.n_samples(),
            self.config.threads,
            time_limit
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()?;

        let outcomes: Vec<PairOutcome> = pool.install(|| {
            pairs
                .par_iter()
                .map(|pair| score_pair(data, pair, time_limit))
                .collect()
        });

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        if failed > 0 {
            log::warn!("{} of {} pairs had failed terms", failed, outcomes.len());
        }

        Ok(outcomes)
    }
}

/// look up both features and score them
pub fn score_pair(data: &SurvivalData, pair: &FeaturePair, time_limit: f64) -> PairOutcome {
    let result = data.feature(&pair.feature1).and_then(|f1| {
        let f2 = data.feature(&pair.feature2)?;
        compute_interactions_with_limit(f1, f2, data.times(), data.events(), time_limit)
    });

    match &result {
        Ok(scored) => {
            for e in &scored.failures {
                log::warn!("pair ({}, {}): {}", pair.feature1, pair.feature2, e);
            }
        }
        Err(e) => log::warn!("pair ({}, {}) failed: {}", pair.feature1, pair.feature2, e),
    }

    PairOutcome {
        feature1: pair.feature1.clone(),
        feature2: pair.feature2.clone(),
        result,
    }
}
