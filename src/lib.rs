//! # rmst interactions
//!
//! does combining two features split survival better than either one alone?
//!
//! ## how it scores a pair
//!
//! - split each feature at its median, fit a kaplan-meier curve per cohort
//! - separation = |RMST difference| between the two cohort curves, integrated
//!   up to a shared horizon (75th percentile of follow-up by default)
//! - do the same for three composites: `f1 + f2`, `f1 - f2`, `f1 * f2`
//! - interaction score = composite separation - best single-feature separation
//!
//! the numeric core is pure; the [`distributor`] and [`io`] modules handle
//! partitioning pair lists across workers, permutation replicates, and the
//! input/output tables.
//!
//! ## quick start
//!
//! ```rust
//! use rmst_interactions::{SurvivalData, compute_interactions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let times = (1..=12).map(f64::from).collect();
//! let events = vec![true, true, true, true, true, true, true, false, true, false, true, false];
//! let data = SurvivalData::from_columns(times, events, vec![
//!     // high values die early
//!     ("g1".to_string(), vec![9.0, 8.5, 8.0, 7.5, 7.0, 6.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]),
//!     ("g2".to_string(), vec![0.3, -1.2, 0.8, 0.1, -0.5, 1.1, -0.9, 0.6, -0.2, 1.4, -1.0, 0.2]),
//! ])?;
//!
//! let result = compute_interactions(
//!     data.feature("g1")?,
//!     data.feature("g2")?,
//!     data.times(),
//!     data.events(),
//! )?;
//!
//! assert!(result.feature1_rmst > result.feature2_rmst);
//! println!("xor interaction: {:.4}", result.rounded().xor_interaction_score);
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod distributor;
pub mod error;
pub mod interaction;
pub mod io;
pub mod km;
pub mod rmst;
pub mod split;
pub mod stats;

pub use data::SurvivalData;
pub use distributor::{Distributor, DistributorConfig, FeaturePair, PairOutcome};
pub use error::{Cohort, PipelineError, Result, RmstError, Term};
pub use interaction::{InteractionResult, compute_interactions, compute_interactions_with_limit};
pub use km::KaplanMeierCurve;
pub use rmst::rmst_difference;
pub use split::median_split_rmst;
