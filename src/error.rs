use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RmstError>;

/// which side of a median split a sample falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cohort {
    Above,     // value > median
    AtOrBelow, // value <= median, ties land here
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cohort::Above => f.write_str("above-median"),
            Cohort::AtOrBelow => f.write_str("at-or-below-median"),
        }
    }
}

/// the five median-split evaluations that make up one interaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    Feature1,
    Feature2,
    Additive,
    Competing,
    Xor,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Term::Feature1 => "feature1",
            Term::Feature2 => "feature2",
            Term::Additive => "additive",
            Term::Competing => "competing",
            Term::Xor => "xor",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RmstError {
    #[error("dimensions don't match: {message}")]
    InvalidDimensions { message: String },

    #[error("bad parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    #[error("survival data is broken: {message}")]
    InvalidSurvivalData { message: String },

    #[error("no feature column named '{name}'")]
    FeatureNotFound { name: String },

    #[error("median split left a cohort empty ({above} above, {at_or_below} at/below median)")]
    DegenerateSplit { above: usize, at_or_below: usize },

    #[error("{cohort} cohort ran out of subjects at risk at step {step}")]
    ExhaustedRiskSet { cohort: Cohort, step: usize },

    #[error("numerical issues: {message}")]
    NumericalError { message: String },

    #[error("{term} term failed: {source}")]
    Term {
        term: Term,
        #[source]
        source: Box<RmstError>,
    },
}

impl RmstError {
    pub fn invalid_dimensions(message: impl Into<String>) -> Self {
        Self::InvalidDimensions { message: message.into() }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    pub fn invalid_survival_data(message: impl Into<String>) -> Self {
        Self::InvalidSurvivalData { message: message.into() }
    }

    pub fn feature_not_found(name: impl Into<String>) -> Self {
        Self::FeatureNotFound { name: name.into() }
    }

    pub fn numerical_error(message: impl Into<String>) -> Self {
        Self::NumericalError { message: message.into() }
    }

    /// tag an error with the interaction term it came from
    pub fn in_term(self, term: Term) -> Self {
        Self::Term { term, source: Box::new(self) }
    }

    /// innermost error, skipping term tags
    pub fn root(&self) -> &RmstError {
        match self {
            Self::Term { source, .. } => source.root(),
            other => other,
        }
    }

    /// stable label for the status column of the result table
    pub fn status(&self) -> &'static str {
        match self.root() {
            Self::InvalidDimensions { .. } => "invalid_dimensions",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::InvalidSurvivalData { .. } => "invalid_survival_data",
            Self::FeatureNotFound { .. } => "feature_not_found",
            Self::DegenerateSplit { .. } => "degenerate_split",
            Self::ExhaustedRiskSet { .. } => "exhausted_risk_set",
            Self::NumericalError { .. } => "numerical_error",
            Self::Term { .. } => "term_failed", // root() never stops on a tag
        }
    }
}

/// failures at the file / thread-pool boundary, outside the numeric core
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' not found in input")]
    ColumnNotFound(String),

    #[error("can't parse '{value}' in column '{column}' (row {row})")]
    Parse { column: String, row: usize, value: String },

    #[error("malformed pair list at line {line}: {message}")]
    MalformedPairs { line: usize, message: String },

    #[error("couldn't build worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Data(#[from] RmstError),
}
