use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use serde::{Serialize, Serializer};
use crate::data::SurvivalData;
use crate::distributor::{FeaturePair, PairOutcome};
use crate::error::PipelineError;
use crate::stats;

pub const TIME_COLUMN: &str = "time";
pub const EVENT_COLUMN: &str = "event";

/// tab for .tsv/.txt, comma for everything else
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("txt") => b'\t',
        _ => b',',
    }
}

fn parse_number(value: &str, column: &str, row: usize) -> Result<f64, PipelineError> {
    value.trim().parse::<f64>().map_err(|_| PipelineError::Parse {
        column: column.to_string(),
        row,
        value: value.to_string(),
    })
}

fn parse_event(value: &str, row: usize) -> Result<bool, PipelineError> {
    match value.trim() {
        "1" | "1.0" | "true" | "True" | "TRUE" => Ok(true),
        "0" | "0.0" | "false" | "False" | "FALSE" => Ok(false),
        other => Err(PipelineError::Parse {
            column: EVENT_COLUMN.to_string(),
            row,
            value: other.to_string(),
        }),
    }
}

/// read `time`, `event` and the named feature columns from a delimited file
/// with a header row. other columns are ignored, and so are requested
/// features the file doesn't have
pub fn read_survival_data(path: &Path, features: &[String]) -> Result<SurvivalData, PipelineError> {
    let file = File::open(path)?;
    read_survival_data_from(file, delimiter_for(path), features)
}

pub fn read_survival_data_from<R: Read>(
    reader: R,
    delimiter: u8,
    features: &[String],
) -> Result<SurvivalData, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::ColumnNotFound(name.to_string()))
    };

    let time_idx = column(TIME_COLUMN)?;
    let event_idx = column(EVENT_COLUMN)?;

    // labels absent from the header are left out; pairs naming them are
    // reported per pair as feature_not_found
    let mut wanted: Vec<String> = Vec::with_capacity(features.len());
    let mut feature_idx = Vec::with_capacity(features.len());
    let mut seen = HashSet::new();
    for name in features {
        if !seen.insert(name.as_str()) {
            continue;
        }
        match column(name.as_str()) {
            Ok(idx) => {
                wanted.push(name.clone());
                feature_idx.push(idx);
            }
            Err(_) => log::warn!("feature '{}' not in the data, skipping it", name),
        }
    }

    let mut times = Vec::new();
    let mut events = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); wanted.len()];

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        times.push(parse_number(cell(time_idx), TIME_COLUMN, row)?);
        events.push(parse_event(cell(event_idx), row)?);
        for (values, (&idx, name)) in columns.iter_mut().zip(feature_idx.iter().zip(&wanted)) {
            values.push(parse_number(cell(idx), name, row)?);
        }
    }

    log::info!(
        "read {} samples ({} events) w/ {} feature columns",
        times.len(),
        events.iter().filter(|&&e| e).count(),
        wanted.len()
    );

    let data = SurvivalData::from_columns(times, events, wanted.into_iter().zip(columns).collect())?;
    Ok(data)
}

/// headerless two-column list of feature pairs
pub fn read_pairs(path: &Path) -> Result<Vec<FeaturePair>, PipelineError> {
    let file = File::open(path)?;
    read_pairs_from(file, delimiter_for(path))
}

pub fn read_pairs_from<R: Read>(reader: R, delimiter: u8) -> Result<Vec<FeaturePair>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut pairs = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() != 2 {
            return Err(PipelineError::MalformedPairs {
                line: line + 1,
                message: format!("expected 2 fields, got {}", record.len()),
            });
        }
        pairs.push(FeaturePair::new(&record[0], &record[1]));
    }
    Ok(pairs)
}

/// rounded to 4 places and printed w/ exactly 4 decimals
fn fixed4<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let rounded = stats::round4(*value);
    if rounded.is_nan() {
        serializer.serialize_str("NaN")
    } else {
        serializer.serialize_str(&format!("{:.4}", rounded))
    }
}

/// one output row
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord<'a> {
    pub feature1: &'a str,
    pub feature2: &'a str,
    #[serde(serialize_with = "fixed4")]
    pub feature1_rmst: f64,
    #[serde(serialize_with = "fixed4")]
    pub feature2_rmst: f64,
    #[serde(serialize_with = "fixed4")]
    pub additive_rmst: f64,
    #[serde(serialize_with = "fixed4")]
    pub additive_interaction_score: f64,
    #[serde(serialize_with = "fixed4")]
    pub competing_rmst: f64,
    #[serde(serialize_with = "fixed4")]
    pub competing_interaction_score: f64,
    #[serde(serialize_with = "fixed4")]
    pub xor_rmst: f64,
    #[serde(serialize_with = "fixed4")]
    pub xor_interaction_score: f64,
    pub status: &'static str,
}

impl<'a> From<&'a PairOutcome> for ResultRecord<'a> {
    fn from(outcome: &'a PairOutcome) -> Self {
        let [f1, f2, add, add_score, comp, comp_score, xor, xor_score] = match &outcome.result {
            Ok(result) => result.values(),
            // nothing was scored
            Err(_) => [f64::NAN; 8],
        };
        Self {
            feature1: &outcome.feature1,
            feature2: &outcome.feature2,
            feature1_rmst: f1,
            feature2_rmst: f2,
            additive_rmst: add,
            additive_interaction_score: add_score,
            competing_rmst: comp,
            competing_interaction_score: comp_score,
            xor_rmst: xor,
            xor_interaction_score: xor_score,
            status: outcome.status(),
        }
    }
}

/// write the result table, creating parent dirs as needed
pub fn write_results(path: &Path, outcomes: &[PairOutcome]) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_results_to(file, delimiter_for(path), outcomes)?;
    log::info!("wrote {} rows to {}", outcomes.len(), path.display());
    Ok(())
}

pub fn write_results_to<W: Write>(
    writer: W,
    delimiter: u8,
    outcomes: &[PairOutcome],
) -> Result<(), PipelineError> {
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    for outcome in outcomes {
        writer.serialize(ResultRecord::from(outcome))?;
    }
    writer.flush()?;
    Ok(())
}
