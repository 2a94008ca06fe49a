//! Sentiment distribution and narrative summary for a scored dataset.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sentiment::SentimentLabel;
use crate::template::{self, Values};
use crate::{Result, VerdictError};

pub const DEFAULT_NARRATIVE_TEMPLATE: &str = "This sentiment analysis report provides insights into customer opinions. \
The dataset contains {total} reviews: {positive} positive, {negative} negative, and {neutral} neutral. \
This reflects a sentiment distribution of {percent_positive}% positive, {percent_negative}% negative, \
and {percent_neutral}% neutral.";

/// Largest accepted gap, in percentage points, between a stored percentage and its count
const PERCENTAGE_TOLERANCE: f64 = 0.01;

pub const NO_DATA_NARRATIVE: &str = "This sentiment analysis report provides insights into customer opinions. \
The dataset contains no reviews, so no sentiment distribution is available.";

/// Label, count and percentage columns of a sentiment distribution.
///
/// The three sequences are always the same length and every percentage is its
/// count's share of the total. Every constructor (including deserialization)
/// checks this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSummary", into = "RawSummary")]
pub struct SentimentSummary {
  labels: Vec<SentimentLabel>,
  counts: Vec<usize>,
  percentages: Vec<f64>,
}

/// Wire form of [`SentimentSummary`], checked on the way in.
#[derive(Serialize, Deserialize)]
struct RawSummary {
  labels: Vec<SentimentLabel>,
  counts: Vec<usize>,
  percentages: Vec<f64>,
}

impl TryFrom<RawSummary> for SentimentSummary {
  type Error = VerdictError;

  fn try_from(raw: RawSummary) -> Result<Self> {
    Self::try_new(raw.labels, raw.counts, raw.percentages)
  }
}

impl From<SentimentSummary> for RawSummary {
  fn from(summary: SentimentSummary) -> Self {
    RawSummary {
      labels: summary.labels,
      counts: summary.counts,
      percentages: summary.percentages,
    }
  }
}

impl SentimentSummary {
  pub fn try_new(
    labels: Vec<SentimentLabel>,
    counts: Vec<usize>,
    percentages: Vec<f64>,
  ) -> Result<Self> {
    if labels.len() != counts.len() || labels.len() != percentages.len() {
      return Err(VerdictError::validation(
        "summary",
        format!(
          "labels, counts and percentages differ in length ({}, {}, {})",
          labels.len(),
          counts.len(),
          percentages.len()
        ),
      ));
    }
    if let Some(bad) = percentages.iter().find(|p| !p.is_finite() || **p < 0.0) {
      return Err(VerdictError::validation(
        "summary.percentages",
        format!("percentage {bad} is not a finite non-negative number"),
      ));
    }
    let total: usize = counts.iter().sum();
    for ((label, count), percentage) in labels.iter().zip(&counts).zip(&percentages) {
      let expected = share(*count, total);
      if (percentage - expected).abs() > PERCENTAGE_TOLERANCE {
        return Err(VerdictError::validation(
          "summary.percentages",
          format!("{label} is {percentage}% but {count} of {total} reviews is {expected:.2}%"),
        ));
      }
    }
    Ok(Self { labels, counts, percentages })
  }

  /// Builds the canonical Positive, Neutral, Negative distribution from raw labels.
  /// An empty input yields zero counts and zero percentages.
  pub fn from_labels(labels: &[SentimentLabel]) -> Self {
    let counts: Vec<usize> = SentimentLabel::ALL
      .iter()
      .map(|label| labels.iter().filter(|l| *l == label).count())
      .collect();
    Self::from_counts(SentimentLabel::ALL.to_vec(), counts)
  }

  fn from_counts(labels: Vec<SentimentLabel>, counts: Vec<usize>) -> Self {
    let total: usize = counts.iter().sum();
    let percentages = counts.iter().map(|count| share(*count, total)).collect();
    Self { labels, counts, percentages }
  }

  pub fn labels(&self) -> &[SentimentLabel] {
    &self.labels
  }

  pub fn counts(&self) -> &[usize] {
    &self.counts
  }

  pub fn percentages(&self) -> &[f64] {
    &self.percentages
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn total(&self) -> usize {
    self.counts.iter().sum()
  }

  pub fn is_empty_dataset(&self) -> bool {
    self.total() == 0
  }

  pub fn count_of(&self, label: SentimentLabel) -> usize {
    self.position(label).map(|i| self.counts[i]).unwrap_or(0)
  }

  pub fn percentage_of(&self, label: SentimentLabel) -> f64 {
    self.position(label).map(|i| self.percentages[i]).unwrap_or(0.0)
  }

  /// `(label, count, percentage)` rows in summary order
  pub fn rows(&self) -> impl Iterator<Item = (SentimentLabel, usize, f64)> + '_ {
    self
      .labels
      .iter()
      .zip(&self.counts)
      .zip(&self.percentages)
      .map(|((label, count), percentage)| (*label, *count, *percentage))
  }

  fn position(&self, label: SentimentLabel) -> Option<usize> {
    self.labels.iter().position(|l| *l == label)
  }
}

/// Outcome of one analysis run: the narrative plus the distribution it describes.
///
/// `total_rows` and `no_data` are derived from the summary. They are written out for
/// readers of the JSON but recomputed whenever a result is read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAnalysis")]
pub struct AnalysisResult {
  narrative: String,
  summary: SentimentSummary,
  total_rows: usize,
  no_data: bool,
}

#[derive(Deserialize)]
struct RawAnalysis {
  narrative: String,
  summary: SentimentSummary,
}

impl From<RawAnalysis> for AnalysisResult {
  fn from(raw: RawAnalysis) -> Self {
    Self::new(raw.narrative, raw.summary)
  }
}

impl AnalysisResult {
  pub fn new(narrative: String, summary: SentimentSummary) -> Self {
    let total_rows = summary.total();
    Self { narrative, summary, total_rows, no_data: total_rows == 0 }
  }

  pub fn narrative(&self) -> &str {
    &self.narrative
  }

  pub fn summary(&self) -> &SentimentSummary {
    &self.summary
  }

  pub fn total_rows(&self) -> usize {
    self.total_rows
  }

  pub fn no_data(&self) -> bool {
    self.no_data
  }

  /// Reads a result previously written by [`AnalysisResult::save_to_file`]
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
      VerdictError::input_format(format!("cannot read analysis file {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content).map_err(|e| {
      VerdictError::input_format(format!("malformed analysis file {}: {e}", path.display()))
    })
  }

  pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(self)
      .map_err(|e| VerdictError::resource(format!("cannot serialize analysis: {e}")))?;
    std::fs::write(path, content)?;
    Ok(())
  }
}

pub struct Aggregator {
  template: String,
}

impl Default for Aggregator {
  fn default() -> Self {
    Self::new()
  }
}

impl Aggregator {
  pub fn new() -> Self {
    Self { template: DEFAULT_NARRATIVE_TEMPLATE.to_string() }
  }

  pub fn with_template(template: impl Into<String>) -> Self {
    Self { template: template.into() }
  }

  pub fn aggregate(&self, labels: &[SentimentLabel]) -> Result<AnalysisResult> {
    let summary = SentimentSummary::from_labels(labels);
    let narrative = self.narrative(&summary)?;
    debug!(
      total = summary.total(),
      positive = summary.count_of(SentimentLabel::Positive),
      neutral = summary.count_of(SentimentLabel::Neutral),
      negative = summary.count_of(SentimentLabel::Negative),
      "aggregated sentiment"
    );
    Ok(AnalysisResult::new(narrative, summary))
  }

  pub fn narrative(&self, summary: &SentimentSummary) -> Result<String> {
    if summary.is_empty_dataset() {
      warn!("dataset has no rows; using no-data narrative");
      return Ok(NO_DATA_NARRATIVE.to_string());
    }
    template::render(&self.template, &narrative_values(summary))
  }
}

fn share(count: usize, total: usize) -> f64 {
  if total == 0 {
    0.0
  } else {
    count as f64 / total as f64 * 100.0
  }
}

fn narrative_values(summary: &SentimentSummary) -> Values {
  let mut values = Values::new();
  values.insert("total".into(), summary.total().to_string());
  for label in SentimentLabel::ALL {
    values.insert(label.key().into(), summary.count_of(label).to_string());
    values.insert(format!("percent_{}", label.key()), format!("{:.2}", summary.percentage_of(label)));
  }
  values
}

#[cfg(test)]
mod tests {
  use super::*;
  use SentimentLabel::*;

  #[test]
  fn test_counts_in_canonical_order() {
    let summary = SentimentSummary::from_labels(&[Negative, Positive, Positive]);
    assert_eq!(summary.labels(), &[Positive, Neutral, Negative]);
    assert_eq!(summary.counts(), &[2, 0, 1]);
  }

  #[test]
  fn test_percentages_sum_to_hundred() {
    let labels = [Positive, Positive, Neutral, Negative, Negative, Negative, Positive];
    let summary = SentimentSummary::from_labels(&labels);
    let sum: f64 = summary.percentages().iter().sum();
    assert!((sum - 100.0).abs() < 0.01);
    assert_eq!(summary.total(), labels.len());
  }

  #[test]
  fn test_empty_input_is_zero_filled() {
    let summary = SentimentSummary::from_labels(&[]);
    assert_eq!(summary.counts(), &[0, 0, 0]);
    assert_eq!(summary.percentages(), &[0.0, 0.0, 0.0]);
    assert!(summary.is_empty_dataset());
    assert!(!summary.is_empty());
  }

  #[test]
  fn test_try_new_rejects_mismatched_lengths() {
    let err = SentimentSummary::try_new(vec![Positive, Neutral], vec![1, 2, 3], vec![10.0, 20.0])
      .unwrap_err();
    assert_eq!(err.kind(), "validation");
  }

  #[test]
  fn test_try_new_rejects_negative_percentages() {
    let err = SentimentSummary::try_new(vec![Positive], vec![1], vec![-5.0]).unwrap_err();
    assert!(err.to_string().contains("summary.percentages"));
  }

  #[test]
  fn test_try_new_rejects_percentages_that_disagree_with_counts() {
    let err = SentimentSummary::try_new(vec![Positive, Neutral, Negative], vec![5, 0, 0], vec![0.0, 0.0, 0.0])
      .unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(err.to_string().contains("summary.percentages"));

    let rounded = SentimentSummary::try_new(vec![Positive, Negative], vec![1, 2], vec![33.333, 66.667]);
    assert!(rounded.is_ok());
  }

  #[test]
  fn test_zero_total_requires_zero_percentages() {
    assert!(SentimentSummary::try_new(vec![Positive], vec![0], vec![0.0]).is_ok());
    assert!(SentimentSummary::try_new(vec![Positive], vec![0], vec![100.0]).is_err());
  }

  #[test]
  fn test_deserialization_validates_shape() {
    let bad = r#"{"labels":["positive"],"counts":[1,2],"percentages":[100.0]}"#;
    assert!(serde_json::from_str::<SentimentSummary>(bad).is_err());

    let good = r#"{"labels":["positive"],"counts":[1],"percentages":[100.0]}"#;
    let summary: SentimentSummary = serde_json::from_str(good).unwrap();
    assert_eq!(summary.count_of(Positive), 1);
  }

  #[test]
  fn test_three_way_split_narrative() {
    let result = Aggregator::new().aggregate(&[Positive, Negative, Neutral]).unwrap();
    assert_eq!(result.summary().counts(), &[1, 1, 1]);
    for percentage in result.summary().percentages() {
      assert!((percentage - 33.33).abs() < 0.01);
    }
    assert!(result.narrative().contains("3 reviews: 1 positive, 1 negative, and 1 neutral"));
    assert!(result.narrative().contains("33.33% positive, 33.33% negative, and 33.33% neutral"));
  }

  #[test]
  fn test_single_neutral_row() {
    let result = Aggregator::new().aggregate(&[Neutral]).unwrap();
    assert_eq!(result.summary().counts(), &[0, 1, 0]);
    assert_eq!(result.summary().percentage_of(Neutral), 100.0);
    assert!(result.narrative().contains("100.00% neutral"));
  }

  #[test]
  fn test_empty_dataset_flags_no_data() {
    let result = Aggregator::new().aggregate(&[]).unwrap();
    assert!(result.no_data());
    assert_eq!(result.total_rows(), 0);
    assert_eq!(result.narrative(), NO_DATA_NARRATIVE);
  }

  #[test]
  fn test_every_label_has_count_and_percent_placeholders() {
    let summary = SentimentSummary::from_labels(&[Positive, Positive, Neutral, Negative]);
    let values = narrative_values(&summary);
    for label in SentimentLabel::ALL {
      assert_eq!(values[label.key()], summary.count_of(label).to_string());
      assert_eq!(values[&format!("percent_{}", label.key())], format!("{:.2}", summary.percentage_of(label)));
    }
    assert_eq!(values["total"], "4");
  }

  #[test]
  fn test_custom_template_missing_key_fails() {
    let aggregator = Aggregator::with_template("{total} reviews, {mixed} mixed");
    let err = aggregator.aggregate(&[Positive]).unwrap_err();
    assert!(err.to_string().contains("'mixed'"));
  }

  #[test]
  fn test_analysis_result_round_trips_through_json() {
    let result = Aggregator::new().aggregate(&[Positive, Negative]).unwrap();
    let json = serde_json::to_string(&result).unwrap();
    let restored: AnalysisResult = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, result);
  }

  #[test]
  fn test_aggregation_is_idempotent() {
    let labels = [Positive, Neutral, Negative, Negative];
    let aggregator = Aggregator::new();
    assert_eq!(aggregator.aggregate(&labels).unwrap(), aggregator.aggregate(&labels).unwrap());
  }

  #[test]
  fn test_analysis_file_save_and_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("analysis.json");
    let result = Aggregator::new().aggregate(&[Positive, Positive, Neutral]).unwrap();

    result.save_to_file(&path).unwrap();
    assert_eq!(AnalysisResult::load_from_file(&path).unwrap(), result);
  }

  #[test]
  fn test_malformed_analysis_file_is_input_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("analysis.json");
    std::fs::write(&path, r#"{"narrative":"x","summary":{"labels":[],"counts":[1],"percentages":[]}}"#)
      .unwrap();

    let err = AnalysisResult::load_from_file(&path).unwrap_err();
    assert_eq!(err.kind(), "input_format");
  }

  #[test]
  fn test_loaded_analysis_derives_totals_from_summary() {
    let json = r#"{
      "narrative": "x",
      "summary": {"labels": ["positive", "neutral", "negative"], "counts": [3, 1, 0], "percentages": [75.0, 25.0, 0.0]},
      "total_rows": 0,
      "no_data": true
    }"#;
    let result: AnalysisResult = serde_json::from_str(json).unwrap();
    assert_eq!(result.total_rows(), 4);
    assert!(!result.no_data());

    let without_totals = r#"{"narrative": "x", "summary": {"labels": ["positive"], "counts": [0], "percentages": [0.0]}}"#;
    let result: AnalysisResult = serde_json::from_str(without_totals).unwrap();
    assert_eq!(result.total_rows(), 0);
    assert!(result.no_data());
  }

  #[test]
  fn test_inconsistent_analysis_file_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("analysis.json");
    std::fs::write(
      &path,
      r#"{"narrative":"x","summary":{"labels":["positive","neutral","negative"],"counts":[5,0,0],"percentages":[0,0,0]}}"#,
    )
    .unwrap();

    let err = AnalysisResult::load_from_file(&path).unwrap_err();
    assert_eq!(err.kind(), "input_format");
    assert!(err.to_string().contains("summary.percentages"));
  }
}
