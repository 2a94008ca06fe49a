//! Per-record sentiment classification on top of a polarity model.

use std::fmt;

use lexis::PolarityModel;
use serde::{Deserialize, Serialize};

use crate::dataset::ReviewRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
  Positive,
  Neutral,
  Negative,
}

impl SentimentLabel {
  /// Canonical report order
  pub const ALL: [SentimentLabel; 3] =
    [SentimentLabel::Positive, SentimentLabel::Neutral, SentimentLabel::Negative];

  /// Exact-zero boundary: anything above zero is positive, anything below is negative.
  pub fn from_polarity(polarity: f64) -> Self {
    if polarity > 0.0 {
      SentimentLabel::Positive
    } else if polarity < 0.0 {
      SentimentLabel::Negative
    } else {
      SentimentLabel::Neutral
    }
  }

  pub fn display_name(&self) -> &'static str {
    match self {
      SentimentLabel::Positive => "Positive",
      SentimentLabel::Neutral => "Neutral",
      SentimentLabel::Negative => "Negative",
    }
  }

  pub fn key(&self) -> &'static str {
    match self {
      SentimentLabel::Positive => "positive",
      SentimentLabel::Neutral => "neutral",
      SentimentLabel::Negative => "negative",
    }
  }
}

impl fmt::Display for SentimentLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.display_name())
  }
}

/// Classifies texts with an injected polarity model. Holds no per-record state.
pub struct Scorer<M> {
  model: M,
}

impl<M: PolarityModel> Scorer<M> {
  pub fn new(model: M) -> Self {
    Self { model }
  }

  pub fn score(&self, text: &str) -> SentimentLabel {
    let polarity = self.model.polarity(text);
    if polarity.is_nan() {
      return SentimentLabel::Neutral;
    }
    SentimentLabel::from_polarity(polarity)
  }

  pub fn score_record(&self, record: &ReviewRecord) -> SentimentLabel {
    self.score(&record.combined_text())
  }

  pub fn score_all(&self, records: &[ReviewRecord]) -> Vec<SentimentLabel> {
    records.iter().map(|record| self.score_record(record)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use lexis::LexiconModel;

  fn fixed_scores(text: &str) -> f64 {
    match text {
      "up" => 0.5,
      "down" => -0.3,
      "tiny" => 0.001,
      "nan" => f64::NAN,
      _ => 0.0,
    }
  }

  #[test]
  fn test_from_polarity_boundaries() {
    assert_eq!(SentimentLabel::from_polarity(0.5), SentimentLabel::Positive);
    assert_eq!(SentimentLabel::from_polarity(-0.3), SentimentLabel::Negative);
    assert_eq!(SentimentLabel::from_polarity(0.0), SentimentLabel::Neutral);
    assert_eq!(SentimentLabel::from_polarity(-0.0), SentimentLabel::Neutral);
  }

  #[test]
  fn test_near_zero_is_not_neutral() {
    let scorer = Scorer::new(fixed_scores);
    assert_eq!(scorer.score("tiny"), SentimentLabel::Positive);
  }

  #[test]
  fn test_nan_polarity_is_neutral() {
    let scorer = Scorer::new(fixed_scores);
    assert_eq!(scorer.score("nan"), SentimentLabel::Neutral);
  }

  #[test]
  fn test_empty_text_is_neutral() {
    let scorer = Scorer::new(LexiconModel::new());
    assert_eq!(scorer.score(""), SentimentLabel::Neutral);
  }

  #[test]
  fn test_score_record_uses_headline_and_body() {
    let scorer = Scorer::new(|text: &str| if text == "up down" { 1.0 } else { 0.0 });
    let record = ReviewRecord::new("up", "down");
    assert_eq!(scorer.score_record(&record), SentimentLabel::Positive);
  }

  #[test]
  fn test_score_all_is_order_independent() {
    let scorer = Scorer::new(fixed_scores);
    let forward = vec![
      ReviewRecord::new("up", ""),
      ReviewRecord::new("down", ""),
      ReviewRecord::new("flat", ""),
    ];
    let reversed: Vec<ReviewRecord> = forward.iter().rev().cloned().collect();

    let labels_forward = scorer.score_all(&forward);
    let mut labels_reversed = scorer.score_all(&reversed);
    labels_reversed.reverse();

    assert_eq!(labels_forward, labels_reversed);
  }

  #[test]
  fn test_label_serialization() {
    assert_eq!(serde_json::to_string(&SentimentLabel::Neutral).unwrap(), "\"neutral\"");
    let label: SentimentLabel = serde_json::from_str("\"negative\"").unwrap();
    assert_eq!(label, SentimentLabel::Negative);
  }
}
