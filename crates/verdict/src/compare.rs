//! Side-by-side comparison of two analysed datasets.

use serde::Serialize;

use crate::aggregate::AnalysisResult;
use crate::sentiment::SentimentLabel;

/// Percentage-point movement of one label between two datasets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelDelta {
  pub label: SentimentLabel,
  pub baseline_count: usize,
  pub candidate_count: usize,
  pub baseline_percentage: f64,
  pub candidate_percentage: f64,
  /// `candidate - baseline`, in percentage points
  pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
  pub baseline: AnalysisResult,
  pub candidate: AnalysisResult,
  pub deltas: Vec<LabelDelta>,
}

impl Comparison {
  pub fn new(baseline: AnalysisResult, candidate: AnalysisResult) -> Self {
    let deltas = SentimentLabel::ALL
      .iter()
      .map(|label| {
        let baseline_percentage = baseline.summary().percentage_of(*label);
        let candidate_percentage = candidate.summary().percentage_of(*label);
        LabelDelta {
          label: *label,
          baseline_count: baseline.summary().count_of(*label),
          candidate_count: candidate.summary().count_of(*label),
          baseline_percentage,
          candidate_percentage,
          delta: candidate_percentage - baseline_percentage,
        }
      })
      .collect();
    Self { baseline, candidate, deltas }
  }

  pub fn delta_of(&self, label: SentimentLabel) -> Option<&LabelDelta> {
    self.deltas.iter().find(|d| d.label == label)
  }

  /// Label whose share moved the most in either direction
  pub fn largest_shift(&self) -> Option<&LabelDelta> {
    self.deltas.iter().max_by(|a, b| a.delta.abs().total_cmp(&b.delta.abs()))
  }
}
