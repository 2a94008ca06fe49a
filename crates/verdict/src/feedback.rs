//! User feedback records shown in the report's feedback tables.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, VerdictError};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Star rating between 1 and 5 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StarRating(u8);

impl StarRating {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 5;

  pub fn new(stars: u8) -> Result<Self> {
    if (Self::MIN..=Self::MAX).contains(&stars) {
      Ok(Self(stars))
    } else {
      Err(VerdictError::validation(
        "star_rating",
        format!("{stars} is outside {}..={}", Self::MIN, Self::MAX),
      ))
    }
  }

  pub fn value(&self) -> u8 {
    self.0
  }
}

impl TryFrom<u8> for StarRating {
  type Error = VerdictError;

  fn try_from(stars: u8) -> Result<Self> {
    Self::new(stars)
  }
}

impl From<StarRating> for u8 {
  fn from(rating: StarRating) -> Self {
    rating.0
  }
}

impl fmt::Display for StarRating {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
  pub comment: String,
  #[serde(alias = "created_date")]
  pub created_at: DateTime<Utc>,
  #[serde(default, alias = "starRating", skip_serializing_if = "Option::is_none")]
  pub star_rating: Option<StarRating>,
}

impl FeedbackRecord {
  pub fn interface(comment: impl Into<String>, created_at: DateTime<Utc>) -> Self {
    Self { comment: comment.into(), created_at, star_rating: None }
  }

  pub fn review(comment: impl Into<String>, created_at: DateTime<Utc>, rating: StarRating) -> Self {
    Self { comment: comment.into(), created_at, star_rating: Some(rating) }
  }

  pub fn formatted_timestamp(&self) -> String {
    self.created_at.format(TIMESTAMP_FORMAT).to_string()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
  /// Comments about the application itself; no rating column
  Interface,
  /// Comments about the analysed reviews; every record carries a rating
  Review,
}

impl FeedbackKind {
  pub fn title(&self) -> &'static str {
    match self {
      FeedbackKind::Interface => "User Interface Feedback",
      FeedbackKind::Review => "Review Feedback",
    }
  }

  pub fn has_rating(&self) -> bool {
    matches!(self, FeedbackKind::Review)
  }
}

/// Ordered feedback records of one kind, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSet {
  kind: FeedbackKind,
  records: Vec<FeedbackRecord>,
}

impl FeedbackSet {
  pub fn new(kind: FeedbackKind, records: Vec<FeedbackRecord>) -> Result<Self> {
    if kind.has_rating() {
      if let Some(index) = records.iter().position(|record| record.star_rating.is_none()) {
        return Err(VerdictError::validation(
          format!("review_feedback[{index}].star_rating"),
          "review feedback requires a star rating",
        ));
      }
    }
    Ok(Self { kind, records })
  }

  pub fn empty(kind: FeedbackKind) -> Self {
    Self { kind, records: Vec::new() }
  }

  /// Reads a JSON array of feedback records
  pub fn load(kind: FeedbackKind, path: &Path) -> Result<Self> {
    let content = std::fs::read_to_string(path).map_err(|e| {
      VerdictError::input_format(format!("cannot read feedback file {}: {e}", path.display()))
    })?;
    let records: Vec<FeedbackRecord> = serde_json::from_str(&content).map_err(|e| {
      VerdictError::input_format(format!("malformed feedback file {}: {e}", path.display()))
    })?;
    Self::new(kind, records)
  }

  pub fn kind(&self) -> FeedbackKind {
    self.kind
  }

  pub fn records(&self) -> &[FeedbackRecord] {
    &self.records
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Table cells for each record: comment, timestamp and, for reviews, the rating
  pub fn rows(&self) -> Vec<Vec<String>> {
    self
      .records
      .iter()
      .map(|record| {
        let mut row = vec![record.comment.clone(), record.formatted_timestamp()];
        if self.kind.has_rating() {
          row.push(record.star_rating.map(|r| r.to_string()).unwrap_or_default());
        }
        row
      })
      .collect()
  }
}

/// Both feedback collections scoped to one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackCollections {
  pub interface: FeedbackSet,
  pub review: FeedbackSet,
}

impl FeedbackCollections {
  pub fn new(interface: Vec<FeedbackRecord>, review: Vec<FeedbackRecord>) -> Result<Self> {
    Ok(Self {
      interface: FeedbackSet::new(FeedbackKind::Interface, interface)?,
      review: FeedbackSet::new(FeedbackKind::Review, review)?,
    })
  }
}

impl Default for FeedbackCollections {
  fn default() -> Self {
    Self {
      interface: FeedbackSet::empty(FeedbackKind::Interface),
      review: FeedbackSet::empty(FeedbackKind::Review),
    }
  }
}
