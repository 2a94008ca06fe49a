//! Report document model and its two encodings.
//!
//! A [`ReportDocument`] is an ordered list of blocks. The fixed-page encoder places
//! them with [`LayoutEngine`] and writes a PDF; the flow encoder writes the same
//! blocks, in the same order, as a DOCX body and leaves pagination to the reader.

pub mod docx;
pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod table;

use tracing::debug;

pub use docx::DocxEncoder;
pub use layout::{Cursor, Element, LaidOutDocument, LayoutEngine, Page, Placed};
pub use pdf::PdfEncoder;
pub use table::{Column, Table};

use crate::aggregate::{AnalysisResult, SentimentSummary};
use crate::chart::{ChartImage, ChartKind};
use crate::feedback::{FeedbackCollections, FeedbackSet};
use crate::{Result, VerdictError};

pub const SUMMARY_TABLE_TITLE: &str = "Summary Table";
pub const FEEDBACK_TABLE_GAP: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
  /// Level 1 is the document title; deeper levels are section headings
  Heading { text: String, level: u8 },
  Paragraph(String),
  Image(ChartImage),
  Table(Table),
  PageBreak,
  /// Vertical gap in points
  Spacer(f32),
}

impl Block {
  /// Short signature used to compare section order across encodings
  pub fn signature(&self) -> String {
    match self {
      Block::Heading { text, level } => format!("heading{level}:{text}"),
      Block::Paragraph(_) => "paragraph".to_string(),
      Block::Image(image) => match image.kind {
        ChartKind::Pie => "image:pie".to_string(),
        ChartKind::Bar => "image:bar".to_string(),
      },
      Block::Table(table) => format!("table:{}", table.title().unwrap_or_default()),
      Block::PageBreak => "page-break".to_string(),
      Block::Spacer(_) => "spacer".to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDocument {
  blocks: Vec<Block>,
}

impl ReportDocument {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, block: Block) {
    self.blocks.push(block);
  }

  pub fn blocks(&self) -> &[Block] {
    &self.blocks
  }

  pub fn outline(&self) -> Vec<String> {
    self.blocks.iter().map(Block::signature).collect()
  }

  pub fn tables(&self) -> impl Iterator<Item = &Table> {
    self.blocks.iter().filter_map(|block| match block {
      Block::Table(table) => Some(table),
      _ => None,
    })
  }
}

/// Assembles the canonical report: title, narrative, both charts, the summary
/// table, then the feedback tables on their own page.
pub struct ReportBuilder {
  title: String,
}

impl ReportBuilder {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into() }
  }

  pub fn build(
    &self,
    analysis: &AnalysisResult,
    pie: ChartImage,
    bar: ChartImage,
    feedback: &FeedbackCollections,
  ) -> Result<ReportDocument> {
    let mut document = ReportDocument::new();
    let summary = summary_table(analysis.summary())?;

    document.push(Block::Heading { text: self.title.clone(), level: 1 });
    document.push(Block::Paragraph(analysis.narrative().to_string()));
    document.push(Block::Image(pie));
    document.push(Block::Image(bar));
    document.push(Block::Table(summary));
    document.push(Block::PageBreak);
    document.push(Block::Table(feedback_table(&feedback.interface)?));
    document.push(Block::Spacer(FEEDBACK_TABLE_GAP));
    document.push(Block::Table(feedback_table(&feedback.review)?));

    debug!(blocks = document.blocks().len(), "assembled report document");
    Ok(document)
  }
}

pub fn summary_table(summary: &SentimentSummary) -> Result<Table> {
  if summary.is_empty() {
    return Err(VerdictError::validation("summary.labels", "a report needs at least one sentiment label"));
  }
  let columns = vec![
    Column::new("Review Type", 0.27),
    Column::new("Total", 0.27),
    Column::new("Percentage", 0.27),
  ];
  let rows = summary
    .rows()
    .map(|(label, count, percentage)| {
      vec![label.display_name().to_string(), count.to_string(), format!("{percentage:.2}%")]
    })
    .collect();
  Table::new(Some(SUMMARY_TABLE_TITLE.to_string()), columns)?.with_rows(rows)
}

pub fn feedback_table(set: &FeedbackSet) -> Result<Table> {
  let columns = if set.kind().has_rating() {
    vec![
      Column::new("Comment", 0.266667),
      Column::new("Created Date", 0.266667),
      Column::new("Rating", 0.266667),
    ]
  } else {
    vec![Column::new("Comment", 0.4), Column::new("Created Date", 0.4)]
  };
  Table::new(Some(set.kind().title().to_string()), columns)?.with_rows(set.rows())
}
