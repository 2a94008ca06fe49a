//! End-to-end orchestration: dataset in, analysis and both report documents out.

use std::io::Write;
use std::path::{Path, PathBuf};

use lexis::{LexiconModel, PolarityModel};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::aggregate::{AnalysisResult, Aggregator};
use crate::chart::ChartRenderer;
use crate::color::Palette;
use crate::config::VerdictConfig;
use crate::dataset::Dataset;
use crate::feedback::FeedbackCollections;
use crate::report::{DocxEncoder, PdfEncoder, ReportBuilder};
use crate::sentiment::{Scorer, SentimentLabel};
use crate::{Result, VerdictError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
  Pdf,
  Docx,
}

impl DocumentFormat {
  pub fn extension(&self) -> &'static str {
    match self {
      DocumentFormat::Pdf => "pdf",
      DocumentFormat::Docx => "docx",
    }
  }
}

/// An encoded report, held in memory until the caller decides where it goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
  pub format: DocumentFormat,
  pub bytes: Vec<u8>,
}

impl GeneratedDocument {
  pub fn file_name(&self, stem: &str) -> String {
    format!("{stem}.{}", self.format.extension())
  }

  /// Writes `<dir>/<stem>.<ext>` through a temporary file in `dir`, so the target
  /// either holds the complete document or is left untouched
  pub fn persist(&self, dir: &Path, stem: &str) -> Result<PathBuf> {
    let target = dir.join(self.file_name(stem));
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
      VerdictError::resource(format!("cannot create temporary file in {}: {e}", dir.display()))
    })?;
    temp.write_all(&self.bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(&target).map_err(|e| {
      VerdictError::resource(format!("cannot write {}: {}", target.display(), e.error))
    })?;
    info!(path = %target.display(), size = self.bytes.len(), "saved report");
    Ok(target)
  }
}

/// File stem for a report, e.g. `report_42`
pub fn report_stem(prefix: &str, id: &str) -> String {
  format!("{prefix}_{id}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
  pub pdf: GeneratedDocument,
  pub docx: GeneratedDocument,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
  pub analysis: AnalysisResult,
  pub pdf: GeneratedDocument,
  pub docx: GeneratedDocument,
}

pub struct Pipeline<M> {
  scorer: Scorer<M>,
  aggregator: Aggregator,
  charts: ChartRenderer,
  config: VerdictConfig,
}

impl Pipeline<LexiconModel> {
  /// Pipeline backed by the built-in review lexicon
  pub fn with_lexicon(config: VerdictConfig) -> Self {
    Self::new(LexiconModel::new(), config)
  }
}

impl<M: PolarityModel> Pipeline<M> {
  pub fn new(model: M, config: VerdictConfig) -> Self {
    Self {
      scorer: Scorer::new(model),
      aggregator: Aggregator::with_template(config.report.narrative_template.clone()),
      charts: ChartRenderer::new(config.chart.clone()),
      config,
    }
  }

  /// Loads and scores a dataset file
  pub fn analyze(&self, dataset_path: &Path) -> Result<AnalysisResult> {
    let dataset = Dataset::load(dataset_path)?;
    info!(path = %dataset_path.display(), rows = dataset.len(), "loaded dataset");
    self.analyze_dataset(&dataset)
  }

  pub fn analyze_dataset(&self, dataset: &Dataset) -> Result<AnalysisResult> {
    let labels = self.scorer.score_all(dataset.records());
    self.aggregator.aggregate(&labels)
  }

  /// Builds both documents from an existing analysis. Nothing is returned unless
  /// both encodings succeed.
  pub fn render(
    &self,
    analysis: &AnalysisResult,
    feedback: &FeedbackCollections,
    palette: &Palette,
  ) -> Result<RenderedReport> {
    let summary = analysis.summary();
    if summary.is_empty() {
      return Err(VerdictError::validation("summary.labels", "cannot report on a summary without labels"));
    }
    palette.ensure_matches(summary.len())?;

    let pie = self.charts.render_pie(summary, palette)?;
    let bar = self.charts.render_bar(summary, palette)?;
    let document = ReportBuilder::new(self.config.report.title.clone()).build(analysis, pie, bar, feedback)?;
    debug!(outline = ?document.outline(), "report outline");

    let pdf = PdfEncoder::new(self.config.page.clone(), self.config.chart.clone()).encode(&document)?;
    let docx = DocxEncoder::new(self.config.page.clone()).encode(&document)?;
    info!(pdf_size = pdf.len(), docx_size = docx.len(), "rendered report");

    Ok(RenderedReport {
      pdf: GeneratedDocument { format: DocumentFormat::Pdf, bytes: pdf },
      docx: GeneratedDocument { format: DocumentFormat::Docx, bytes: docx },
    })
  }

  pub fn run(
    &self,
    dataset_path: &Path,
    feedback: &FeedbackCollections,
    palette: &Palette,
  ) -> Result<PipelineOutput> {
    // fail on a bad palette before spending time on scoring
    palette.ensure_matches(SentimentLabel::ALL.len())?;

    let analysis = self.analyze(dataset_path)?;
    let RenderedReport { pdf, docx } = self.render(&analysis, feedback, palette)?;
    Ok(PipelineOutput { analysis, pdf, docx })
  }
}
